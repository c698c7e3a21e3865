//! Basic assembly example: the one-shot and builder APIs.
//!
//! Run with: `cargo run --example basic`

use tasm::{assemble, Assembler, Type};

fn main() {
    println!("=== tasm basic example ===\n");

    // --- One-shot assembly ---
    println!("1. One-shot assembly (mov eax, 42; ret):");
    let bytes = assemble("mov eax, 42\nret").unwrap();
    print_hex("   ", &bytes);

    // --- Builder API ---
    println!("\n2. Builder API (function prologue/epilogue):");
    let mut asm = Assembler::new();
    asm.enable_listing();
    asm.emit(
        r#"
entry:
    push rbp
    mov rbp, rsp
    sub rsp, 0x20
    # function body would go here
    xor eax, eax        # return 0
    add rsp, 0x20
    pop rbp
    ret
"#,
    )
    .unwrap();

    let result = asm.finish().unwrap();
    print_hex("   ", result.bytes());

    println!("\n   Labels:");
    for (name, offset) in result.labels() {
        println!("   {}: 0x{:X}", name, offset);
    }

    println!("\n   Listing:");
    for line in result.listing().lines() {
        println!("   {}", line);
    }

    // --- Data directives ---
    println!("\n3. Data directives:");
    let bytes = assemble(
        r#"
.utf8 "Hello, tasm!"
.byte 0
.align 4
.int32 0xDEADBEEF
.double 2.5
"#,
    )
    .unwrap();
    print_hex("   ", &bytes);

    // --- Types ---
    println!("\n4. Typed memory operands:");
    let bytes = assemble(
        r#"
.type node
    int64 next
    int32 value
    byte  flags
.endtype
    mov rax, [rdi:node.next]
    mov ecx, [rdi:node.value]
    add rdi, node
"#,
    )
    .unwrap();
    print_hex("   ", &bytes);

    // --- Types built in Rust ---
    println!("\n5. Types registered from Rust:");
    let mut header = Type::new("header", true);
    header.add_member("magic", &Type::primitive("int32", 4), 1).unwrap();
    header.add_member("version", &Type::primitive("byte", 1), 1).unwrap();
    header.add_member("length", &Type::primitive("int64", 8), 1).unwrap();

    let mut asm = Assembler::new();
    asm.define_type(header).unwrap();
    let bytes = asm.encode_one("mov rdx, [rsi:header.length]").unwrap();
    println!(
        "   header.length at offset {}",
        asm.types().offset_of("header.length").unwrap()
    );
    print_hex("   ", &bytes);

    // --- Errors ---
    println!("\n6. Errors:");
    if let Err(e) = assemble("nop\npush eax") {
        println!("   {e}");
    }

    println!("\n=== Done! ===");
}

fn print_hex(prefix: &str, bytes: &[u8]) {
    print!("{}", prefix);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 && i % 16 == 0 {
            println!();
            print!("{}", prefix);
        }
        print!("{:02X} ", b);
    }
    println!();
}
