//! Compile-time assembly with the `tasm_bytes!` and `tasm_array!` macros.
//!
//! Run with: `cargo run --example compile_time_asm -p tasm-macros`

use tasm_macros::{tasm_array, tasm_bytes};

/// Function prologue.
const PROLOGUE: &[u8] = tasm_bytes!(
    "
    push rbp
    mov rbp, rsp
"
);

/// Function epilogue.
const EPILOGUE: &[u8] = tasm_bytes!(
    "
    pop rbp
    ret
"
);

/// Reads `node.value` through `rdi` and returns it.
const LOAD_VALUE: &[u8] = tasm_bytes!(
    "
    .type node
    int64 next
    int32 value
    .endtype
    mov eax, [rdi:node.value]
    ret
"
);

/// A fixed-size trap instruction.
const TRAP: [u8; 1] = tasm_array!("int3");

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn main() {
    println!("prologue:   {}", hex(PROLOGUE));
    println!("epilogue:   {}", hex(EPILOGUE));
    println!("load_value: {}", hex(LOAD_VALUE));
    println!("trap:       {}", hex(&TRAP));
}
