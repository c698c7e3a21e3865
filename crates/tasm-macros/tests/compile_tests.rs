//! Integration tests for the `tasm_bytes!` and `tasm_array!` proc-macros.

use tasm_macros::{tasm_array, tasm_bytes};

#[test]
fn single_instruction() {
    const CODE: &[u8] = tasm_bytes!("nop");
    assert_eq!(CODE, &[0x90]);
}

#[test]
fn multi_instruction() {
    const CODE: &[u8] = tasm_bytes!("xor eax, eax\ninc eax\nret");
    assert_eq!(CODE, &[0x31, 0xC0, 0xFF, 0xC0, 0xC3]);
}

#[test]
fn accumulator_form() {
    const CODE: &[u8] = tasm_bytes!("add eax, 5");
    assert_eq!(CODE, &[0x05, 0x05, 0x00, 0x00, 0x00]);
}

#[test]
fn extended_register_gets_rex() {
    const CODE: [u8; 2] = tasm_array!("push r12");
    assert_eq!(CODE, [0x41, 0x54]);
}

#[test]
fn array_multi() {
    const CODE: [u8; 5] = tasm_array!("xor eax, eax\ninc eax\nret");
    assert_eq!(CODE, [0x31, 0xC0, 0xFF, 0xC0, 0xC3]);
}

#[test]
fn raw_string_source() {
    const CODE: &[u8] = tasm_bytes!(
        r#"
        nop
        nop
        ret
    "#
    );
    assert_eq!(CODE, &[0x90, 0x90, 0xC3]);
}

#[test]
fn escaped_quotes_reach_the_assembler() {
    const CODE: &[u8] = tasm_bytes!(".byte \"hi\", 0");
    assert_eq!(CODE, b"hi\0");
}

#[test]
fn type_definitions_resolve_at_compile_time() {
    const CODE: &[u8] = tasm_bytes!(
        "
        .type point
        int32 x, y
        .endtype
        mov eax, [rdi:point.y]
    "
    );
    assert_eq!(CODE, &[0x8B, 0x47, 0x04]);
}

#[test]
fn labels_and_comments_emit_nothing() {
    const CODE: &[u8] = tasm_bytes!("start:  # entry\n    ret");
    assert_eq!(CODE, &[0xC3]);
}

#[test]
fn trailing_comma_is_accepted() {
    const CODE: &[u8] = tasm_bytes!("int3",);
    assert_eq!(CODE, &[0xCC]);
}

#[test]
fn empty_source() {
    const CODE: &[u8] = tasm_bytes!("");
    assert!(CODE.is_empty());
    const ARRAY: [u8; 0] = tasm_array!("# nothing");
    assert!(ARRAY.is_empty());
}

#[test]
fn const_in_static_context() {
    static BYTES: &[u8] = tasm_bytes!("ret");
    assert_eq!(BYTES, &[0xC3]);
}

#[test]
fn array_in_static_context() {
    static BYTES: [u8; 1] = tasm_array!("ret");
    assert_eq!(BYTES, [0xC3]);
}
