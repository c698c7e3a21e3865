//! Integration tests for tasm.
//!
//! These tests exercise the public API end-to-end: one-shot helpers, the
//! statement driver, type definitions, directives, and error reporting.

use tasm::{assemble, assemble_hex, AsmError, Assembler, ResourceLimits, Type};

// ============================================================================
// One-Shot API
// ============================================================================

#[test]
fn one_shot_nop() {
    assert_eq!(assemble("nop").unwrap(), vec![0x90]);
}

#[test]
fn one_shot_multiple_instructions() {
    assert_eq!(assemble("nop\nnop\nret").unwrap(), vec![0x90, 0x90, 0xC3]);
}

#[test]
fn one_shot_hex() {
    assert_eq!(assemble_hex("add eax, 5").unwrap(), "0505000000");
    assert_eq!(assemble_hex("").unwrap(), "");
}

#[test]
fn blank_and_comment_lines_emit_nothing() {
    let bytes = assemble("\n   \n# comment only\n  nop  # trailing\n").unwrap();
    assert_eq!(bytes, vec![0x90]);
}

#[test]
fn crlf_line_endings() {
    assert_eq!(assemble("push rbx\r\npush r12\r\n").unwrap(), vec![0x53, 0x41, 0x54]);
}

#[test]
fn mnemonics_and_registers_are_case_insensitive() {
    assert_eq!(assemble("PUSH RBX").unwrap(), assemble("push rbx").unwrap());
    assert_eq!(assemble("Mov EAX, Ecx").unwrap(), assemble("mov eax, ecx").unwrap());
}

// ============================================================================
// Builder API
// ============================================================================

#[test]
fn builder_function_frame() {
    let mut asm = Assembler::new();
    asm.emit("push rbp\nmov rbp, rsp\nsub rsp, 16").unwrap();
    asm.emit("leave\nret").unwrap();
    let result = asm.finish().unwrap();
    assert_eq!(
        result.bytes(),
        &[0x55, 0x48, 0x89, 0xE5, 0x48, 0x83, 0xEC, 0x10, 0xC9, 0xC3]
    );
    assert_eq!(result.len(), 10);
    assert!(!result.is_empty());
}

#[test]
fn emit_line_is_statement_at_a_time() {
    let mut asm = Assembler::new();
    asm.emit_line("push rbx").unwrap().emit_line("pop rbx").unwrap();
    assert_eq!(asm.bytes(), &[0x53, 0x5B]);
}

#[test]
fn encode_one_uses_registered_types() {
    let mut asm = Assembler::new();
    asm.emit(".type frame\nint64 saved\nint64 ret_addr\n.endtype").unwrap();
    assert_eq!(
        asm.encode_one("mov rax, [rsp:frame.ret_addr]").unwrap(),
        vec![0x48, 0x8B, 0x44, 0x24, 0x08]
    );
    assert!(asm.bytes().is_empty());
}

#[test]
fn into_bytes_matches_bytes() {
    let mut asm = Assembler::new();
    asm.emit("int3").unwrap();
    let result = asm.finish().unwrap();
    let copy = result.bytes().to_vec();
    assert_eq!(result.into_bytes(), copy);
}

// ============================================================================
// Types
// ============================================================================

#[test]
fn unpacked_type_offsets() {
    let mut asm = Assembler::new();
    asm.emit(
        "
        .type sample
            int32 f1
            byte  f2
            double f3
        .endtype
        mov al, [rbx:sample.f2]
        mov eax, sample
        ",
    )
    .unwrap();
    let types = asm.types();
    assert_eq!(types.offset_of("sample.f2").unwrap(), 4);
    assert_eq!(types.offset_of("sample.f3").unwrap(), 8);
    assert_eq!(types.type_of("sample").unwrap().effective_size(), 16);
    assert_eq!(
        asm.bytes(),
        &[0x8A, 0x43, 0x04, 0xB8, 0x10, 0x00, 0x00, 0x00]
    );
}

#[test]
fn packed_type_offsets() {
    let mut asm = Assembler::new();
    asm.emit(".type header:pack\nbyte kind\nint32 len\nint16 flags\n.endtype")
        .unwrap();
    let types = asm.types();
    assert_eq!(types.offset_of("header.len").unwrap(), 1);
    assert_eq!(types.offset_of("header.flags").unwrap(), 5);
    assert_eq!(types.type_of("header").unwrap().effective_size(), 7);
}

#[test]
fn nested_types_and_arrays() {
    let mut asm = Assembler::new();
    asm.emit(
        "
        .type vec2
        float x, y
        .endtype
        .type body
        int32 id
        vec2 pos, vel
        int64 tags[3]
        .endtype
        mov eax, [rdi:body.vel.y]
        mov rax, [rdi + body.tags + 8]
        ",
    )
    .unwrap();
    assert_eq!(asm.types().offset_of("body.vel.y").unwrap(), 16);
    assert_eq!(asm.types().offset_of("body.tags").unwrap(), 24);
    assert_eq!(
        asm.bytes(),
        &[0x8B, 0x47, 0x10, 0x48, 0x8B, 0x47, 0x20]
    );
}

#[test]
fn type_sizes_in_immediates() {
    let bytes = assemble(".type pair\nint64 a, b\n.endtype\nsub rsp, pair * 2").unwrap();
    assert_eq!(bytes, vec![0x48, 0x83, 0xEC, 0x20]);
}

#[test]
fn unknown_member_is_fatal() {
    let err = assemble(".type p\nint32 x\n.endtype\nmov eax, [rdi:p.z]").unwrap_err();
    assert_eq!(
        err.root_cause(),
        &AsmError::UnknownMember {
            path: "p.z".into(),
            member: "z".into()
        }
    );
}

#[test]
fn define_type_programmatically() {
    let mut point = Type::new("point", false);
    point.add_member("x", &Type::primitive("int32", 4), 1).unwrap();
    point.add_member("y", &Type::primitive("int32", 4), 1).unwrap();

    let mut asm = Assembler::new();
    asm.define_type(point.clone()).unwrap();
    assert_eq!(asm.encode_one("mov eax, [rdi:point.y]").unwrap(), vec![0x8B, 0x47, 0x04]);

    let err = asm.define_type(point).unwrap_err();
    assert!(matches!(err, AsmError::DuplicateType { .. }));
}

#[test]
fn unterminated_type_at_finish() {
    let mut asm = Assembler::new();
    asm.emit(".type open\nint32 x").unwrap();
    assert_eq!(
        asm.finish().unwrap_err(),
        AsmError::UnterminatedType {
            name: "open".into()
        }
    );
}

// ============================================================================
// Labels & Directives
// ============================================================================

#[test]
fn labels_and_listing() {
    let mut asm = Assembler::new();
    asm.enable_listing();
    asm.emit("entry:\n  push rbx\n.label body\n  mov eax, 1\nexit:\n  pop rbx\n  ret")
        .unwrap();
    let result = asm.finish().unwrap();
    assert_eq!(
        result.labels(),
        &[
            ("entry".to_string(), 0),
            ("body".to_string(), 1),
            ("exit".to_string(), 6)
        ]
    );
    let listing = result.listing();
    assert!(listing.contains("00000001                  body:"));
    assert!(listing.contains("00000001  B801000000        mov eax, 1"));
    assert!(listing.contains("00000007  C3                ret"));
}

#[test]
fn listing_without_source_text() {
    let mut asm = Assembler::new();
    asm.emit("nop\nret").unwrap();
    let listing = asm.finish().unwrap().listing();
    assert_eq!(listing, "00000000  90C3            \n");
}

#[test]
fn data_block() {
    let bytes = assemble(
        "
        .byte 1, 2, 'x'
        .int16 0x1234
        .align 8
        .int32 -1
        .int64 0x0102030405060708
        .utf8 \"ok\"
        ",
    )
    .unwrap();
    assert_eq!(
        bytes,
        vec![
            1, 2, b'x', 0x34, 0x12, 0, 0, 0, // .byte .int16 .align
            0xFF, 0xFF, 0xFF, 0xFF, // .int32
            0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01, // .int64
            b'o', b'k',
        ]
    );
}

#[test]
fn float_data() {
    let bytes = assemble(".float 1.5, -2.0\n.double 0.1").unwrap();
    let mut expected = Vec::new();
    expected.extend_from_slice(&1.5f32.to_le_bytes());
    expected.extend_from_slice(&(-2.0f32).to_le_bytes());
    expected.extend_from_slice(&0.1f64.to_le_bytes());
    assert_eq!(bytes, expected);
}

#[test]
fn string_escapes() {
    assert_eq!(
        assemble(r#".byte "a\tb\0""#).unwrap(),
        vec![b'a', b'\t', b'b', 0]
    );
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn error_carries_line_number_and_text() {
    let err = assemble("nop\n\n  frobnicate rax\nret").unwrap_err();
    match err {
        AsmError::Line { line, text, cause } => {
            assert_eq!(line, 3);
            assert_eq!(text, "  frobnicate rax");
            assert_eq!(
                *cause,
                AsmError::UnknownMnemonic {
                    mnemonic: "frobnicate".into()
                }
            );
        }
        other => panic!("expected a line error, got {other:?}"),
    }
}

#[test]
fn error_display_is_readable() {
    let err = assemble("push eax").unwrap_err();
    assert_eq!(
        err.to_string(),
        "line 1: no encoding of 'push' accepts 'eax' (in `push eax`)"
    );
}

#[test]
fn stored_failure_keeps_earlier_bytes() {
    let mut asm = Assembler::new();
    asm.emit("nop\nret").unwrap();
    assert!(asm.emit("mov eax, [rsp*2]").is_err());
    assert!(asm.is_failed());
    assert_eq!(asm.bytes(), &[0x90, 0xC3]);
    let stored = asm.error().cloned().unwrap();
    assert_eq!(asm.emit("nop").unwrap_err(), stored);
    assert_eq!(asm.finish().unwrap_err(), stored);
}

#[test]
fn no_matching_encoding_for_bad_operands() {
    for src in [
        "mov eax, [rsp*2]",
        "add eax, rbx",
        "mov ah, sil",
        "mov rax, [rip + rbx]",
        "push 0x1_0000_0000",
        "inc 5",
    ] {
        let err = assemble(src).unwrap_err();
        assert!(
            matches!(err.root_cause(), AsmError::NoMatchingEncoding { .. }),
            "`{src}` gave {err:?}"
        );
    }
}

#[test]
fn malformed_lines() {
    assert!(matches!(
        assemble("mov eax, [rbx").unwrap_err().root_cause(),
        AsmError::MalformedOperandList { .. }
    ));
    assert!(matches!(
        assemble("= eax").unwrap_err().root_cause(),
        AsmError::MalformedStatement { .. }
    ));
}

#[test]
fn resource_limits_apply() {
    let mut asm = Assembler::new();
    asm.limits(ResourceLimits {
        max_labels: 1,
        ..ResourceLimits::default()
    });
    asm.emit("a:").unwrap();
    let err = asm.emit("b:").unwrap_err();
    assert!(matches!(
        err.root_cause(),
        AsmError::ResourceLimitExceeded { .. }
    ));
}

#[test]
fn reset_allows_reuse() {
    let mut asm = Assembler::new();
    asm.emit("bogus").unwrap_err();
    asm.reset();
    asm.emit("nop").unwrap();
    assert_eq!(asm.finish().unwrap().bytes(), &[0x90]);
}
