//! Regression tests for bug fixes.
//!
//! Each test documents a specific bug that was found and fixed, ensuring the
//! fix is never accidentally reverted.

use tasm::{assemble, AsmError, Assembler, ResourceLimits};

/// Regression: an r13 base with an index and no offset must still get a
/// zero disp8. mod=00 with SIB base=101 means "no base, disp32".
#[test]
fn r13_base_with_index_keeps_disp8() {
    assert_eq!(
        assemble("mov eax, [r13 + rax]").unwrap(),
        &[0x41, 0x8B, 0x44, 0x05, 0x00]
    );
}

/// Regression: an r12 base with an index must not be confused with the
/// "rsp needs a SIB" rule. The index goes into SIB.index with REX.X.
#[test]
fn r12_base_with_extended_index() {
    assert_eq!(
        assemble("mov eax, [r12 + r13]").unwrap(),
        &[0x43, 0x8B, 0x04, 0x2C]
    );
}

/// Regression: legacy prefixes must precede REX. `66 41` decodes as a
/// 16-bit operation on r8; `41 66` leaves the REX byte ignored.
#[test]
fn operand_size_prefix_precedes_rex() {
    assert_eq!(assemble("push r8w").unwrap(), &[0x66, 0x41, 0x50]);
    assert_eq!(
        assemble("mov r8w, 1").unwrap(),
        &[0x66, 0x41, 0xB8, 0x01, 0x00]
    );
}

/// Regression: sil/dil need a bare REX prefix even when no REX bit is set,
/// or the byte decodes as dh/bh.
#[test]
fn uniform_byte_registers_force_rex() {
    assert_eq!(assemble("mov al, sil").unwrap(), &[0x40, 0x88, 0xF0]);
    assert_eq!(assemble("mov dil, 1").unwrap(), &[0x40, 0xB7, 0x01]);
}

/// Regression: ah..bh cannot be combined with any REX prefix. The pair must
/// be rejected rather than silently encoding spl.
#[test]
fn high_byte_with_rex_register_is_rejected() {
    for src in ["mov ah, sil", "mov r8b, ah", "movzx r9d, bh"] {
        let err = assemble(src).unwrap_err();
        assert!(
            matches!(err.root_cause(), AsmError::NoMatchingEncoding { .. }),
            "`{src}` gave {err:?}"
        );
    }
}

/// Regression: alternatives are tried in order, so the accumulator short
/// form wins over the sign-extended imm8 form for `eax`.
#[test]
fn accumulator_form_comes_first() {
    assert_eq!(assemble("add eax, 5").unwrap(), &[0x05, 0x05, 0x00, 0x00, 0x00]);
    assert_eq!(assemble("add ecx, 5").unwrap(), &[0x83, 0xC1, 0x05]);
}

/// Regression: an unknown member is a fatal error, not a template mismatch.
/// Swallowing it turned the message into a misleading "no encoding".
#[test]
fn unknown_member_is_not_swallowed() {
    let err = assemble(".type p\nint32 x\n.endtype\nadd [rdi:p.z], 1").unwrap_err();
    assert!(
        matches!(err.root_cause(), AsmError::UnknownMember { member, .. } if member == "z"),
        "got {err:?}"
    );
}

/// Regression: `mov r64, imm` picks the 7-byte sign-extended form when the
/// value fits, and the 10-byte form only when it does not.
#[test]
fn mov_r64_immediate_width() {
    assert_eq!(
        assemble("mov rax, -1").unwrap(),
        &[0x48, 0xC7, 0xC0, 0xFF, 0xFF, 0xFF, 0xFF]
    );
    assert_eq!(
        assemble("mov rax, 0xFFFFFFFF").unwrap(),
        &[0x48, 0xB8, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00]
    );
}

/// Regression: unsigned-style immediates accept the full unsigned range but
/// not one past it.
#[test]
fn unsigned_immediate_bounds() {
    assert_eq!(assemble("mov al, 255").unwrap(), &[0xB0, 0xFF]);
    assert_eq!(assemble("mov al, -128").unwrap(), &[0xB0, 0x80]);
    assert!(assemble("mov al, 256").is_err());
    assert!(assemble("mov al, -129").is_err());
}

/// Regression: a float literal in an integer slot is a mismatch, so `mov`
/// falls through to its IEEE-754 form.
#[test]
fn float_immediate_falls_through_to_float_form() {
    assert_eq!(
        assemble("mov eax, 1.5").unwrap(),
        &[0xB8, 0x00, 0x00, 0xC0, 0x3F]
    );
}

/// Regression: `shl r, 1` must use the D1 form; `shl r, 2` the C1 form.
#[test]
fn shift_by_one_uses_short_form() {
    assert_eq!(assemble("shl eax, 1").unwrap(), &[0xD1, 0xE0]);
    assert_eq!(assemble("shl eax, 2").unwrap(), &[0xC1, 0xE0, 0x02]);
}

/// Regression: line numbers count blank and comment lines too.
#[test]
fn line_numbers_include_blank_lines() {
    let err = assemble("# header\n\nnop\n\nbogus").unwrap_err();
    assert!(matches!(err, AsmError::Line { line: 5, .. }), "got {err:?}");
}

/// Regression: line numbers keep counting across separate `emit` calls.
#[test]
fn line_numbers_span_emit_calls() {
    let mut asm = Assembler::new();
    asm.emit("nop\nnop").unwrap();
    let err = asm.emit("ret\nbogus").unwrap_err();
    assert!(matches!(err, AsmError::Line { line: 4, .. }), "got {err:?}");
}

/// Regression: a failing line must not leave partial bytes behind.
#[test]
fn failed_line_appends_nothing() {
    let mut asm = Assembler::new();
    asm.emit("nop").unwrap();
    asm.emit(".byte 1, 2, 300").unwrap_err();
    assert_eq!(asm.bytes(), &[0x90]);
}

/// Regression: a typed base on r13 keeps REX.B and takes the member offset
/// as its disp8.
#[test]
fn type_member_offset_with_extended_base() {
    let bytes = assemble(".type pair\nint64 a, b\n.endtype\nmov rax, [r13:pair.b]").unwrap();
    assert_eq!(bytes, &[0x49, 0x8B, 0x45, 0x08]);
}

/// Regression: `.align` with a huge power of two must hit the output limit
/// before any padding is allocated.
#[test]
fn huge_align_hits_output_limit() {
    let mut asm = Assembler::new();
    asm.emit("nop").unwrap();
    let err = asm.emit(".align 0x4000000000000000").unwrap_err();
    assert!(
        matches!(err.root_cause(), AsmError::ResourceLimitExceeded { .. }),
        "got {err:?}"
    );
    assert_eq!(asm.bytes(), &[0x90]);

    let mut asm = Assembler::new();
    asm.limits(ResourceLimits {
        max_output_bytes: 8,
        ..ResourceLimits::default()
    });
    asm.emit("nop\n.align 8").unwrap();
    assert_eq!(asm.bytes().len(), 8);
    assert!(asm.emit(".byte 1\n.align 16").is_err());
}

/// Regression: an array count whose byte size overflows `u64` is a fatal
/// layout error, not an arithmetic panic.
#[test]
fn oversized_array_member_is_rejected() {
    let err = assemble(".type t\nint64 a[0x7fffffffffffffff]\n.endtype").unwrap_err();
    assert!(
        matches!(err, AsmError::Line { line: 2, .. }),
        "got {err:?}"
    );
    assert!(
        matches!(err.root_cause(), AsmError::TypeTooLarge { member, .. } if member == "a"),
        "got {err:?}"
    );
}

/// Regression: deeply nested operand expressions stop at the nesting limit
/// instead of exhausting the stack.
#[test]
fn deep_expression_nesting_is_bounded() {
    for src in [
        format!("mov eax, {}1", "-".repeat(200_000)),
        format!("mov eax, {}1{}", "(".repeat(100_000), ")".repeat(100_000)),
        format!("mov eax, [rax + {}1]", "~".repeat(100_000)),
        format!(".byte {}0", "+".repeat(100_000)),
    ] {
        let err = assemble(&src).unwrap_err();
        assert!(
            matches!(err.root_cause(), AsmError::ResourceLimitExceeded { .. }),
            "got {err:?}"
        );
    }
    assert_eq!(
        assemble(&format!("mov eax, {}5{}", "(".repeat(64), ")".repeat(64))).unwrap(),
        &[0xB8, 0x05, 0x00, 0x00, 0x00]
    );
}

/// Regression: whitespace around the `:pack` suffix is allowed.
#[test]
fn pack_suffix_allows_spaces() {
    let mut asm = Assembler::new();
    asm.emit(".type t : pack\nbyte a\nint32 b\n.endtype").unwrap();
    let t = asm.types().type_of("t").unwrap();
    assert!(t.is_packed());
    assert_eq!(t.effective_size(), 5);
    assert!(assemble(".type u : packed\n.endtype").is_err());
}
