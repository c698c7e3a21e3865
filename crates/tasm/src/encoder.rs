//! Operand encoders and the instruction selector.
//!
//! Encoding one template alternative works on an [`EncodingContext`]: a
//! private copy of the template's byte fields plus the SIB, displacement and
//! immediate bytes the operands produce. REX, ModRM and SIB start out absent
//! and are materialized by the first operand that needs a bit in them.

use alloc::format;
use alloc::string::String;

use crate::error::{join_operands, AsmError};
use crate::literal::{eval_int, parse_float_literal, EvalError};
use crate::memory::{Displacement, MemoryOperand};
use crate::register::{Register, ACCUMULATOR, COUNT};
use crate::template::{OperandCode, OperandKind, Template};
use crate::types::TypeRegistry;

/// Architectural limit on the length of one x86-64 instruction.
pub const MAX_INSTRUCTION_LEN: usize = 15;

/// Bare REX marker with no W/R/X/B bits.
const REX_BASE: u8 = 0x40;
const REX_R: u8 = 0x04;
const REX_X: u8 = 0x02;
const REX_B: u8 = 0x01;

// ─── InstrBytes: stack-allocated instruction buffer ────────────────────

/// Stack-allocated byte buffer for one instruction or one of its fields.
///
/// Capacity: 16 bytes, one more than the longest legal instruction.
#[derive(Clone, Copy, Default)]
pub struct InstrBytes {
    data: [u8; 16],
    len: u8,
}

impl InstrBytes {
    /// Create an empty buffer.
    #[inline]
    pub const fn new() -> Self {
        Self {
            data: [0; 16],
            len: 0,
        }
    }

    /// Create a buffer pre-filled from a byte slice.
    #[inline]
    pub fn from_slice(src: &[u8]) -> Self {
        let mut buf = Self::new();
        buf.extend_from_slice(src);
        buf
    }

    /// Append a single byte.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is already full.
    #[inline]
    pub fn push(&mut self, byte: u8) {
        assert!(
            (self.len as usize) < self.data.len(),
            "InstrBytes overflow: cannot push beyond 16 bytes"
        );
        self.data[self.len as usize] = byte;
        self.len += 1;
    }

    /// Append a slice of bytes.
    ///
    /// # Panics
    ///
    /// Panics if appending would exceed the capacity.
    #[inline]
    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        let start = self.len as usize;
        let end = start + bytes.len();
        assert!(
            end <= self.data.len(),
            "InstrBytes overflow: {} + {} exceeds 16-byte capacity",
            start,
            bytes.len()
        );
        self.data[start..end].copy_from_slice(bytes);
        self.len = end as u8;
    }

    /// Number of bytes in the buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Whether the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Mutable reference to the last byte, if any.
    #[inline]
    fn last_mut(&mut self) -> Option<&mut u8> {
        let len = self.len as usize;
        len.checked_sub(1).map(|i| &mut self.data[i])
    }
}

impl core::ops::Deref for InstrBytes {
    type Target = [u8];
    #[inline]
    fn deref(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }
}

impl AsRef<[u8]> for InstrBytes {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self
    }
}

impl core::fmt::Debug for InstrBytes {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl PartialEq for InstrBytes {
    fn eq(&self, other: &Self) -> bool {
        **self == **other
    }
}

impl Eq for InstrBytes {}

impl PartialEq<[u8]> for InstrBytes {
    fn eq(&self, other: &[u8]) -> bool {
        **self == *other
    }
}

// ─── Encoding context ──────────────────────────────────────────────────

/// Working copy of one template's byte fields while its operands are encoded.
#[derive(Debug, Clone)]
pub struct EncodingContext {
    prefix: InstrBytes,
    rex: Option<u8>,
    opcode: InstrBytes,
    modrm: Option<u8>,
    sib: Option<u8>,
    disp: InstrBytes,
    imm: InstrBytes,
    /// spl/bpl/sil/dil were used: the REX byte must be present.
    force_rex: bool,
    /// ah/ch/dh/bh were used: no REX byte may be present.
    high_byte: Option<&'static str>,
}

impl EncodingContext {
    /// Start from the template's fixed bytes.
    pub fn new(template: &Template) -> Self {
        Self {
            prefix: InstrBytes::from_slice(&template.prefix),
            rex: template.rex,
            opcode: InstrBytes::from_slice(&template.opcode),
            modrm: template.modrm,
            sib: None,
            disp: InstrBytes::new(),
            imm: InstrBytes::new(),
            force_rex: false,
            high_byte: None,
        }
    }

    /// The REX byte, created as a bare `0x40` if absent.
    pub fn ensure_rex(&mut self) -> &mut u8 {
        self.rex.get_or_insert(REX_BASE)
    }

    /// The ModRM byte, created as zero if absent.
    pub fn ensure_modrm(&mut self) -> &mut u8 {
        self.modrm.get_or_insert(0)
    }

    /// The SIB byte, created as zero if absent.
    pub fn ensure_sib(&mut self) -> &mut u8 {
        self.sib.get_or_insert(0)
    }

    fn note_register(&mut self, reg: Register) {
        if reg.requires_rex_for_byte() {
            self.force_rex = true;
        }
        if reg.is_high_byte() {
            self.high_byte = Some(reg.name());
        }
    }

    /// Concatenate prefix, REX, opcode, ModRM, SIB, displacement and
    /// immediate, in that order.
    ///
    /// # Errors
    ///
    /// [`AsmError::OperandType`] if a high-byte register meets a REX byte and
    /// [`AsmError::InstructionTooLong`] past 15 bytes.
    pub fn finish(mut self, mnemonic: &str) -> Result<InstrBytes, AsmError> {
        if self.force_rex {
            self.ensure_rex();
        }
        if let (Some(name), Some(_)) = (self.high_byte, self.rex) {
            return Err(AsmError::operand_type(
                name,
                "an operand encodable without a REX prefix",
            ));
        }

        let len = self.prefix.len()
            + usize::from(self.rex.is_some())
            + self.opcode.len()
            + usize::from(self.modrm.is_some())
            + usize::from(self.sib.is_some())
            + self.disp.len()
            + self.imm.len();
        if len > MAX_INSTRUCTION_LEN {
            return Err(AsmError::InstructionTooLong {
                mnemonic: String::from(mnemonic),
                len,
            });
        }

        let mut out = InstrBytes::new();
        out.extend_from_slice(&self.prefix);
        out.extend_from_slice(self.rex.as_slice());
        out.extend_from_slice(&self.opcode);
        out.extend_from_slice(self.modrm.as_slice());
        out.extend_from_slice(self.sib.as_slice());
        out.extend_from_slice(&self.disp);
        out.extend_from_slice(&self.imm);
        Ok(out)
    }
}

// ─── Operand encoders ──────────────────────────────────────────────────

/// Apply one operand code to one operand.
///
/// # Errors
///
/// A mismatch error (see [`AsmError::is_mismatch`]) if the operand does not
/// fit this code; fatal registry errors pass through unchanged.
pub fn encode_operand(
    ctx: &mut EncodingContext,
    code: OperandCode,
    operand: &str,
    types: &TypeRegistry,
) -> Result<(), AsmError> {
    let operand = operand.trim();
    match code.kind {
        OperandKind::Accumulator => {
            let reg = sized_register(operand, code.width)?;
            if reg.code() != ACCUMULATOR || reg.is_high_byte() {
                return Err(AsmError::operand_type(operand, "the accumulator register"));
            }
        }
        OperandKind::Count => {
            let reg = sized_register(operand, code.width)?;
            if reg.code() != COUNT || reg.is_high_byte() {
                return Err(AsmError::operand_type(operand, "the count register"));
            }
        }
        OperandKind::SignedImm | OperandKind::UnsignedImm => {
            let bits = code.width.unwrap_or(32);
            let value = immediate(operand, types)?;
            let min = -(1i128 << (bits - 1));
            let max = if code.kind == OperandKind::SignedImm {
                (1i128 << (bits - 1)) - 1
            } else {
                (1i128 << bits) - 1
            };
            if !(min..=max).contains(&value) {
                return Err(AsmError::operand_type(
                    operand,
                    format!("an immediate in {}..={}", min, max),
                ));
            }
            emit_imm(&mut ctx.imm, value, bits);
        }
        OperandKind::FloatImm => {
            let value = parse_float_literal(operand)
                .ok_or_else(|| AsmError::operand_type(operand, "a floating-point literal"))?;
            if code.width == Some(32) {
                ctx.imm.extend_from_slice(&(value as f32).to_le_bytes());
            } else {
                ctx.imm.extend_from_slice(&value.to_le_bytes());
            }
        }
        OperandKind::Direct => {
            let expected = u64::from(code.width.unwrap_or(0));
            let mismatch = || AsmError::DirectOperandMismatch {
                operand: String::from(operand),
                expected,
            };
            match eval_int(operand, |ident| types.resolve_symbol(ident)) {
                Ok(v) if v == i128::from(expected) => {}
                Ok(_) | Err(EvalError::NotANumber) => return Err(mismatch()),
                Err(EvalError::Fatal(err)) => return Err(err),
            }
        }
        OperandKind::Reg => {
            let reg = sized_register(operand, code.width)?;
            ctx.note_register(reg);
            *ctx.ensure_modrm() |= reg.low_bits() << 3;
            if reg.is_extended() {
                *ctx.ensure_rex() |= REX_R;
            }
        }
        OperandKind::OpcodeReg => {
            let reg = sized_register(operand, code.width)?;
            ctx.note_register(reg);
            if let Some(last) = ctx.opcode.last_mut() {
                *last |= reg.low_bits();
            }
            if reg.is_extended() {
                *ctx.ensure_rex() |= REX_B;
            }
        }
        OperandKind::RmReg => {
            let reg = sized_register(operand, code.width)?;
            ctx.note_register(reg);
            *ctx.ensure_modrm() |= 0xC0 | reg.low_bits();
            if reg.is_extended() {
                *ctx.ensure_rex() |= REX_B;
            }
        }
        OperandKind::Memory => encode_memory(ctx, code.width, operand, types)?,
    }
    Ok(())
}

fn encode_memory(
    ctx: &mut EncodingContext,
    width: Option<u32>,
    operand: &str,
    types: &TypeRegistry,
) -> Result<(), AsmError> {
    let mem = MemoryOperand::parse(operand, types)?;
    if let (Some(want), Some(have)) = (width, mem.size) {
        if want != have {
            return Err(AsmError::operand_type(
                operand,
                format!("a {}-bit memory operand", want),
            ));
        }
    }

    if let Some(segment) = mem.segment {
        ctx.prefix.push(segment);
    }
    let addr = mem.addressing();
    *ctx.ensure_modrm() |= (addr.mode << 6) | addr.rm;
    if let Some(sib) = addr.sib {
        *ctx.ensure_sib() |= sib;
    }
    match addr.disp {
        Displacement::None => {}
        Displacement::Disp8(d) => ctx.disp.push(d as u8),
        Displacement::Disp32(d) => ctx.disp.extend_from_slice(&d.to_le_bytes()),
    }
    if addr.rex_x {
        *ctx.ensure_rex() |= REX_X;
    }
    if addr.rex_b {
        *ctx.ensure_rex() |= REX_B;
    }
    Ok(())
}

fn sized_register(operand: &str, width: Option<u32>) -> Result<Register, AsmError> {
    let width = width.unwrap_or(0);
    match Register::parse(operand) {
        Some(reg) if u32::from(reg.width()) == width => Ok(reg),
        _ => Err(AsmError::operand_type(
            operand,
            format!("a {}-bit register", width),
        )),
    }
}

fn immediate(operand: &str, types: &TypeRegistry) -> Result<i128, AsmError> {
    match eval_int(operand, |ident| types.resolve_symbol(ident)) {
        Ok(v) => Ok(v),
        Err(EvalError::NotANumber) => Err(AsmError::operand_type(operand, "an integer constant")),
        Err(EvalError::Fatal(err)) => Err(err),
    }
}

/// Append `bits / 8` little-endian bytes of `imm`.
fn emit_imm(buf: &mut InstrBytes, imm: i128, bits: u32) {
    match bits {
        8 => buf.push(imm as u8),
        16 => buf.extend_from_slice(&(imm as u16).to_le_bytes()),
        32 => buf.extend_from_slice(&(imm as u32).to_le_bytes()),
        _ => buf.extend_from_slice(&(imm as u64).to_le_bytes()),
    }
}

// ─── Instruction selector ──────────────────────────────────────────────

/// Encode `args` with one template alternative.
///
/// # Errors
///
/// A mismatch error if the operand count or any operand does not fit, or a
/// fatal error from the registry or the length check.
pub fn encode_template(
    mnemonic: &str,
    template: &Template,
    args: &[&str],
    types: &TypeRegistry,
) -> Result<InstrBytes, AsmError> {
    if template.arity() != args.len() {
        return Err(AsmError::operand_type(
            &join_operands(args),
            format!("{} operands", template.arity()),
        ));
    }
    let mut ctx = EncodingContext::new(template);
    for (&code, operand) in template.operands.iter().zip(args) {
        encode_operand(&mut ctx, code, operand, types)?;
    }
    ctx.finish(mnemonic)
}

/// Try each alternative in declaration order and commit to the first that
/// encodes.
///
/// # Errors
///
/// [`AsmError::NoMatchingEncoding`] if every alternative is rejected; any
/// non-mismatch error stops the search immediately.
pub fn select(
    mnemonic: &str,
    alternatives: &[Template],
    args: &[&str],
    types: &TypeRegistry,
) -> Result<InstrBytes, AsmError> {
    for (i, template) in alternatives.iter().enumerate() {
        match encode_template(mnemonic, template, args, types) {
            Ok(bytes) => {
                log::trace!("{}: alternative {} `{}` selected", mnemonic, i, template);
                return Ok(bytes);
            }
            Err(err) if err.is_mismatch() => {
                log::trace!("{}: alternative {} `{}` rejected: {}", mnemonic, i, template, err);
            }
            Err(err) => return Err(err),
        }
    }
    Err(AsmError::NoMatchingEncoding {
        mnemonic: String::from(mnemonic),
        operands: join_operands(args),
    })
}
