//! Memory-operand resolver.
//!
//! Parses `[size [ptr]] [segment:] [ base + index*scale ± offset ]` and turns
//! the resolved address into ModRM.mod/rm, an optional SIB byte, an optional
//! displacement and the REX.X/REX.B extension bits.

use alloc::format;
use alloc::vec::Vec;

use crate::error::AsmError;
use crate::literal::{eval_int, EvalError};
use crate::register::{segment_prefix, Register, BP_LOW_BITS, SP_LOW_BITS};
use crate::types::TypeRegistry;

/// Size qualifiers accepted in front of a memory operand, with their widths.
const SIZE_QUALIFIERS: &[(&str, u32)] = &[("byte", 8), ("word", 16), ("dword", 32), ("qword", 64)];

/// Base of an effective address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Base {
    /// A 64-bit general register.
    Reg(Register),
    /// Instruction-pointer relative.
    Rip,
}

/// A resolved memory operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryOperand {
    /// Width from a `byte`/`word`/`dword`/`qword` qualifier.
    pub size: Option<u32>,
    /// Segment-override prefix byte.
    pub segment: Option<u8>,
    /// Base register, if any.
    pub base: Option<Base>,
    /// Index register and its scale (1, 2, 4 or 8).
    pub index: Option<(Register, u8)>,
    /// Signed displacement.
    pub offset: i32,
}

/// Displacement bytes that follow ModRM/SIB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Displacement {
    /// No displacement.
    None,
    /// One signed byte.
    Disp8(i8),
    /// Four little-endian bytes.
    Disp32(i32),
}

/// Everything a memory operand contributes to an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Addressing {
    /// ModRM.mod (0–2).
    pub mode: u8,
    /// ModRM.rm (0–7).
    pub rm: u8,
    /// SIB byte, when rm = 100.
    pub sib: Option<u8>,
    /// Displacement.
    pub disp: Displacement,
    /// REX.X: index register code ≥ 8.
    pub rex_x: bool,
    /// REX.B: base register code ≥ 8.
    pub rex_b: bool,
}

impl MemoryOperand {
    /// Parse a memory operand, resolving `register:type.path` terms and
    /// symbolic constants through `types`.
    ///
    /// # Errors
    ///
    /// Returns [`AsmError::InvalidMemoryOperand`] when the text is not a
    /// well-formed memory operand. Unknown members of a known type are
    /// reported as [`AsmError::UnknownMember`].
    pub fn parse(text: &str, types: &TypeRegistry) -> Result<MemoryOperand, AsmError> {
        let invalid = |detail: &str| AsmError::invalid_memory(text, detail);

        let (size, rest) = strip_size_qualifier(text.trim());
        let open = rest
            .find('[')
            .ok_or_else(|| invalid("expected '['"))?;
        let segment = match rest[..open].trim() {
            "" => None,
            seg => {
                let name = seg
                    .strip_suffix(':')
                    .ok_or_else(|| invalid("expected ':' after segment"))?;
                Some(segment_prefix(name.trim()).ok_or_else(|| invalid("unknown segment register"))?)
            }
        };
        let inner = rest[open + 1..]
            .strip_suffix(']')
            .ok_or_else(|| invalid("expected ']' at end"))?;

        let mut resolver = Resolver::default();
        for (negative, term) in split_terms(inner).map_err(invalid)? {
            resolver.add_term(text, term, negative, types)?;
        }
        let mut mem = resolver.finish(text)?;
        mem.size = size;
        mem.segment = segment;
        Ok(mem)
    }

    /// Compute the ModRM/SIB/displacement layout for this address.
    pub fn addressing(&self) -> Addressing {
        let offset = self.offset;
        let index_bits = self.index.map(|(r, s)| (r, scale_bits(s)));
        let rex_x = index_bits.is_some_and(|(r, _)| r.is_extended());

        match (self.base, index_bits) {
            (Some(Base::Rip), _) => Addressing {
                mode: 0b00,
                rm: BP_LOW_BITS,
                sib: None,
                disp: Displacement::Disp32(offset),
                rex_x: false,
                rex_b: false,
            },
            (None, None) => Addressing {
                mode: 0b00,
                rm: SP_LOW_BITS,
                sib: Some(sib(0, SP_LOW_BITS, BP_LOW_BITS)),
                disp: Displacement::Disp32(offset),
                rex_x: false,
                rex_b: false,
            },
            (None, Some((index, ss))) => Addressing {
                mode: 0b00,
                rm: SP_LOW_BITS,
                sib: Some(sib(ss, index.low_bits(), BP_LOW_BITS)),
                disp: Displacement::Disp32(offset),
                rex_x,
                rex_b: false,
            },
            (Some(Base::Reg(base)), index) => {
                let (mode, disp) = displacement_for(base, offset);
                let (rm, sib) = match index {
                    Some((index, ss)) => (SP_LOW_BITS, Some(sib(ss, index.low_bits(), base.low_bits()))),
                    None if base.low_bits() == SP_LOW_BITS => {
                        (SP_LOW_BITS, Some(sib(0, SP_LOW_BITS, SP_LOW_BITS)))
                    }
                    None => (base.low_bits(), None),
                };
                Addressing {
                    mode,
                    rm,
                    sib,
                    disp,
                    rex_x,
                    rex_b: base.is_extended(),
                }
            }
        }
    }
}

/// rbp/r13 as a base can never drop the displacement: mod=00 with rm/base=101
/// means "no base".
fn displacement_for(base: Register, offset: i32) -> (u8, Displacement) {
    if offset == 0 && base.low_bits() != BP_LOW_BITS {
        (0b00, Displacement::None)
    } else if let Ok(d) = i8::try_from(offset) {
        (0b01, Displacement::Disp8(d))
    } else {
        (0b10, Displacement::Disp32(offset))
    }
}

fn sib(ss: u8, index: u8, base: u8) -> u8 {
    (ss << 6) | ((index & 7) << 3) | (base & 7)
}

fn scale_bits(scale: u8) -> u8 {
    match scale {
        2 => 1,
        4 => 2,
        8 => 3,
        _ => 0,
    }
}

fn strip_size_qualifier(text: &str) -> (Option<u32>, &str) {
    let word_end = text
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(text.len());
    let word = &text[..word_end];
    let Some(&(_, bits)) = SIZE_QUALIFIERS
        .iter()
        .find(|(q, _)| q.eq_ignore_ascii_case(word))
    else {
        return (None, text);
    };
    let rest = text[word_end..].trim_start();
    let rest = match rest.get(..3) {
        Some(p) if p.eq_ignore_ascii_case("ptr") => rest[3..].trim_start(),
        _ => rest,
    };
    (Some(bits), rest)
}

/// Split on top-level `+`/`-`, folding unary signs into the following term.
fn split_terms(inner: &str) -> Result<Vec<(bool, &str)>, &'static str> {
    let mut terms = Vec::new();
    let mut depth = 0usize;
    let mut in_char = false;
    let mut negative = false;
    let mut start = 0;

    for (i, c) in inner.char_indices() {
        if in_char {
            if c == '\'' {
                in_char = false;
            }
            continue;
        }
        match c {
            '\'' => in_char = true,
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1).ok_or("unbalanced parentheses")?,
            '+' | '-' if depth == 0 => {
                let term = inner[start..i].trim();
                if term.is_empty() {
                    if c == '-' {
                        negative = !negative;
                    }
                } else {
                    terms.push((negative, term));
                    negative = c == '-';
                }
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = inner[start..].trim();
    if last.is_empty() {
        return Err(if terms.is_empty() { "empty address" } else { "dangling operator" });
    }
    terms.push((negative, last));
    Ok(terms)
}

#[derive(Default)]
struct Resolver {
    base: Option<Register>,
    index: Option<(Register, u8)>,
    rip: bool,
    offset: i128,
}

impl Resolver {
    fn add_term(
        &mut self,
        operand: &str,
        term: &str,
        negative: bool,
        types: &TypeRegistry,
    ) -> Result<(), AsmError> {
        let invalid = |detail: &str| AsmError::invalid_memory(operand, detail);

        if term.eq_ignore_ascii_case("rip") {
            if negative || self.rip {
                return Err(invalid("rip may appear once, with '+'"));
            }
            self.rip = true;
            return Ok(());
        }

        if let Some((reg, path)) = term.split_once(':') {
            let reg = address_register(operand, reg.trim())?
                .ok_or_else(|| invalid("expected register before ':'"))?;
            if negative {
                return Err(invalid("a register cannot be subtracted"));
            }
            self.add_register(operand, reg)?;
            return self.add_offset(operand, i128::from(types.offset_of(path.trim())?));
        }

        if let Some((lhs, rhs)) = term.split_once('*') {
            let scaled = match (
                address_register(operand, lhs.trim())?,
                address_register(operand, rhs.trim())?,
            ) {
                (Some(reg), None) => Some((reg, rhs)),
                (None, Some(reg)) => Some((reg, lhs)),
                (Some(_), Some(_)) => return Err(invalid("register multiplied by register")),
                (None, None) => None,
            };
            if let Some((reg, scale)) = scaled {
                if negative {
                    return Err(invalid("a register cannot be subtracted"));
                }
                let scale = match constant(operand, scale.trim(), types)? {
                    s @ (1 | 2 | 4 | 8) => s as u8,
                    _ => return Err(invalid("scale must be 1, 2, 4 or 8")),
                };
                if self.index.is_some() {
                    return Err(invalid("more than one index register"));
                }
                self.index = Some((reg, scale));
                return Ok(());
            }
        }

        if let Some(reg) = address_register(operand, term)? {
            if negative {
                return Err(invalid("a register cannot be subtracted"));
            }
            return self.add_register(operand, reg);
        }

        let value = constant(operand, term, types)?;
        self.add_offset(operand, if negative { value.wrapping_neg() } else { value })
    }

    fn add_offset(&mut self, operand: &str, value: i128) -> Result<(), AsmError> {
        self.offset = self
            .offset
            .checked_add(value)
            .ok_or_else(|| AsmError::invalid_memory(operand, "displacement overflow"))?;
        Ok(())
    }

    fn add_register(&mut self, operand: &str, reg: Register) -> Result<(), AsmError> {
        match (self.base, self.index) {
            (None, _) => self.base = Some(reg),
            (Some(base), None) => {
                // rsp can only be a base
                if reg.code() == SP_LOW_BITS && base.code() != SP_LOW_BITS {
                    self.base = Some(reg);
                    self.index = Some((base, 1));
                } else {
                    self.index = Some((reg, 1));
                }
            }
            (Some(_), Some(_)) => {
                return Err(AsmError::invalid_memory(operand, "too many registers"))
            }
        }
        Ok(())
    }

    fn finish(mut self, operand: &str) -> Result<MemoryOperand, AsmError> {
        let invalid = |detail: &str| AsmError::invalid_memory(operand, detail);

        if self.base.is_none() {
            if let Some((reg, 1)) = self.index {
                self.base = Some(reg);
                self.index = None;
            }
        }
        if self.rip && (self.base.is_some() || self.index.is_some()) {
            return Err(invalid("rip cannot be combined with another register"));
        }
        if let Some((reg, _)) = self.index {
            if reg.code() == SP_LOW_BITS {
                return Err(invalid("rsp cannot be an index register"));
            }
        }
        let offset = i32::try_from(self.offset)
            .map_err(|_| invalid("displacement does not fit in 32 bits"))?;

        Ok(MemoryOperand {
            size: None,
            segment: None,
            base: if self.rip {
                Some(Base::Rip)
            } else {
                self.base.map(Base::Reg)
            },
            index: self.index,
            offset,
        })
    }
}

/// A register term: `Ok(None)` if `text` is not a register name at all.
fn address_register(operand: &str, text: &str) -> Result<Option<Register>, AsmError> {
    match Register::parse(text) {
        Some(reg) if reg.is_address_register() => Ok(Some(reg)),
        Some(reg) => Err(AsmError::invalid_memory(
            operand,
            format!("'{}' is not a 64-bit address register", reg.name()),
        )),
        None => Ok(None),
    }
}

fn constant(operand: &str, text: &str, types: &TypeRegistry) -> Result<i128, AsmError> {
    match eval_int(text, |ident| types.resolve_symbol(ident)) {
        Ok(v) => Ok(v),
        Err(EvalError::NotANumber) => Err(AsmError::invalid_memory(
            operand,
            format!("'{}' is not a register or constant", text),
        )),
        Err(EvalError::Fatal(err)) => Err(err),
    }
}
