//! Template grammar: one candidate byte layout of an instruction.
//!
//! An alternative has the shape `prefix:rex:opcode:modrm/operandcodes`:
//!
//! - `prefix`: legacy prefix bytes in hex (0–4 bytes, may be empty);
//! - `rex`: a fixed REX byte `40`–`4f`, or empty;
//! - `opcode`: 1–3 opcode bytes in hex;
//! - `modrm`: a ModRM seed byte (usually a `/digit` in bits 3–5), or empty;
//! - `operandcodes`: one `letter[digits]` code per operand, left to right.
//!
//! Alternatives of one mnemonic are joined with `|` and tried in order.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::error::AsmError;

/// Most legacy prefix bytes a template may carry.
const MAX_PREFIX_BYTES: usize = 4;
/// Most immediate bits a template may append.
const MAX_IMMEDIATE_BITS: u32 = 64;

/// What an operand code does with its operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OperandKind {
    /// `a<n>`: implicit accumulator of width n.
    Accumulator,
    /// `c<n>`: implicit count register of width n.
    Count,
    /// `i<n>`: signed immediate.
    SignedImm,
    /// `I<n>`: immediate accepting signed or unsigned n-bit values.
    UnsignedImm,
    /// `f<n>`: IEEE-754 immediate (32 or 64 bits).
    FloatImm,
    /// `d<n>`: operand must equal the literal n; emits nothing.
    Direct,
    /// `r<n>`: register in ModRM.reg.
    Reg,
    /// `B<n>`: register in the low three bits of the last opcode byte.
    OpcodeReg,
    /// `b<n>`: register in ModRM.rm (mod=11).
    RmReg,
    /// `m` / `m<n>`: memory operand in ModRM.rm (+ SIB, displacement).
    Memory,
}

impl OperandKind {
    fn from_letter(c: char) -> Option<Self> {
        Some(match c {
            'a' => OperandKind::Accumulator,
            'c' => OperandKind::Count,
            'i' => OperandKind::SignedImm,
            'I' => OperandKind::UnsignedImm,
            'f' => OperandKind::FloatImm,
            'd' => OperandKind::Direct,
            'r' => OperandKind::Reg,
            'B' => OperandKind::OpcodeReg,
            'b' => OperandKind::RmReg,
            'm' => OperandKind::Memory,
            _ => return None,
        })
    }

    fn letter(self) -> char {
        match self {
            OperandKind::Accumulator => 'a',
            OperandKind::Count => 'c',
            OperandKind::SignedImm => 'i',
            OperandKind::UnsignedImm => 'I',
            OperandKind::FloatImm => 'f',
            OperandKind::Direct => 'd',
            OperandKind::Reg => 'r',
            OperandKind::OpcodeReg => 'B',
            OperandKind::RmReg => 'b',
            OperandKind::Memory => 'm',
        }
    }

    fn is_immediate(self) -> bool {
        matches!(
            self,
            OperandKind::SignedImm | OperandKind::UnsignedImm | OperandKind::FloatImm
        )
    }
}

/// One `(operand-code, bit-width)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OperandCode {
    /// The encoding rule.
    pub kind: OperandKind,
    /// Bit width; the required literal for `d`; `None` only for bare `m`.
    pub width: Option<u32>,
}

impl fmt::Display for OperandCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.letter())?;
        if let Some(w) = self.width {
            write!(f, "{}", w)?;
        }
        Ok(())
    }
}

/// A parsed template alternative.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Template {
    /// Legacy prefix bytes.
    pub prefix: Vec<u8>,
    /// Fixed REX byte, if the template carries one.
    pub rex: Option<u8>,
    /// Opcode bytes (1–3); the last one receives `B<n>` register bits.
    pub opcode: Vec<u8>,
    /// ModRM seed, if the template carries one.
    pub modrm: Option<u8>,
    /// Operand codes, one per operand.
    pub operands: Vec<OperandCode>,
}

impl Template {
    /// Parse one alternative.
    ///
    /// # Errors
    ///
    /// Returns [`AsmError::InvalidTemplate`] if the text does not follow the
    /// grammar.
    pub fn parse(text: &str) -> Result<Template, AsmError> {
        let invalid = |detail: String| AsmError::InvalidTemplate {
            template: String::from(text),
            detail,
        };

        let (fields, codes) = text
            .split_once('/')
            .ok_or_else(|| invalid(String::from("missing '/' before operand codes")))?;
        let parts: Vec<&str> = fields.split(':').collect();
        let [prefix, rex, opcode, modrm] = parts[..] else {
            return Err(invalid(format!(
                "expected 4 ':'-separated fields, found {}",
                parts.len()
            )));
        };

        let prefix = parse_hex(prefix).ok_or_else(|| invalid(String::from("bad prefix hex")))?;
        if prefix.len() > MAX_PREFIX_BYTES {
            return Err(invalid(format!("more than {} prefix bytes", MAX_PREFIX_BYTES)));
        }

        let rex = match parse_hex(rex).as_deref() {
            Some([]) => None,
            Some([b]) if (0x40..=0x4F).contains(b) => Some(*b),
            _ => return Err(invalid(String::from("REX must be one byte in 40..4f"))),
        };

        let opcode = parse_hex(opcode).ok_or_else(|| invalid(String::from("bad opcode hex")))?;
        if opcode.is_empty() || opcode.len() > 3 {
            return Err(invalid(String::from("opcode must be 1 to 3 bytes")));
        }

        let modrm = match parse_hex(modrm).as_deref() {
            Some([]) => None,
            Some([b]) => Some(*b),
            _ => return Err(invalid(String::from("ModRM seed must be one byte"))),
        };

        let operands = parse_operand_codes(codes).map_err(invalid)?;
        if operands.iter().filter(|c| c.kind == OperandKind::Memory).count() > 1 {
            return Err(invalid(String::from("at most one memory operand")));
        }
        let imm_bits: u32 = operands
            .iter()
            .filter(|c| c.kind.is_immediate())
            .filter_map(|c| c.width)
            .sum();
        if imm_bits > MAX_IMMEDIATE_BITS {
            return Err(invalid(format!(
                "{} immediate bits exceed {}",
                imm_bits, MAX_IMMEDIATE_BITS
            )));
        }

        Ok(Template {
            prefix,
            rex,
            opcode,
            modrm,
            operands,
        })
    }

    /// Number of operands this alternative consumes.
    pub fn arity(&self) -> usize {
        self.operands.len()
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.prefix {
            write!(f, "{:02x}", b)?;
        }
        f.write_str(":")?;
        if let Some(rex) = self.rex {
            write!(f, "{:02x}", rex)?;
        }
        f.write_str(":")?;
        for b in &self.opcode {
            write!(f, "{:02x}", b)?;
        }
        f.write_str(":")?;
        if let Some(modrm) = self.modrm {
            write!(f, "{:02x}", modrm)?;
        }
        f.write_str("/")?;
        for code in &self.operands {
            write!(f, "{}", code)?;
        }
        Ok(())
    }
}

/// Parse a `|`-separated alternative string.
///
/// # Errors
///
/// Returns [`AsmError::InvalidTemplate`] for the first malformed alternative.
pub fn parse_alternatives(text: &str) -> Result<Vec<Template>, AsmError> {
    text.split('|').map(|alt| Template::parse(alt.trim())).collect()
}

fn parse_hex(text: &str) -> Option<Vec<u8>> {
    if text.len() % 2 != 0 {
        return None;
    }
    (0..text.len())
        .step_by(2)
        .map(|i| {
            let pair = text.get(i..i + 2)?;
            u8::from_str_radix(pair, 16).ok()
        })
        .collect()
}

fn parse_operand_codes(text: &str) -> Result<Vec<OperandCode>, String> {
    let mut codes = Vec::new();
    let mut chars = text.char_indices().peekable();
    while let Some((_, letter)) = chars.next() {
        let kind = OperandKind::from_letter(letter)
            .ok_or_else(|| format!("unknown operand code '{}'", letter))?;
        let mut digits = String::new();
        while let Some(&(_, c)) = chars.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            digits.push(c);
            chars.next();
        }
        let width = if digits.is_empty() {
            None
        } else {
            Some(
                digits
                    .parse::<u32>()
                    .map_err(|_| format!("bad width '{}{}'", letter, digits))?,
            )
        };
        validate_width(kind, width).map_err(|expected| {
            format!("'{}{}' must have {}", letter, digits, expected)
        })?;
        codes.push(OperandCode { kind, width });
    }
    Ok(codes)
}

fn validate_width(kind: OperandKind, width: Option<u32>) -> Result<(), &'static str> {
    let gp = |w: Option<u32>| matches!(w, Some(8 | 16 | 32 | 64));
    let ok = match kind {
        OperandKind::Accumulator
        | OperandKind::Count
        | OperandKind::Reg
        | OperandKind::OpcodeReg
        | OperandKind::RmReg
        | OperandKind::SignedImm
        | OperandKind::UnsignedImm => gp(width),
        OperandKind::FloatImm => matches!(width, Some(32 | 64)),
        OperandKind::Direct => width.is_some(),
        OperandKind::Memory => width.is_none() || gp(width),
    };
    if ok {
        Ok(())
    } else {
        Err(match kind {
            OperandKind::FloatImm => "width 32 or 64",
            OperandKind::Direct => "a literal value",
            _ => "width 8, 16, 32 or 64",
        })
    }
}
