//! Error types for template parsing, operand encoding and statement dispatch.

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

/// Assembly error with a descriptive payload.
///
/// Three variants ([`OperandType`](AsmError::OperandType),
/// [`InvalidMemoryOperand`](AsmError::InvalidMemoryOperand) and
/// [`DirectOperandMismatch`](AsmError::DirectOperandMismatch)) describe why a
/// single template alternative does not fit its operands; the instruction
/// selector swallows them and moves on to the next alternative. Every other
/// variant is fatal to the run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AsmError {
    /// Unbalanced brackets, an unterminated quote or an empty operand.
    MalformedOperandList {
        /// Why the operand list was rejected.
        detail: String,
        /// The raw operand text.
        text: String,
    },

    /// The line does not start with a mnemonic or label.
    MalformedStatement {
        /// The offending line.
        text: String,
    },

    /// A template alternative string does not follow the template grammar.
    InvalidTemplate {
        /// The alternative that failed to parse.
        template: String,
        /// Why it was rejected.
        detail: String,
    },

    /// One operand does not satisfy an operand encoder's precondition.
    OperandType {
        /// The operand text.
        operand: String,
        /// What the encoder expected.
        expected: String,
    },

    /// Memory operand grammar or addressing-mode violation.
    InvalidMemoryOperand {
        /// The memory operand text.
        operand: String,
        /// Why it was rejected.
        detail: String,
    },

    /// A `d<n>` operand evaluated to something other than `n`.
    DirectOperandMismatch {
        /// The operand text.
        operand: String,
        /// The literal the template requires.
        expected: u64,
    },

    /// Every template alternative of a mnemonic was rejected.
    NoMatchingEncoding {
        /// The mnemonic.
        mnemonic: String,
        /// The operands, joined as written.
        operands: String,
    },

    /// Dispatch lookup found neither a template nor a directive.
    UnknownMnemonic {
        /// The mnemonic that was not recognized.
        mnemonic: String,
    },

    /// A type with this name is already registered.
    DuplicateType {
        /// The type name.
        name: String,
    },

    /// No type with this name is registered.
    UnknownType {
        /// The type name.
        name: String,
    },

    /// A dotted path names a member that does not exist.
    UnknownMember {
        /// The full dotted path.
        path: String,
        /// The missing member.
        member: String,
    },

    /// A member name was declared twice inside one type definition.
    DuplicateMember {
        /// The type being defined.
        type_name: String,
        /// The repeated member name.
        member: String,
    },

    /// A member pushes a type's layout past `u64::MAX` bytes.
    TypeTooLarge {
        /// The type being defined.
        type_name: String,
        /// The member that did not fit.
        member: String,
    },

    /// The run finished while a `.type` definition was still open.
    UnterminatedType {
        /// The open type.
        name: String,
    },

    /// Label defined more than once.
    DuplicateLabel {
        /// The label name.
        label: String,
        /// Output offset of the first definition.
        first_offset: usize,
    },

    /// A directive received an operand it cannot use.
    InvalidDirective {
        /// The directive name.
        directive: String,
        /// Why the operand was rejected.
        detail: String,
    },

    /// Encoded instruction exceeds the 15-byte architectural limit.
    InstructionTooLong {
        /// The mnemonic.
        mnemonic: String,
        /// The encoded length.
        len: usize,
    },

    /// A configurable resource limit was exceeded.
    ResourceLimitExceeded {
        /// Human-readable name of the resource (e.g. "statements", "types").
        resource: String,
        /// The configured limit that was exceeded.
        limit: usize,
    },

    /// A fatal error, annotated with the source line that caused it.
    Line {
        /// 1-based line number within the run.
        line: u32,
        /// The raw line text.
        text: String,
        /// The underlying error.
        cause: Box<AsmError>,
    },
}

impl AsmError {
    /// Whether this error only rejects one template alternative.
    #[must_use]
    pub fn is_mismatch(&self) -> bool {
        matches!(
            self,
            AsmError::OperandType { .. }
                | AsmError::InvalidMemoryOperand { .. }
                | AsmError::DirectOperandMismatch { .. }
        )
    }

    /// The innermost error, looking through [`AsmError::Line`].
    #[must_use]
    pub fn root_cause(&self) -> &AsmError {
        match self {
            AsmError::Line { cause, .. } => cause.root_cause(),
            other => other,
        }
    }

    pub(crate) fn operand_type(operand: &str, expected: impl Into<String>) -> Self {
        AsmError::OperandType {
            operand: String::from(operand),
            expected: expected.into(),
        }
    }

    pub(crate) fn invalid_memory(operand: &str, detail: impl Into<String>) -> Self {
        AsmError::InvalidMemoryOperand {
            operand: String::from(operand),
            detail: detail.into(),
        }
    }

    pub(crate) fn invalid_directive(directive: &str, detail: impl Into<String>) -> Self {
        AsmError::InvalidDirective {
            directive: String::from(directive),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for AsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsmError::MalformedOperandList { detail, text } => {
                write!(f, "malformed operand list '{}': {}", text, detail)
            }
            AsmError::MalformedStatement { text } => {
                write!(f, "malformed statement '{}'", text)
            }
            AsmError::InvalidTemplate { template, detail } => {
                write!(f, "invalid template '{}': {}", template, detail)
            }
            AsmError::OperandType { operand, expected } => {
                write!(f, "operand '{}' is not {}", operand, expected)
            }
            AsmError::InvalidMemoryOperand { operand, detail } => {
                write!(f, "invalid memory operand '{}': {}", operand, detail)
            }
            AsmError::DirectOperandMismatch { operand, expected } => {
                write!(f, "operand '{}' must be exactly {}", operand, expected)
            }
            AsmError::NoMatchingEncoding { mnemonic, operands } => {
                write!(f, "no encoding of '{}' accepts '{}'", mnemonic, operands)
            }
            AsmError::UnknownMnemonic { mnemonic } => {
                write!(f, "unknown mnemonic '{}'", mnemonic)
            }
            AsmError::DuplicateType { name } => write!(f, "type '{}' is already defined", name),
            AsmError::UnknownType { name } => write!(f, "unknown type '{}'", name),
            AsmError::UnknownMember { path, member } => {
                write!(f, "'{}' has no member '{}'", path, member)
            }
            AsmError::DuplicateMember { type_name, member } => {
                write!(f, "type '{}' already has a member '{}'", type_name, member)
            }
            AsmError::TypeTooLarge { type_name, member } => {
                write!(f, "member '{}' makes type '{}' too large", member, type_name)
            }
            AsmError::UnterminatedType { name } => {
                write!(f, "type '{}' is missing .endtype", name)
            }
            AsmError::DuplicateLabel {
                label,
                first_offset,
            } => {
                write!(
                    f,
                    "duplicate label '{}' (first defined at offset {:#x})",
                    label, first_offset
                )
            }
            AsmError::InvalidDirective { directive, detail } => {
                write!(f, "{}: {}", directive, detail)
            }
            AsmError::InstructionTooLong { mnemonic, len } => {
                write!(
                    f,
                    "'{}' encodes to {} bytes, more than the 15-byte limit",
                    mnemonic, len
                )
            }
            AsmError::ResourceLimitExceeded { resource, limit } => {
                write!(
                    f,
                    "resource limit exceeded: {} (limit: {})",
                    resource, limit
                )
            }
            AsmError::Line { line, text, cause } => {
                write!(f, "line {}: {} (in `{}`)", line, cause, text.trim())
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for AsmError {}

/// Joins operand fragments back into their written form for diagnostics.
pub(crate) fn join_operands(args: &[&str]) -> String {
    let mut out = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(arg);
    }
    out
}
