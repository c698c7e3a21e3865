//! # tasm: template-driven x86-64 assembler
//!
//! `tasm` turns Intel-syntax x86-64 assembly text into machine-code bytes.
//! Every mnemonic maps to an ordered list of compact encoding templates; the
//! first template whose operand slots accept the written operands wins.
//!
//! ## Quick Start
//!
//! ```rust
//! let code = tasm::assemble("add eax, 5").unwrap();
//! assert_eq!(code, vec![0x05, 0x05, 0x00, 0x00, 0x00]);
//! ```
//!
//! ## Features
//!
//! - **Template tables**: encodings are data (`prefix:rex:opcode:modrm/codes`),
//!   not code paths.
//! - **Named layouts**: `.type` blocks define field offsets that memory
//!   operands reference as `[rdi:point.y]`.
//! - **Data directives**: `.byte`, `.utf8`, `.int16/32/64`, `.float`,
//!   `.double`, `.align`.
//! - **`no_std` + `alloc`**: the `std` feature only adds `std::error::Error`.
//!
//! ## Builder API
//!
//! ```rust
//! use tasm::Assembler;
//!
//! let mut asm = Assembler::new();
//! asm.emit(".type point\nint32 x, y\n.endtype").unwrap();
//! asm.emit("mov eax, [rdi:point.y]").unwrap();
//! let result = asm.finish().unwrap();
//! assert_eq!(result.bytes(), &[0x8B, 0x47, 0x04]);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
// Encoders narrow i128 operand values into byte fields and write dense hex
// opcode literals.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_lossless,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::unreadable_literal,
    clippy::match_same_arms,
    clippy::module_name_repetitions,
    clippy::uninlined_format_args,
    clippy::doc_markdown,
    clippy::similar_names,
    clippy::too_many_lines,
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use
)]

extern crate alloc;

/// Public assembler API: the statement driver, directives and `AssemblyResult`.
pub mod assembler;
/// Operand encoders and the instruction selector.
pub mod encoder;
/// Error type.
pub mod error;
/// Statement splitter.
pub mod lexer;
/// Integer, float and string literal evaluation.
pub mod literal;
/// Memory operand parsing and addressing-form computation.
pub mod memory;
/// General-purpose and segment registers.
pub mod register;
/// Mnemonic and directive dispatch tables.
pub mod table;
/// Encoding template grammar.
pub mod template;
/// Named field layouts.
pub mod types;

// Re-exports
pub use assembler::{Assembler, AssemblyResult, ResourceLimits};
pub use encoder::{InstrBytes, MAX_INSTRUCTION_LEN};
pub use error::AsmError;
pub use lexer::Statement;
pub use memory::MemoryOperand;
pub use register::Register;
pub use template::{OperandCode, OperandKind, Template};
pub use types::{Member, Type, TypeRegistry};

use alloc::string::String;
use alloc::vec::Vec;

/// Assemble a multi-line source into machine code bytes.
///
/// # Errors
///
/// Returns the first fatal [`AsmError`], wrapped in [`AsmError::Line`], or
/// [`AsmError::UnterminatedType`] if a `.type` block is left open.
///
/// # Examples
///
/// ```rust
/// let code = tasm::assemble("push rbx\npush r12").unwrap();
/// assert_eq!(code, vec![0x53, 0x41, 0x54]);
/// ```
pub fn assemble(source: &str) -> Result<Vec<u8>, AsmError> {
    let mut asm = Assembler::new();
    asm.emit(source)?;
    let result = asm.finish()?;
    Ok(result.into_bytes())
}

/// Assemble and render the bytes as lowercase hexadecimal.
///
/// # Errors
///
/// See [`assemble`].
///
/// # Examples
///
/// ```rust
/// assert_eq!(tasm::assemble_hex("ret").unwrap(), "c3");
/// ```
pub fn assemble_hex(source: &str) -> Result<String, AsmError> {
    let mut asm = Assembler::new();
    asm.emit(source)?;
    Ok(asm.finish()?.to_hex())
}
