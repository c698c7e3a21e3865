//! Statement splitter.
//!
//! Turns one source line into an opcode and a list of operand fragments.
//! Fragments are borrowed from the line and trimmed; commas inside quotes or
//! inside `()`, `[]` and `{}` nesting do not split, and `#` outside quotes and
//! nesting starts a comment.

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::AsmError;

/// One statement: opcode plus raw operand fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement<'src> {
    /// Mnemonic or directive name, as written.
    pub opcode: &'src str,
    /// Trimmed operand fragments, in source order.
    pub args: Vec<&'src str>,
}

/// Split a line into a [`Statement`].
///
/// Returns `Ok(None)` for blank and comment-only lines. A line of the form
/// `name:` or `@name:` becomes a `.label name` statement.
///
/// # Errors
///
/// Returns [`AsmError::MalformedStatement`] if the line does not begin with
/// an opcode and [`AsmError::MalformedOperandList`] if the operands are
/// unbalanced.
pub fn split_statement(line: &str) -> Result<Option<Statement<'_>>, AsmError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    if let Some(label) = label_name(trimmed) {
        return Ok(Some(Statement {
            opcode: ".label",
            args: alloc::vec![label],
        }));
    }

    let end = trimmed
        .find(|c: char| !is_opcode_char(c))
        .unwrap_or(trimmed.len());
    let opcode = &trimmed[..end];
    let rest = &trimmed[end..];
    if opcode.is_empty() || !(rest.is_empty() || rest.starts_with(char::is_whitespace) || rest.starts_with('#')) {
        return Err(AsmError::MalformedStatement {
            text: String::from(trimmed),
        });
    }

    Ok(Some(Statement {
        opcode,
        args: split_args(rest)?,
    }))
}

fn is_opcode_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.' || c == '-'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// `name:` or `@name:` with nothing but an optional comment after the colon.
fn label_name(line: &str) -> Option<&str> {
    let (head, tail) = line.split_once(':')?;
    let tail = tail.trim_start();
    if !(tail.is_empty() || tail.starts_with('#')) {
        return None;
    }
    let name = head.trim_end();
    let body = name.strip_prefix('@').unwrap_or(name);
    if body.is_empty() || !body.chars().all(is_ident_char) {
        return None;
    }
    Some(name)
}

/// Split an operand string into trimmed fragments.
///
/// A single trailing comma is dropped; an empty fragment anywhere else is an
/// error.
///
/// # Errors
///
/// Returns [`AsmError::MalformedOperandList`] on a stray or mismatched closing
/// bracket, an unclosed bracket, an unterminated quote, or an empty operand.
pub fn split_args(text: &str) -> Result<Vec<&str>, AsmError> {
    let malformed = |detail: &str| AsmError::MalformedOperandList {
        detail: String::from(detail),
        text: String::from(text.trim()),
    };

    let bytes = text.as_bytes();
    let mut nesting: Vec<u8> = Vec::new();
    let mut single_quote = false;
    let mut double_quote = false;
    let mut cuts: Vec<usize> = Vec::new();
    let mut end = bytes.len();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        i += 1;
        if single_quote || double_quote {
            match c {
                b'\\' => i += 1,
                b'\'' if single_quote => single_quote = false,
                b'"' if double_quote => double_quote = false,
                _ => {}
            }
            continue;
        }
        match c {
            b'(' => nesting.push(b')'),
            b'[' => nesting.push(b']'),
            b'{' => nesting.push(b'}'),
            b')' | b']' | b'}' => {
                if nesting.pop() != Some(c) {
                    return Err(malformed("unbalanced closing bracket"));
                }
            }
            b'\'' => single_quote = true,
            b'"' => double_quote = true,
            b'#' if nesting.is_empty() => {
                end = i - 1;
                break;
            }
            b',' if nesting.is_empty() => cuts.push(i - 1),
            _ => {}
        }
    }

    if single_quote || double_quote {
        return Err(malformed("unterminated quote"));
    }
    if !nesting.is_empty() {
        return Err(malformed("unclosed bracket"));
    }

    let body = &text[..end];
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut args = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    for cut in cuts {
        args.push(body[start..cut].trim());
        start = cut + 1;
    }
    let last = body[start..].trim();
    if !last.is_empty() {
        args.push(last);
    }

    if args.iter().any(|a| a.is_empty()) {
        return Err(malformed("empty operand"));
    }
    Ok(args)
}
