//! Compile-time assembly proc-macros for [`tasm`](https://crates.io/crates/tasm).
//!
//! [`tasm_bytes!`] assembles source text while the crate compiles and expands
//! to a `&'static [u8]` constant; [`tasm_array!`] expands to `[u8; N]`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tasm_macros::{tasm_array, tasm_bytes};
//!
//! const PROLOGUE: &[u8] = tasm_bytes!("push rbp\nmov rbp, rsp");
//! const RET: [u8; 1] = tasm_array!("ret");
//! ```

use proc_macro::TokenStream;

/// Assemble source text at compile time, producing a `&'static [u8]` byte slice.
///
/// # Syntax
///
/// ```rust,ignore
/// tasm_bytes!("assembly source")
/// ```
///
/// # Examples
///
/// ```rust,ignore
/// use tasm_macros::tasm_bytes;
///
/// const CODE: &[u8] = tasm_bytes!("
///     .type point
///     int32 x, y
///     .endtype
///     mov eax, [rdi:point.y]
///     ret
/// ");
/// assert_eq!(CODE, &[0x8B, 0x47, 0x04, 0xC3]);
/// ```
///
/// # Compile-time errors
///
/// If the source fails to assemble, the macro emits a `compile_error!` with
/// the full `AsmError` message, pointing at the string literal.
#[proc_macro]
pub fn tasm_bytes(input: TokenStream) -> TokenStream {
    match tasm_bytes_impl(input) {
        Ok(ts) => ts,
        Err(err) => err.into_compile_error(),
    }
}

/// Assemble source text at compile time, producing a fixed-size array `[u8; N]`.
///
/// # Examples
///
/// ```rust,ignore
/// use tasm_macros::tasm_array;
///
/// const PUSH_R12: [u8; 2] = tasm_array!("push r12");
/// ```
#[proc_macro]
pub fn tasm_array(input: TokenStream) -> TokenStream {
    match tasm_array_impl(input) {
        Ok(ts) => ts,
        Err(err) => err.into_compile_error(),
    }
}

// ─── Implementation ─────────────────────────────────────────────────────────

type Tokens = std::iter::Peekable<proc_macro::token_stream::IntoIter>;

struct MacroInput {
    source: String,
    /// Span of the source literal for error reporting.
    source_span: proc_macro::Span,
}

fn parse_input(input: TokenStream) -> Result<MacroInput, syn_free::Error> {
    let mut tokens = input.into_iter().peekable();
    let (source, source_span) = parse_string_literal(&mut tokens)?;

    // One optional trailing comma.
    if let Some(proc_macro::TokenTree::Punct(p)) = tokens.peek() {
        if p.as_char() == ',' {
            tokens.next();
        }
    }
    if let Some(extra) = tokens.next() {
        return Err(syn_free::Error::with_span(
            extra.span(),
            "unexpected extra tokens after source string",
        ));
    }

    Ok(MacroInput {
        source,
        source_span,
    })
}

fn tasm_bytes_impl(input: TokenStream) -> Result<TokenStream, syn_free::Error> {
    let mi = parse_input(input)?;
    let bytes = do_assemble(&mi)?;
    Ok(bytes_to_slice_expr(&bytes))
}

fn tasm_array_impl(input: TokenStream) -> Result<TokenStream, syn_free::Error> {
    let mi = parse_input(input)?;
    let bytes = do_assemble(&mi)?;
    Ok(bytes_to_array_expr(&bytes))
}

fn do_assemble(mi: &MacroInput) -> Result<Vec<u8>, syn_free::Error> {
    tasm::assemble(&mi.source)
        .map_err(|e| syn_free::Error::with_span(mi.source_span, &format!("assembly error: {e}")))
}

fn parse_string_literal(tokens: &mut Tokens) -> Result<(String, proc_macro::Span), syn_free::Error> {
    let tt = tokens
        .next()
        .ok_or_else(|| syn_free::Error::new("expected assembly source string"))?;
    let proc_macro::TokenTree::Literal(lit) = &tt else {
        return Err(syn_free::Error::with_span(
            tt.span(),
            "expected string literal",
        ));
    };
    let raw = lit.to_string();
    // Raw strings carry no escapes: r"..." and r#"..."#.
    if let Some(rest) = raw.strip_prefix('r') {
        let hashes = rest.len() - rest.trim_start_matches('#').len();
        let fence = "#".repeat(hashes);
        let content = rest
            .strip_prefix(fence.as_str())
            .and_then(|s| s.strip_prefix('"'))
            .and_then(|s| s.strip_suffix(fence.as_str()))
            .and_then(|s| s.strip_suffix('"'))
            .ok_or_else(|| syn_free::Error::with_span(tt.span(), "malformed raw string"))?;
        return Ok((content.to_string(), tt.span()));
    }
    let inner = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| syn_free::Error::with_span(tt.span(), "expected string literal"))?;
    Ok((unescape_string(inner), tt.span()))
}

fn unescape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('0') => out.push('\0'),
            // Line continuation: skip the newline and leading whitespace.
            Some('\n') => {
                while chars.peek().is_some_and(|c| c.is_whitespace()) {
                    chars.next();
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn bytes_to_slice_expr(bytes: &[u8]) -> TokenStream {
    let inner = byte_list(bytes);
    syn_free::parse(&format!("{{ const BYTES: &[u8] = &[{inner}]; BYTES }}"))
}

fn bytes_to_array_expr(bytes: &[u8]) -> TokenStream {
    let len = bytes.len();
    let inner = byte_list(bytes);
    syn_free::parse(&format!("{{ const BYTES: [u8; {len}] = [{inner}]; BYTES }}"))
}

fn byte_list(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:#04X}u8"))
        .collect::<Vec<_>>()
        .join(", ")
}

// ─── Minimal syn-free error type ─────────────────────────────────────────────
// The input is a single string literal, so `proc_macro` alone is enough.

mod syn_free {
    use proc_macro::{Span, TokenStream};

    pub struct Error {
        message: String,
        span: Option<Span>,
    }

    impl Error {
        pub fn new(msg: &str) -> Self {
            Self {
                message: msg.to_string(),
                span: None,
            }
        }

        pub fn with_span(span: Span, msg: &str) -> Self {
            Self {
                message: msg.to_string(),
                span: Some(span),
            }
        }

        pub fn into_compile_error(self) -> TokenStream {
            let msg = self.message.replace('\\', "\\\\").replace('"', "\\\"");
            let ts = parse(&format!("compile_error!(\"{msg}\")"));
            match self.span {
                Some(span) => ts
                    .into_iter()
                    .map(|mut tt| {
                        tt.set_span(span);
                        tt
                    })
                    .collect(),
                None => ts,
            }
        }
    }

    /// Parse generated code; an empty stream stands in if it is not valid Rust.
    pub fn parse(code: &str) -> TokenStream {
        code.parse().unwrap_or_default()
    }
}
