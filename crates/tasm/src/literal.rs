//! Literal and constant-expression evaluation for operand text.
//!
//! Integer expressions support decimal, `0x`, `0b` and `0o` literals,
//! character literals, the usual arithmetic and bitwise operators with C-like
//! precedence, parentheses, and identifiers resolved by a caller-supplied
//! symbol lookup.

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::AsmError;

/// Unary operators and parentheses nest at most this deep.
pub const MAX_EXPR_DEPTH: usize = 256;

/// Why an expression could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// The text is not a constant expression.
    NotANumber,
    /// Evaluation failed fatally: a missing member of a known type, or
    /// nesting deeper than [`MAX_EXPR_DEPTH`].
    Fatal(AsmError),
}

impl From<AsmError> for EvalError {
    fn from(err: AsmError) -> Self {
        EvalError::Fatal(err)
    }
}

/// Evaluate an integer constant expression.
///
/// `lookup` resolves identifiers (which may contain `.`); returning
/// `Ok(None)` makes the whole expression [`EvalError::NotANumber`].
///
/// # Errors
///
/// See [`EvalError`].
pub fn eval_int<F>(text: &str, lookup: F) -> Result<i128, EvalError>
where
    F: Fn(&str) -> Result<Option<i128>, AsmError>,
{
    let mut parser = ExprParser {
        src: text.as_bytes(),
        pos: 0,
        depth: 0,
        lookup: &lookup,
    };
    let value = parser.parse_or()?;
    parser.skip_ws();
    if parser.pos != parser.src.len() {
        return Err(EvalError::NotANumber);
    }
    Ok(value)
}

struct ExprParser<'a, F> {
    src: &'a [u8],
    pos: usize,
    depth: usize,
    lookup: &'a F,
}

impl<F> ExprParser<'_, F>
where
    F: Fn(&str) -> Result<Option<i128>, AsmError>,
{
    fn skip_ws(&mut self) {
        while self.pos < self.src.len() && self.src[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_ws();
        self.src.get(self.pos).copied()
    }

    fn eat(&mut self, op: &[u8]) -> bool {
        self.skip_ws();
        if self.src[self.pos..].starts_with(op) {
            self.pos += op.len();
            true
        } else {
            false
        }
    }

    /// Run `inner` one nesting level deeper.
    fn nested(
        &mut self,
        inner: impl FnOnce(&mut Self) -> Result<i128, EvalError>,
    ) -> Result<i128, EvalError> {
        if self.depth >= MAX_EXPR_DEPTH {
            return Err(EvalError::Fatal(AsmError::ResourceLimitExceeded {
                resource: String::from("expression nesting"),
                limit: MAX_EXPR_DEPTH,
            }));
        }
        self.depth += 1;
        let value = inner(self);
        self.depth -= 1;
        value
    }

    fn parse_or(&mut self) -> Result<i128, EvalError> {
        let mut lhs = self.parse_xor()?;
        while self.peek() == Some(b'|') {
            self.pos += 1;
            lhs |= self.parse_xor()?;
        }
        Ok(lhs)
    }

    fn parse_xor(&mut self) -> Result<i128, EvalError> {
        let mut lhs = self.parse_and()?;
        while self.peek() == Some(b'^') {
            self.pos += 1;
            lhs ^= self.parse_and()?;
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<i128, EvalError> {
        let mut lhs = self.parse_shift()?;
        while self.peek() == Some(b'&') {
            self.pos += 1;
            lhs &= self.parse_shift()?;
        }
        Ok(lhs)
    }

    fn parse_shift(&mut self) -> Result<i128, EvalError> {
        let mut lhs = self.parse_additive()?;
        loop {
            if self.eat(b"<<") {
                let rhs = self.parse_additive()?;
                let shift = u32::try_from(rhs).map_err(|_| EvalError::NotANumber)?;
                lhs = lhs.checked_shl(shift).ok_or(EvalError::NotANumber)?;
            } else if self.eat(b">>") {
                let rhs = self.parse_additive()?;
                let shift = u32::try_from(rhs).map_err(|_| EvalError::NotANumber)?;
                lhs = lhs.checked_shr(shift).ok_or(EvalError::NotANumber)?;
            } else {
                return Ok(lhs);
            }
        }
    }

    fn parse_additive(&mut self) -> Result<i128, EvalError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            match self.peek() {
                Some(b'+') => {
                    self.pos += 1;
                    let rhs = self.parse_multiplicative()?;
                    lhs = lhs.checked_add(rhs).ok_or(EvalError::NotANumber)?;
                }
                Some(b'-') => {
                    self.pos += 1;
                    let rhs = self.parse_multiplicative()?;
                    lhs = lhs.checked_sub(rhs).ok_or(EvalError::NotANumber)?;
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn parse_multiplicative(&mut self) -> Result<i128, EvalError> {
        let mut lhs = self.parse_unary()?;
        loop {
            match self.peek() {
                Some(b'*') => {
                    self.pos += 1;
                    let rhs = self.parse_unary()?;
                    lhs = lhs.checked_mul(rhs).ok_or(EvalError::NotANumber)?;
                }
                Some(b'/') => {
                    self.pos += 1;
                    let rhs = self.parse_unary()?;
                    lhs = lhs.checked_div(rhs).ok_or(EvalError::NotANumber)?;
                }
                Some(b'%') => {
                    self.pos += 1;
                    let rhs = self.parse_unary()?;
                    lhs = lhs.checked_rem(rhs).ok_or(EvalError::NotANumber)?;
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn parse_unary(&mut self) -> Result<i128, EvalError> {
        match self.peek() {
            Some(b'-') => {
                self.pos += 1;
                let v = self.nested(Self::parse_unary)?;
                v.checked_neg().ok_or(EvalError::NotANumber)
            }
            Some(b'+') => {
                self.pos += 1;
                self.nested(Self::parse_unary)
            }
            Some(b'~') => {
                self.pos += 1;
                Ok(!self.nested(Self::parse_unary)?)
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<i128, EvalError> {
        match self.peek() {
            Some(b'(') => {
                self.pos += 1;
                let v = self.nested(Self::parse_or)?;
                if self.peek() != Some(b')') {
                    return Err(EvalError::NotANumber);
                }
                self.pos += 1;
                Ok(v)
            }
            Some(b'\'') => {
                let (value, consumed) =
                    parse_char_literal(&self.src[self.pos..]).ok_or(EvalError::NotANumber)?;
                self.pos += consumed;
                Ok(value)
            }
            Some(c) if c.is_ascii_digit() => {
                let start = self.pos;
                while self.pos < self.src.len()
                    && (self.src[self.pos].is_ascii_alphanumeric() || self.src[self.pos] == b'_')
                {
                    self.pos += 1;
                }
                let word = core::str::from_utf8(&self.src[start..self.pos])
                    .map_err(|_| EvalError::NotANumber)?;
                parse_int_literal(word).ok_or(EvalError::NotANumber)
            }
            Some(c) if c.is_ascii_alphabetic() || c == b'_' || c == b'@' => {
                let start = self.pos;
                while self.pos < self.src.len()
                    && (self.src[self.pos].is_ascii_alphanumeric()
                        || matches!(self.src[self.pos], b'_' | b'.' | b'@'))
                {
                    self.pos += 1;
                }
                let ident = core::str::from_utf8(&self.src[start..self.pos])
                    .map_err(|_| EvalError::NotANumber)?;
                match (self.lookup)(ident)? {
                    Some(v) => Ok(v),
                    None => Err(EvalError::NotANumber),
                }
            }
            _ => Err(EvalError::NotANumber),
        }
    }
}

/// Parse one unsigned integer literal: decimal, `0x`, `0b` or `0o`, with
/// optional `_` separators.
pub fn parse_int_literal(word: &str) -> Option<i128> {
    let b = word.as_bytes();
    let (radix, digits) = if b.len() > 2 && b[0] == b'0' {
        match b[1] {
            b'x' | b'X' => (16, &word[2..]),
            b'b' | b'B' => (2, &word[2..]),
            b'o' | b'O' => (8, &word[2..]),
            _ => (10, word),
        }
    } else {
        (10, word)
    };
    let mut value: i128 = 0;
    let mut any = false;
    for c in digits.chars() {
        if c == '_' {
            continue;
        }
        let d = c.to_digit(radix)?;
        value = value.checked_mul(radix as i128)?.checked_add(d as i128)?;
        any = true;
    }
    any.then_some(value)
}

/// Parse a character literal at the start of `src` (`'a'`, `'\n'`, `'\x41'`).
/// Returns the value and the number of bytes consumed.
fn parse_char_literal(src: &[u8]) -> Option<(i128, usize)> {
    let text = core::str::from_utf8(src).ok()?;
    let inner = text.strip_prefix('\'')?;
    let mut chars = inner.char_indices();
    let (_, first) = chars.next()?;
    let (value, after) = if first == '\\' {
        let (idx, esc) = chars.next()?;
        match esc {
            'x' => {
                let hex = inner.get(idx + 1..idx + 3)?;
                (u32::from_str_radix(hex, 16).ok()?, idx + 3)
            }
            other => (unescape_char(other)? as u32, idx + other.len_utf8()),
        }
    } else if first == '\'' {
        return None;
    } else {
        (first as u32, first.len_utf8())
    };
    if !inner[after..].starts_with('\'') {
        return None;
    }
    Some((value as i128, 1 + after + 1))
}

fn unescape_char(c: char) -> Option<char> {
    Some(match c {
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        '0' => '\0',
        '\\' => '\\',
        '\'' => '\'',
        '"' => '"',
        _ => return None,
    })
}

/// Decode a quoted string literal (either quote style) into its characters.
///
/// Returns `None` if `text` is not a complete quoted literal or contains an
/// unknown escape.
pub fn parse_string_literal(text: &str) -> Option<String> {
    let quote = text.chars().next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let inner = text.strip_prefix(quote)?.strip_suffix(quote)?;
    if text.len() < 2 {
        return None;
    }
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == quote {
            return None;
        }
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'x' => {
                let hi = chars.next()?.to_digit(16)?;
                let lo = chars.next()?.to_digit(16)?;
                out.push(char::from_u32(hi * 16 + lo)?);
            }
            other => out.push(unescape_char(other)?),
        }
    }
    Some(out)
}

/// Parse a floating-point literal for `f<n>` operands.
///
/// The text must look like a float (contain `.` or an exponent, or be
/// `inf`/`nan`) so that integer operands never fall through to a float
/// alternative.
pub fn parse_float_literal(text: &str) -> Option<f64> {
    let t = text.trim();
    let body = t.strip_prefix(['-', '+']).unwrap_or(t);
    let lower: Vec<u8> = body.bytes().map(|b| b.to_ascii_lowercase()).collect();
    let special = lower == b"inf" || lower == b"infinity" || lower == b"nan";
    let looks_float = special
        || (lower.first().is_some_and(|c| c.is_ascii_digit() || *c == b'.')
            && !lower.starts_with(b"0x")
            && lower.iter().any(|c| *c == b'.' || *c == b'e'));
    if !looks_float {
        return None;
    }
    t.parse::<f64>().ok()
}
