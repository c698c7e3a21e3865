//! Public assembler API: the statement-at-a-time driver and one-shot helpers.
//!
//! The driver owns the output buffer, the type and label registries, and the
//! dispatch mode. Each source line is split into a statement, looked up in the
//! dispatch table of the current mode, and either handed to a directive
//! handler or encoded by the instruction selector.

use alloc::collections::btree_map::Entry;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::encoder::select;
use crate::error::AsmError;
use crate::lexer::{split_statement, Statement};
use crate::literal::{eval_int, parse_float_literal, parse_string_literal, EvalError};
use crate::table::{DispatchEntry, NORMAL, TYPE_DEFINITION};
use crate::template::{parse_alternatives, Template};
use crate::types::{Type, TypeRegistry, PRIMITIVES};

/// The result of a successful assembly run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub struct AssemblyResult {
    /// The assembled machine code.
    bytes: Vec<u8>,
    /// Label offsets, in definition order.
    labels: Vec<(String, usize)>,
    /// `(output_offset, source_text)` pairs for the listing.
    source_annotations: Vec<(usize, String)>,
}

impl AssemblyResult {
    /// Get the assembled bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use tasm::Assembler;
    ///
    /// let mut asm = Assembler::new();
    /// asm.emit("nop")?;
    /// let result = asm.finish()?;
    /// assert_eq!(result.bytes(), &[0x90]);
    /// # Ok::<(), tasm::AsmError>(())
    /// ```
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume and return the bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Get the byte count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether no bytes were produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Labels as `(name, output offset)`, in definition order.
    ///
    /// # Examples
    ///
    /// ```
    /// use tasm::Assembler;
    ///
    /// let mut asm = Assembler::new();
    /// asm.emit("start:\nnop\nend:")?;
    /// let result = asm.finish()?;
    /// assert_eq!(result.labels()[1], ("end".to_string(), 1));
    /// # Ok::<(), tasm::AsmError>(())
    /// ```
    #[must_use]
    pub fn labels(&self) -> &[(String, usize)] {
        &self.labels
    }

    /// Look up a label's output offset by name.
    #[must_use]
    pub fn label_offset(&self, name: &str) -> Option<usize> {
        self.labels
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, off)| off)
    }

    /// Render the bytes as lowercase hexadecimal.
    ///
    /// # Examples
    ///
    /// ```
    /// use tasm::Assembler;
    ///
    /// let mut asm = Assembler::new();
    /// asm.emit("push r12")?;
    /// assert_eq!(asm.finish()?.to_hex(), "4154");
    /// # Ok::<(), tasm::AsmError>(())
    /// ```
    #[must_use]
    pub fn to_hex(&self) -> String {
        to_hex(&self.bytes)
    }

    /// Hex listing: one line per statement (offset, bytes, source) plus one
    /// line per label. Source text is only present when
    /// [`Assembler::enable_listing`] was called.
    ///
    /// ```text
    /// 00000000                  entry:
    /// 00000000  55                push rbp
    /// 00000001  4889E5            mov rbp, rsp
    /// ```
    #[must_use]
    pub fn listing(&self) -> String {
        use core::fmt::Write;

        let mut out = String::new();

        let mut label_at: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
        for (name, off) in &self.labels {
            label_at.entry(*off).or_default().push(name);
        }
        let mut source_at: BTreeMap<usize, &str> = BTreeMap::new();
        for (off, text) in &self.source_annotations {
            source_at.insert(*off, text);
        }

        // Chunks break at every label and every annotated statement.
        let mut splits: Vec<usize> = label_at.keys().chain(source_at.keys()).copied().collect();
        splits.push(self.bytes.len());
        splits.sort_unstable();
        splits.dedup();

        let mut offset = 0;
        while offset < self.bytes.len() {
            if let Some(names) = label_at.get(&offset) {
                for name in names {
                    let _ = writeln!(out, "{:08X}                  {}:", offset, name);
                }
            }
            let next_split = splits
                .iter()
                .copied()
                .find(|&s| s > offset)
                .unwrap_or(self.bytes.len());
            let end = next_split.min(offset + 8);
            let hex = to_hex(&self.bytes[offset..end]).to_ascii_uppercase();
            match source_at.get(&offset) {
                Some(text) => {
                    let _ = writeln!(out, "{:08X}  {:<16}  {}", offset, hex, text);
                }
                None => {
                    let _ = writeln!(out, "{:08X}  {:<16}", offset, hex);
                }
            }
            offset = end;
        }

        if let Some(names) = label_at.get(&offset) {
            for name in names {
                let _ = writeln!(out, "{:08X}                  {}:", offset, name);
            }
        }
        out
    }
}

fn to_hex(bytes: &[u8]) -> String {
    use core::fmt::Write;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut acc, b| {
        let _ = write!(acc, "{:02x}", b);
        acc
    })
}

/// Configurable resource limits for untrusted input.
///
/// All limits default to generous values that are sufficient for any
/// reasonable program.
///
/// # Examples
///
/// ```rust
/// use tasm::{Assembler, ResourceLimits};
///
/// let mut asm = Assembler::new();
/// asm.limits(ResourceLimits {
///     max_statements: 1_000,
///     max_output_bytes: 4096,
///     ..ResourceLimits::default()
/// });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceLimits {
    /// Maximum number of statements (instructions, directives, labels,
    /// member lines). Default: 1,000,000.
    pub max_statements: usize,
    /// Maximum number of labels. Default: 100,000.
    pub max_labels: usize,
    /// Maximum number of user-defined types. Default: 10,000.
    pub max_types: usize,
    /// Maximum output size in bytes. Default: 16 MiB.
    pub max_output_bytes: usize,
    /// Maximum input bytes per `emit()` call. Default: 64 MiB.
    pub max_source_bytes: usize,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_statements: 1_000_000,
            max_labels: 100_000,
            max_types: 10_000,
            max_output_bytes: 16 * 1024 * 1024,
            max_source_bytes: 64 * 1024 * 1024,
        }
    }
}

/// Dispatch mode of the driver.
#[derive(Debug, Clone, Default)]
enum Mode {
    /// Instructions and directives.
    #[default]
    Normal,
    /// Member declarations for the open type, until `.endtype`.
    TypeDefinition(Type),
}

/// Statement-at-a-time x86-64 assembler.
///
/// # Examples
///
/// ```rust
/// use tasm::Assembler;
///
/// let mut asm = Assembler::new();
/// asm.emit("push rbp").unwrap();
/// asm.emit("mov rbp, rsp").unwrap();
/// asm.emit("pop rbp").unwrap();
/// asm.emit("ret").unwrap();
/// let result = asm.finish().unwrap();
/// assert_eq!(result.bytes(), &[0x55, 0x48, 0x89, 0xE5, 0x5D, 0xC3]);
/// ```
#[derive(Debug)]
pub struct Assembler {
    output: Vec<u8>,
    types: TypeRegistry,
    labels: Vec<(String, usize)>,
    mode: Mode,
    /// First fatal error; once set, the run is over.
    failure: Option<AsmError>,
    /// 1-based number of the last line processed.
    line: u32,
    statement_count: usize,
    listing_enabled: bool,
    annotations: Vec<(usize, String)>,
    resource_limits: ResourceLimits,
    /// Parsed alternatives, keyed by their table string.
    templates: BTreeMap<&'static str, Vec<Template>>,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Assembler {
    /// Create an assembler with an empty output buffer and only the
    /// primitive types registered.
    pub fn new() -> Self {
        Self {
            output: Vec::new(),
            types: TypeRegistry::new(),
            labels: Vec::new(),
            mode: Mode::Normal,
            failure: None,
            line: 0,
            statement_count: 0,
            listing_enabled: false,
            annotations: Vec::new(),
            resource_limits: ResourceLimits::default(),
            templates: BTreeMap::new(),
        }
    }

    /// Set resource limits.
    ///
    /// See [`ResourceLimits`] for the available limits and their defaults.
    pub fn limits(&mut self, limits: ResourceLimits) -> &mut Self {
        self.resource_limits = limits;
        self
    }

    /// Record source text for each statement that produces bytes, making it
    /// available in [`AssemblyResult::listing()`].
    ///
    /// # Examples
    ///
    /// ```
    /// use tasm::Assembler;
    ///
    /// let mut asm = Assembler::new();
    /// asm.enable_listing();
    /// asm.emit("nop")?;
    /// let listing = asm.finish()?.listing();
    /// assert!(listing.contains("90"));
    /// assert!(listing.contains("nop"));
    /// # Ok::<(), tasm::AsmError>(())
    /// ```
    pub fn enable_listing(&mut self) -> &mut Self {
        self.listing_enabled = true;
        self
    }

    /// Process every line of `source`, in order.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error, wrapped in [`AsmError::Line`]. After
    /// that the assembler is failed: further calls return the same error.
    pub fn emit(&mut self, source: &str) -> Result<&mut Self, AsmError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        if source.len() > self.resource_limits.max_source_bytes {
            return Err(self.fail(AsmError::ResourceLimitExceeded {
                resource: String::from("source bytes"),
                limit: self.resource_limits.max_source_bytes,
            }));
        }
        for line in source.lines() {
            self.emit_line(line)?;
        }
        Ok(self)
    }

    /// Process one source line.
    ///
    /// Output appended for earlier lines is kept when this line fails.
    ///
    /// # Errors
    ///
    /// See [`Assembler::emit`].
    pub fn emit_line(&mut self, line: &str) -> Result<&mut Self, AsmError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        self.line += 1;
        match self.process_line(line) {
            Ok(()) => Ok(self),
            Err(cause) => Err(self.fail(AsmError::Line {
                line: self.line,
                text: line.to_string(),
                cause: alloc::boxed::Box::new(cause),
            })),
        }
    }

    /// Encode a single instruction without touching the assembler's state.
    ///
    /// Type paths resolve against the types registered so far.
    ///
    /// # Examples
    ///
    /// ```
    /// use tasm::Assembler;
    ///
    /// let asm = Assembler::new();
    /// assert_eq!(asm.encode_one("xor eax, eax")?, [0x31, 0xC0]);
    /// # Ok::<(), tasm::AsmError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`AsmError`] if the line is not an encodable instruction.
    pub fn encode_one(&self, line: &str) -> Result<Vec<u8>, AsmError> {
        let Some(stmt) = split_statement(line)? else {
            return Ok(Vec::new());
        };
        match NORMAL.lookup(stmt.opcode, &stmt.args) {
            Some(DispatchEntry::Templates(text)) => {
                let alternatives = parse_alternatives(text)?;
                let bytes = select(stmt.opcode, &alternatives, &stmt.args, &self.types)?;
                Ok(bytes.to_vec())
            }
            Some(DispatchEntry::Directive(_)) => Err(AsmError::invalid_directive(
                stmt.opcode,
                "only instructions can be encoded on their own",
            )),
            None => Err(AsmError::UnknownMnemonic {
                mnemonic: stmt.opcode.to_string(),
            }),
        }
    }

    /// Register a type built through the [`Type`] API.
    ///
    /// # Errors
    ///
    /// [`AsmError::DuplicateType`] if the name is taken, or
    /// [`AsmError::ResourceLimitExceeded`] past `max_types`.
    pub fn define_type(&mut self, ty: Type) -> Result<&mut Self, AsmError> {
        self.check_type_limit()?;
        self.types.register(ty)?;
        Ok(self)
    }

    /// The type registry.
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Bytes produced so far (including those before a failure).
    pub fn bytes(&self) -> &[u8] {
        &self.output
    }

    /// Whether a fatal error has ended the run.
    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// The error that ended the run, if any.
    pub fn error(&self) -> Option<&AsmError> {
        self.failure.as_ref()
    }

    /// Reset to the initial state, keeping limits and the listing flag.
    ///
    /// # Examples
    ///
    /// ```
    /// use tasm::Assembler;
    ///
    /// let mut asm = Assembler::new();
    /// asm.emit("nop")?;
    /// asm.reset();
    /// asm.emit("ret")?;
    /// assert_eq!(asm.finish()?.bytes(), &[0xC3]);
    /// # Ok::<(), tasm::AsmError>(())
    /// ```
    pub fn reset(&mut self) -> &mut Self {
        self.output.clear();
        self.types = TypeRegistry::new();
        self.labels.clear();
        self.mode = Mode::Normal;
        self.failure = None;
        self.line = 0;
        self.statement_count = 0;
        self.annotations.clear();
        self
    }

    /// Finish the run.
    ///
    /// # Errors
    ///
    /// Returns the stored failure, or [`AsmError::UnterminatedType`] if a
    /// `.type` block is still open.
    pub fn finish(self) -> Result<AssemblyResult, AsmError> {
        if let Some(err) = self.failure {
            return Err(err);
        }
        if let Mode::TypeDefinition(ty) = self.mode {
            return Err(AsmError::UnterminatedType {
                name: ty.name().to_string(),
            });
        }
        Ok(AssemblyResult {
            bytes: self.output,
            labels: self.labels,
            source_annotations: self.annotations,
        })
    }

    fn fail(&mut self, err: AsmError) -> AsmError {
        self.failure = Some(err.clone());
        err
    }

    fn process_line(&mut self, line: &str) -> Result<(), AsmError> {
        let Some(stmt) = split_statement(line)? else {
            return Ok(());
        };

        self.statement_count += 1;
        if self.statement_count > self.resource_limits.max_statements {
            return Err(AsmError::ResourceLimitExceeded {
                resource: String::from("statements"),
                limit: self.resource_limits.max_statements,
            });
        }

        let start = self.output.len();
        let table = match self.mode {
            Mode::Normal => &NORMAL,
            Mode::TypeDefinition(_) => &TYPE_DEFINITION,
        };
        match table.lookup(stmt.opcode, &stmt.args) {
            Some(DispatchEntry::Directive(handler)) => handler(self, &stmt)?,
            Some(DispatchEntry::Templates(text)) => {
                let alternatives = match self.templates.entry(text) {
                    Entry::Occupied(e) => e.into_mut(),
                    Entry::Vacant(e) => e.insert(parse_alternatives(text)?),
                };
                let bytes = select(stmt.opcode, alternatives, &stmt.args, &self.types)?;
                self.append(&bytes)?;
            }
            None => {
                return Err(AsmError::UnknownMnemonic {
                    mnemonic: stmt.opcode.to_string(),
                })
            }
        }

        if self.listing_enabled && self.output.len() > start {
            self.annotations.push((start, line.trim().to_string()));
        }
        Ok(())
    }

    fn append(&mut self, bytes: &[u8]) -> Result<(), AsmError> {
        if self.output.len() + bytes.len() > self.resource_limits.max_output_bytes {
            return Err(self.output_limit_error());
        }
        self.output.extend_from_slice(bytes);
        Ok(())
    }

    fn output_limit_error(&self) -> AsmError {
        AsmError::ResourceLimitExceeded {
            resource: String::from("output bytes"),
            limit: self.resource_limits.max_output_bytes,
        }
    }

    fn check_type_limit(&self) -> Result<(), AsmError> {
        if self.types.len() - PRIMITIVES.len() >= self.resource_limits.max_types {
            return Err(AsmError::ResourceLimitExceeded {
                resource: String::from("types"),
                limit: self.resource_limits.max_types,
            });
        }
        Ok(())
    }

    /// Evaluate a data operand as an integer, resolving type symbols.
    fn data_int(&self, directive: &str, text: &str) -> Result<i128, AsmError> {
        match eval_int(text, |ident| self.types.resolve_symbol(ident)) {
            Ok(v) => Ok(v),
            Err(EvalError::NotANumber) => Err(AsmError::invalid_directive(
                directive,
                format!("'{}' is not an integer", text),
            )),
            Err(EvalError::Fatal(err)) => Err(err),
        }
    }
}

// ─── Directive handlers ─────────────────────────────────────────────────────

fn expect_args(stmt: &Statement<'_>, count: usize) -> Result<(), AsmError> {
    if stmt.args.len() != count {
        return Err(AsmError::invalid_directive(
            stmt.opcode,
            format!("expected {} operand(s), found {}", count, stmt.args.len()),
        ));
    }
    Ok(())
}

fn expect_some_args(stmt: &Statement<'_>) -> Result<(), AsmError> {
    if stmt.args.is_empty() {
        return Err(AsmError::invalid_directive(
            stmt.opcode,
            "expected at least one operand",
        ));
    }
    Ok(())
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// `.label name`: record the current output offset.
pub(crate) fn directive_label(asm: &mut Assembler, stmt: &Statement<'_>) -> Result<(), AsmError> {
    expect_args(stmt, 1)?;
    let name = stmt.args[0];
    if !is_identifier(name.strip_prefix('@').unwrap_or(name)) {
        return Err(AsmError::invalid_directive(
            stmt.opcode,
            format!("'{}' is not a label name", name),
        ));
    }
    if let Some(&(_, first_offset)) = asm.labels.iter().find(|(n, _)| n == name) {
        return Err(AsmError::DuplicateLabel {
            label: name.to_string(),
            first_offset,
        });
    }
    if asm.labels.len() >= asm.resource_limits.max_labels {
        return Err(AsmError::ResourceLimitExceeded {
            resource: String::from("labels"),
            limit: asm.resource_limits.max_labels,
        });
    }
    log::debug!("label '{}' at offset {}", name, asm.output.len());
    asm.labels.push((name.to_string(), asm.output.len()));
    Ok(())
}

/// `.type name[:pack]`: open a type definition.
pub(crate) fn directive_type(asm: &mut Assembler, stmt: &Statement<'_>) -> Result<(), AsmError> {
    expect_args(stmt, 1)?;
    let (name, packed) = match stmt.args[0].split_once(':') {
        Some((name, suffix)) if suffix.trim() == "pack" => (name.trim(), true),
        Some((_, suffix)) => {
            return Err(AsmError::invalid_directive(
                stmt.opcode,
                format!("unknown type suffix ':{}'", suffix.trim()),
            ))
        }
        None => (stmt.args[0], false),
    };
    if !is_identifier(name) {
        return Err(AsmError::invalid_directive(
            stmt.opcode,
            format!("'{}' is not a type name", name),
        ));
    }
    if asm.types.contains(name) {
        return Err(AsmError::DuplicateType {
            name: name.to_string(),
        });
    }
    asm.check_type_limit()?;
    log::debug!("entering type definition '{}' (packed: {})", name, packed);
    asm.mode = Mode::TypeDefinition(Type::new(name, packed));
    Ok(())
}

/// `.endtype`: register the open type and return to normal dispatch.
pub(crate) fn directive_endtype(asm: &mut Assembler, stmt: &Statement<'_>) -> Result<(), AsmError> {
    expect_args(stmt, 0)?;
    if let Mode::TypeDefinition(ty) = core::mem::take(&mut asm.mode) {
        log::debug!("leaving type definition '{}'", ty.name());
        asm.types.register(ty)?;
    }
    Ok(())
}

/// `<type> a, b[count], …` inside a type definition.
pub(crate) fn directive_member(asm: &mut Assembler, stmt: &Statement<'_>) -> Result<(), AsmError> {
    let member_type = asm.types.type_of(stmt.opcode)?.clone();
    expect_some_args(stmt)?;
    for arg in &stmt.args {
        let (name, count) = match arg.split_once('[') {
            Some((name, rest)) => {
                let count_text = rest.strip_suffix(']').ok_or_else(|| {
                    AsmError::invalid_directive(stmt.opcode, format!("malformed member '{}'", arg))
                })?;
                let count = asm.data_int(stmt.opcode, count_text.trim())?;
                let count = u64::try_from(count).ok().filter(|&c| c > 0).ok_or_else(|| {
                    AsmError::invalid_directive(
                        stmt.opcode,
                        format!("array count of '{}' must be positive", arg),
                    )
                })?;
                (name.trim(), count)
            }
            None => (*arg, 1),
        };
        if !is_identifier(name) {
            return Err(AsmError::invalid_directive(
                stmt.opcode,
                format!("'{}' is not a member name", name),
            ));
        }
        if let Mode::TypeDefinition(open) = &mut asm.mode {
            open.add_member(name, &member_type, count)?;
        }
    }
    Ok(())
}

/// `.byte`: integers in `-128..=255` and strings of byte-sized characters.
pub(crate) fn directive_byte(asm: &mut Assembler, stmt: &Statement<'_>) -> Result<(), AsmError> {
    expect_some_args(stmt)?;
    let mut data = Vec::new();
    for arg in &stmt.args {
        if let Some(text) = parse_string_literal(arg) {
            for c in text.chars() {
                let b = u8::try_from(u32::from(c)).map_err(|_| {
                    AsmError::invalid_directive(
                        stmt.opcode,
                        format!("character {:?} does not fit in a byte", c),
                    )
                })?;
                data.push(b);
            }
            continue;
        }
        let value = asm.data_int(stmt.opcode, arg)?;
        if !(-128..=255).contains(&value) {
            return Err(AsmError::invalid_directive(
                stmt.opcode,
                format!("{} does not fit in a byte", value),
            ));
        }
        data.push(value as u8);
    }
    asm.append(&data)
}

/// `.utf8`: strings as UTF-8, integers as code points.
pub(crate) fn directive_utf8(asm: &mut Assembler, stmt: &Statement<'_>) -> Result<(), AsmError> {
    expect_some_args(stmt)?;
    let mut data = String::new();
    for arg in &stmt.args {
        if let Some(text) = parse_string_literal(arg) {
            data.push_str(&text);
            continue;
        }
        let value = asm.data_int(stmt.opcode, arg)?;
        let c = u32::try_from(value)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| {
                AsmError::invalid_directive(stmt.opcode, format!("{} is not a code point", value))
            })?;
        data.push(c);
    }
    asm.append(data.as_bytes())
}

fn int_directive(asm: &mut Assembler, stmt: &Statement<'_>, bits: u32) -> Result<(), AsmError> {
    expect_some_args(stmt)?;
    let min = -(1i128 << (bits - 1));
    let max = (1i128 << bits) - 1;
    let mut data = Vec::new();
    for arg in &stmt.args {
        let value = asm.data_int(stmt.opcode, arg)?;
        if !(min..=max).contains(&value) {
            return Err(AsmError::invalid_directive(
                stmt.opcode,
                format!("{} does not fit in {} bits", value, bits),
            ));
        }
        data.extend_from_slice(&(value as u64).to_le_bytes()[..(bits / 8) as usize]);
    }
    asm.append(&data)
}

pub(crate) fn directive_int16(asm: &mut Assembler, stmt: &Statement<'_>) -> Result<(), AsmError> {
    int_directive(asm, stmt, 16)
}

pub(crate) fn directive_int32(asm: &mut Assembler, stmt: &Statement<'_>) -> Result<(), AsmError> {
    int_directive(asm, stmt, 32)
}

pub(crate) fn directive_int64(asm: &mut Assembler, stmt: &Statement<'_>) -> Result<(), AsmError> {
    int_directive(asm, stmt, 64)
}

fn float_directive(asm: &mut Assembler, stmt: &Statement<'_>, double: bool) -> Result<(), AsmError> {
    expect_some_args(stmt)?;
    let mut data = Vec::new();
    for arg in &stmt.args {
        let value = match parse_float_literal(arg) {
            Some(v) => v,
            None => asm.data_int(stmt.opcode, arg)? as f64,
        };
        if double {
            data.extend_from_slice(&value.to_le_bytes());
        } else {
            data.extend_from_slice(&(value as f32).to_le_bytes());
        }
    }
    asm.append(&data)
}

pub(crate) fn directive_float(asm: &mut Assembler, stmt: &Statement<'_>) -> Result<(), AsmError> {
    float_directive(asm, stmt, false)
}

pub(crate) fn directive_double(asm: &mut Assembler, stmt: &Statement<'_>) -> Result<(), AsmError> {
    float_directive(asm, stmt, true)
}

/// `.align n`: zero-pad the output to a multiple of `n` (a power of two).
pub(crate) fn directive_align(asm: &mut Assembler, stmt: &Statement<'_>) -> Result<(), AsmError> {
    expect_args(stmt, 1)?;
    let align = asm.data_int(stmt.opcode, stmt.args[0])?;
    let align = usize::try_from(align)
        .ok()
        .filter(|a| a.is_power_of_two())
        .ok_or_else(|| {
            AsmError::invalid_directive(stmt.opcode, format!("{} is not a power of two", align))
        })?;
    let len = asm.output.len();
    let end = len
        .checked_next_multiple_of(align)
        .filter(|&end| end <= asm.resource_limits.max_output_bytes)
        .ok_or_else(|| asm.output_limit_error())?;
    asm.output.resize(end, 0);
    Ok(())
}
