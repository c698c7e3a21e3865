//! Static register and segment tables.

/// Register code of the accumulator (`al`/`ax`/`eax`/`rax`).
pub const ACCUMULATOR: u8 = 0;
/// Register code of the count register (`cl`/`cx`/`ecx`/`rcx`).
pub const COUNT: u8 = 1;
/// Low three bits shared by `rsp` and `r12`: as ModRM.rm it means "SIB follows".
pub const SP_LOW_BITS: u8 = 0b100;
/// Low three bits shared by `rbp` and `r13`: as ModRM.rm with mod=00 it means
/// "no base, disp32" instead.
pub const BP_LOW_BITS: u8 = 0b101;

/// `(name, code, width in bits)` for every general-purpose register.
#[rustfmt::skip]
const REGISTERS: &[(&str, u8, u16)] = &[
    ("rax", 0, 64), ("rcx", 1, 64), ("rdx", 2, 64), ("rbx", 3, 64),
    ("rsp", 4, 64), ("rbp", 5, 64), ("rsi", 6, 64), ("rdi", 7, 64),
    ("r8", 8, 64), ("r9", 9, 64), ("r10", 10, 64), ("r11", 11, 64),
    ("r12", 12, 64), ("r13", 13, 64), ("r14", 14, 64), ("r15", 15, 64),
    ("eax", 0, 32), ("ecx", 1, 32), ("edx", 2, 32), ("ebx", 3, 32),
    ("esp", 4, 32), ("ebp", 5, 32), ("esi", 6, 32), ("edi", 7, 32),
    ("r8d", 8, 32), ("r9d", 9, 32), ("r10d", 10, 32), ("r11d", 11, 32),
    ("r12d", 12, 32), ("r13d", 13, 32), ("r14d", 14, 32), ("r15d", 15, 32),
    ("ax", 0, 16), ("cx", 1, 16), ("dx", 2, 16), ("bx", 3, 16),
    ("sp", 4, 16), ("bp", 5, 16), ("si", 6, 16), ("di", 7, 16),
    ("r8w", 8, 16), ("r9w", 9, 16), ("r10w", 10, 16), ("r11w", 11, 16),
    ("r12w", 12, 16), ("r13w", 13, 16), ("r14w", 14, 16), ("r15w", 15, 16),
    ("al", 0, 8), ("cl", 1, 8), ("dl", 2, 8), ("bl", 3, 8),
    ("spl", 4, 8), ("bpl", 5, 8), ("sil", 6, 8), ("dil", 7, 8),
    ("r8b", 8, 8), ("r9b", 9, 8), ("r10b", 10, 8), ("r11b", 11, 8),
    ("r12b", 12, 8), ("r13b", 13, 8), ("r14b", 14, 8), ("r15b", 15, 8),
    ("ah", 4, 8), ("ch", 5, 8), ("dh", 6, 8), ("bh", 7, 8),
];

/// Segment register name → legacy override prefix byte.
const SEGMENTS: &[(&str, u8)] = &[
    ("es", 0x26),
    ("cs", 0x2E),
    ("ss", 0x36),
    ("ds", 0x3E),
    ("fs", 0x64),
    ("gs", 0x65),
];

/// A general-purpose register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Register {
    name: &'static str,
    code: u8,
    width: u16,
}

impl Register {
    /// Look up a register by name (case-insensitive).
    pub fn parse(name: &str) -> Option<Register> {
        REGISTERS
            .iter()
            .find(|(n, _, _)| n.eq_ignore_ascii_case(name))
            .map(|&(name, code, width)| Register { name, code, width })
    }

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        self.name
    }

    /// Full 4-bit register code (0–15).
    pub fn code(self) -> u8 {
        self.code
    }

    /// Low three bits, as stored in ModRM/SIB/opcode fields.
    pub fn low_bits(self) -> u8 {
        self.code & 7
    }

    /// Width in bits.
    pub fn width(self) -> u16 {
        self.width
    }

    /// Codes 8–15 need a REX extension bit.
    pub fn is_extended(self) -> bool {
        self.code >= 8
    }

    /// `ah`, `ch`, `dh`, `bh`: unencodable when any REX byte is present.
    pub fn is_high_byte(self) -> bool {
        self.width == 8 && matches!(self.name, "ah" | "ch" | "dh" | "bh")
    }

    /// `spl`, `bpl`, `sil`, `dil`: only reachable with a REX byte.
    pub fn requires_rex_for_byte(self) -> bool {
        self.width == 8 && matches!(self.name, "spl" | "bpl" | "sil" | "dil")
    }

    /// Whether this is a 64-bit general register usable in an address.
    pub fn is_address_register(self) -> bool {
        self.width == 64
    }
}

/// Legacy prefix byte for a segment override (`fs` → `0x64`).
pub fn segment_prefix(name: &str) -> Option<u8> {
    SEGMENTS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|&(_, prefix)| prefix)
}
