//! Mnemonic dispatch tables.
//!
//! Each table maps a key to either a template-alternative string (consumed by
//! the instruction selector) or a directive handler. A statement is looked up
//! under these keys, most specific first:
//!
//! 1. `mnemonic-arity` (e.g. `imul-3`)
//! 2. `mnemonic`
//! 3. `mnemonic-arg1,arg2…` with the literal operand text (e.g. `rep-movsb`)
//! 4. `*`

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::assembler::{
    directive_align, directive_byte, directive_double, directive_endtype, directive_float,
    directive_int16, directive_int32, directive_int64, directive_label, directive_member,
    directive_type, directive_utf8, Assembler,
};
use crate::error::AsmError;
use crate::lexer::Statement;

/// Directive handler: receives the driver and the statement being processed.
pub type Directive = fn(&mut Assembler, &Statement<'_>) -> Result<(), AsmError>;

/// What a dispatch key resolves to.
#[derive(Clone, Copy)]
pub enum DispatchEntry {
    /// `|`-separated template alternatives, tried in order.
    Templates(&'static str),
    /// A directive handler.
    Directive(Directive),
}

impl fmt::Debug for DispatchEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchEntry::Templates(t) => f.debug_tuple("Templates").field(t).finish(),
            DispatchEntry::Directive(_) => f.write_str("Directive"),
        }
    }
}

/// A sorted key → entry table searched with binary search.
#[derive(Debug)]
pub struct DispatchTable {
    entries: &'static [(&'static str, DispatchEntry)],
}

impl DispatchTable {
    /// Resolve a statement to its dispatch entry.
    pub fn lookup(&self, opcode: &str, args: &[&str]) -> Option<DispatchEntry> {
        let opcode = opcode.to_ascii_lowercase();
        let literal = args
            .iter()
            .map(|a| a.to_ascii_lowercase())
            .collect::<Vec<_>>()
            .join(",");
        let keys = [
            format!("{}-{}", opcode, args.len()),
            opcode.clone(),
            format!("{}-{}", opcode, literal),
            String::from("*"),
        ];
        keys.iter().find_map(|key| self.get(key))
    }

    /// Exact-key lookup.
    pub fn get(&self, key: &str) -> Option<DispatchEntry> {
        self.entries
            .binary_search_by_key(&key, |&(k, _)| k)
            .ok()
            .map(|idx| self.entries[idx].1)
    }

    /// All `(key, entry)` pairs in key order.
    pub fn entries(&self) -> &'static [(&'static str, DispatchEntry)] {
        self.entries
    }
}

// ─── Template families ──────────────────────────────────────────────────────

/// `add`-style ALU group: accumulator forms, then sign-extended imm8, then
/// full immediates, register, and memory forms. Arguments are the six
/// opcodes `r/m8,r8`, `r/m,r`, `r8,r/m8`, `r,r/m`, `al,imm8`, `eax,imm32`
/// followed by the `/digit` ModRM seed of the `80`/`81`/`83` forms.
macro_rules! alu {
    ($rm_r8:literal, $rm_r:literal, $r8_rm:literal, $r_rm:literal, $al:literal, $eax:literal, $d:literal) => {
        concat!(
            "::", $al, ":/a8I8|66::", $eax, ":/a16I16|::", $eax, ":/a32I32|:48:", $eax, ":/a64i32|",
            "::80:", $d, "/b8I8|66::83:", $d, "/b16i8|66::81:", $d, "/b16I16|",
            "::83:", $d, "/b32i8|::81:", $d, "/b32I32|:48:83:", $d, "/b64i8|:48:81:", $d, "/b64i32|",
            "::", $rm_r8, ":/b8r8|66::", $rm_r, ":/b16r16|::", $rm_r, ":/b32r32|:48:", $rm_r, ":/b64r64|",
            "::", $r8_rm, ":/r8m8|66::", $r_rm, ":/r16m16|::", $r_rm, ":/r32m32|:48:", $r_rm, ":/r64m64|",
            "::", $rm_r8, ":/m8r8|66::", $rm_r, ":/m16r16|::", $rm_r, ":/m32r32|:48:", $rm_r, ":/m64r64|",
            "::83:", $d, "/m32i8|::81:", $d, "/m32I32|:48:83:", $d, "/m64i8|:48:81:", $d, "/m64i32|",
            "66::83:", $d, "/m16i8|66::81:", $d, "/m16I16|::80:", $d, "/m8I8"
        )
    };
}

/// One-operand `F6`/`F7`-style group (`/digit` seed in `$d`).
macro_rules! unary {
    ($op8:literal, $op:literal, $d:literal) => {
        concat!(
            "::", $op8, ":", $d, "/b8|66::", $op, ":", $d, "/b16|::", $op, ":", $d, "/b32|:48:", $op, ":", $d, "/b64|",
            "::", $op, ":", $d, "/m32|:48:", $op, ":", $d, "/m64|66::", $op, ":", $d, "/m16|::", $op8, ":", $d, "/m8"
        )
    };
}

/// Shift/rotate group: by 1, by `cl`, by imm8.
macro_rules! shift {
    ($d:literal) => {
        concat!(
            "::d0:", $d, "/b8d1|66::d1:", $d, "/b16d1|::d1:", $d, "/b32d1|:48:d1:", $d, "/b64d1|",
            "::d2:", $d, "/b8c8|66::d3:", $d, "/b16c8|::d3:", $d, "/b32c8|:48:d3:", $d, "/b64c8|",
            "::c0:", $d, "/b8I8|66::c1:", $d, "/b16I8|::c1:", $d, "/b32I8|:48:c1:", $d, "/b64I8|",
            "::d1:", $d, "/m32d1|:48:d1:", $d, "/m64d1|66::d1:", $d, "/m16d1|::d0:", $d, "/m8d1|",
            "::d3:", $d, "/m32c8|:48:d3:", $d, "/m64c8|66::d3:", $d, "/m16c8|::d2:", $d, "/m8c8|",
            "::c1:", $d, "/m32I8|:48:c1:", $d, "/m64I8|66::c1:", $d, "/m16I8|::c0:", $d, "/m8I8"
        )
    };
}

/// Conditional jump: `rel8` then `rel32`, condition nibble in `$cc`.
macro_rules! jcc {
    ($cc:literal) => {
        concat!("::7", $cc, ":/i8|::0f8", $cc, ":/i32")
    };
}

macro_rules! setcc {
    ($cc:literal) => {
        concat!("::0f9", $cc, ":00/b8|::0f9", $cc, ":00/m8")
    };
}

macro_rules! cmovcc {
    ($cc:literal) => {
        concat!(
            "66::0f4", $cc, ":/r16b16|::0f4", $cc, ":/r32b32|:48:0f4", $cc, ":/r64b64|",
            "66::0f4", $cc, ":/r16m16|::0f4", $cc, ":/r32m32|:48:0f4", $cc, ":/r64m64"
        )
    };
}

/// `F3 0F xx /r` bit-count instructions.
macro_rules! bitcount {
    ($op:literal) => {
        concat!(
            "66f3::", $op, ":/r16b16|f3::", $op, ":/r32b32|f3:48:", $op, ":/r64b64|",
            "66f3::", $op, ":/r16m16|f3::", $op, ":/r32m32|f3:48:", $op, ":/r64m64"
        )
    };
}

/// `movzx`/`movsx`: byte source opcode, word source opcode.
macro_rules! movx {
    ($op8:literal, $op16:literal) => {
        concat!(
            "66::", $op8, ":/r16b8|::", $op8, ":/r32b8|:48:", $op8, ":/r64b8|",
            "::", $op16, ":/r32b16|:48:", $op16, ":/r64b16|",
            "66::", $op8, ":/r16m8|::", $op8, ":/r32m8|:48:", $op8, ":/r64m8|",
            "::", $op16, ":/r32m16|:48:", $op16, ":/r64m16"
        )
    };
}

use DispatchEntry::{Directive as D, Templates as T};

/// Ordinary statement dispatch: instructions and data/layout directives.
pub static NORMAL: DispatchTable = DispatchTable {
    entries: &[
        (".align", D(directive_align)),
        (".byte", D(directive_byte)),
        (".double", D(directive_double)),
        (".float", D(directive_float)),
        (".int16", D(directive_int16)),
        (".int32", D(directive_int32)),
        (".int64", D(directive_int64)),
        (".label", D(directive_label)),
        (".type", D(directive_type)),
        (".utf8", D(directive_utf8)),
        ("adc", T(alu!("10", "11", "12", "13", "14", "15", "10"))),
        ("add", T(alu!("00", "01", "02", "03", "04", "05", "00"))),
        ("and", T(alu!("20", "21", "22", "23", "24", "25", "20"))),
        ("bswap", T("::0fc8:/B32|:48:0fc8:/B64")),
        ("bt", T(concat!(
            "66::0fa3:/b16r16|::0fa3:/b32r32|:48:0fa3:/b64r64|66::0fba:20/b16I8|",
            "::0fba:20/b32I8|:48:0fba:20/b64I8|::0fa3:/m32r32|:48:0fa3:/m64r64|",
            "66::0fa3:/m16r16|::0fba:20/m32I8|:48:0fba:20/m64I8|66::0fba:20/m16I8",
        ))),
        ("call", T("::e8:/i32|::ff:10/b64|::ff:10/m64")),
        ("cbw", T("66::98:/")),
        ("cdq", T("::99:/")),
        ("cdqe", T(":48:98:/")),
        ("clc", T("::f8:/")),
        ("cld", T("::fc:/")),
        ("cmc", T("::f5:/")),
        ("cmova", T(cmovcc!("7"))),
        ("cmovae", T(cmovcc!("3"))),
        ("cmovb", T(cmovcc!("2"))),
        ("cmovbe", T(cmovcc!("6"))),
        ("cmovc", T(cmovcc!("2"))),
        ("cmove", T(cmovcc!("4"))),
        ("cmovg", T(cmovcc!("f"))),
        ("cmovge", T(cmovcc!("d"))),
        ("cmovl", T(cmovcc!("c"))),
        ("cmovle", T(cmovcc!("e"))),
        ("cmovna", T(cmovcc!("6"))),
        ("cmovnae", T(cmovcc!("2"))),
        ("cmovnb", T(cmovcc!("3"))),
        ("cmovnbe", T(cmovcc!("7"))),
        ("cmovnc", T(cmovcc!("3"))),
        ("cmovne", T(cmovcc!("5"))),
        ("cmovng", T(cmovcc!("e"))),
        ("cmovnge", T(cmovcc!("c"))),
        ("cmovnl", T(cmovcc!("d"))),
        ("cmovnle", T(cmovcc!("f"))),
        ("cmovno", T(cmovcc!("1"))),
        ("cmovnp", T(cmovcc!("b"))),
        ("cmovns", T(cmovcc!("9"))),
        ("cmovnz", T(cmovcc!("5"))),
        ("cmovo", T(cmovcc!("0"))),
        ("cmovp", T(cmovcc!("a"))),
        ("cmovpe", T(cmovcc!("a"))),
        ("cmovpo", T(cmovcc!("b"))),
        ("cmovs", T(cmovcc!("8"))),
        ("cmovz", T(cmovcc!("4"))),
        ("cmp", T(alu!("38", "39", "3a", "3b", "3c", "3d", "38"))),
        ("cmpsb", T("::a6:/")),
        ("cmpsd", T("::a7:/")),
        ("cmpsq", T(":48:a7:/")),
        ("cmpsw", T("66::a7:/")),
        ("cpuid", T("::0fa2:/")),
        ("cqo", T(":48:99:/")),
        ("cwd", T("66::99:/")),
        ("cwde", T("::98:/")),
        ("dec", T(unary!("fe", "ff", "08"))),
        ("div", T(unary!("f6", "f7", "30"))),
        ("enter", T("::c8:/I16I8")),
        ("hlt", T("::f4:/")),
        ("idiv", T(unary!("f6", "f7", "38"))),
        ("imul-1", T(unary!("f6", "f7", "28"))),
        ("imul-2", T(concat!(
            "66::0faf:/r16b16|::0faf:/r32b32|:48:0faf:/r64b64|66::0faf:/r16m16|",
            "::0faf:/r32m32|:48:0faf:/r64m64",
        ))),
        ("imul-3", T(concat!(
            "66::6b:/r16b16i8|::6b:/r32b32i8|:48:6b:/r64b64i8|66::69:/r16b16I16|",
            "::69:/r32b32I32|:48:69:/r64b64i32|66::6b:/r16m16i8|::6b:/r32m32i8|",
            ":48:6b:/r64m64i8|66::69:/r16m16I16|::69:/r32m32I32|:48:69:/r64m64i32",
        ))),
        ("inc", T(unary!("fe", "ff", "00"))),
        ("int", T("::cd:/I8")),
        ("int3", T("::cc:/")),
        ("ja", T(jcc!("7"))),
        ("jae", T(jcc!("3"))),
        ("jb", T(jcc!("2"))),
        ("jbe", T(jcc!("6"))),
        ("jc", T(jcc!("2"))),
        ("je", T(jcc!("4"))),
        ("jg", T(jcc!("f"))),
        ("jge", T(jcc!("d"))),
        ("jl", T(jcc!("c"))),
        ("jle", T(jcc!("e"))),
        ("jmp", T("::eb:/i8|::e9:/i32|::ff:20/b64|::ff:20/m64")),
        ("jna", T(jcc!("6"))),
        ("jnae", T(jcc!("2"))),
        ("jnb", T(jcc!("3"))),
        ("jnbe", T(jcc!("7"))),
        ("jnc", T(jcc!("3"))),
        ("jne", T(jcc!("5"))),
        ("jng", T(jcc!("e"))),
        ("jnge", T(jcc!("c"))),
        ("jnl", T(jcc!("d"))),
        ("jnle", T(jcc!("f"))),
        ("jno", T(jcc!("1"))),
        ("jnp", T(jcc!("b"))),
        ("jns", T(jcc!("9"))),
        ("jnz", T(jcc!("5"))),
        ("jo", T(jcc!("0"))),
        ("jp", T(jcc!("a"))),
        ("jpe", T(jcc!("a"))),
        ("jpo", T(jcc!("b"))),
        ("jrcxz", T("::e3:/i8")),
        ("js", T(jcc!("8"))),
        ("jz", T(jcc!("4"))),
        ("lea", T("66::8d:/r16m|::8d:/r32m|:48:8d:/r64m")),
        ("leave", T("::c9:/")),
        ("lfence", T("::0faee8:/")),
        ("lodsb", T("::ac:/")),
        ("lodsd", T("::ad:/")),
        ("lodsq", T(":48:ad:/")),
        ("lodsw", T("66::ad:/")),
        ("loop", T("::e2:/i8")),
        ("lzcnt", T(bitcount!("0fbd"))),
        ("mfence", T("::0faef0:/")),
        ("mov", T(concat!(
            "::88:/b8r8|66::89:/b16r16|::89:/b32r32|:48:89:/b64r64|::8a:/r8m8|",
            "66::8b:/r16m16|::8b:/r32m32|:48:8b:/r64m64|::88:/m8r8|66::89:/m16r16|",
            "::89:/m32r32|:48:89:/m64r64|::b0:/B8I8|66::b8:/B16I16|::b8:/B32I32|",
            ":48:c7:00/b64i32|:48:b8:/B64I64|::b8:/B32f32|:48:b8:/B64f64|::c7:00/m32I32|",
            ":48:c7:00/m64i32|66::c7:00/m16I16|::c6:00/m8I8",
        ))),
        ("movsb", T("::a4:/")),
        ("movsd", T("::a5:/")),
        ("movsq", T(":48:a5:/")),
        ("movsw", T("66::a5:/")),
        ("movsx", T(movx!("0fbe", "0fbf"))),
        ("movsxd", T(":48:63:/r64b32|:48:63:/r64m32")),
        ("movzx", T(movx!("0fb6", "0fb7"))),
        ("mul", T(unary!("f6", "f7", "20"))),
        ("neg", T(unary!("f6", "f7", "18"))),
        ("nop", T("::90:/|::0f1f:00/m32|66::0f1f:00/m16")),
        ("not", T(unary!("f6", "f7", "10"))),
        ("or", T(alu!("08", "09", "0a", "0b", "0c", "0d", "08"))),
        ("pause", T("f3::90:/")),
        ("pop", T("::58:/B64|66::58:/B16|::8f:00/m64")),
        ("popcnt", T(bitcount!("0fb8"))),
        ("push", T("::50:/B64|66::50:/B16|::ff:30/m64|::6a:/i8|::68:/i32")),
        ("rcl", T(shift!("10"))),
        ("rcr", T(shift!("18"))),
        ("rdtsc", T("::0f31:/")),
        ("rep-lodsb", T("f3::ac:/")),
        ("rep-lodsd", T("f3::ad:/")),
        ("rep-lodsq", T("f3:48:ad:/")),
        ("rep-lodsw", T("66f3::ad:/")),
        ("rep-movsb", T("f3::a4:/")),
        ("rep-movsd", T("f3::a5:/")),
        ("rep-movsq", T("f3:48:a5:/")),
        ("rep-movsw", T("66f3::a5:/")),
        ("rep-stosb", T("f3::aa:/")),
        ("rep-stosd", T("f3::ab:/")),
        ("rep-stosq", T("f3:48:ab:/")),
        ("rep-stosw", T("66f3::ab:/")),
        ("repe-cmpsb", T("f3::a6:/")),
        ("repe-cmpsd", T("f3::a7:/")),
        ("repe-cmpsq", T("f3:48:a7:/")),
        ("repe-cmpsw", T("66f3::a7:/")),
        ("repe-scasb", T("f3::ae:/")),
        ("repe-scasd", T("f3::af:/")),
        ("repe-scasq", T("f3:48:af:/")),
        ("repe-scasw", T("66f3::af:/")),
        ("repne-cmpsb", T("f2::a6:/")),
        ("repne-cmpsd", T("f2::a7:/")),
        ("repne-cmpsq", T("f2:48:a7:/")),
        ("repne-cmpsw", T("66f2::a7:/")),
        ("repne-scasb", T("f2::ae:/")),
        ("repne-scasd", T("f2::af:/")),
        ("repne-scasq", T("f2:48:af:/")),
        ("repne-scasw", T("66f2::af:/")),
        ("repnz-cmpsb", T("f2::a6:/")),
        ("repnz-cmpsd", T("f2::a7:/")),
        ("repnz-cmpsq", T("f2:48:a7:/")),
        ("repnz-cmpsw", T("66f2::a7:/")),
        ("repnz-scasb", T("f2::ae:/")),
        ("repnz-scasd", T("f2::af:/")),
        ("repnz-scasq", T("f2:48:af:/")),
        ("repnz-scasw", T("66f2::af:/")),
        ("repz-cmpsb", T("f3::a6:/")),
        ("repz-cmpsd", T("f3::a7:/")),
        ("repz-cmpsq", T("f3:48:a7:/")),
        ("repz-cmpsw", T("66f3::a7:/")),
        ("repz-scasb", T("f3::ae:/")),
        ("repz-scasd", T("f3::af:/")),
        ("repz-scasq", T("f3:48:af:/")),
        ("repz-scasw", T("66f3::af:/")),
        ("ret", T("::c3:/|::c2:/I16")),
        ("rol", T(shift!("00"))),
        ("ror", T(shift!("08"))),
        ("sal", T(shift!("20"))),
        ("sar", T(shift!("38"))),
        ("sbb", T(alu!("18", "19", "1a", "1b", "1c", "1d", "18"))),
        ("scasb", T("::ae:/")),
        ("scasd", T("::af:/")),
        ("scasq", T(":48:af:/")),
        ("scasw", T("66::af:/")),
        ("seta", T(setcc!("7"))),
        ("setae", T(setcc!("3"))),
        ("setb", T(setcc!("2"))),
        ("setbe", T(setcc!("6"))),
        ("setc", T(setcc!("2"))),
        ("sete", T(setcc!("4"))),
        ("setg", T(setcc!("f"))),
        ("setge", T(setcc!("d"))),
        ("setl", T(setcc!("c"))),
        ("setle", T(setcc!("e"))),
        ("setna", T(setcc!("6"))),
        ("setnae", T(setcc!("2"))),
        ("setnb", T(setcc!("3"))),
        ("setnbe", T(setcc!("7"))),
        ("setnc", T(setcc!("3"))),
        ("setne", T(setcc!("5"))),
        ("setng", T(setcc!("e"))),
        ("setnge", T(setcc!("c"))),
        ("setnl", T(setcc!("d"))),
        ("setnle", T(setcc!("f"))),
        ("setno", T(setcc!("1"))),
        ("setnp", T(setcc!("b"))),
        ("setns", T(setcc!("9"))),
        ("setnz", T(setcc!("5"))),
        ("seto", T(setcc!("0"))),
        ("setp", T(setcc!("a"))),
        ("setpe", T(setcc!("a"))),
        ("setpo", T(setcc!("b"))),
        ("sets", T(setcc!("8"))),
        ("setz", T(setcc!("4"))),
        ("sfence", T("::0faef8:/")),
        ("shl", T(shift!("20"))),
        ("shr", T(shift!("28"))),
        ("stc", T("::f9:/")),
        ("std", T("::fd:/")),
        ("stosb", T("::aa:/")),
        ("stosd", T("::ab:/")),
        ("stosq", T(":48:ab:/")),
        ("stosw", T("66::ab:/")),
        ("sub", T(alu!("28", "29", "2a", "2b", "2c", "2d", "28"))),
        ("syscall", T("::0f05:/")),
        ("test", T(concat!(
            "::a8:/a8I8|66::a9:/a16I16|::a9:/a32I32|:48:a9:/a64i32|::f6:00/b8I8|",
            "66::f7:00/b16I16|::f7:00/b32I32|:48:f7:00/b64i32|::84:/b8r8|66::85:/b16r16|",
            "::85:/b32r32|:48:85:/b64r64|::84:/m8r8|66::85:/m16r16|::85:/m32r32|",
            ":48:85:/m64r64|::f7:00/m32I32|:48:f7:00/m64i32|66::f7:00/m16I16|",
            "::f6:00/m8I8",
        ))),
        ("tzcnt", T(bitcount!("0fbc"))),
        ("ud2", T("::0f0b:/")),
        ("xchg", T(concat!(
            "::86:/b8r8|66::87:/b16r16|::87:/b32r32|:48:87:/b64r64|::86:/m8r8|",
            "66::87:/m16r16|::87:/m32r32|:48:87:/m64r64|::86:/r8m8|66::87:/r16m16|",
            "::87:/r32m32|:48:87:/r64m64",
        ))),
        ("xor", T(alu!("30", "31", "32", "33", "34", "35", "30"))),
    ],
};

/// Dispatch while a `.type` block is open: every statement other than
/// `.endtype` declares members.
pub static TYPE_DEFINITION: DispatchTable = DispatchTable {
    entries: &[("*", D(directive_member)), (".endtype", D(directive_endtype))],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::parse_alternatives;

    fn templates(opcode: &str, args: &[&str]) -> &'static str {
        match NORMAL.lookup(opcode, args) {
            Some(DispatchEntry::Templates(t)) => t,
            other => panic!("{} resolved to {:?}", opcode, other),
        }
    }

    #[test]
    fn tables_are_sorted() {
        for table in [&NORMAL, &TYPE_DEFINITION] {
            for w in table.entries().windows(2) {
                assert!(
                    w[0].0 < w[1].0,
                    "dispatch table not sorted: {:?} >= {:?}",
                    w[0].0,
                    w[1].0
                );
            }
        }
    }

    #[test]
    fn every_template_parses() {
        for &(key, entry) in NORMAL.entries() {
            if let DispatchEntry::Templates(text) = entry {
                if let Err(err) = parse_alternatives(text) {
                    panic!("{}: {}", key, err);
                }
            }
        }
    }

    #[test]
    fn arity_key_wins_over_bare_key() {
        assert!(templates("imul", &["ecx"]).starts_with("::f6:28/b8|"));
        assert!(templates("imul", &["eax", "ecx"]).starts_with("66::0faf:/r16b16|"));
        assert!(templates("imul", &["eax", "ecx", "3"]).starts_with("66::6b:/r16b16i8|"));
    }

    #[test]
    fn literal_argument_key() {
        assert_eq!(templates("rep", &["movsb"]), "f3::a4:/");
        assert_eq!(templates("REPNE", &["SCASB"]), "f2::ae:/");
    }

    #[test]
    fn mnemonics_are_case_insensitive() {
        assert_eq!(templates("PUSH", &["rbx"]), templates("push", &["rbx"]));
    }

    #[test]
    fn unknown_mnemonic_has_no_entry() {
        assert!(NORMAL.lookup("bogus", &["eax"]).is_none());
        assert!(NORMAL.lookup("rep", &["nop"]).is_none());
    }

    #[test]
    fn directives_resolve() {
        assert!(matches!(
            NORMAL.lookup(".type", &["point"]),
            Some(DispatchEntry::Directive(_))
        ));
        assert!(matches!(
            TYPE_DEFINITION.lookup("int32", &["x"]),
            Some(DispatchEntry::Directive(_))
        ));
        assert!(matches!(
            TYPE_DEFINITION.lookup(".endtype", &[]),
            Some(DispatchEntry::Directive(_))
        ));
    }

    #[test]
    fn add_lists_accumulator_form_first() {
        assert!(templates("add", &["eax", "5"]).starts_with("::04:/a8I8|66::05:/a16I16|::05:/a32I32"));
    }
}
