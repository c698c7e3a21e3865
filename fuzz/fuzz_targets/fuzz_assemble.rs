#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // The one-shot assembler must never panic, only return Ok/Err.
    let _ = tasm::assemble(data);

    // encode_one on the first line, against an empty registry.
    let asm = tasm::Assembler::new();
    if let Some(line) = data.lines().next() {
        let _ = asm.encode_one(line);
    }

    // Statement at a time, with listing enabled and tight limits.
    let mut asm = tasm::Assembler::new();
    asm.enable_listing().limits(tasm::ResourceLimits {
        max_statements: 4096,
        max_output_bytes: 1 << 16,
        ..tasm::ResourceLimits::default()
    });
    for line in data.lines() {
        if asm.emit_line(line).is_err() {
            return;
        }
    }
    if let Ok(result) = asm.finish() {
        let _ = result.listing();
    }
});
