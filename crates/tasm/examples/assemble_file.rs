//! Assemble a source file and print the result as hex or as a listing.
//!
//! Run with: `cargo run --example assemble_file -- path/to/code.s [--listing]`

use std::process::ExitCode;

use tasm::Assembler;

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("usage: assemble_file <source> [--listing]");
        return ExitCode::FAILURE;
    };
    let listing = args.any(|a| a == "--listing");

    let source = match std::fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{path}: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut asm = Assembler::new();
    if listing {
        asm.enable_listing();
    }
    // A failed `emit` is reported again by `finish`.
    let _ = asm.emit(&source);
    let result = match asm.finish() {
        Ok(result) => result,
        Err(e) => {
            eprintln!("{path}: {e}");
            return ExitCode::FAILURE;
        }
    };

    if listing {
        print!("{}", result.listing());
    } else {
        println!("{}", result.to_hex());
    }
    ExitCode::SUCCESS
}
