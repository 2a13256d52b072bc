use std::env;
use std::fs;
use std::io::Write;
use std::process::ExitCode;

use pl0c::lexer::tokenize;
use pl0c::translator::translate;

fn main() -> ExitCode {
    simple_logger::SimpleLogger::new()
        .env()
        .init()
        .expect("logger already initialized");

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: pl0c <source.pl0> [-o <out.code>]");
        return ExitCode::FAILURE;
    }

    let source_path = &args[1];
    let out_path = args
        .iter()
        .position(|a| a == "-o")
        .and_then(|i| args.get(i + 1));

    let source = match fs::read_to_string(source_path) {
        Ok(s) => s,
        Err(err) => {
            eprintln!("failed to read {source_path}: {err}");
            return ExitCode::FAILURE;
        }
    };

    let lexed = match tokenize(&source) {
        Ok(lexed) => lexed,
        Err(err) => {
            log::error!("lexical error: {err}");
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let translated = match translate(lexed.tokens) {
        Ok(result) => result,
        Err(err) => {
            log::error!("translation error: {err}");
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let stream: String = translated
        .code
        .iter()
        .map(|instr| instr.to_string())
        .collect::<Vec<_>>()
        .join("\n");

    match out_path {
        Some(path) => {
            if let Err(err) = fs::write(path, stream + "\n") {
                eprintln!("failed to write {path}: {err}");
                return ExitCode::FAILURE;
            }
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            let _ = writeln!(handle, "{stream}");
        }
    }

    eprintln!("// symbol table");
    for symbol in translated.symbols.iter() {
        eprintln!("//\t{}\t{}", symbol.name, symbol.address);
    }

    ExitCode::SUCCESS
}
