// runeforge-abi - standalone contract ABI analyzer.
// Reads one contract source file and prints its ABI as JSON on stdout;
// the build toolkit invokes this binary as a subprocess.

use std::env;
use std::fs;
use std::process::ExitCode;

mod extract;

fn run(path: &str) -> Result<String, String> {
    let source =
        fs::read_to_string(path).map_err(|e| format!("failed to read {}: {}", path, e))?;
    let abi = extract::extract_abi(&source)?;
    serde_json::to_string_pretty(&abi).map_err(|e| format!("failed to encode ABI: {}", e))
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <contract-file>", args[0]);
        return ExitCode::FAILURE;
    }
    match run(&args[1]) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
