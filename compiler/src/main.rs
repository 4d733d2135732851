// runeforge CLI - thin shell over the compile facade.
// All sequencing lives in the library; this binary only parses flags,
// loads the optional config file and reports outcomes.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Deserialize;

use runeforge_compiler::{abi, artifacts, CompileOverrides, Compiler, CompilerOptions, DependencySpec};

#[derive(Parser)]
#[command(author, version, about = "runeforge - contract build toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Command,
    /// TOML config file overriding the built-in defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a contract and write the wasm module and ABI document
    Build {
        source: PathBuf,
        #[arg(short = 'o', long = "out-dir")]
        out_dir: Option<PathBuf>,
        /// Release-profile optimization level, forwarded to the toolchain
        #[arg(long = "opt-level")]
        opt_level: Option<u8>,
    },
    /// Print the ABI of a contract without building it
    Abi { source: PathBuf },
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    build: BuildSection,
    #[serde(default)]
    dependencies: BTreeMap<String, DependencySpec>,
}

#[derive(Debug, Default, Deserialize)]
struct BuildSection {
    workspace: Option<PathBuf>,
    target: Option<String>,
    opt_level: Option<u8>,
    out_dir: Option<PathBuf>,
    cargo_bin: Option<PathBuf>,
    analyzer_bin: Option<PathBuf>,
}

fn load_options(config: Option<&Path>) -> anyhow::Result<CompilerOptions> {
    let mut options = CompilerOptions::default();
    let Some(path) = config else {
        return Ok(options);
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let file: ConfigFile = toml::from_str(&text)
        .with_context(|| format!("failed to parse config {}", path.display()))?;

    if let Some(workspace) = file.build.workspace {
        options.workspace = workspace;
    }
    if let Some(target) = file.build.target {
        options.target = target;
    }
    if let Some(opt_level) = file.build.opt_level {
        options.optimization_level = opt_level;
    }
    if let Some(out_dir) = file.build.out_dir {
        options.output_dir = out_dir;
    }
    if let Some(cargo_bin) = file.build.cargo_bin {
        options.cargo_bin = cargo_bin;
    }
    if let Some(analyzer_bin) = file.build.analyzer_bin {
        options.analyzer_bin = Some(analyzer_bin);
    }
    options.dependencies.extend(file.dependencies);
    Ok(options)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let options = load_options(cli.config.as_deref())?;

    match cli.command {
        Command::Build {
            source,
            out_dir,
            opt_level,
        } => {
            let overrides = CompileOverrides {
                optimization_level: opt_level,
                output_dir: out_dir,
            };
            let output_dir = overrides
                .output_dir
                .clone()
                .unwrap_or_else(|| options.output_dir.clone());
            let compiler = Compiler::new(options);
            let artifact = compiler.compile_file(&source, &overrides)?;

            let base = source
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("contract");
            println!(
                "wrote {}",
                output_dir
                    .join(format!("{}.{}", base, artifacts::MODULE_EXT))
                    .display()
            );
            println!(
                "wrote {}",
                output_dir
                    .join(format!("{}.{}", base, artifacts::ABI_EXT))
                    .display()
            );
            let methods = artifact.abi["methods"].as_array().map(Vec::len).unwrap_or(0);
            println!("{} entry points", methods);
        }
        Command::Abi { source } => {
            let text = fs::read_to_string(&source)
                .with_context(|| format!("failed to read {}", source.display()))?;
            let scratch = options.scratch_dir.join("abi-input.rs");
            let doc = abi::extract_abi(
                &text,
                &scratch,
                options.analyzer_bin.as_deref(),
                options.abi_timeout,
            )?;
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
