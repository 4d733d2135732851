// Compile pipeline facade. Composes scaffolding, the toolchain build and
// ABI extraction behind two operations; this is the sole entry point for
// the CLI and embedding callers.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::abi;
use crate::artifacts;
use crate::builder;
use crate::errors::{CompilerError, Result};
use crate::options::{CompileOverrides, CompilerOptions};
use crate::scaffold;

/// Result of one compile request; immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledArtifact {
    /// The wasm module, base64-encoded.
    pub bytecode: String,
    /// The ABI document exactly as the analyzer emitted it.
    pub abi: serde_json::Value,
}

pub struct Compiler {
    options: CompilerOptions,
    in_flight: AtomicU64,
    ticket: AtomicU64,
}

impl Compiler {
    pub fn new(options: CompilerOptions) -> Self {
        Compiler {
            options,
            in_flight: AtomicU64::new(0),
            ticket: AtomicU64::new(1),
        }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Compile source text into `{bytecode, abi}`.
    pub fn compile(&self, source: &str, overrides: &CompileOverrides) -> Result<CompiledArtifact> {
        let (bytes, abi) = self
            .compile_parts(source, overrides)
            .map_err(|e| e.wrap("compilation failed"))?;
        Ok(CompiledArtifact {
            bytecode: STANDARD.encode(&bytes),
            abi,
        })
    }

    /// Compile a source file and persist both artifacts. The in-memory
    /// result is returned regardless of persistence having happened too.
    pub fn compile_file(
        &self,
        path: &Path,
        overrides: &CompileOverrides,
    ) -> Result<CompiledArtifact> {
        let context = path.display().to_string();
        let source =
            fs::read_to_string(path).map_err(|e| CompilerError::fs(path, e).wrap(&context))?;
        let (bytes, abi) = self
            .compile_parts(&source, overrides)
            .map_err(|e| e.wrap(&context))?;

        let base_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("contract");
        let output_dir = overrides
            .output_dir
            .clone()
            .unwrap_or_else(|| self.options.output_dir.clone());
        artifacts::persist(base_name, &bytes, &abi, &output_dir).map_err(|e| e.wrap(&context))?;

        Ok(CompiledArtifact {
            bytecode: STANDARD.encode(&bytes),
            abi,
        })
    }

    fn compile_parts(
        &self,
        source: &str,
        overrides: &CompileOverrides,
    ) -> Result<(Vec<u8>, serde_json::Value)> {
        self.check_config()?;
        let opt_level = overrides
            .optimization_level
            .unwrap_or(self.options.optimization_level);

        let slot = RequestSlot::acquire(&self.in_flight, &self.ticket);
        let workspace = slot.scoped(&self.options.workspace);
        let scratch = slot.scoped(&self.options.scratch_dir).join("abi-input.rs");

        scaffold::materialize(source, &workspace, &self.options.dependencies)?;

        // The two invocations share nothing but the source text: run the
        // build on its own thread, extract on this one, join both.
        let (build_result, abi_result) = thread::scope(|scope| {
            let build = scope.spawn(|| {
                builder::build(
                    &self.options.cargo_bin,
                    &workspace,
                    &self.options.target,
                    opt_level,
                    self.options.build_timeout,
                )
            });
            let abi = abi::extract_abi(
                source,
                &scratch,
                self.options.analyzer_bin.as_deref(),
                self.options.abi_timeout,
            );
            (build.join(), abi)
        });
        let build_result = match build_result {
            Ok(result) => result,
            Err(_) => Err(CompilerError::Build("build thread panicked".to_string())),
        };

        // Neither side is cancelled by the other's failure; the losing
        // error is still logged for diagnostics.
        match (build_result, abi_result) {
            (Ok(bytes), Ok(abi)) => Ok((bytes, abi)),
            (Err(build), Err(extraction)) => {
                log::warn!("ABI extraction also failed: {}", extraction);
                Err(build)
            }
            (Err(build), Ok(_)) => Err(build),
            (Ok(_), Err(extraction)) => Err(extraction),
        }
    }

    // Required paths must be set before any I/O happens.
    fn check_config(&self) -> Result<()> {
        if self.options.workspace.as_os_str().is_empty() {
            return Err(CompilerError::Configuration(
                "workspace path is not set".to_string(),
            ));
        }
        if self.options.output_dir.as_os_str().is_empty() {
            return Err(CompilerError::Configuration(
                "output directory is not set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Marks one in-flight request. A request that is alone in flight keeps
/// the configured paths, so single-request behavior is unchanged; each
/// additional concurrent request gets an isolated `req-<n>` slot. Tickets
/// are never reused, so slots cannot collide.
struct RequestSlot<'a> {
    in_flight: &'a AtomicU64,
    suffix: Option<u64>,
}

impl<'a> RequestSlot<'a> {
    fn acquire(in_flight: &'a AtomicU64, ticket: &AtomicU64) -> Self {
        let previous = in_flight.fetch_add(1, Ordering::SeqCst);
        let suffix = if previous == 0 {
            None
        } else {
            Some(ticket.fetch_add(1, Ordering::SeqCst))
        };
        RequestSlot { in_flight, suffix }
    }

    fn scoped(&self, base: &Path) -> PathBuf {
        match self.suffix {
            None => base.to_path_buf(),
            Some(n) => base.join(format!("req-{}", n)),
        }
    }
}

impl Drop for RequestSlot<'_> {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
