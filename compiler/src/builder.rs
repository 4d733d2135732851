// Drives the external cargo toolchain over a scaffolded workspace and
// collects the built module. This is the most expensive step of the
// pipeline; a failed build is reported as-is, never retried.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::errors::{CompilerError, Result};
use crate::invoke;
use crate::manifest::CONTRACT_PACKAGE;

/// Deterministic location of the built module inside the workspace.
pub fn artifact_path(workspace: &Path, target: &str) -> PathBuf {
    workspace
        .join("target")
        .join(target)
        .join("release")
        .join(format!("{}.wasm", CONTRACT_PACKAGE))
}

/// Argument vector for one build invocation. The optimization level is
/// forwarded verbatim; the toolchain is the authority on its validity.
pub fn build_args(target: &str, optimization_level: u8) -> Vec<String> {
    vec![
        "build".to_string(),
        "--release".to_string(),
        "--target".to_string(),
        target.to_string(),
        "--config".to_string(),
        format!("profile.release.opt-level={}", optimization_level),
    ]
}

pub fn build(
    cargo_bin: &Path,
    workspace: &Path,
    target: &str,
    optimization_level: u8,
    timeout: Duration,
) -> Result<Vec<u8>> {
    let mut cmd = Command::new(cargo_bin);
    cmd.args(build_args(target, optimization_level));
    cmd.current_dir(workspace);
    log::info!(
        "building {} (target={}, opt-level={})",
        workspace.display(),
        target,
        optimization_level
    );

    let captured = invoke::run_captured(cmd, timeout)
        .map_err(|e| CompilerError::Build(format!("failed to launch cargo: {}", e)))?;
    let stderr = String::from_utf8_lossy(&captured.stderr);
    match captured.status {
        None => {
            return Err(CompilerError::Build(format!(
                "cargo timed out after {:?}",
                timeout
            )))
        }
        Some(status) if !status.success() => {
            return Err(CompilerError::Build(stderr.trim().to_string()));
        }
        Some(_) => {}
    }
    // cargo reports progress and warnings on stderr even when the build
    // succeeds; that is not a failure.
    if !captured.stderr.is_empty() {
        log::warn!("cargo: {}", stderr.trim());
    }

    let artifact = artifact_path(workspace, target);
    fs::read(&artifact)
        .map_err(|_| CompilerError::Build(format!("artifact not found at {}", artifact.display())))
}
