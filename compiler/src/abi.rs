// Derives the contract ABI by invoking the runeforge-abi analyzer, a
// separately built binary shipped with the toolkit. The analyzer reads
// the source from a scratch file and prints a JSON document; the document
// is treated as opaque here beyond being well-formed JSON.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::errors::{CompilerError, Result};
use crate::invoke;

/// Binary name of the analyzer shipped with the toolkit.
pub const ANALYZER_BIN: &str = "runeforge-abi";

/// Environment override for the analyzer location.
pub const ANALYZER_ENV: &str = "RUNEFORGE_ABI_BIN";

/// Locate the analyzer: explicit configuration first, then the env
/// override, then next to the running executable, then the toolkit's own
/// build tree (walking up from the executable into target/{release,debug}).
pub fn resolve_analyzer(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Ok(path) = env::var(ANALYZER_ENV) {
        return Ok(PathBuf::from(path));
    }
    let exe = env::current_exe()
        .map_err(|e| CompilerError::AbiExtraction(format!("cannot locate toolkit: {}", e)))?;
    let exe_dir = exe.parent().unwrap_or(Path::new(".")).to_path_buf();

    let mut candidates = vec![exe_dir.join(ANALYZER_BIN)];
    let mut dir = exe_dir.clone();
    for _ in 0..5 {
        candidates.push(dir.join("target").join("release").join(ANALYZER_BIN));
        candidates.push(dir.join("target").join("debug").join(ANALYZER_BIN));
        match dir.parent() {
            Some(parent) => dir = parent.to_path_buf(),
            None => break,
        }
    }
    candidates.into_iter().find(|c| c.exists()).ok_or_else(|| {
        CompilerError::AbiExtraction(format!(
            "{} not found near {}",
            ANALYZER_BIN,
            exe_dir.display()
        ))
    })
}

/// Write `source` to `scratch_path` and run the analyzer over it.
/// Independent of the build; the two invocations share only the source
/// text.
pub fn extract_abi(
    source: &str,
    scratch_path: &Path,
    analyzer_bin: Option<&Path>,
    timeout: Duration,
) -> Result<serde_json::Value> {
    if let Some(dir) = scratch_path.parent() {
        fs::create_dir_all(dir).map_err(|e| CompilerError::fs(dir, e))?;
    }
    fs::write(scratch_path, source).map_err(|e| CompilerError::fs(scratch_path, e))?;

    let analyzer = resolve_analyzer(analyzer_bin)?;
    let mut cmd = Command::new(&analyzer);
    cmd.arg(scratch_path);
    log::debug!("extracting ABI via {}", analyzer.display());

    let captured = invoke::run_captured(cmd, timeout).map_err(|e| {
        CompilerError::AbiExtraction(format!("failed to launch {}: {}", analyzer.display(), e))
    })?;
    match captured.status {
        None => {
            return Err(CompilerError::AbiExtraction(format!(
                "analyzer timed out after {:?}",
                timeout
            )))
        }
        Some(status) if !status.success() => {
            let stderr = String::from_utf8_lossy(&captured.stderr);
            return Err(CompilerError::AbiExtraction(stderr.trim().to_string()));
        }
        Some(_) => {}
    }
    serde_json::from_slice(&captured.stdout)
        .map_err(|e| CompilerError::AbiExtraction(format!("malformed analyzer output: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_analyzer_wins_without_an_existence_check() {
        // The launch, not the resolution, reports a bad location.
        let dir = tempfile::tempdir().unwrap();
        let scratch = dir.path().join("scratch").join("input.rs");
        let missing = Path::new("/nonexistent/runeforge-abi");
        assert_eq!(resolve_analyzer(Some(missing)).unwrap(), missing);

        let err = extract_abi("fn main() {}", &scratch, Some(missing), Duration::from_secs(5))
            .unwrap_err();
        assert!(
            matches!(&err, CompilerError::AbiExtraction(msg) if msg.contains("failed to launch")),
            "got {:?}",
            err
        );
    }

    #[test]
    fn env_override_resolves_when_no_explicit_path_is_set() {
        env::set_var(ANALYZER_ENV, "/opt/toolkit/runeforge-abi");
        let resolved = resolve_analyzer(None).unwrap();
        env::remove_var(ANALYZER_ENV);
        assert_eq!(resolved, PathBuf::from("/opt/toolkit/runeforge-abi"));
    }

    // `cat` echoes the scratch file back, standing in for the analyzer.
    #[test]
    fn analyzer_stdout_parses_as_the_abi_document() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = dir.path().join("scratch").join("input.rs");
        let cat = Some(Path::new("cat"));
        let timeout = Duration::from_secs(5);

        let doc = extract_abi(
            "{\"contract\": \"Demo\", \"methods\": []}",
            &scratch,
            cat,
            timeout,
        )
        .unwrap();
        assert_eq!(doc["contract"], "Demo");

        // Non-JSON analyzer output is a failure of the same kind.
        let err = extract_abi("fn main() {}", &scratch, cat, timeout).unwrap_err();
        assert!(
            matches!(&err, CompilerError::AbiExtraction(msg) if msg.contains("malformed")),
            "got {:?}",
            err
        );
    }
}
