// Persists compile outputs under deterministic names in the output
// directory. Pre-existing artifacts are overwritten; last write wins.

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{CompilerError, Result};

pub const MODULE_EXT: &str = "wasm";
pub const ABI_EXT: &str = "json";

pub fn persist(
    base_name: &str,
    bytes: &[u8],
    abi: &serde_json::Value,
    output_dir: &Path,
) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(output_dir).map_err(|e| CompilerError::fs(output_dir, e))?;

    let module_path = output_dir.join(format!("{}.{}", base_name, MODULE_EXT));
    fs::write(&module_path, bytes).map_err(|e| CompilerError::fs(&module_path, e))?;

    let abi_path = output_dir.join(format!("{}.{}", base_name, ABI_EXT));
    let rendered = serde_json::to_string_pretty(abi)
        .map_err(|e| CompilerError::AbiExtraction(format!("ABI not serializable: {}", e)))?;
    fs::write(&abi_path, rendered).map_err(|e| CompilerError::fs(&abi_path, e))?;

    log::info!("wrote {} and {}", module_path.display(), abi_path.display());
    Ok((module_path, abi_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn persists_both_artifacts_and_reads_back_identical() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("build");
        let abi = json!({"contract": "Demo", "methods": [{"name": "mint", "opcode": 77}]});

        let (module_path, abi_path) = persist("Demo", b"\0asm\x01\0\0\0", &abi, &out).unwrap();

        assert_eq!(module_path, out.join("Demo.wasm"));
        assert_eq!(abi_path, out.join("Demo.json"));
        assert_eq!(fs::read(&module_path).unwrap(), b"\0asm\x01\0\0\0");
        let read_back: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&abi_path).unwrap()).unwrap();
        assert_eq!(read_back, abi);
    }

    #[test]
    fn overwrites_existing_artifacts_without_warning() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().to_path_buf();
        persist("c", b"first", &serde_json::json!({}), &out).unwrap();
        persist("c", b"second", &serde_json::json!({}), &out).unwrap();
        assert_eq!(fs::read(out.join("c.wasm")).unwrap(), b"second");
    }
}
