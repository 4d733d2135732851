// Materializes the ephemeral build workspace for one compile request:
// a manifest plus the contract source at a fixed path. Filesystem writes
// only; no process is spawned here.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::errors::{CompilerError, Result};
use crate::manifest::ContractManifest;
use crate::options::DependencySpec;

/// Filename the contract source is written to inside the workspace.
pub const ENTRY_FILE: &str = "lib.rs";

pub fn materialize(
    source: &str,
    workspace: &Path,
    dependencies: &BTreeMap<String, DependencySpec>,
) -> Result<()> {
    let src_dir = workspace.join("src");
    fs::create_dir_all(&src_dir).map_err(|e| CompilerError::fs(&src_dir, e))?;

    let manifest_path = workspace.join("Cargo.toml");
    let manifest = ContractManifest::new(dependencies).render();
    fs::write(&manifest_path, manifest).map_err(|e| CompilerError::fs(&manifest_path, e))?;

    let entry_path = src_dir.join(ENTRY_FILE);
    fs::write(&entry_path, source).map_err(|e| CompilerError::fs(&entry_path, e))?;

    log::debug!("scaffolded workspace at {}", workspace.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::DependencyDetail;

    #[test]
    fn writes_manifest_and_entry_file() {
        let dir = tempfile::tempdir().unwrap();
        let ws = dir.path().join("build");
        let mut deps = BTreeMap::new();
        deps.insert("hex".to_string(), DependencySpec::Version("0.4".to_string()));
        deps.insert(
            "runelet-token".to_string(),
            DependencySpec::Detailed(DependencyDetail {
                git: Some("https://example.org/runelet-token.git".to_string()),
                version: None,
                features: Some(vec!["mint".to_string()]),
            }),
        );

        materialize("pub fn entry() {}", &ws, &deps).unwrap();

        let manifest = fs::read_to_string(ws.join("Cargo.toml")).unwrap();
        assert!(manifest.contains("name = \"runelet_contract\""));
        assert!(manifest.contains("hex = \"0.4\""));
        assert!(manifest.contains(
            "runelet-token = { git = \"https://example.org/runelet-token.git\", features = [\"mint\"] }"
        ));
        let entry = fs::read_to_string(ws.join("src").join(ENTRY_FILE)).unwrap();
        assert_eq!(entry, "pub fn entry() {}");
    }

    #[test]
    fn rescaffolding_the_same_workspace_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let ws = dir.path().join("build");
        let deps = BTreeMap::new();

        materialize("fn first() {}", &ws, &deps).unwrap();
        materialize("fn second() {}", &ws, &deps).unwrap();

        let entry = fs::read_to_string(ws.join("src").join(ENTRY_FILE)).unwrap();
        assert_eq!(entry, "fn second() {}");
    }
}
