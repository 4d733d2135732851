// Facade configuration and the dependency-spec model.

use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Target triple every contract package is built for.
pub const CONTRACT_TARGET: &str = "wasm32-unknown-unknown";

/// Default optimization level forwarded to the release profile.
pub const DEFAULT_OPT_LEVEL: u8 = 3;

/// One caller-supplied entry in the generated manifest's dependency table.
///
/// Untagged so a TOML config maps onto it directly: `name = "1.0"` parses
/// as `Version`, an inline table as `Detailed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencySpec {
    Version(String),
    Detailed(DependencyDetail),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
}

/// Configuration for one `Compiler` instance. Constructed once; the
/// optimization level and output directory may be overridden per call.
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    /// Root of the ephemeral build workspace. Reused across calls; never
    /// cleaned up, so cargo keeps its incremental cache.
    pub workspace: PathBuf,
    /// Scratch directory for analyzer input files.
    pub scratch_dir: PathBuf,
    pub target: String,
    pub optimization_level: u8,
    pub output_dir: PathBuf,
    /// Extra dependencies appended to the generated manifest, in name
    /// order.
    pub dependencies: BTreeMap<String, DependencySpec>,
    /// Build toolchain binary; resolved via PATH when left at the default.
    pub cargo_bin: PathBuf,
    /// Explicit analyzer location; when unset the env override and the
    /// toolkit search path apply.
    pub analyzer_bin: Option<PathBuf>,
    /// Hard deadline for one toolchain invocation.
    pub build_timeout: Duration,
    /// Hard deadline for one analyzer invocation.
    pub abi_timeout: Duration,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        let root = env::temp_dir().join("runeforge");
        CompilerOptions {
            workspace: root.join("build"),
            scratch_dir: root.join("scratch"),
            target: CONTRACT_TARGET.to_string(),
            optimization_level: DEFAULT_OPT_LEVEL,
            output_dir: PathBuf::from("build"),
            dependencies: BTreeMap::new(),
            cargo_bin: PathBuf::from("cargo"),
            analyzer_bin: None,
            build_timeout: Duration::from_secs(600),
            abi_timeout: Duration::from_secs(60),
        }
    }
}

/// Per-call overrides accepted by the facade operations.
#[derive(Debug, Clone, Default)]
pub struct CompileOverrides {
    pub optimization_level: Option<u8>,
    pub output_dir: Option<PathBuf>,
}
