// Model and renderer for the generated contract package manifest.
//
// The manifest is built as a value and rendered in one pass so quoting and
// separator placement live in exactly one place.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::options::{DependencyDetail, DependencySpec};

/// Package name of every scaffolded contract build. The build artifact
/// name derives from it.
pub const CONTRACT_PACKAGE: &str = "runelet_contract";

/// Relative location of the framework checkout next to the workspace.
const FRAMEWORK_ROOT: &str = "../runelet-rs/crates";

/// Baseline framework libraries every contract links against.
const FRAMEWORK_LIBS: [&str; 4] = [
    "runelet-runtime",
    "runelet-support",
    "protomsg-support",
    "indexer-support",
];

/// In-memory manifest for one ephemeral contract package.
#[derive(Debug, Clone)]
pub struct ContractManifest {
    extra: BTreeMap<String, DependencySpec>,
}

impl ContractManifest {
    pub fn new(extra: &BTreeMap<String, DependencySpec>) -> Self {
        ContractManifest {
            extra: extra.clone(),
        }
    }

    /// Render the manifest text: fixed package/library header, baseline
    /// dependency block, then one line per caller dependency in name order.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            "[package]\nname = \"{}\"\nversion = \"0.1.0\"\nedition = \"2021\"\n\n",
            CONTRACT_PACKAGE
        );
        out.push_str("[lib]\ncrate-type = [\"cdylib\"]\n\n");
        out.push_str("[dependencies]\n");
        for lib in FRAMEWORK_LIBS {
            let _ = writeln!(out, "{} = {{ path = \"{}/{}\" }}", lib, FRAMEWORK_ROOT, lib);
        }
        out.push_str("anyhow = \"1.0\"\n");
        out.push_str("hex_lit = \"0.1\"\n");
        for (name, spec) in &self.extra {
            let _ = writeln!(out, "{} = {}", name, render_spec(spec));
        }
        out
    }
}

/// Render one dependency requirement. A bare spec becomes a quoted
/// version; a detailed spec becomes an inline table joining only the
/// fields actually present.
pub fn render_spec(spec: &DependencySpec) -> String {
    match spec {
        DependencySpec::Version(version) => format!("\"{}\"", version),
        DependencySpec::Detailed(detail) => render_detail(detail),
    }
}

fn render_detail(detail: &DependencyDetail) -> String {
    let mut fields = Vec::new();
    if let Some(git) = &detail.git {
        fields.push(format!("git = \"{}\"", git));
    }
    if let Some(version) = &detail.version {
        fields.push(format!("version = \"{}\"", version));
    }
    if let Some(features) = &detail.features {
        let quoted: Vec<String> = features.iter().map(|f| format!("\"{}\"", f)).collect();
        fields.push(format!("features = [{}]", quoted.join(", ")));
    }
    if fields.is_empty() {
        return "{ }".to_string();
    }
    format!("{{ {} }}", fields.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detailed(
        git: Option<&str>,
        version: Option<&str>,
        features: Option<&[&str]>,
    ) -> DependencySpec {
        DependencySpec::Detailed(DependencyDetail {
            git: git.map(str::to_string),
            version: version.map(str::to_string),
            features: features.map(|fs| fs.iter().map(|f| f.to_string()).collect()),
        })
    }

    #[test]
    fn bare_spec_renders_as_quoted_version() {
        let spec = DependencySpec::Version("2.1".to_string());
        assert_eq!(render_spec(&spec), "\"2.1\"");
    }

    // Exact separator placement for every subset of {git, version, features}.
    #[test]
    fn detailed_spec_renders_every_field_subset() {
        let cases = [
            (detailed(None, None, None), "{ }"),
            (detailed(Some("https://example.org/r.git"), None, None),
                "{ git = \"https://example.org/r.git\" }"),
            (detailed(None, Some("0.3"), None), "{ version = \"0.3\" }"),
            (detailed(None, None, Some(&["a", "b"])),
                "{ features = [\"a\", \"b\"] }"),
            (detailed(Some("https://example.org/r.git"), Some("0.3"), None),
                "{ git = \"https://example.org/r.git\", version = \"0.3\" }"),
            (detailed(Some("https://example.org/r.git"), None, Some(&["a", "b"])),
                "{ git = \"https://example.org/r.git\", features = [\"a\", \"b\"] }"),
            (detailed(None, Some("0.3"), Some(&["a"])),
                "{ version = \"0.3\", features = [\"a\"] }"),
            (detailed(Some("https://example.org/r.git"), Some("0.3"), Some(&["a", "b"])),
                "{ git = \"https://example.org/r.git\", version = \"0.3\", features = [\"a\", \"b\"] }"),
        ];
        for (spec, expected) in cases {
            assert_eq!(render_spec(&spec), expected, "spec: {:?}", spec);
        }
    }

    #[test]
    fn base_template_carries_package_and_framework_block() {
        let manifest = ContractManifest::new(&BTreeMap::new()).render();
        assert!(manifest.contains("name = \"runelet_contract\""));
        assert!(manifest.contains("crate-type = [\"cdylib\"]"));
        for lib in FRAMEWORK_LIBS {
            let line = format!("{} = {{ path = \"../runelet-rs/crates/{}\" }}", lib, lib);
            assert!(manifest.contains(&line), "missing {}", line);
        }
        assert!(manifest.contains("anyhow = \"1.0\""));
        assert!(manifest.contains("hex_lit = \"0.1\""));
    }

    #[test]
    fn caller_dependencies_append_in_name_order() {
        let mut extra = BTreeMap::new();
        extra.insert("zeta".to_string(), DependencySpec::Version("1".to_string()));
        extra.insert("alpha".to_string(), detailed(None, Some("0.2"), None));
        let manifest = ContractManifest::new(&extra).render();
        let alpha = manifest.find("alpha = { version = \"0.2\" }").unwrap();
        let zeta = manifest.find("zeta = \"1\"").unwrap();
        assert!(alpha < zeta);
    }
}
