//! kernel.json rewriting
//!
//! The bundled kernel.json may refer to its own install location through
//! [`INSTALL_DIRECTORY_TOKEN`]. Once the destination is known the token is
//! replaced, the environment overrides are merged into `env` and the result
//! is written back out with sorted keys.

use crate::error::{InstallerError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{collections::BTreeMap, path::Path};

/// Placeholder for the directory the kernelspec ends up in
pub const INSTALL_DIRECTORY_TOKEN: &str = "@KERNEL_INSTALL_DIRECTORY@";

const INDENT: &[u8] = b"    ";

/// Typed view of a kernelspec
// DOCS: https://jupyter-client.readthedocs.io/en/latest/kernels.html#kernel-specs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelSpec {
    #[serde(default)]
    pub argv: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interrupt_mode: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

impl KernelSpec {
    /// Problems Jupyter would have launching this kernelspec
    pub fn problems(rendered: &str) -> Vec<String> {
        let spec: Self = match serde_json::from_str(rendered) {
            Ok(spec) => spec,
            Err(e) => return vec![format!("kernel.json does not match the kernelspec format: {e}")],
        };

        let mut problems = Vec::new();
        if spec.argv.is_empty() {
            problems.push("kernel.json has no 'argv' to launch the kernel with".to_string());
        }
        if spec.display_name.is_none() {
            problems.push("kernel.json has no 'display_name'".to_string());
        }
        problems
    }
}

/// `path` as the inside of a JSON string literal, without the quotes
pub fn json_path_fragment(path: &Path) -> Result<String> {
    let quoted = serde_json::to_string(&path.to_string_lossy()).map_err(|e| {
        InstallerError::kernel_json_with_source("Failed to encode install path", path, e)
    })?;

    Ok(quoted[1..quoted.len() - 1].to_string())
}

/// Produce the installed kernel.json from the bundled template
///
/// `source` is only used to point errors at the template file.
pub fn render(
    template: &str,
    install_dir: &Path,
    overrides: &BTreeMap<String, String>,
    source: &Path,
) -> Result<String> {
    let fragment = json_path_fragment(install_dir)?;
    let contents = template.replace(INSTALL_DIRECTORY_TOKEN, &fragment);

    let mut document: Value = serde_json::from_str(&contents).map_err(|e| {
        InstallerError::kernel_json_with_source("kernel.json is not valid JSON", source, e)
    })?;

    let root = document
        .as_object_mut()
        .ok_or_else(|| InstallerError::kernel_json("kernel.json must contain an object", source))?;

    let env = root
        .entry("env")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| InstallerError::kernel_json("'env' in kernel.json must be an object", source))?;

    for (key, value) in overrides {
        env.insert(key.clone(), Value::String(value.clone()));
    }

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    document.serialize(&mut serializer).map_err(|e| {
        InstallerError::kernel_json_with_source("Failed to serialize kernel.json", source, e)
    })?;

    String::from_utf8(buf).map_err(|e| {
        InstallerError::kernel_json_with_source("kernel.json is not valid UTF-8", source, e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const TEMPLATE: &str = r#"{
        "argv": ["java", "-jar", "@KERNEL_INSTALL_DIRECTORY@/kernel.jar", "{connection_file}"],
        "display_name": "Demo",
        "language": "demo",
        "env": {"DEMO_HOME": "@KERNEL_INSTALL_DIRECTORY@", "KEEP": "yes"}
    }"#;

    fn overrides(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_fragment_escapes_json_specials() {
        let fragment = json_path_fragment(Path::new(r#"C:\Users\a "b"\kernels"#)).unwrap();
        assert_eq!(fragment, r#"C:\\Users\\a \"b\"\\kernels"#);

        let fragment = json_path_fragment(Path::new("/usr/local/share")).unwrap();
        assert_eq!(fragment, "/usr/local/share");
    }

    #[test]
    fn test_render_replaces_token_everywhere() {
        let install_dir = PathBuf::from("/opt/jupyter/kernels/demo");
        let rendered = render(TEMPLATE, &install_dir, &BTreeMap::new(), Path::new("kernel.json")).unwrap();
        let value: Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value["argv"][2], "/opt/jupyter/kernels/demo/kernel.jar");
        assert_eq!(value["env"]["DEMO_HOME"], "/opt/jupyter/kernels/demo");
        assert!(!rendered.contains(INSTALL_DIRECTORY_TOKEN));
    }

    #[test]
    fn test_render_path_with_backslashes_stays_valid_json() {
        let install_dir = PathBuf::from(r"C:\ProgramData\jupyter\kernels\demo");
        let rendered = render(TEMPLATE, &install_dir, &BTreeMap::new(), Path::new("kernel.json")).unwrap();
        let value: Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value["env"]["DEMO_HOME"], r"C:\ProgramData\jupyter\kernels\demo");
    }

    #[test]
    fn test_render_merges_overrides() {
        let rendered = render(
            TEMPLATE,
            Path::new("/k"),
            &overrides(&[("KEEP", "no"), ("NEW", "1")]),
            Path::new("kernel.json"),
        )
        .unwrap();
        let value: Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value["env"]["KEEP"], "no");
        assert_eq!(value["env"]["NEW"], "1");
        assert_eq!(value["env"]["DEMO_HOME"], "/k");
    }

    #[test]
    fn test_render_creates_env_when_missing() {
        let rendered = render(
            r#"{"argv": ["k"], "display_name": "K"}"#,
            Path::new("/k"),
            &overrides(&[("A", "1")]),
            Path::new("kernel.json"),
        )
        .unwrap();
        let value: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["env"]["A"], "1");

        let rendered = render(r#"{"argv": ["k"]}"#, Path::new("/k"), &BTreeMap::new(), Path::new("kernel.json")).unwrap();
        assert!(rendered.contains("\"env\": {}"));
    }

    #[test]
    fn test_render_output_format() {
        let rendered = render(
            r#"{"language": "x", "argv": ["a"], "display_name": "X"}"#,
            Path::new("/k"),
            &BTreeMap::new(),
            Path::new("kernel.json"),
        )
        .unwrap();

        let expected = "{\n    \"argv\": [\n        \"a\"\n    ],\n    \"display_name\": \"X\",\n    \"env\": {},\n    \"language\": \"x\"\n}";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_render_rejects_bad_documents() {
        let source = Path::new("kernel.json");

        let err = render("[1, 2]", Path::new("/k"), &BTreeMap::new(), source).unwrap_err();
        assert!(err.to_string().contains("must contain an object"));

        let err = render(r#"{"env": "nope"}"#, Path::new("/k"), &BTreeMap::new(), source).unwrap_err();
        assert!(err.to_string().contains("'env'"));

        let err = render("{ broken", Path::new("/k"), &BTreeMap::new(), source).unwrap_err();
        assert!(matches!(err, InstallerError::KernelJson { .. }));
    }

    #[test]
    fn test_kernel_spec_problems() {
        assert!(KernelSpec::problems(r#"{"argv": ["k"], "display_name": "K"}"#).is_empty());

        let problems = KernelSpec::problems(r#"{"language": "k"}"#);
        assert_eq!(problems.len(), 2);

        let problems = KernelSpec::problems(r#"{"argv": "k"}"#);
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("kernelspec format"));
    }
}
