//! Configuration: user-supplied third-party sink targets.
//!
//! Loaded from YAML (default file `.leakhound.yaml`) and fully validated
//! before the analysis core ever sees it. The core treats the value as
//! read-only shared input.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{HoundError, Result};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".leakhound.yaml";

/// Maximum allowed configuration file size (1 MiB).
const MAX_CONFIG_SIZE: u64 = 1024 * 1024;

// Limits preventing pathological configurations.
const MAX_TARGETS: usize = 20;
const MAX_FUNCTIONS: usize = 50;
const MAX_METHODS: usize = 10;
const MAX_METHOD_NAMES: usize = 50;

static PACKAGE_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9.\-/]+$").expect("valid pattern"));

/// The configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
}

/// One target logging library.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Import path of the library, e.g. `go.uber.org/zap`.
    pub package: String,
    /// Package-level function names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<String>,
    /// Method groups keyed by receiver type.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<MethodConfig>,
}

/// Methods on one receiver type. `receiver` is `T` for value receivers or
/// `*T` for pointer receivers, with `T` declared in the target package.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodConfig {
    pub receiver: String,
    pub names: Vec<String>,
}

/// Load the configuration from `path`, or from the default file when no
/// path is given. A missing default file yields an empty configuration;
/// a missing explicit path is an error.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let (path, explicit) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (Path::new(DEFAULT_CONFIG_FILE).to_path_buf(), false),
    };

    let meta = match fs::metadata(&path) {
        Ok(m) => m,
        Err(_) if !explicit => return Ok(Config::default()),
        Err(e) => return Err(HoundError::io_with_path(e, path)),
    };

    if meta.len() > MAX_CONFIG_SIZE {
        return Err(HoundError::Config(format!(
            "config file size ({} bytes) exceeds maximum allowed size ({} bytes)",
            meta.len(),
            MAX_CONFIG_SIZE
        )));
    }

    let text = fs::read_to_string(&path).map_err(|e| HoundError::io_with_path(e, &path))?;
    let config: Config = serde_yaml::from_str(&text)
        .map_err(|e| HoundError::Config(format!("failed to parse config file: {e}")))?;
    validate(&config)?;
    Ok(config)
}

/// Validate structure and content limits.
pub fn validate(config: &Config) -> Result<()> {
    if config.targets.len() > MAX_TARGETS {
        return Err(HoundError::Config(format!(
            "too many targets: {} (max: {})",
            config.targets.len(),
            MAX_TARGETS
        )));
    }
    for (i, target) in config.targets.iter().enumerate() {
        validate_target(i, target)?;
    }
    Ok(())
}

fn validate_target(index: usize, target: &TargetConfig) -> Result<()> {
    if target.package.is_empty() {
        return Err(HoundError::Config(format!(
            "target[{index}]: package path is required"
        )));
    }
    if !PACKAGE_PATH_RE.is_match(&target.package) {
        return Err(HoundError::Config(format!(
            "target[{index}]: invalid package path: {}",
            target.package
        )));
    }
    if target.functions.is_empty() && target.methods.is_empty() {
        return Err(HoundError::Config(format!(
            "target[{index}] ({}): at least one of 'functions' or 'methods' must be specified",
            target.package
        )));
    }
    if target.functions.len() > MAX_FUNCTIONS {
        return Err(HoundError::Config(format!(
            "target[{index}] ({}): too many functions: {} (max: {})",
            target.package,
            target.functions.len(),
            MAX_FUNCTIONS
        )));
    }
    for f in &target.functions {
        if !is_go_identifier(f) {
            return Err(HoundError::Config(format!(
                "target[{index}] ({}): invalid function name '{f}'",
                target.package
            )));
        }
    }
    if target.methods.len() > MAX_METHODS {
        return Err(HoundError::Config(format!(
            "target[{index}] ({}): too many method configs: {} (max: {})",
            target.package,
            target.methods.len(),
            MAX_METHODS
        )));
    }
    for (j, method) in target.methods.iter().enumerate() {
        validate_method(index, &target.package, j, method)?;
    }
    Ok(())
}

fn validate_method(
    target_index: usize,
    pkg: &str,
    method_index: usize,
    method: &MethodConfig,
) -> Result<()> {
    if method.receiver.is_empty() {
        return Err(HoundError::Config(format!(
            "target[{target_index}] ({pkg}), method[{method_index}]: receiver is required"
        )));
    }
    let base = method.receiver.strip_prefix('*').unwrap_or(&method.receiver);
    if !is_go_identifier(base) {
        return Err(HoundError::Config(format!(
            "target[{target_index}] ({pkg}), method[{method_index}]: invalid receiver '{}'",
            method.receiver
        )));
    }
    if method.names.len() > MAX_METHOD_NAMES {
        return Err(HoundError::Config(format!(
            "target[{target_index}] ({pkg}), method[{method_index}]: too many method names: {} (max: {})",
            method.names.len(),
            MAX_METHOD_NAMES
        )));
    }
    for name in &method.names {
        if !is_go_identifier(name) {
            return Err(HoundError::Config(format!(
                "target[{target_index}] ({pkg}), method[{method_index}]: invalid method name '{name}'"
            )));
        }
    }
    Ok(())
}

/// Whether `name` is a valid Go identifier.
fn is_go_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn target(package: &str) -> TargetConfig {
        TargetConfig {
            package: package.into(),
            functions: vec!["Print".into()],
            methods: vec![],
        }
    }

    #[test]
    fn test_load_valid_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
targets:
  - package: "go.uber.org/zap"
    functions: ["L", "S"]
    methods:
      - receiver: "*Logger"
        names: ["Info", "Error"]
"#
        )
        .unwrap();
        let config = load(Some(file.path())).unwrap();
        assert_eq!(config.targets.len(), 1);
        assert_eq!(config.targets[0].package, "go.uber.org/zap");
        assert_eq!(config.targets[0].methods[0].receiver, "*Logger");
    }

    #[test]
    fn test_missing_default_is_empty() {
        // No .leakhound.yaml in the crate root: the default lookup yields
        // an empty configuration rather than an error.
        let config = load(None).unwrap();
        assert!(config.targets.is_empty());
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        assert!(load(Some(Path::new("/nonexistent/config.yaml"))).is_err());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
targets:
  - package: "example.com/x"
    functions: ["Log"]
surprise: true
"#
        )
        .unwrap();
        assert!(load(Some(file.path())).is_err());
    }

    #[test]
    fn test_validate_requires_functions_or_methods() {
        let config = Config {
            targets: vec![TargetConfig {
                package: "example.com/x".into(),
                functions: vec![],
                methods: vec![],
            }],
        };
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_package_path_pattern() {
        let mut bad = target("Example.com/X");
        bad.package = "Example.com/X".into();
        let config = Config {
            targets: vec![bad],
        };
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_identifier_names() {
        let mut bad = target("example.com/x");
        bad.functions = vec!["not-an-ident".into()];
        let config = Config {
            targets: vec![bad],
        };
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_receiver() {
        let config = Config {
            targets: vec![TargetConfig {
                package: "example.com/x".into(),
                functions: vec![],
                methods: vec![MethodConfig {
                    receiver: "**Logger".into(),
                    names: vec!["Info".into()],
                }],
            }],
        };
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_limits() {
        let config = Config {
            targets: (0..21).map(|_| target("example.com/x")).collect(),
        };
        assert!(validate(&config).is_err());
    }
}
