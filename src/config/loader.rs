//! Locating and reading `stitch.toml`.
//!
//! The nearest `stitch.toml` at or above the working directory wins; the
//! per-user file under the XDG config directory is the fallback. With no
//! file at all the defaults apply.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::schema::{ConfigValidationError, StitchConfig};

pub const CONFIG_FILE: &str = "stitch.toml";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("cannot read stitch.toml: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed stitch.toml: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{}", render_problems(.0))]
    Validation(Vec<ConfigValidationError>),
}

fn render_problems(problems: &[ConfigValidationError]) -> String {
    problems.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    /// Palette used for bare color references.
    pub palette: Option<String>,
}

impl Overrides {
    pub fn apply(self, config: &mut StitchConfig) {
        if let Some(palette) = self.palette {
            config.palettes.default = palette;
        }
    }
}

/// Nearest config file at or above `start`.
pub fn find_config_from(start: &Path) -> Option<PathBuf> {
    start.ancestors().map(|dir| dir.join(CONFIG_FILE)).find(|candidate| candidate.is_file())
}

fn user_config() -> Option<PathBuf> {
    let base = match env::var_os("XDG_CONFIG_HOME") {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from(env::var_os("HOME")?).join(".config"),
    };
    Some(base.join("stitchbook").join(CONFIG_FILE)).filter(|path| path.is_file())
}

pub fn find_config() -> Option<PathBuf> {
    env::current_dir().ok().and_then(|cwd| find_config_from(&cwd)).or_else(user_config)
}

/// Read the config at `path`, or the discovered one when `path` is `None`.
pub fn load_config(path: Option<&Path>) -> Result<StitchConfig, ConfigError> {
    let Some(path) = path.map(Path::to_path_buf).or_else(find_config) else {
        return Ok(StitchConfig::default());
    };

    log::debug!("reading {}", path.display());
    let config: StitchConfig = toml::from_str(&fs::read_to_string(&path)?)?;
    let problems = config.validate();
    if problems.is_empty() {
        Ok(config)
    } else {
        Err(ConfigError::Validation(problems))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_with(contents: &str) -> (TempDir, PathBuf) {
        let temp = TempDir::new().expect("should create temp dir");
        let path = temp.path().join(CONFIG_FILE);
        fs::write(&path, contents).expect("should write config");
        (temp, path)
    }

    #[test]
    fn test_find_config_walks_up() {
        let (temp, path) = temp_with("");
        assert_eq!(find_config_from(temp.path()), Some(path.clone()));

        let nested = temp.path().join("patterns").join("flowers");
        fs::create_dir_all(&nested).expect("should create subdirectories");
        assert_eq!(find_config_from(&nested), Some(path));
    }

    #[test]
    fn test_find_config_ignores_directories_named_like_the_file() {
        let temp = TempDir::new().expect("should create temp dir");
        fs::create_dir(temp.path().join(CONFIG_FILE)).expect("should create dir");
        assert_eq!(find_config_from(temp.path()), None);
    }

    #[test]
    fn test_load_full_config() {
        let (_temp, path) = temp_with(
            r#"
[weights]
full = 12
petite = 3

[palettes]
builtin = ["dmc"]
default = "dmc"

[local]
name = "Mine"
"#,
        );

        let config = load_config(Some(&path)).expect("should load valid config");
        assert_eq!(config.weights.full, 12);
        assert_eq!(config.weights.petite, 3);
        assert_eq!(config.weights.quarter, 1);
        assert_eq!(config.palettes.builtin, vec!["dmc"]);
        assert_eq!(config.local.name, "Mine");
    }

    #[test]
    fn test_load_errors() {
        let temp = TempDir::new().expect("should create temp dir");
        let missing = load_config(Some(&temp.path().join("absent.toml")));
        assert!(matches!(missing, Err(ConfigError::Io(_))));

        let (_temp, path) = temp_with("[weights\nfull = ");
        assert!(matches!(load_config(Some(&path)), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_reports_every_problem() {
        let (_temp, path) = temp_with("[weights]\nfull = 0\n[palettes]\nbuiltin = [\"nope\"]\n");

        match load_config(Some(&path)) {
            Err(ConfigError::Validation(problems)) => {
                let fields: Vec<&str> = problems.iter().map(|p| p.field.as_str()).collect();
                assert_eq!(fields, vec!["weights.full", "palettes.builtin[0]"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_overrides_replace_default_palette() {
        let mut config = StitchConfig::default();
        Overrides { palette: Some("anchor".to_string()) }.apply(&mut config);
        assert_eq!(config.palettes.default, "anchor");

        Overrides::default().apply(&mut config);
        assert_eq!(config.palettes.default, "anchor");
    }
}
