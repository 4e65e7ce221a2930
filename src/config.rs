use crate::error::{Error, Result};
use fs_err as fs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "dev.toml";
pub const PROJECT_DIR_ENV: &str = "DEV_PROJECT_DIR";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DevConfig {
    /// Fallback install prefix used when the project sibling `.local` can't be used.
    #[serde(default = "default_system_prefix")]
    pub system_prefix: PathBuf,
    /// Output directory for generated OpenAPI files, relative to the project root.
    #[serde(default = "default_openapi_dir")]
    pub openapi_dir: PathBuf,
    #[serde(default)]
    pub generate: GenerateConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerateConfig {
    /// Needed by buf managed mode even though no Go code is generated.
    #[serde(default = "default_go_package_prefix")]
    pub go_package_prefix: String,
}

fn default_system_prefix() -> PathBuf {
    PathBuf::from("/usr/local")
}

fn default_openapi_dir() -> PathBuf {
    PathBuf::from("openapi")
}

fn default_go_package_prefix() -> String {
    "example.com/api/gen/go".to_string()
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            go_package_prefix: default_go_package_prefix(),
        }
    }
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            system_prefix: default_system_prefix(),
            openapi_dir: default_openapi_dir(),
            generate: GenerateConfig::default(),
        }
    }
}

impl DevConfig {
    /// Loads `dev.toml` from the project root. A missing file yields the defaults.
    pub fn load(project: &Path) -> Result<Self> {
        let path = project.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)?;
        Self::parse(&data).map_err(|e| Error::config(format!("invalid {}: {e}", path.display())))
    }

    fn parse(data: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(data)
    }
}

/// Finds the project root: `DEV_PROJECT_DIR`, else the nearest ancestor holding `dev.toml`,
/// else the working directory.
pub fn project_root() -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    resolve_project(std::env::var_os(PROJECT_DIR_ENV).map(PathBuf::from), &cwd)
}

/// The root is always absolute: the install prefix is derived from its parent and
/// subprocesses run inside it.
fn resolve_project(explicit: Option<PathBuf>, cwd: &Path) -> Result<PathBuf> {
    match explicit {
        Some(dir) => Ok(fs::canonicalize(cwd.join(dir))?),
        None => Ok(find_marker(cwd).unwrap_or_else(|| cwd.to_path_buf())),
    }
}

fn find_marker(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        if dir.join(CONFIG_FILE).is_file() {
            return Some(dir);
        }
        if !dir.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_file_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = DevConfig::load(tmp.path()).unwrap();
        assert_eq!(cfg.system_prefix, PathBuf::from("/usr/local"));
        assert_eq!(cfg.openapi_dir, PathBuf::from("openapi"));
        assert_eq!(cfg.generate.go_package_prefix, "example.com/api/gen/go");
    }

    #[test]
    fn parses_partial_file() {
        let cfg = DevConfig::parse(
            r#"
system_prefix = "/opt/tools"

[generate]
go_package_prefix = "github.com/acme/api"
"#,
        )
        .unwrap();
        assert_eq!(cfg.system_prefix, PathBuf::from("/opt/tools"));
        assert_eq!(cfg.openapi_dir, PathBuf::from("openapi"));
        assert_eq!(cfg.generate.go_package_prefix, "github.com/acme/api");
    }

    #[test]
    fn rejects_unknown_keys() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE), "prefix = \"/x\"\n").unwrap();
        let err = DevConfig::load(tmp.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)), "{err}");
    }

    #[test]
    fn marker_search_walks_up() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE), "").unwrap();
        let nested = tmp.path().join("proto").join("v1");
        std::fs::create_dir_all(&nested).unwrap();
        assert_eq!(find_marker(&nested).as_deref(), Some(tmp.path()));
    }

    #[test]
    fn relative_project_dir_is_made_absolute() {
        let tmp = tempfile::tempdir().unwrap();
        let project = tmp.path().join("api");
        std::fs::create_dir_all(project.join("proto")).unwrap();
        let expected = std::fs::canonicalize(&project).unwrap();

        let root = resolve_project(Some(PathBuf::from(".")), &project).unwrap();
        assert_eq!(root, expected);
        let root = resolve_project(Some(PathBuf::from("..")), &project.join("proto")).unwrap();
        assert_eq!(root, expected);

        let dirs = crate::dirs::Dirs::new(&root, "/nonexistent");
        assert_eq!(
            dirs.local().unwrap(),
            expected.parent().unwrap().join(".local")
        );
    }

    #[test]
    fn missing_project_dir_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(resolve_project(Some(PathBuf::from("nope")), tmp.path()).is_err());
    }

    #[test]
    fn without_override_falls_back_to_cwd() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(resolve_project(None, tmp.path()).unwrap(), tmp.path());
    }
}
