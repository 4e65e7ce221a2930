//! `buf generate` templates.

use crate::error::{Error, Result};
use fs_err as fs;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
struct GenTemplate {
    version: &'static str,
    managed: Managed,
    plugins: Vec<Plugin>,
}

#[derive(Debug, Serialize)]
struct Managed {
    enabled: bool,
    #[serde(rename = "override")]
    overrides: Vec<Override>,
}

#[derive(Debug, Serialize)]
struct Override {
    file_option: &'static str,
    value: String,
}

#[derive(Debug, Serialize)]
struct Plugin {
    local: &'static str,
    out: PathBuf,
    opt: Vec<&'static str>,
}

/// Renders the template that runs `protoc-gen-openapiv2` into `out_dir`, merging all
/// services into a single `openapi.json`. buf managed mode needs a Go package prefix even
/// though no Go code is generated.
pub fn openapi_template(out_dir: &Path, go_package_prefix: &str) -> Result<String> {
    let template = GenTemplate {
        version: "v2",
        managed: Managed {
            enabled: true,
            overrides: vec![Override {
                file_option: "go_package_prefix",
                value: go_package_prefix.to_string(),
            }],
        },
        plugins: vec![Plugin {
            local: "protoc-gen-openapiv2",
            out: out_dir.to_path_buf(),
            opt: vec!["allow_merge=true", "merge_file_name=openapi"],
        }],
    };
    serde_yaml::to_string(&template)
        .map_err(|e| Error::config(format!("failed to render buf template: {e}")))
}

/// Writes the template to `dir/buf.gen.yaml` and returns its path.
pub fn write_openapi_template(dir: &Path, out_dir: &Path, go_package_prefix: &str) -> Result<PathBuf> {
    let path = dir.join("buf.gen.yaml");
    fs::write(&path, openapi_template(out_dir, go_package_prefix)?)?;
    Ok(path)
}
