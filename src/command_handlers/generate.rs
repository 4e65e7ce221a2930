use crate::args;
use crate::buf;
use crate::command::Runner;
use crate::config::DevConfig;
use crate::error::{Error, Result};
use crate::files::{ensure_dir, move_file};
use crate::tools::{Registry, ToolId};
use fs_err as fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Regenerates `<openapi_dir>/v2/openapi.json` with buf and converts it to
/// `<openapi_dir>/v3/openapi.yaml` with swagger-codegen.
pub fn openapi(
    registry: &Registry,
    runner: &dyn Runner,
    project: &Path,
    config: &DevConfig,
) -> Result<()> {
    let buf_tool = registry.get(ToolId::Buf)?;
    let swagger = registry.get(ToolId::SwaggerCodegenCli)?;

    let openapi_dir = project.join(&config.openapi_dir);
    if openapi_dir.exists() {
        fs::remove_dir_all(&openapi_dir)?;
    }
    let v2_dir = openapi_dir.join("v2");
    let v3_dir = openapi_dir.join("v3");
    ensure_dir(&v2_dir)?;
    ensure_dir(&v3_dir)?;

    let tmp = tempfile::Builder::new().prefix("dev-openapi-").tempdir()?;

    let v2_tmp = tmp.path().join("v2");
    ensure_dir(&v2_tmp)?;
    let template =
        buf::write_openapi_template(tmp.path(), &v2_tmp, &config.generate.go_package_prefix)?;
    runner.run(
        &args![buf_tool.name, "generate", "--template", template.display()],
        true,
    )?;
    let v2_file = v2_dir.join("openapi.json");
    move_file(&single_file(&v2_tmp, "json")?, &v2_file)?;
    info!("Generated '{}'", v2_file.display());

    let v3_tmp = tmp.path().join("v3");
    ensure_dir(&v3_tmp)?;
    runner.run(
        &args![
            swagger.name,
            "generate",
            "--lang",
            "openapi-yaml",
            "--input-spec",
            v2_file.display(),
            "--output",
            v3_tmp.display(),
        ],
        true,
    )?;
    let v3_file = v3_dir.join("openapi.yaml");
    move_file(&single_file(&v3_tmp, "yaml")?, &v3_file)?;
    info!("Generated '{}'", v3_file.display());
    Ok(())
}

/// The only file with extension `ext` directly inside `dir`.
fn single_file(dir: &Path, ext: &str) -> Result<PathBuf> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == ext) {
            found.push(path);
        }
    }
    match <[PathBuf; 1]>::try_from(found) {
        Ok([file]) => Ok(file),
        Err(found) => Err(Error::not_found(format!(
            "expected exactly one generated OpenAPI file, but found {}",
            found.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeRunner;

    fn arg_after<'a>(args: &'a [String], flag: &str) -> &'a str {
        let i = args.iter().position(|a| a == flag).unwrap();
        &args[i + 1]
    }

    /// Emulates buf writing `names` next to the template's `v2` output dir.
    fn buf_writes(names: &'static [&'static str]) -> impl Fn(&[String]) {
        move |args: &[String]| {
            let template = Path::new(arg_after(args, "--template"));
            let out = template.parent().unwrap().join("v2");
            for name in names {
                std::fs::write(out.join(name), "{\"swagger\": \"2.0\"}").unwrap();
            }
        }
    }

    fn swagger_writes(args: &[String]) {
        let out = Path::new(arg_after(args, "--output"));
        std::fs::write(out.join("openapi.yaml"), "openapi: 3.0.1\n").unwrap();
    }

    fn project() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    #[test]
    fn generates_v2_and_v3() {
        let tmp = project();
        std::fs::create_dir_all(tmp.path().join("openapi/stale")).unwrap();
        let registry = Registry::builtin().unwrap();
        let runner = FakeRunner::default()
            .on("buf generate", buf_writes(&["openapi.swagger.json"]))
            .on("swagger-codegen-cli generate", swagger_writes);
        openapi(&registry, &runner, tmp.path(), &DevConfig::default()).unwrap();

        let v2 = tmp.path().join("openapi/v2/openapi.json");
        let v3 = tmp.path().join("openapi/v3/openapi.yaml");
        assert_eq!(std::fs::read_to_string(&v2).unwrap(), "{\"swagger\": \"2.0\"}");
        assert_eq!(std::fs::read_to_string(&v3).unwrap(), "openapi: 3.0.1\n");
        assert!(!tmp.path().join("openapi/stale").exists());

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].starts_with("buf generate --template "));
        assert!(calls[1].contains(&format!("--input-spec {}", v2.display())));
        assert!(calls[1].contains("--lang openapi-yaml"));
    }

    #[test]
    fn no_generated_file_fails_before_move() {
        let tmp = project();
        let registry = Registry::builtin().unwrap();
        let runner = FakeRunner::default();
        let err = openapi(&registry, &runner, tmp.path(), &DevConfig::default()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(
            err.to_string(),
            "expected exactly one generated OpenAPI file, but found 0"
        );
        assert!(!tmp.path().join("openapi/v2/openapi.json").exists());
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn several_generated_files_fail_before_move() {
        let tmp = project();
        let registry = Registry::builtin().unwrap();
        let runner = FakeRunner::default().on("buf generate", buf_writes(&["a.json", "b.json"]));
        let err = openapi(&registry, &runner, tmp.path(), &DevConfig::default()).unwrap_err();
        assert!(err.to_string().ends_with("but found 2"));
        assert!(!tmp.path().join("openapi/v2/openapi.json").exists());
    }

    #[test]
    fn missing_v3_output_fails() {
        let tmp = project();
        let registry = Registry::builtin().unwrap();
        let runner = FakeRunner::default().on("buf generate", buf_writes(&["openapi.json"]));
        let err = openapi(&registry, &runner, tmp.path(), &DevConfig::default()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(tmp.path().join("openapi/v2/openapi.json").exists());
        assert!(!tmp.path().join("openapi/v3/openapi.yaml").exists());
    }

    #[test]
    fn single_file_ignores_other_extensions() {
        let tmp = project();
        std::fs::write(tmp.path().join("openapi.json"), "{}").unwrap();
        std::fs::write(tmp.path().join("README.md"), "").unwrap();
        std::fs::create_dir(tmp.path().join("nested.json")).unwrap();
        assert_eq!(
            single_file(tmp.path(), "json").unwrap(),
            tmp.path().join("openapi.json")
        );
    }
}
