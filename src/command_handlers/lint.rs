use crate::command::Runner;
use crate::tools::{Registry, ToolId};
use anyhow::{Context, Result};

pub fn lint(registry: &Registry, runner: &dyn Runner) -> Result<()> {
    let buf = registry.get(ToolId::Buf)?;
    runner
        .run(&crate::args![buf.name, "lint"], true)
        .context("lint check failed")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeRunner;

    #[test]
    fn runs_buf_lint() {
        let registry = Registry::builtin().unwrap();
        let runner = FakeRunner::default();
        lint(&registry, &runner).unwrap();
        assert_eq!(runner.calls(), ["buf lint"]);
    }

    #[test]
    fn lint_findings_fail() {
        let registry = Registry::builtin().unwrap();
        let runner = FakeRunner::default().respond("buf lint", 100, "api/v1/service.proto:3:1:Package name should be suffixed with a version");
        let err = lint(&registry, &runner).unwrap_err();
        assert!(format!("{err:#}").contains("suffixed with a version"));
    }
}
