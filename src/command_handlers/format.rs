use crate::command::Runner;
use crate::tools::{Registry, ToolId};
use anyhow::{Context, Result};
use tracing::info;

/// Formats the protobuf sources, or with `check_only` fails when formatting would change them.
pub fn format(registry: &Registry, runner: &dyn Runner, check_only: bool) -> Result<()> {
    let buf = registry.get(ToolId::Buf)?;
    let args = format_args(&buf.name, check_only);
    runner.run(&args, true).with_context(|| {
        if check_only {
            "source code is not correctly formatted, run 'dev format' to fix it".to_string()
        } else {
            "failed to format source code".to_string()
        }
    })?;
    if check_only {
        info!("Source code is correctly formatted");
    }
    Ok(())
}

fn format_args(buf: &str, check_only: bool) -> Vec<String> {
    let mut args = crate::args![buf, "format"];
    if check_only {
        args.extend(crate::args!["--diff", "--exit-code"]);
    } else {
        args.extend(crate::args!["--write"]);
    }
    args
}
