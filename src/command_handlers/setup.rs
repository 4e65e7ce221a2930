use crate::command::Runner;
use crate::dirs::Dirs;
use crate::error::{Error, Result};
use crate::installer::Installer;
use crate::tools::{Registry, ToolId};
use crate::transport::Transport;
use tracing::info;

/// Installs the pinned tools, all of them when `names` is empty.
pub fn setup(
    registry: &Registry,
    dirs: &Dirs,
    runner: &dyn Runner,
    transport: &dyn Transport,
    names: &[String],
) -> Result<()> {
    let ids = select_tools(registry, names)?;
    Installer::new(registry, dirs, runner, transport).install_all(&ids)?;
    info!("Development environment is ready");
    Ok(())
}

fn select_tools(registry: &Registry, names: &[String]) -> Result<Vec<ToolId>> {
    if names.is_empty() {
        return Ok(registry.iter().map(|(id, _)| id).collect());
    }
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        let (id, _) = registry
            .find(name)
            .ok_or_else(|| Error::not_found(format!("unknown tool '{name}'")))?;
        ids.push(id);
    }
    // Keep the dependency order of a full setup regardless of argument order.
    ids.sort_by_key(|id| ToolId::ALL.iter().position(|a| a == id));
    ids.dedup();
    Ok(ids)
}
