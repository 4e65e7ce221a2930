use crate::cli::{Commands, GenerateTarget};
use crate::command_handlers::{format, generate, lint, setup, Context};
use crate::transport::HttpTransport;
use anyhow::{Context as _, Result};
use std::io::IsTerminal;

pub fn dispatch(cmd: Commands, ctx: &Context) -> Result<()> {
    match cmd {
        Commands::Format { check_only } => format::format(&ctx.registry, &ctx.runner, check_only),
        Commands::Lint => lint::lint(&ctx.registry, &ctx.runner),
        Commands::Generate { target } => match target.unwrap_or_default() {
            GenerateTarget::Openapi => {
                generate::openapi(&ctx.registry, &ctx.runner, ctx.dirs.project(), &ctx.config)
                    .context("failed to generate the OpenAPI specification")
            }
        },
        Commands::Setup { tools } => {
            let transport = HttpTransport::new(std::io::stderr().is_terminal())?;
            setup::setup(&ctx.registry, &ctx.dirs, &ctx.runner, &transport, &tools)
                .context("failed to prepare the development environment")
        }
    }
}
