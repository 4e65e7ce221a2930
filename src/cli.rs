use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    version,
    name = "dev",
    about = "Development tools: install the pinned build tools, format sources and generate API specifications"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log debug output (DEV_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Formats the source code.
    Format {
        /// Check the format, but don't fix it.
        #[arg(long)]
        check_only: bool,
    },
    /// Lints the protobuf definitions.
    Lint,
    /// Generate code (the OpenAPI specification unless a target is given).
    Generate {
        #[command(subcommand)]
        target: Option<GenerateTarget>,
    },
    /// Prepares the development environment by installing the pinned tools.
    Setup {
        /// Only install the named tool (repeatable)
        #[arg(long = "tool", value_name = "NAME")]
        tools: Vec<String>,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GenerateTarget {
    /// Generate the OpenAPI v2 and v3 specifications.
    #[default]
    Openapi,
}
