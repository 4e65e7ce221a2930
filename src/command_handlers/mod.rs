pub mod dispatch;
pub mod format;
pub mod generate;
pub mod lint;
pub mod setup;

use crate::command::SystemRunner;
use crate::config::DevConfig;
use crate::dirs::Dirs;
use crate::tools::Registry;

/// Everything a command needs, resolved once in `main`.
pub struct Context {
    pub config: DevConfig,
    pub registry: Registry,
    pub dirs: Dirs,
    pub runner: SystemRunner,
}
