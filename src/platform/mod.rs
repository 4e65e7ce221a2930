use crate::error::Result;
use std::path::Path;

pub fn platform() -> &'static dyn PlatformOps {
    &ConcretePlatform
}

pub trait PlatformOps: Sync + Send {
    /// Operating system name as `uname -s` prints it.
    fn system(&self) -> &'static str;
    /// Machine architecture as `uname -m` prints it.
    fn machine(&self) -> &'static str;
    fn final_binary_name(&self, base: &str) -> String;
    /// Adds execute permission for owner, group and other.
    fn make_executable(&self, path: &Path) -> Result<()>;
}

/// OS and architecture names used to compose release artifact names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub system: String,
    pub machine: String,
}

impl Target {
    pub fn host() -> Self {
        let p = platform();
        Self::new(p.system(), p.machine())
    }

    pub fn new(system: &str, machine: &str) -> Self {
        Self {
            system: system.to_string(),
            machine: machine.to_string(),
        }
    }

    pub fn is_windows(&self) -> bool {
        self.system.eq_ignore_ascii_case("windows")
    }
}

#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub use unix::UNIX_PLATFORM as ConcretePlatform;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WINDOWS_PLATFORM as ConcretePlatform;
