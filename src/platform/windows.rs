use crate::error::Result;
use crate::platform::PlatformOps;
use std::path::Path;

pub static WINDOWS_PLATFORM: Windows = Windows;

pub struct Windows;

impl PlatformOps for Windows {
    fn system(&self) -> &'static str { "Windows" }
    fn machine(&self) -> &'static str { match std::env::consts::ARCH { "aarch64" => "arm64", other => other } }
    fn final_binary_name(&self, base: &str) -> String { if base.ends_with(".exe") { base.to_string() } else { format!("{base}.exe") } }
    fn make_executable(&self, _path: &Path) -> Result<()> { Ok(()) }
}
