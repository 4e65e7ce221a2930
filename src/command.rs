use crate::error::{Error, Result};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::debug;

/// Process execution seam used by the installer and the workflow commands.
pub trait Runner {
    /// Runs `args` to completion. With `check`, a non-zero exit is an [`Error::Execution`].
    /// Returns the exit code.
    fn run(&self, args: &[String], check: bool) -> Result<i32>;

    /// Runs `args` and returns the exit code and combined output without judging the result.
    fn eval(&self, args: &[String]) -> Result<(i32, String)>;

    /// Locates a binary on the search path.
    fn find(&self, name: &str) -> Option<PathBuf>;
}

/// Runs real processes in `cwd` with `extra_path` ahead of the inherited `PATH`.
pub struct SystemRunner {
    cwd: PathBuf,
    search_path: OsString,
}

impl SystemRunner {
    pub fn new(cwd: impl Into<PathBuf>, extra_path: Option<&Path>) -> Self {
        let inherited = std::env::var_os("PATH").unwrap_or_default();
        let mut dirs: Vec<PathBuf> = extra_path.map(Path::to_path_buf).into_iter().collect();
        dirs.extend(std::env::split_paths(&inherited));
        let search_path = std::env::join_paths(dirs).unwrap_or(inherited);
        Self {
            cwd: cwd.into(),
            search_path,
        }
    }

    fn output(&self, args: &[String]) -> Result<Output> {
        let (program, rest) = args
            .split_first()
            .ok_or_else(|| Error::config("empty command line"))?;
        debug!(command = %args.join(" "), "running");
        let program = self.find(program).unwrap_or_else(|| PathBuf::from(program));
        Command::new(&program)
            .args(rest)
            .current_dir(&self.cwd)
            .env("PATH", &self.search_path)
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => {
                    Error::not_found(format!("failed to find command '{}'", args[0]))
                }
                _ => Error::Io(e),
            })
    }
}

impl Runner for SystemRunner {
    fn run(&self, args: &[String], check: bool) -> Result<i32> {
        let output = self.output(args)?;
        let code = exit_code(&output);
        let combined = combined_output(&output);
        if check && code != 0 {
            return Err(Error::Execution {
                command: args.join(" "),
                code,
                output: combined,
            });
        }
        if !combined.trim().is_empty() {
            debug!(code, output = %combined.trim_end(), "command finished");
        }
        Ok(code)
    }

    fn eval(&self, args: &[String]) -> Result<(i32, String)> {
        let output = self.output(args)?;
        Ok((exit_code(&output), combined_output(&output)))
    }

    fn find(&self, name: &str) -> Option<PathBuf> {
        which::which_in(name, Some(&self.search_path), &self.cwd).ok()
    }
}

/// Processes killed by a signal report `-1`.
fn exit_code(output: &Output) -> i32 {
    output.status.code().unwrap_or(-1)
}

fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}

/// Builds an owned argument vector from anything string-like.
#[macro_export]
macro_rules! args {
    ($($arg:expr),* $(,)?) => {
        vec![$(::std::string::ToString::to_string(&$arg)),*]
    };
}
