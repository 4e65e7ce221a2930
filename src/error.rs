use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// A downloaded file or manifest does not hash to the pinned digest.
    #[error("failed to verify checksum of '{subject}', expected '{expected}' but got '{actual}'")]
    Integrity {
        subject: String,
        expected: String,
        actual: String,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("command '{command}' failed with exit code {code}{}", format_output(.output))]
    Execution {
        command: String,
        code: i32,
        output: String,
    },

    #[error("{0}")]
    Config(String),

    #[error("download of '{url}' failed with status {status}")]
    Transfer { url: String, status: u16 },

    #[error("failed to extract archive '{path}'")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}

fn format_output(output: &str) -> String {
    let trimmed = output.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(":\n{trimmed}")
    }
}
