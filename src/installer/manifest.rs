use crate::error::{Error, Result};
use crate::tools::Tool;
use crate::transport::Transport;
use fs_err as fs;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::io;
use std::path::Path;
use tracing::{debug, info};

/// A release checksum listing whose own digest matched the pinned one.
#[derive(Debug)]
pub struct Manifest {
    url: String,
    text: String,
}

impl Manifest {
    /// Downloads `<base_url>/<name>` and checks it against the digest pinned for `name`.
    /// The pinned digest is looked up first so a missing pin never touches the network.
    pub fn fetch(transport: &dyn Transport, tool: &Tool, base_url: &str, name: &str) -> Result<Self> {
        let expected = tool.checksum(name)?;
        let url = format!("{base_url}/{name}");
        let bytes = transport.get(&url)?;
        verify_bytes(&url, &bytes, expected)?;
        debug!(%url, "manifest checksum verified");
        Ok(Self {
            url,
            text: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }

    #[cfg(test)]
    pub fn from_text(url: &str, text: &str) -> Self {
        Self {
            url: url.to_string(),
            text: text.to_string(),
        }
    }

    /// Finds the `<hex>  <artifact>` line for `artifact`.
    pub fn checksum_for(&self, artifact: &str) -> Result<String> {
        let pattern = Regex::new(&format!(
            r"(?m)^(?P<checksum>[0-9a-fA-F]+)\s+{}\r?$",
            regex::escape(artifact)
        ))
        .map_err(|e| Error::config(format!("bad artifact name '{artifact}': {e}")))?;
        let checksum = pattern
            .captures(&self.text)
            .and_then(|c| c.name("checksum"))
            .map(|m| m.as_str().to_ascii_lowercase())
            .ok_or_else(|| {
                Error::not_found(format!(
                    "failed to find checksum for artifact '{artifact}' inside '{}'",
                    self.url
                ))
            })?;
        info!(%artifact, %checksum, "expected artifact checksum");
        Ok(checksum)
    }
}

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

pub fn verify_bytes(subject: &str, data: &[u8], expected: &str) -> Result<()> {
    compare(subject, sha256_hex(data), expected)
}

/// Streams `path` through sha256 and compares with `expected`.
pub fn verify_file(path: &Path, expected: &str) -> Result<()> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    compare(
        &path.display().to_string(),
        hex::encode(hasher.finalize()),
        expected,
    )
}

fn compare(subject: &str, actual: String, expected: &str) -> Result<()> {
    if !actual.eq_ignore_ascii_case(expected) {
        return Err(Error::Integrity {
            subject: subject.to_string(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}
