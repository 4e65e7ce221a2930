use crate::error::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::debug;

/// Network seam: fetches a URL and returns the body. Non-2xx responses are errors.
pub trait Transport {
    fn get(&self, url: &str) -> Result<Vec<u8>>;
}

pub struct HttpTransport {
    client: Client,
    progress: bool,
}

impl HttpTransport {
    pub fn new(progress: bool) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("dev/", env!("CARGO_PKG_VERSION")))
            .timeout(None)
            .build()?;
        Ok(Self { client, progress })
    }

    fn spinner(&self, url: &str) -> Option<ProgressBar> {
        if !self.progress {
            return None;
        }
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("GET {url}"));
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<Vec<u8>> {
        debug!(%url, "downloading");
        let pb = self.spinner(url);
        let result = self.fetch(url);
        if let Some(pb) = pb {
            pb.finish_and_clear();
        }
        let bytes = result?;
        debug!(%url, size = bytes.len(), "downloaded");
        Ok(bytes)
    }
}

impl HttpTransport {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self.client.get(url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Transfer {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(resp.bytes()?.to_vec())
    }
}
