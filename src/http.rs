//! Blocking HTTP access for manifests and archives

use crate::acquire::ProgressCallback;
use crate::{Config, Error, Result};
use std::io::{Read, Write};
use std::time::Duration;
use tracing::debug;

/// Default `User-Agent` sent with every request
pub const DEFAULT_USER_AGENT: &str = concat!("sdkpack/", env!("CARGO_PKG_VERSION"));

pub struct HttpClient {
    client: reqwest::blocking::Client,
}

impl HttpClient {
    /// Create a client with an explicit timeout and user agent
    pub fn new(timeout: Option<Duration>, user_agent: &str) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Create a client from the `[download]` section of the user configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let timeout = match config.download.timeout_seconds {
            0 => None,
            seconds => Some(Duration::from_secs(seconds)),
        };
        Self::new(timeout, &config.download.user_agent)
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response> {
        debug!(url, "GET");

        let response = self.client.get(url).send().map_err(|e| {
            if e.is_connect() {
                Error::Other(format!(
                    "Cannot connect to {}\n\
                     Please check your network connection and that the URL is correct.",
                    url
                ))
            } else if e.is_timeout() {
                Error::Other(format!("Request to {} timed out. Please try again.", url))
            } else {
                Error::Http(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Download {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    /// Fetch a document as text
    pub fn fetch_text(&self, url: &str) -> Result<String> {
        Ok(self.get(url)?.text()?)
    }

    /// Stream a response body into `target`, returning the number of bytes written
    ///
    /// `expected_size` is only used for progress reporting; when the server
    /// sends a `Content-Length`, that takes precedence.
    pub fn download<W: Write>(
        &self,
        url: &str,
        target: &mut W,
        expected_size: u64,
        progress: Option<&ProgressCallback>,
    ) -> Result<u64> {
        let mut response = self.get(url)?;
        let total = response.content_length().unwrap_or(expected_size);

        let mut buffer = vec![0; 64 * 1024];
        let mut written: u64 = 0;

        loop {
            let read = response.read(&mut buffer)?;
            if read == 0 {
                break;
            }
            target.write_all(&buffer[..read])?;
            written += read as u64;

            if let Some(cb) = progress {
                cb("Downloading", written, total.max(written));
            }
        }
        target.flush()?;

        debug!(url, bytes = written, "download complete");
        Ok(written)
    }
}
