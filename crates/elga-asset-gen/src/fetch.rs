//! Downloading URL payloads to disk

use elga_core::Result;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::http;

/// Streams a remote image to a local file
pub trait Fetcher {
    /// Download `url` into `dest`, creating or truncating it. Returns the
    /// number of bytes written.
    fn download(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// [`Fetcher`] over HTTP(S), retrying transient failures
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpFetcher;

impl HttpFetcher {
    pub fn new() -> Self {
        Self
    }
}

impl Fetcher for HttpFetcher {
    fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        http::get_with_retry(url, |reader| {
            let mut writer = BufWriter::new(File::create(dest)?);
            let written = io::copy(reader, &mut writer)?;
            writer.flush()?;
            Ok(written)
        })
    }
}
