//! Remote archive acquisition
//!
//! The remote source is a single HTTPS URL returning a ZIP archive that
//! contains the merged table as a `.csv` entry. The fetch is one-shot per
//! load: an explicit timeout and exactly one retry bound the interaction, a
//! failure after that is terminal ([`Error::SourceUnavailable`]).

use crate::{Error, Result};
use std::io::{Cursor, Read};
use std::time::Duration;
use tracing::warn;

/// Per-request timeout for the archive download.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// One retry after the first failed attempt, then give up.
const MAX_RETRIES: usize = 1;

/// Pause before the retry attempt.
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Fetches the remote ZIP archive and extracts the tabular entry.
pub struct ArchiveFetcher {
    client: reqwest::Client,
}

impl Default for ArchiveFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveFetcher {
    /// Create a fetcher with the default timeout/retry policy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Download the archive at `url` and return the bytes of its first
    /// `.csv` entry.
    ///
    /// # Errors
    /// - [`Error::SourceUnavailable`] if the download fails after the retry
    /// - [`Error::ParseError`] if the response is not a ZIP archive
    /// - [`Error::NoTableFound`] if no entry name ends in `.csv`
    pub async fn fetch_csv(&self, url: &str) -> Result<Vec<u8>> {
        let mut attempt = 0;
        let archive = loop {
            match self.try_fetch(url).await {
                Ok(bytes) => break bytes,
                Err(err) if attempt < MAX_RETRIES => {
                    warn!(url, %err, "archive fetch failed, retrying once");
                    attempt += 1;
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                Err(err) => return Err(err),
            }
        };
        extract_first_csv(&archive, url)
    }

    async fn try_fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| Error::SourceUnavailable(format!("{url}: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::SourceUnavailable(format!(
                "{url}: HTTP {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::SourceUnavailable(format!("{url}: {e}")))?;
        Ok(bytes.to_vec())
    }
}

/// Locate the first `.csv` entry (central-directory order) and inflate it.
fn extract_first_csv(archive: &[u8], url: &str) -> Result<Vec<u8>> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive))
        .map_err(|e| Error::ParseError(format!("{url}: not a ZIP archive: {e}")))?;

    for index in 0..zip.len() {
        let mut entry = zip
            .by_index(index)
            .map_err(|e| Error::ParseError(format!("{url}: unreadable archive entry: {e}")))?;
        if entry.name().ends_with(".csv") {
            let mut bytes = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
            entry.read_to_end(&mut bytes)?;
            return Ok(bytes);
        }
    }

    Err(Error::NoTableFound(url.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn build_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, content) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_extract_first_csv_entry() {
        let archive = build_archive(&[
            ("readme.txt", b"notes"),
            ("data/merged_all_data.csv", b"order_id\no1\n"),
            ("other.csv", b"ignored"),
        ]);
        let bytes = extract_first_csv(&archive, "https://example.com/a.zip").unwrap();
        assert_eq!(bytes, b"order_id\no1\n");
    }

    #[test]
    fn test_no_table_found_when_no_csv_entry() {
        let archive = build_archive(&[("readme.txt", b"notes")]);
        let err = extract_first_csv(&archive, "https://example.com/a.zip").unwrap_err();
        assert!(matches!(err, Error::NoTableFound(_)));
    }

    #[test]
    fn test_garbage_bytes_are_a_parse_error() {
        let err = extract_first_csv(b"definitely not a zip", "https://example.com/a.zip")
            .unwrap_err();
        assert!(matches!(err, Error::ParseError(_)));
    }
}
