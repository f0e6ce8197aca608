use crate::error::TimetableError;
use std::fs::File;
use std::io::BufReader;
use std::io::Cursor;
use std::io::Read;
use std::io::Seek;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Error, Debug)]
pub enum UnifiedReaderError {
    #[error("No data from remote file: '{0}'")]
    RemoteFileNoDataError(String),
}

/// A reader over workbook bytes from a local file or an in-memory buffer
pub enum UnifiedReader {
    /// Local file reader
    Local(BufReader<File>),
    /// Downloaded or caller-supplied bytes
    Memory(Cursor<Vec<u8>>),
}

impl UnifiedReader {
    /// Opens a workbook from either a local path or an http(s) URL
    ///
    /// # Arguments
    /// * `location` - Path or URL of the workbook
    /// * `timeout` - Upper bound for the download of a remote workbook
    ///
    /// # Returns
    /// * `Result<UnifiedReader, TimetableError>` - Reader for the workbook content
    pub fn new(location: &str, timeout: Duration) -> Result<UnifiedReader, TimetableError> {
        if Self::is_remote_url(location) {
            Self::download(location, timeout)
        } else {
            let file = File::open(location)?;
            Ok(UnifiedReader::Local(BufReader::new(file)))
        }
    }

    /// Wraps bytes that were already fetched by the caller
    pub fn from_bytes(bytes: Vec<u8>) -> UnifiedReader {
        UnifiedReader::Memory(Cursor::new(bytes))
    }

    /// Checks if a location represents a remote URL
    pub fn is_remote_url(location: &str) -> bool {
        if let Ok(url) = Url::parse(location) {
            matches!(url.scheme(), "http" | "https")
        } else {
            false
        }
    }

    fn download(location: &str, timeout: Duration) -> Result<UnifiedReader, TimetableError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        let bytes = client.get(location)
            .send()?
            .error_for_status()?
            .bytes()?
            .to_vec();
        if bytes.is_empty() {
            Err(UnifiedReaderError::RemoteFileNoDataError(location.to_owned()))?;
        }
        debug!(location, size = bytes.len(), "downloaded workbook");
        Ok(UnifiedReader::Memory(Cursor::new(bytes)))
    }
}

impl Read for UnifiedReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            UnifiedReader::Local(reader) => reader.read(buf),
            UnifiedReader::Memory(reader) => reader.read(buf),
        }
    }
}

impl Seek for UnifiedReader {
    fn seek(&mut self, pos: std::io::SeekFrom) -> std::io::Result<u64> {
        match self {
            UnifiedReader::Local(reader) => reader.seek(pos),
            UnifiedReader::Memory(reader) => reader.seek(pos),
        }
    }
}
