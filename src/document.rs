use std::io::Write;
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::fetch::BinaryFetcher;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to fetch document: {0}")]
    Fetch(String),

    #[error("failed to stage document in temporary file: {0}")]
    TempFile(#[from] std::io::Error),

    #[error("failed to extract text: {0}")]
    Extract(String),

    #[error("text extraction panicked on malformed document")]
    Panicked,
}

/// Turns a document on disk into plain text.
pub trait TextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, ExtractError>;
}

pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, ExtractError> {
        // pdf-extract panics on some malformed files.
        match catch_panic_quietly(|| pdf_extract::extract_text(path))? {
            Ok(text) => Ok(text),
            Err(e) => Err(ExtractError::Extract(e.to_string())),
        }
    }
}

// Serializes hook swaps so concurrent callers restore the original hook.
static HOOK_LOCK: Mutex<()> = Mutex::new(());

/// Run `f`, turning a panic into [`ExtractError::Panicked`]. The panic message
/// goes to the debug log instead of stderr; the previous hook is restored.
fn catch_panic_quietly<T>(f: impl FnOnce() -> T + panic::UnwindSafe) -> Result<T, ExtractError> {
    let _guard = HOOK_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let previous = panic::take_hook();
    panic::set_hook(Box::new(|info| log::debug!("PDF backend panicked: {}", info)));
    let result = panic::catch_unwind(f);
    panic::set_hook(previous);
    result.map_err(|_| ExtractError::Panicked)
}

/// Downloads a linked document and extracts its text via a temporary file.
///
/// The temporary file is removed before `extract` returns, whatever the
/// outcome.
pub struct DocumentExtractor<'a> {
    fetcher: &'a dyn BinaryFetcher,
    text: Box<dyn TextExtractor + 'a>,
    temp_dir: Option<PathBuf>,
}

impl<'a> DocumentExtractor<'a> {
    pub fn new(fetcher: &'a dyn BinaryFetcher, text: Box<dyn TextExtractor + 'a>) -> Self {
        Self {
            fetcher,
            text,
            temp_dir: None,
        }
    }

    pub fn pdf(fetcher: &'a dyn BinaryFetcher) -> Self {
        Self::new(fetcher, Box::new(PdfTextExtractor))
    }

    /// Stage temporary files in `dir` instead of the system temp directory.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn extract(&self, url: &str) -> Result<String, ExtractError> {
        log::info!("Processing PDF: {}", url);
        let bytes = self
            .fetcher
            .fetch_bytes(url)
            .map_err(|e| ExtractError::Fetch(format!("{:#}", e)))?;

        let staged = self.stage(&bytes)?;
        let result = self.text.extract_text(staged.path());
        if let Err(e) = staged.close() {
            log::warn!("Failed to remove temporary file for {}: {}", url, e);
        }

        let text = result?;
        log::info!("Extracted {} characters from PDF", text.chars().count());
        Ok(text)
    }

    fn stage(&self, bytes: &[u8]) -> Result<NamedTempFile, ExtractError> {
        let mut file = match &self.temp_dir {
            Some(dir) => NamedTempFile::new_in(dir)?,
            None => NamedTempFile::new()?,
        };
        file.write_all(bytes)?;
        file.flush()?;
        Ok(file)
    }
}
