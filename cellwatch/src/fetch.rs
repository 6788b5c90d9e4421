//! Sources of raw sheet markup

use cellwatch_core::{Result, SheetError};
use std::path::{Path, PathBuf};

/// Something that can produce the raw markup of a document by id
pub trait DocumentSource {
    fn fetch(&self, document_id: &str) -> Result<String>;
}

impl<T: DocumentSource + ?Sized> DocumentSource for Box<T> {
    fn fetch(&self, document_id: &str) -> Result<String> {
        (**self).fetch(document_id)
    }
}

/// Fetch snapshots over HTTP
#[cfg(feature = "http")]
pub struct HttpSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

#[cfg(feature = "http")]
impl HttpSource {
    pub fn new(base_url: impl Into<String>, timeout: std::time::Duration) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[cfg(feature = "http")]
impl DocumentSource for HttpSource {
    fn fetch(&self, document_id: &str) -> Result<String> {
        let url = crate::link::document_url(&self.base_url, document_id);
        log::debug!("Fetching {}", url);

        let unavailable = |reason: String| SheetError::DocumentUnavailable {
            document: document_id.to_string(),
            reason,
        };

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| unavailable(e.to_string()))?;
        if !response.status().is_success() {
            return Err(unavailable(format!("HTTP {}", response.status())));
        }
        response.text().map_err(|e| unavailable(e.to_string()))
    }
}

/// Read snapshots saved as `<dir>/<document id>.html`, with `/` in ids replaced by `_`
pub struct FileSource {
    dir: PathBuf,
}

impl FileSource {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, document_id: &str) -> PathBuf {
        self.dir
            .join(format!("{}.html", document_id.replace('/', "_")))
    }
}

impl DocumentSource for FileSource {
    fn fetch(&self, document_id: &str) -> Result<String> {
        let path = self.path_for(document_id);
        std::fs::read_to_string(&path).map_err(|e| SheetError::DocumentUnavailable {
            document: document_id.to_string(),
            reason: format!("{}: {}", path.display(), e),
        })
    }
}
