use formats::rekey::rekey_header;
use formats::table::SourceFile;

use crate::error::ViewerError;

/// Files chosen by the user, waiting for an explicit load.
#[derive(Debug, Clone, Default)]
pub struct FileQueue {
    files: Vec<SourceFile>,
}

impl FileQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.files.push(SourceFile::new(name, text));
    }

    /// Queues `text` with its `column` header renamed to `key`, for files
    /// that name their regions under a different heading.
    pub fn push_rekeyed(
        &mut self,
        name: impl Into<String>,
        text: &str,
        column: &str,
        key: &str,
    ) -> Result<(), ViewerError> {
        let name = name.into();
        let Some(text) = rekey_header(text, column, key)? else {
            return Err(ViewerError::KeyColumnNotFound {
                file: name,
                column: column.to_string(),
            });
        };
        tracing::debug!(file = %name, column, key, "header rekeyed");
        self.files.push(SourceFile::new(name, text));
        Ok(())
    }

    /// Removes the file at `index`; out-of-range indices are ignored.
    pub fn remove(&mut self, index: usize) -> Option<SourceFile> {
        (index < self.files.len()).then(|| self.files.remove(index))
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn names(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
