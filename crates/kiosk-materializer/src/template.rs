//! Access to the canonical template document.

use std::path::{Path, PathBuf};

use crate::MaterializeError;

/// Read access to the canonical template text.
///
/// The template is never written by the materializer; implementations only
/// need to return its current contents.
pub trait TemplateSource: Send + Sync {
    /// Return the full template text.
    fn read_template(&self) -> Result<String, MaterializeError>;
}

/// Template stored as a file on disk.
#[derive(Debug, Clone)]
pub struct FileTemplate {
    path: PathBuf,
}

impl FileTemplate {
    /// Create a template source reading from `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the template file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TemplateSource for FileTemplate {
    fn read_template(&self) -> Result<String, MaterializeError> {
        std::fs::read_to_string(&self.path).map_err(|source| MaterializeError::TemplateUnreadable {
            path: self.path.clone(),
            source,
        })
    }
}

impl TemplateSource for str {
    fn read_template(&self) -> Result<String, MaterializeError> {
        Ok(self.to_owned())
    }
}

impl TemplateSource for String {
    fn read_template(&self) -> Result<String, MaterializeError> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_template_reads_contents() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("index.html");
        std::fs::write(&path, "<head></head><body></body>").unwrap();

        let template = FileTemplate::new(&path);
        assert_eq!(template.path(), path.as_path());
        assert_eq!(template.read_template().unwrap(), "<head></head><body></body>");
    }

    #[test]
    fn test_file_template_missing_file() {
        let template = FileTemplate::new("/nonexistent/index.html");
        let err = template.read_template().unwrap_err();
        assert!(
            matches!(err, MaterializeError::TemplateUnreadable { ref path, .. } if path == Path::new("/nonexistent/index.html")),
            "got {err:?}"
        );
    }

    #[test]
    fn test_in_memory_template() {
        let text = String::from("<head></head><body></body>");
        assert_eq!(text.read_template().unwrap(), text);
        assert_eq!("abc".read_template().unwrap(), "abc");
    }
}
