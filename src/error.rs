use std::path::PathBuf;
use thiserror::Error;

pub type FeedResult<T> = Result<T, FeedError>;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Credentials error: {0}")]
    Credentials(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Failed to fetch sheet '{sheet}': {message}")]
    Fetch { sheet: String, message: String },

    #[error("No data found in sheet: {0}")]
    EmptySheet(String),

    #[error("Cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FeedError {
    /// Build a fetch failure for the given sheet
    pub fn fetch(sheet: &str, message: impl Into<String>) -> Self {
        FeedError::Fetch {
            sheet: sheet.to_string(),
            message: message.into(),
        }
    }

    /// Name of the sheet this error belongs to, if any
    pub fn sheet(&self) -> Option<&str> {
        match self {
            FeedError::Fetch { sheet, .. } => Some(sheet),
            FeedError::EmptySheet(sheet) => Some(sheet),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display() {
        let err = FeedError::fetch("Stock", "HTTP 404: Requested entity was not found.");
        assert_eq!(
            err.to_string(),
            "Failed to fetch sheet 'Stock': HTTP 404: Requested entity was not found."
        );
        assert_eq!(err.sheet(), Some("Stock"));
    }

    #[test]
    fn test_write_error_display() {
        let err = FeedError::Write {
            path: PathBuf::from("data/feed/cook.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("data/feed/cook.json"));
        assert!(err.to_string().contains("denied"));
        assert!(err.sheet().is_none());
    }

    #[test]
    fn test_read_error_names_path() {
        let err = FeedError::Read {
            path: PathBuf::from("rows/Stock.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
        };
        assert_eq!(
            err.to_string(),
            "Cannot read rows/Stock.json: No such file or directory"
        );
    }

    #[test]
    fn test_empty_sheet_display() {
        let err = FeedError::EmptySheet("General".to_string());
        assert_eq!(err.to_string(), "No data found in sheet: General");
    }
}
