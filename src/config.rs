//! Feed configuration
//!
//! Everything a run needs is resolved once at process entry and passed
//! down explicitly: the feed file, the credentials and the run options.

use crate::auth::{Credentials, ServiceAccountKey};
use crate::error::{FeedError, FeedResult};
use crate::types::SheetSource;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

/// Env var holding the service account key JSON inline
pub const SERVICE_ACCOUNT_KEY_ENV: &str = "GOOGLE_SERVICE_ACCOUNT_KEY";
/// Env var holding an API key (public sheets only)
pub const API_KEY_ENV: &str = "GOOGLE_SHEETS_API_KEY";

pub const DEFAULT_RANGE: &str = "A:Z";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_range() -> String {
    DEFAULT_RANGE.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Contents of the feed file
///
/// ```yaml
/// spreadsheet_id: "1cR05XN_ezXbB811eBvhY_-g7bmscmoLfbhzSOpG1U5U"
/// range: "A:Z"
/// sheets:
///   - name: General
///     output: data/feed/general-guide.json
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    pub spreadsheet_id: String,
    /// Column range fetched from every sheet
    #[serde(default = "default_range")]
    pub range: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    pub sheets: Vec<SheetSource>,
}

impl FeedConfig {
    pub fn new(spreadsheet_id: impl Into<String>, sheets: Vec<SheetSource>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            range: default_range(),
            timeout_secs: default_timeout_secs(),
            sheets,
        }
    }

    /// Load and validate a feed file
    pub fn from_path(path: &Path) -> FeedResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FeedError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate feed file contents
    pub fn from_yaml(content: &str) -> FeedResult<Self> {
        let config: FeedConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check the invariants a run relies on
    pub fn validate(&self) -> FeedResult<()> {
        if self.spreadsheet_id.trim().is_empty() {
            return Err(FeedError::Config("spreadsheet_id is empty".to_string()));
        }
        if self.range.trim().is_empty() {
            return Err(FeedError::Config("range is empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(FeedError::Config("timeout_secs must be positive".to_string()));
        }
        if self.sheets.is_empty() {
            return Err(FeedError::Config("No sheets configured".to_string()));
        }

        let mut outputs = HashSet::new();
        for sheet in &self.sheets {
            if sheet.name.trim().is_empty() {
                return Err(FeedError::Config("Sheet name is empty".to_string()));
            }
            validate_output_path(&sheet.name, &sheet.output)?;
            if !outputs.insert(normalize_output(&sheet.output)) {
                return Err(FeedError::Config(format!(
                    "Output {} is used by more than one sheet",
                    sheet.output.display()
                )));
            }
        }

        Ok(())
    }
}

/// Output path with `.` components dropped, so `./data/a.json` and
/// `data//a.json` compare equal to `data/a.json`
fn normalize_output(output: &Path) -> PathBuf {
    output
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

fn validate_output_path(sheet: &str, output: &Path) -> FeedResult<()> {
    if output.as_os_str().is_empty() {
        return Err(FeedError::Config(format!(
            "Sheet '{}' has an empty output path",
            sheet
        )));
    }
    let escapes = output
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(FeedError::Config(format!(
            "Sheet '{}': output {} must be relative and stay under the root",
            sheet,
            output.display()
        )));
    }
    Ok(())
}

/// Resolve credentials: an explicit key file wins, then the inline key env
/// var, then the API key env var.
pub fn resolve_credentials(key_file: Option<&Path>) -> FeedResult<Credentials> {
    resolve_credentials_with(key_file, |name| std::env::var(name).ok())
}

/// [`resolve_credentials`] with an injectable environment lookup
pub fn resolve_credentials_with<F>(key_file: Option<&Path>, env: F) -> FeedResult<Credentials>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = key_file {
        let json = std::fs::read_to_string(path).map_err(|e| {
            FeedError::Credentials(format!("Cannot read {}: {}", path.display(), e))
        })?;
        return ServiceAccountKey::from_json(&json).map(Credentials::ServiceAccount);
    }

    if let Some(json) = env(SERVICE_ACCOUNT_KEY_ENV).filter(|v| !v.trim().is_empty()) {
        return ServiceAccountKey::from_json(&json).map(Credentials::ServiceAccount);
    }

    if let Some(key) = env(API_KEY_ENV).filter(|v| !v.trim().is_empty()) {
        return Ok(Credentials::ApiKey(key.trim().to_string()));
    }

    Err(FeedError::Credentials(format!(
        "No credentials: pass --credentials or set {} or {}",
        SERVICE_ACCOUNT_KEY_ENV, API_KEY_ENV
    )))
}

/// Per-run behavior of the exporter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Output paths resolve against this directory
    pub root: PathBuf,
    /// Fetch and convert, but write nothing
    pub dry_run: bool,
    /// Abort the batch on an empty sheet instead of skipping it
    pub fail_on_empty: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            dry_run: false,
            fail_on_empty: false,
        }
    }
}

impl RunOptions {
    pub fn with_root<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    const FEED_YAML: &str = r#"
spreadsheet_id: "1cR05XN_ezXbB811eBvhY_-g7bmscmoLfbhzSOpG1U5U"
sheets:
  - name: General
    output: data/feed/general-guide.json
  - name: Stock
    outputPath: data/feed/stock.json
  - name: Cook
    output: data/feed/cook.json
"#;

    #[test]
    fn test_from_yaml_defaults() {
        let config = FeedConfig::from_yaml(FEED_YAML).unwrap();
        assert_eq!(config.range, "A:Z");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        let names: Vec<&str> = config.sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["General", "Stock", "Cook"]);
        assert_eq!(config.sheets[1].output, PathBuf::from("data/feed/stock.json"));
    }

    #[test]
    fn test_validate_rejects_shared_output() {
        let config = FeedConfig::new(
            "id",
            vec![
                SheetSource::new("A", "out.json"),
                SheetSource::new("B", "out.json"),
            ],
        );
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("more than one sheet"));
    }

    #[test]
    fn test_validate_rejects_shared_output_spelled_differently() {
        for (a, b) in [
            ("data/a.json", "./data/a.json"),
            ("data/a.json", "data/./a.json"),
            ("data/a.json", "data//a.json"),
        ] {
            let config = FeedConfig::new(
                "id",
                vec![SheetSource::new("A", a), SheetSource::new("B", b)],
            );
            assert!(
                config.validate().is_err(),
                "{} and {} name the same file",
                a,
                b
            );
        }

        let distinct = FeedConfig::new(
            "id",
            vec![
                SheetSource::new("A", "data/a.json"),
                SheetSource::new("B", "./data/b.json"),
            ],
        );
        assert!(distinct.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_escaping_paths() {
        for output in ["../site/data.json", "/etc/data.json", "data/../../x.json"] {
            let config = FeedConfig::new("id", vec![SheetSource::new("A", output)]);
            assert!(config.validate().is_err(), "{} should be rejected", output);
        }
        let ok = FeedConfig::new("id", vec![SheetSource::new("A", "./data/a.json")]);
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        assert!(FeedConfig::new("", vec![SheetSource::new("A", "a.json")])
            .validate()
            .is_err());
        assert!(FeedConfig::new("id", vec![]).validate().is_err());
        assert!(FeedConfig::new("id", vec![SheetSource::new(" ", "a.json")])
            .validate()
            .is_err());
    }

    #[test]
    fn test_from_yaml_missing_sheets_is_yaml_error() {
        let err = FeedConfig::from_yaml("spreadsheet_id: abc\n").unwrap_err();
        assert!(matches!(err, FeedError::Yaml(_)));
    }

    #[test]
    fn test_resolve_credentials_prefers_service_account_env() {
        let env: HashMap<&str, &str> = [
            (
                SERVICE_ACCOUNT_KEY_ENV,
                r#"{"client_email":"a@b.c","private_key":"pk"}"#,
            ),
            (API_KEY_ENV, "AIza"),
        ]
        .into_iter()
        .collect();
        let creds = resolve_credentials_with(None, |k| env.get(k).map(|v| v.to_string())).unwrap();
        assert!(matches!(creds, Credentials::ServiceAccount(_)));
    }

    #[test]
    fn test_resolve_credentials_api_key_fallback() {
        let creds = resolve_credentials_with(None, |k| {
            (k == API_KEY_ENV).then(|| " AIza ".to_string())
        })
        .unwrap();
        match creds {
            Credentials::ApiKey(key) => assert_eq!(key, "AIza"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_resolve_credentials_none() {
        let err = resolve_credentials_with(None, |_| None).unwrap_err();
        assert!(matches!(err, FeedError::Credentials(_)));
    }

    #[test]
    fn test_resolve_credentials_missing_key_file() {
        let err =
            resolve_credentials_with(Some(Path::new("/nonexistent/key.json")), |_| None).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/key.json"));
    }
}
