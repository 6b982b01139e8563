//! Service configuration

use crate::{EsignError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Service settings, loadable from JSON
///
/// Every field is optional in the JSON; missing fields use the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EsignConfig {
    /// Directory holding `documents/`, `signatures/` and `signed_documents/`
    pub media_root: PathBuf,
    pub default_from_email: String,
    /// Base URL prefixed to invitation links
    pub site_url: String,
    pub site_name: String,
    pub admin_notifications_enabled: bool,
    /// Notified in addition to super users
    pub additional_admin_emails: Vec<String>,
    pub invitation_ttl_days: i64,
    /// Largest accepted upload, in bytes
    pub max_upload_bytes: usize,
}

impl Default for EsignConfig {
    fn default() -> Self {
        Self {
            media_root: PathBuf::from("media"),
            default_from_email: "noreply@example.com".to_string(),
            site_url: "http://localhost:8000".to_string(),
            site_name: "E-Signature System".to_string(),
            admin_notifications_enabled: true,
            additional_admin_emails: Vec::new(),
            invitation_ttl_days: 7,
            max_upload_bytes: 10_485_760,
        }
    }
}

impl EsignConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            EsignError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<()> {
        if self.invitation_ttl_days <= 0 {
            return Err(EsignError::Config(
                "invitation_ttl_days must be positive".to_string(),
            ));
        }
        if self.max_upload_bytes == 0 {
            return Err(EsignError::Config("max_upload_bytes must be positive".to_string()));
        }
        Ok(())
    }

    /// `site_url` without a trailing slash
    pub fn site_base(&self) -> &str {
        self.site_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(EsignConfig::from_json("{}").unwrap(), EsignConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = EsignConfig::from_json(
            r#"{"site_url": "https://sign.example.com/", "additional_admin_emails": ["ops@example.com"]}"#,
        )
        .unwrap();
        assert_eq!(config.site_base(), "https://sign.example.com");
        assert_eq!(config.additional_admin_emails, vec!["ops@example.com"]);
        assert_eq!(config.invitation_ttl_days, 7);
        assert_eq!(config.max_upload_bytes, 10_485_760);
    }

    #[test]
    fn test_invalid_ttl_rejected() {
        let err = EsignConfig::from_json(r#"{"invitation_ttl_days": 0}"#).unwrap_err();
        assert!(matches!(err, EsignError::Config(_)));
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("esign.json");
        std::fs::write(&path, r#"{"site_name": "Acme Sign"}"#).unwrap();
        assert_eq!(EsignConfig::from_json_file(&path).unwrap().site_name, "Acme Sign");
        assert!(EsignConfig::from_json_file(dir.path().join("missing.json")).is_err());
    }
}
