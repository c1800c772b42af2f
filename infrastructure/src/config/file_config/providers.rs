//! Provider configuration from TOML (`[provider]` section)
//!
//! ```toml
//! [provider]
//! kind = "anthropic"                 # or "openai"
//! api_key_env = "ANTHROPIC_API_KEY"  # variable holding the key
//! base_url = "https://api.anthropic.com"
//! api_version = "2023-06-01"
//! ```
//!
//! Unset fields fall back to the defaults of the chosen `kind`. The key itself
//! is never read from the file.

use crate::providers::{ProviderKind, ProviderSettings};
use serde::{Deserialize, Serialize};
use superposition_domain::{ConfigIssue, ConfigIssueCode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Wire protocol: "openai" or "anthropic"
    pub kind: String,
    pub base_url: Option<String>,
    /// Environment variable name for the API key
    pub api_key_env: Option<String>,
    /// Anthropic API version header
    pub api_version: Option<String>,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default().as_str().to_string(),
            base_url: None,
            api_key_env: None,
            api_version: None,
        }
    }
}

impl FileProviderConfig {
    /// Resolve connection settings, reporting an unknown kind or blank values.
    pub fn to_settings(&self) -> (ProviderSettings, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        let kind = match self.kind.parse::<ProviderKind>() {
            Ok(kind) => kind,
            Err(_) => {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::UnknownValue,
                    format!(
                        "provider.kind: unknown value '{}' (valid: openai, anthropic)",
                        self.kind
                    ),
                ));
                ProviderKind::default()
            }
        };

        let mut settings = ProviderSettings::for_kind(kind);
        for (field, value, target) in [
            ("base_url", &self.base_url, &mut settings.base_url),
            ("api_key_env", &self.api_key_env, &mut settings.api_key_env),
            ("api_version", &self.api_version, &mut settings.api_version),
        ] {
            match value {
                Some(v) if v.trim().is_empty() => issues.push(ConfigIssue::error(
                    ConfigIssueCode::EmptyId,
                    format!("provider.{}: must not be blank", field),
                )),
                Some(v) => *target = v.trim().to_string(),
                None => {}
            }
        }

        (settings, issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_openai() {
        let (settings, issues) = FileProviderConfig::default().to_settings();
        assert!(issues.is_empty());
        assert_eq!(settings.kind, ProviderKind::OpenAi);
        assert_eq!(settings.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn test_overrides_apply_on_top_of_kind_defaults() {
        let config: FileProviderConfig = toml::from_str(
            r#"
kind = "anthropic"
api_key_env = "MY_CLAUDE_KEY"
"#,
        )
        .unwrap();

        let (settings, issues) = config.to_settings();
        assert!(issues.is_empty());
        assert_eq!(settings.kind, ProviderKind::Anthropic);
        assert_eq!(settings.api_key_env, "MY_CLAUDE_KEY");
        assert_eq!(settings.base_url, "https://api.anthropic.com");
    }

    #[test]
    fn test_unknown_kind_is_error() {
        let config = FileProviderConfig {
            kind: "bedrock".to_string(),
            ..Default::default()
        };
        let (settings, issues) = config.to_settings();
        assert_eq!(settings.kind, ProviderKind::OpenAi);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ConfigIssueCode::UnknownValue);
        assert!(issues[0].is_error());
    }

    #[test]
    fn test_blank_base_url_is_error() {
        let config = FileProviderConfig {
            base_url: Some("  ".to_string()),
            ..Default::default()
        };
        let (settings, issues) = config.to_settings();
        assert_eq!(settings.base_url, "https://api.openai.com/v1");
        assert_eq!(issues[0].code, ConfigIssueCode::EmptyId);
    }
}
