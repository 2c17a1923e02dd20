//! Storefront configuration.

use anyhow::{Context, Result};
use gm_auth::StorageKeys;
use gm_commerce::catalog::ImageRef;
use gm_commerce::money::Currency;
use serde::{Deserialize, Serialize};

/// Storefront configuration file.
///
/// ```toml
/// api_base_url = "https://api.globalmobiles.in"
/// media_origin = "https://api.globalmobiles.in"
/// currency = "INR"
///
/// [storage]
/// cart = "cart"
/// user_token = "user_token"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// Origin of the REST API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Origin serving uploaded images. Defaults to the API origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_origin: Option<String>,

    /// Currency prices are quoted in.
    #[serde(default)]
    pub currency: Currency,

    /// Client-side storage keys.
    #[serde(default)]
    pub storage: StorageKeys,
}

fn default_api_base_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            media_origin: None,
            currency: Currency::default(),
            storage: StorageKeys::default(),
        }
    }
}

impl StorefrontConfig {
    /// Load config from a file. `.json` files are JSON, anything else TOML.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        Self::parse(path, &content)
    }

    /// Parse config text, picking the format from `path`'s extension.
    pub fn parse(path: &str, content: &str) -> Result<Self> {
        let config: Self = if path.ends_with(".json") {
            serde_json::from_str(content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))?
        } else {
            toml::from_str(content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Save config to a file.
    pub fn save(&self, path: &str) -> Result<()> {
        let content = if path.ends_with(".json") {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path))
    }

    fn validate(&self) -> Result<()> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            anyhow::bail!("api_base_url must be an http(s) URL, got {:?}", self.api_base_url);
        }
        let keys = [
            &self.storage.cart,
            &self.storage.user_token,
            &self.storage.admin_token,
            &self.storage.user,
        ];
        if keys.iter().any(|k| k.trim().is_empty()) {
            anyhow::bail!("storage keys must not be empty");
        }
        Ok(())
    }

    /// The origin images are served from.
    pub fn media_origin(&self) -> &str {
        self.media_origin
            .as_deref()
            .unwrap_or(&self.api_base_url)
            .trim_end_matches('/')
    }

    /// Absolute URL for an image reference.
    ///
    /// References are relative paths such as `static/products/x.png`;
    /// anything already absolute is returned unchanged.
    pub fn media_url(&self, image: &ImageRef) -> String {
        let path = image.as_str();
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.media_origin(), path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:8000");
        assert_eq!(config.currency, Currency::INR);
        assert_eq!(config.storage.cart, "cart");
        assert_eq!(config.storage.admin_token, "admin_token");
    }

    #[test]
    fn test_parse_toml_with_partial_storage() {
        let config = StorefrontConfig::parse(
            "storefront.toml",
            r#"
            api_base_url = "https://api.globalmobiles.in"
            currency = "INR"

            [storage]
            cart = "gm_cart"
            "#,
        )
        .unwrap();
        assert_eq!(config.storage.cart, "gm_cart");
        assert_eq!(config.storage.user, "user");
        assert_eq!(config.media_origin(), "https://api.globalmobiles.in");
    }

    #[test]
    fn test_parse_json() {
        let config = StorefrontConfig::parse(
            "storefront.json",
            r#"{"api_base_url": "http://10.0.0.2:8000", "media_origin": "https://cdn.gm.in/"}"#,
        )
        .unwrap();
        assert_eq!(config.media_origin(), "https://cdn.gm.in");
    }

    #[test]
    fn test_invalid_config_has_context() {
        let err = StorefrontConfig::parse("bad.toml", "api_base_url = 5").unwrap_err();
        assert!(err.to_string().contains("bad.toml"));

        let err = StorefrontConfig::parse("x.toml", r#"api_base_url = "ftp://x""#).unwrap_err();
        assert!(err.to_string().contains("http(s)"));
    }

    #[test]
    fn test_media_url() {
        let config = StorefrontConfig::default();
        assert_eq!(
            config.media_url(&ImageRef::new("static/products/a.png")),
            "http://localhost:8000/static/products/a.png"
        );
        assert_eq!(
            config.media_url(&ImageRef::new("https://cdn/x.png")),
            "https://cdn/x.png"
        );
    }
}
