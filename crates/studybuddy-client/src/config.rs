//! Client configuration loaded from environment variables.
//!
//! All settings have defaults pointing at the hosted deployment, so the
//! client starts with zero configuration.

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the identity provider API.
    /// Env: `STUDYBUDDY_AUTH_URL`
    /// Default: `https://auth.studybuddy.app`
    pub auth_url: String,

    /// Base URL of the document store holding profile records.
    /// Env: `STUDYBUDDY_STORE_URL`
    /// Default: `https://store.studybuddy.app`
    pub store_url: String,

    /// Full URL of the image upload endpoint.
    /// Env: `STUDYBUDDY_UPLOAD_URL`
    /// Default: `https://media.studybuddy.app/image/upload`
    pub upload_url: String,

    /// Unsigned upload preset passed with every image upload.
    /// Env: `STUDYBUDDY_UPLOAD_PRESET`
    /// Default: `studybuddy-profile`
    pub upload_preset: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            auth_url: "https://auth.studybuddy.app".to_string(),
            store_url: "https://store.studybuddy.app".to_string(),
            upload_url: "https://media.studybuddy.app/image/upload".to_string(),
            upload_preset: "studybuddy-profile".to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("STUDYBUDDY_AUTH_URL") {
            config.auth_url = url;
        }
        if let Ok(url) = std::env::var("STUDYBUDDY_STORE_URL") {
            config.store_url = url;
        }
        if let Ok(url) = std::env::var("STUDYBUDDY_UPLOAD_URL") {
            config.upload_url = url;
        }
        if let Ok(preset) = std::env::var("STUDYBUDDY_UPLOAD_PRESET") {
            config.upload_preset = preset;
        }

        config
    }
}
