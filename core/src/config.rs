//! Immutable client configuration.
//!
//! A [`Config`] is built once and handed to the client constructor; there is
//! no process-wide mutable configuration. The two host URLs are the only
//! routing inputs the dispatcher consults.

/// Default API host.
pub const DEFAULT_API_HOST: &str = "https://api.twitter.com";

/// Default host for the search endpoint family.
pub const DEFAULT_SEARCH_HOST: &str = "https://search.twitter.com";

/// Immutable configuration value passed to the client constructor.
#[derive(Debug, Clone)]
pub struct Config {
    api_host: String,
    search_host: String,
    screen_name: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_host: DEFAULT_API_HOST.to_string(),
            search_host: DEFAULT_SEARCH_HOST.to_string(),
            screen_name: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the default API host (scheme + authority, no trailing slash
    /// required).
    pub fn api_host(mut self, host: impl Into<String>) -> Self {
        self.api_host = host.into();
        self
    }

    /// Override the host used by the search endpoint family.
    pub fn search_host(mut self, host: impl Into<String>) -> Self {
        self.search_host = host.into();
        self
    }

    /// Screen name of the authenticated caller, used to resolve implicit
    /// ("me") identifiers. Leave unset for unauthenticated use.
    pub fn screen_name(mut self, name: impl Into<String>) -> Self {
        self.screen_name = Some(name.into());
        self
    }

    pub fn api_host_url(&self) -> &str {
        &self.api_host
    }

    pub fn search_host_url(&self) -> &str {
        &self.search_host
    }

    pub fn current_screen_name(&self) -> Option<&str> {
        self.screen_name.as_deref()
    }
}
