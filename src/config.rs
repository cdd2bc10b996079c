use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Default address of a locally running CouchDB instance.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5984";

/// Instance configuration supplied by the host environment.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub url: Url,
    /// Pre-encoded value for the `Authorization` header (e.g. `Basic ...`).
    /// Attached to every request when non-empty.
    #[serde(default)]
    pub basic_auth: Option<String>,
    /// The maximum time limit for a single request. If a request takes longer
    /// than this, it will be cancelled. Defaults to 30 seconds.
    #[serde(default = "defaults::http_timeout")]
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Url::parse(DEFAULT_BASE_URL).unwrap())
    }
}

impl Config {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            basic_auth: None,
            http_timeout: defaults::http_timeout(),
        }
    }

    pub fn basic_auth(mut self, credential: impl Into<String>) -> Self {
        self.basic_auth = Some(credential.into());
        self
    }

    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }
}

mod defaults {
    use std::time::Duration;

    pub fn http_timeout() -> Duration {
        Duration::from_secs(30)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_points_at_local_couchdb() {
        let config = Config::default();
        assert_eq!(config.url.as_str(), "http://localhost:5984/");
        assert_eq!(config.basic_auth, None);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
    }

    #[test]
    fn deserialize_with_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"url": "http://couch.internal:5984"}"#).unwrap();
        assert_eq!(config.url.as_str(), "http://couch.internal:5984/");
        assert_eq!(config.basic_auth, None);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
    }

    #[test]
    fn deserialize_full() {
        let config: Config = serde_json::from_str(
            r#"{
                "url": "https://couch.example.com",
                "basic_auth": "Basic dXNlcjpwYXNz",
                "http_timeout": {"secs": 5, "nanos": 0}
            }"#,
        )
        .unwrap();
        assert_eq!(config.basic_auth.as_deref(), Some("Basic dXNlcjpwYXNz"));
        assert_eq!(config.http_timeout, Duration::from_secs(5));
    }
}
