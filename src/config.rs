use std::str::FromStr;

use anyhow::{Context, Result};

// ---------------------------------------------------------------------------
// StoreBackend
// ---------------------------------------------------------------------------

/// Which `ReadingStore` implementation backs the HTTP API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "postgres" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(anyhow::anyhow!("unknown store backend: {other:?}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    /// `None` only when running against the in-memory store.
    pub database_url: Option<String>,
    pub store_backend: StoreBackend,
    pub server_host: String,
    pub server_port: u16,
    /// Directory served verbatim for any path the API does not handle.
    pub static_dir: String,
    /// File inside `static_dir` that `/` redirects to.
    pub index_page: String,
    pub weather_base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup so parsing can be
    /// exercised without mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let store_backend = vars
            .optional("STORE_BACKEND", "postgres")
            .parse::<StoreBackend>()
            .context("STORE_BACKEND must be 'postgres' or 'memory'")?;

        // MONGODB_URI is accepted for deployments carried over from the old service.
        let database_url = vars.get("DATABASE_URL").or_else(|| vars.get("MONGODB_URI"));
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            anyhow::bail!("missing required env var: DATABASE_URL");
        }

        let port = vars
            .get("PORT")
            .or_else(|| vars.get("SERVER_PORT"))
            .unwrap_or_else(|| "3000".to_owned());

        Ok(Self {
            database_url,
            store_backend,
            server_host: vars.optional("SERVER_HOST", "0.0.0.0"),
            server_port: port
                .parse()
                .context("PORT must be a valid port number")?,
            static_dir: vars.optional("STATIC_DIR", "public"),
            index_page: vars
                .optional("INDEX_PAGE", "client.html")
                .trim_start_matches('/')
                .to_owned(),
            weather_base_url: vars
                .optional("WEATHER_BASE_URL", "https://wttr.in")
                .trim_end_matches('/')
                .to_owned(),
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.is_empty())
    }

    fn optional(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let config = config_from(&[("DATABASE_URL", "postgres://localhost/readings")]).unwrap();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.static_dir, "public");
        assert_eq!(config.index_page, "client.html");
        assert_eq!(config.weather_base_url, "https://wttr.in");
        assert_eq!(config.store_backend, StoreBackend::Postgres);
        assert_eq!(config.listen_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn missing_database_url_errors_for_postgres() {
        let err = config_from(&[]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn memory_backend_does_not_need_database_url() {
        let config = config_from(&[("STORE_BACKEND", "memory")]).unwrap();
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn mongodb_uri_is_accepted_as_fallback() {
        let config = config_from(&[("MONGODB_URI", "postgres://db/readings")]).unwrap();
        assert_eq!(config.database_url.as_deref(), Some("postgres://db/readings"));
    }

    #[test]
    fn port_prefers_port_over_server_port() {
        let config = config_from(&[
            ("STORE_BACKEND", "memory"),
            ("PORT", "4000"),
            ("SERVER_PORT", "5000"),
        ])
        .unwrap();
        assert_eq!(config.server_port, 4000);
    }

    #[test]
    fn invalid_port_errors() {
        let err = config_from(&[("STORE_BACKEND", "memory"), ("PORT", "http")]).unwrap_err();
        assert!(err.to_string().contains("valid port"));
    }

    #[test]
    fn unknown_store_backend_errors() {
        let err = config_from(&[("STORE_BACKEND", "mongo")]).unwrap_err();
        assert!(err.to_string().contains("STORE_BACKEND"));
    }

    #[test]
    fn trailing_slash_and_leading_slash_are_normalized() {
        let config = config_from(&[
            ("STORE_BACKEND", "memory"),
            ("WEATHER_BASE_URL", "http://localhost:9000/"),
            ("INDEX_PAGE", "/index.html"),
        ])
        .unwrap();
        assert_eq!(config.weather_base_url, "http://localhost:9000");
        assert_eq!(config.index_page, "index.html");
    }
}
