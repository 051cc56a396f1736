//! Configuration types for sparql-export

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable consulted for the signing region when `iam_auth` is
/// enabled and no region is configured explicitly
pub const SERVICE_REGION_ENV: &str = "SERVICE_REGION";

/// How an endpoint is picked from the pool for each operation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Uniform random choice per call (default)
    #[default]
    Random,
    /// Rotate through endpoints in configuration order
    RoundRobin,
}

/// Connection settings for a cluster of equivalent read-replica endpoints
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Endpoint hostnames (at least one required)
    pub endpoints: Vec<String>,

    /// Port shared by all endpoints (default: 8182)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Use HTTPS (default: true)
    #[serde(default = "default_true")]
    pub tls: bool,

    /// Sign requests with IAM-style credentials
    ///
    /// When enabled a region is required, either from `service_region` or the
    /// `SERVICE_REGION` environment variable, and a request signer must be
    /// supplied to the client.
    #[serde(default)]
    pub iam_auth: bool,

    /// Signing region (falls back to `SERVICE_REGION` when unset)
    #[serde(default)]
    pub service_region: Option<String>,

    /// Path of the SPARQL query service on each endpoint (default: "/sparql")
    #[serde(default = "default_query_path")]
    pub query_path: String,

    /// Ask endpoints for response trailers and recover error diagnostics from
    /// them (default: true)
    #[serde(default = "default_true")]
    pub trailer_diagnostics: bool,

    /// Endpoint selection strategy (default: random)
    #[serde(default)]
    pub selection: SelectionStrategy,

    /// TCP connect timeout (default: 30 seconds)
    ///
    /// There is deliberately no overall request timeout: exports stream for as
    /// long as the server keeps sending.
    #[serde(default = "default_connect_timeout", with = "duration_serde")]
    pub connect_timeout: Duration,

    /// Treat invalid IRI syntax in N-Triples responses as non-fatal
    /// (default: true)
    #[serde(default = "default_true")]
    pub lenient_iri_parsing: bool,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            endpoints: Vec::new(),
            port: default_port(),
            tls: true,
            iam_auth: false,
            service_region: None,
            query_path: default_query_path(),
            trailer_diagnostics: true,
            selection: SelectionStrategy::default(),
            connect_timeout: default_connect_timeout(),
            lenient_iri_parsing: true,
            user_agent: default_user_agent(),
        }
    }
}

impl ConnectionConfig {
    /// Config for the given hosts on a shared port, everything else default
    pub fn new<I, S>(endpoints: I, port: u16) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            endpoints: endpoints.into_iter().map(Into::into).collect(),
            port,
            ..Default::default()
        }
    }

    /// Check the settings that can be checked without touching the network
    pub fn validate(&self) -> Result<()> {
        if self.endpoints.is_empty() {
            return Err(Error::config(
                "at least one endpoint must be configured",
                "endpoints",
            ));
        }
        if let Some(blank) = self.endpoints.iter().position(|e| e.trim().is_empty()) {
            return Err(Error::config(
                format!("endpoint #{blank} is blank"),
                "endpoints",
            ));
        }
        if self.port == 0 {
            return Err(Error::config("port must be non-zero", "port"));
        }
        for host in &self.endpoints {
            let url = url::Url::parse(&self.endpoint_url(host)).map_err(|e| {
                Error::config(format!("invalid endpoint host {host:?}: {e}"), "endpoints")
            })?;
            if url.path() != "/" {
                return Err(Error::config(
                    format!("endpoint {host:?} must be a bare host name, not a URL"),
                    "endpoints",
                ));
            }
        }
        if !self.query_path.starts_with('/') {
            return Err(Error::config(
                format!("query path {:?} must start with '/'", self.query_path),
                "query_path",
            ));
        }
        Ok(())
    }

    /// Base URL of an endpoint, e.g. `https://db-1.example.com:8182`
    pub fn endpoint_url(&self, host: &str) -> String {
        let scheme = if self.tls { "https" } else { "http" };
        format!("{}://{}:{}", scheme, host.trim(), self.port)
    }

    /// Signing region, required only when `iam_auth` is enabled
    ///
    /// Returns `Ok(None)` when signing is off. A missing region with signing
    /// on is a configuration error.
    pub fn resolve_region(&self) -> Result<Option<String>> {
        if !self.iam_auth {
            return Ok(None);
        }
        if let Some(region) = self.service_region.as_deref().map(str::trim)
            && !region.is_empty()
        {
            return Ok(Some(region.to_string()));
        }
        match std::env::var(SERVICE_REGION_ENV) {
            Ok(region) if !region.trim().is_empty() => Ok(Some(region.trim().to_string())),
            _ => Err(Error::config(
                format!(
                    "iam_auth is enabled but no region is configured; set service_region or {SERVICE_REGION_ENV}"
                ),
                SERVICE_REGION_ENV,
            )),
        }
    }
}

fn default_port() -> u16 {
    8182
}

fn default_true() -> bool {
    true
}

fn default_query_path() -> String {
    "/sparql".to_string()
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    concat!("sparql-export/", env!("CARGO_PKG_VERSION")).to_string()
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
