//! SPARQL export client split into focused submodules.
//!
//! The `SparqlClient` struct and its methods are organized by concern:
//! - [`executor`] - tuple/graph query evaluation and the streaming pipeline
//! - [`export`] - full, named-graph and Graph Store Protocol exports

mod executor;
mod export;

pub use export::{COMPLETE_EXPORT_QUERY, named_graph_query};

use crate::config::ConnectionConfig;
use crate::endpoint::{EndpointPool, RequestSigner, SigningContext, SparqlEndpoint};
use crate::error::{Error, Result};
use crate::toggles::FeatureToggles;
use std::sync::Arc;

/// Streaming export client over a pool of read-replica endpoints
///
/// Cheap to share: wrap it in an `Arc` and call export operations from as many
/// tasks as needed. Each call picks its own endpoint; nothing mutable is
/// shared between calls.
#[derive(Debug)]
pub struct SparqlClient {
    pool: EndpointPool,
    toggles: FeatureToggles,
}

impl SparqlClient {
    /// Create a client for unsigned endpoints
    ///
    /// No network I/O happens here. Fails with a configuration error when no
    /// endpoint is configured, or when `iam_auth` is enabled (which needs
    /// [`SparqlClient::with_signer`]).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sparql_export::{ConnectionConfig, FeatureToggles, SparqlClient};
    ///
    /// let config = ConnectionConfig::new(["db-1.example.com", "db-2.example.com"], 8182);
    /// let client = SparqlClient::new(config, FeatureToggles::none())?;
    /// assert_eq!(client.endpoints().len(), 2);
    /// # Ok::<(), sparql_export::Error>(())
    /// ```
    pub fn new(config: ConnectionConfig, toggles: FeatureToggles) -> Result<Self> {
        Self::build(&config, toggles, None)
    }

    /// Create a client whose requests are signed by `signer`
    ///
    /// The signing region comes from `config.service_region` or the
    /// `SERVICE_REGION` environment variable; a missing region is a
    /// configuration error.
    pub fn with_signer(
        config: ConnectionConfig,
        toggles: FeatureToggles,
        signer: Arc<dyn RequestSigner>,
    ) -> Result<Self> {
        Self::build(&config, toggles, Some(signer))
    }

    fn build(
        config: &ConnectionConfig,
        toggles: FeatureToggles,
        signer: Option<Arc<dyn RequestSigner>>,
    ) -> Result<Self> {
        config.validate()?;

        let signing = match (config.resolve_region()?, signer) {
            (Some(region), Some(signer)) => Some(SigningContext { signer, region }),
            (Some(_), None) => {
                return Err(Error::config(
                    "iam_auth is enabled but no request signer was supplied",
                    "iam_auth",
                ));
            }
            (None, Some(_)) => {
                tracing::warn!("Request signer supplied but iam_auth is disabled; ignoring it");
                None
            }
            (None, None) => None,
        };

        let endpoints = config
            .endpoints
            .iter()
            .map(|host| SparqlEndpoint::open(host, config, signing.clone()))
            .collect::<Result<Vec<_>>>()?;
        let pool = EndpointPool::new(endpoints, config.selection)?;

        tracing::info!(
            endpoints = pool.len(),
            signed = signing.is_some(),
            strategy = ?pool.strategy(),
            toggles = ?toggles,
            "SPARQL export client ready"
        );

        Ok(Self { pool, toggles })
    }

    /// The endpoint pool
    pub fn endpoints(&self) -> &EndpointPool {
        &self.pool
    }

    /// Feature toggles consulted by the export operations
    pub fn feature_toggles(&self) -> &FeatureToggles {
        &self.toggles
    }

    /// Shut down every endpoint
    pub fn close(self) {
        let endpoints = self.pool.len();
        self.pool.close();
        tracing::info!(endpoints, "SPARQL export client closed");
    }
}
