//! Query endpoints and the pool they are chosen from.
//!
//! - [`SparqlEndpoint`] - one connection handle per configured host
//! - [`EndpointPool`] - the non-empty set of handles and the selection policy
//! - [`RequestSigner`] - hook for IAM-style request signing

mod pool;
mod signing;

pub use pool::EndpointPool;
pub use signing::RequestSigner;

pub(crate) use signing::SigningContext;

use crate::config::ConnectionConfig;
use crate::diagnostics::message_from_error_body;
use crate::error::{Error, Result};
use crate::response::ResponseStream;
use crate::types::{GraphSelector, QueryKind};
use reqwest::header::{ACCEPT, TE};

/// Path of the Graph Store Protocol service, relative to the endpoint root
pub const GRAPH_STORE_PATH: &str = "/sparql/gsp/";

/// Cap on how much of a non-success response body is read for its message
const MAX_ERROR_BODY_BYTES: usize = 64 * 1024;

/// Connection handle for one query endpoint
///
/// Holds its own HTTP client (and therefore its own connection pool). All
/// settings are fixed at construction; handles are shared read-only between
/// concurrent calls.
#[derive(Debug)]
pub struct SparqlEndpoint {
    label: String,
    base_url: String,
    query_url: String,
    client: reqwest::Client,
    signing: Option<SigningContext>,
    trailer_diagnostics: bool,
    lenient_iri_parsing: bool,
}

impl SparqlEndpoint {
    /// Open a handle for `host` using the shared connection settings
    pub(crate) fn open(
        host: &str,
        config: &ConnectionConfig,
        signing: Option<SigningContext>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                Error::config(
                    format!("failed to build HTTP client for {host}: {e}"),
                    "endpoints",
                )
            })?;

        let base_url = config.endpoint_url(host);
        Ok(Self {
            label: format!("{}:{}", host.trim(), config.port),
            query_url: format!("{}{}", base_url, config.query_path),
            base_url,
            client,
            signing,
            trailer_diagnostics: config.trailer_diagnostics,
            lenient_iri_parsing: config.lenient_iri_parsing,
        })
    }

    /// `host:port`, used in logs and errors
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Endpoint root, e.g. `https://db-1:8182`
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// SPARQL query service URL
    pub fn query_url(&self) -> &str {
        &self.query_url
    }

    /// Graph Store Protocol URL for `selector`
    pub fn graph_store_url(&self, selector: &GraphSelector) -> String {
        format!(
            "{}{}?{}",
            self.base_url,
            GRAPH_STORE_PATH,
            selector.query_string()
        )
    }

    /// Whether failures on this endpoint are enriched from response trailers
    pub fn has_trailer_diagnostics(&self) -> bool {
        self.trailer_diagnostics
    }

    /// Whether this endpoint signs its requests
    pub fn is_signed(&self) -> bool {
        self.signing.is_some()
    }

    pub(crate) fn lenient_iri_parsing(&self) -> bool {
        self.lenient_iri_parsing
    }

    /// Evaluate `sparql` via the SPARQL 1.1 protocol (form-encoded POST)
    pub(crate) async fn query(
        &self,
        kind: QueryKind,
        sparql: &str,
    ) -> Result<ResponseStream<reqwest::Body>> {
        let request = self
            .client
            .post(&self.query_url)
            .header(ACCEPT, kind.accept())
            .form(&[("query", sparql)]);
        self.dispatch(request).await
    }

    /// Fetch a whole graph via the Graph Store Protocol
    pub(crate) async fn fetch_graph(
        &self,
        selector: &GraphSelector,
    ) -> Result<ResponseStream<reqwest::Body>> {
        let request = self
            .client
            .get(self.graph_store_url(selector))
            .header(ACCEPT, QueryKind::GraphStore.accept());
        self.dispatch(request).await
    }

    async fn dispatch(
        &self,
        mut builder: reqwest::RequestBuilder,
    ) -> Result<ResponseStream<reqwest::Body>> {
        if self.trailer_diagnostics {
            builder = builder.header(TE, "trailers");
        }
        let mut request = builder
            .build()
            .map_err(|e| Error::transport(self.label.clone(), e))?;
        if let Some(signing) = &self.signing {
            signing.sign(&mut request)?;
        }

        tracing::debug!(
            endpoint = %self.label,
            method = %request.method(),
            url = %request.url(),
            "Dispatching request"
        );

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| Error::transport(self.label.clone(), e))?;

        let status = response.status();
        if !status.is_success() {
            let body = read_error_body(response).await;
            return Err(Error::Http {
                endpoint: self.label.clone(),
                status: status.as_u16(),
                message: message_from_error_body(&body),
            });
        }

        Ok(ResponseStream::new(
            reqwest::Body::from(response),
            self.label.clone(),
        ))
    }
}

/// Read at most [`MAX_ERROR_BODY_BYTES`] of an error response
async fn read_error_body(mut response: reqwest::Response) -> String {
    let mut body = Vec::new();
    while body.len() < MAX_ERROR_BODY_BYTES {
        match response.chunk().await {
            Ok(Some(chunk)) => body.extend_from_slice(&chunk),
            Ok(None) | Err(_) => break,
        }
    }
    body.truncate(MAX_ERROR_BODY_BYTES);
    String::from_utf8_lossy(&body).into_owned()
}
