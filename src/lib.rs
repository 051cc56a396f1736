//! # sparql-export
//!
//! Streaming export client for clusters of SPARQL read replicas.
//!
//! ## Design
//!
//! sparql-export is designed to be:
//! - **Streaming** - results go to the output as they arrive, never buffered whole
//! - **Replica-aware** - every call picks one endpoint from a shared, read-only pool
//! - **Honest about failure** - server diagnostics sent in response trailers are
//!   surfaced with the local error; nothing is retried
//! - **Library-first** - output destinations and RDF writers are plugged in by
//!   the caller through [`RdfTarget`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use sparql_export::{
//!     ConnectionConfig, FeatureToggles, NQuadsWriter, OutputWriter, RdfSink, RdfTarget,
//!     SparqlClient,
//! };
//!
//! struct Stdout;
//!
//! impl RdfTarget for Stdout {
//!     fn create_output_writer(&self) -> sparql_export::Result<Box<dyn OutputWriter>> {
//!         struct Out(std::io::Stdout);
//!         impl std::io::Write for Out {
//!             fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> { self.0.write(buf) }
//!             fn flush(&mut self) -> std::io::Result<()> { self.0.flush() }
//!         }
//!         impl OutputWriter for Out {}
//!         Ok(Box::new(Out(std::io::stdout())))
//!     }
//!
//!     fn create_rdf_writer<'a>(
//!         &self,
//!         output: &'a mut dyn OutputWriter,
//!         _toggles: &FeatureToggles,
//!     ) -> sparql_export::Result<Box<dyn RdfSink + 'a>> {
//!         Ok(Box::new(NQuadsWriter::new(output)))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConnectionConfig::new(["db-1.example.com", "db-2.example.com"], 8182);
//!     let client = SparqlClient::new(config, FeatureToggles::none())?;
//!
//!     let summary = client.export_complete(&Stdout).await?;
//!     eprintln!("exported {} statements from {}", summary.records, summary.endpoint);
//!
//!     client.close();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Client, query execution and export operations
pub mod client;
/// Configuration types
pub mod config;
/// Server diagnostic recovery from response trailers
pub mod diagnostics;
/// Query endpoints and endpoint selection
pub mod endpoint;
/// Error types
pub mod error;
/// Streaming result handlers
pub mod handler;
/// Output sink collaborators
pub mod sink;
/// Feature toggles
pub mod toggles;
/// Core types
pub mod types;

mod response;

// Re-export commonly used types
pub use client::{COMPLETE_EXPORT_QUERY, SparqlClient, named_graph_query};
pub use config::{ConnectionConfig, SelectionStrategy};
pub use diagnostics::DiagnosticSource;
pub use endpoint::{EndpointPool, RequestSigner, SparqlEndpoint};
pub use error::{Error, ErrorKind, Result};
pub use sink::{NQuadsWriter, OutputGuard, OutputWriter, RdfSink, RdfTarget};
pub use toggles::{FeatureToggle, FeatureToggles};
pub use types::{Bindings, ExportSummary, GraphSelector, QueryKind};
