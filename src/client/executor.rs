//! Query evaluation and the streaming pipeline.
//!
//! Every operation follows the same shape:
//! 1. open the caller's output ([`OutputGuard`])
//! 2. build the RDF writer on top of it
//! 3. send the request and push each body frame through a [`ResultHandler`]
//! 4. finish the writer, then close the output
//!
//! The writer borrows the output and the response stream lives inside the
//! writer's scope, so on any early return they unwind innermost first and the
//! output is closed exactly once, after everything that writes to it is gone.

use super::SparqlClient;
use crate::diagnostics::{DiagnosticSource, translate};
use crate::endpoint::SparqlEndpoint;
use crate::error::{BoxError, ErrorKind, Result};
use crate::handler::{GraphQueryHandler, ResultHandler, TupleQueryHandler};
use crate::response::ResponseStream;
use crate::sink::{OutputGuard, RdfSink, RdfTarget};
use crate::types::{ExportSummary, GraphSelector, QueryKind};
use bytes::Bytes;
use http_body::Body;
use std::time::Instant;

/// What to ask the endpoint for
#[derive(Clone, Copy, Debug)]
pub(crate) enum Operation<'q> {
    /// SPARQL protocol query of the given kind
    Query { kind: QueryKind, sparql: &'q str },
    /// Graph Store Protocol fetch
    GraphStore(&'q GraphSelector),
}

impl Operation<'_> {
    fn kind(&self) -> QueryKind {
        match self {
            Operation::Query { kind, .. } => *kind,
            Operation::GraphStore(_) => QueryKind::GraphStore,
        }
    }
}

impl SparqlClient {
    /// Evaluate a SELECT query, streaming one bindings event per row
    ///
    /// # Errors
    ///
    /// Transport, protocol, server-reported or output errors. The output is
    /// closed before the error is returned; whatever was already written to it
    /// must be treated as incomplete.
    pub async fn execute_tuple_query(
        &self,
        query: &str,
        target: &dyn RdfTarget,
    ) -> Result<ExportSummary> {
        let endpoint = self.pool.choose();
        let operation = Operation::Query {
            kind: QueryKind::Tuple,
            sparql: query,
        };
        self.run(endpoint, operation, TupleQueryHandler::new(), target)
            .await
    }

    /// Evaluate a CONSTRUCT/DESCRIBE query, streaming one event per statement
    ///
    /// # Errors
    ///
    /// Same as [`SparqlClient::execute_tuple_query`].
    pub async fn execute_graph_query(
        &self,
        query: &str,
        target: &dyn RdfTarget,
    ) -> Result<ExportSummary> {
        let endpoint = self.pool.choose();
        let operation = Operation::Query {
            kind: QueryKind::Graph,
            sparql: query,
        };
        self.run(endpoint, operation, graph_handler(endpoint), target)
            .await
    }

    /// Fetch a whole graph from one freshly chosen endpoint
    pub(crate) async fn fetch_graph_store(
        &self,
        selector: &GraphSelector,
        target: &dyn RdfTarget,
    ) -> Result<ExportSummary> {
        let endpoint = self.pool.choose();
        self.run(
            endpoint,
            Operation::GraphStore(selector),
            graph_handler(endpoint),
            target,
        )
        .await
    }

    async fn run<H: ResultHandler>(
        &self,
        endpoint: &SparqlEndpoint,
        operation: Operation<'_>,
        mut handler: H,
        target: &dyn RdfTarget,
    ) -> Result<ExportSummary> {
        let started = Instant::now();
        let kind = operation.kind();

        let mut output = OutputGuard::new(target.create_output_writer()?);
        let streamed = self
            .stream_operation(endpoint, operation, &mut handler, target, &mut output)
            .await;

        if let Err(e) = streamed {
            tracing::debug!(
                endpoint = %endpoint.label(),
                kind = %kind,
                records = handler.records(),
                error = %e,
                "Export failed"
            );
            // Dropping the guard closes the output.
            drop(output);
            return Err(e);
        }
        output.close()?;

        let summary = ExportSummary {
            endpoint: endpoint.label().to_string(),
            kind,
            records: handler.records(),
            elapsed: started.elapsed(),
        };
        tracing::info!(
            endpoint = %summary.endpoint,
            kind = %summary.kind,
            records = summary.records,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Export complete"
        );
        Ok(summary)
    }

    async fn stream_operation<H: ResultHandler>(
        &self,
        endpoint: &SparqlEndpoint,
        operation: Operation<'_>,
        handler: &mut H,
        target: &dyn RdfTarget,
        output: &mut OutputGuard,
    ) -> Result<()> {
        let mut writer = target.create_rdf_writer(output.writer(), &self.toggles)?;

        let mut response = match operation {
            Operation::Query { kind, sparql } => endpoint.query(kind, sparql).await?,
            Operation::GraphStore(selector) => endpoint.fetch_graph(selector).await?,
        };

        pump(
            &mut response,
            handler,
            writer.as_mut(),
            endpoint.has_trailer_diagnostics(),
        )
        .await
    }
}

fn graph_handler(endpoint: &SparqlEndpoint) -> GraphQueryHandler {
    if endpoint.lenient_iri_parsing() {
        GraphQueryHandler::lenient()
    } else {
        GraphQueryHandler::new()
    }
}

/// Push every body frame through `handler` into `sink`, then finish the sink
///
/// On failure, and when `recover_trailers` is set, the rest of the body is
/// drained so a trailer diagnostic can be attached to the error. Output
/// failures are returned as-is: the server has nothing to say about them.
pub(crate) async fn pump<B, H>(
    response: &mut ResponseStream<B>,
    handler: &mut H,
    sink: &mut dyn RdfSink,
    recover_trailers: bool,
) -> Result<()>
where
    B: Body<Data = Bytes> + Unpin,
    B::Error: Into<BoxError>,
    H: ResultHandler + ?Sized,
{
    let streamed = async {
        while let Some(chunk) = response.next_chunk().await? {
            handler.on_data(&chunk, sink)?;
        }
        handler.on_end(sink)?;
        sink.finish()
    }
    .await;

    match streamed {
        Ok(()) => Ok(()),
        Err(error) if !recover_trailers || error.kind() == ErrorKind::Sink => Err(error),
        Err(error) => {
            response.drain().await;
            let diagnostic = response.recover_diagnostic();
            if diagnostic.is_none() {
                tracing::debug!(
                    endpoint = %response.endpoint(),
                    "No trailer diagnostic available for failed response"
                );
            }
            Err(translate(error, diagnostic))
        }
    }
}
