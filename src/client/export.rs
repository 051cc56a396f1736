//! Export operations.
//!
//! Whole-dataset and named-graph exports have two equivalent strategies: a
//! Graph Store Protocol fetch (cheaper, the default) or a tuple query over
//! every quad, selected by [`FeatureToggle::NoGsp`].

use super::SparqlClient;
use crate::error::{Error, Result};
use crate::sink::RdfTarget;
use crate::toggles::FeatureToggle;
use crate::types::{ExportSummary, GraphSelector};
use oxrdf::NamedNode;

/// Tuple query selecting every quad in every named graph
pub const COMPLETE_EXPORT_QUERY: &str = "SELECT * WHERE { GRAPH ?g { ?s ?p ?o } }";

/// Tuple query selecting every quad of one named graph
pub fn named_graph_query(graph: &str) -> String {
    format!("SELECT * WHERE {{ GRAPH ?g {{ ?s ?p ?o }} FILTER(?g = <{graph}>) .}}")
}

impl SparqlClient {
    /// Export the whole dataset
    ///
    /// With `No_GSP` enabled this runs [`COMPLETE_EXPORT_QUERY`]; otherwise it
    /// fetches the `default` graph through the Graph Store Protocol.
    pub async fn export_complete(&self, target: &dyn RdfTarget) -> Result<ExportSummary> {
        if self.use_tuple_queries() {
            self.execute_tuple_query(COMPLETE_EXPORT_QUERY, target)
                .await
        } else {
            self.export_graph_store(target, &GraphSelector::Default)
                .await
        }
    }

    /// Export one named graph
    ///
    /// # Errors
    ///
    /// [`Error::InvalidGraphName`] when `graph` is not an absolute IRI, in
    /// addition to the errors of the chosen export strategy.
    pub async fn export_named_graph(
        &self,
        target: &dyn RdfTarget,
        graph: &str,
    ) -> Result<ExportSummary> {
        let graph = NamedNode::new(graph).map_err(|e| Error::InvalidGraphName {
            name: graph.to_string(),
            reason: e.to_string(),
        })?;

        if self.use_tuple_queries() {
            self.execute_tuple_query(&named_graph_query(graph.as_str()), target)
                .await
        } else {
            self.export_graph_store(target, &GraphSelector::Named(graph.into_string()))
                .await
        }
    }

    /// Fetch a graph directly through the Graph Store Protocol
    ///
    /// Bypasses query evaluation: the N-Triples response body is parsed as it
    /// streams in and forwarded statement by statement. The whole fetch runs
    /// against one endpoint chosen for this call.
    pub async fn export_graph_store(
        &self,
        target: &dyn RdfTarget,
        selector: &GraphSelector,
    ) -> Result<ExportSummary> {
        tracing::debug!(selector = %selector, "Starting Graph Store Protocol export");
        self.fetch_graph_store(selector, target).await
    }

    fn use_tuple_queries(&self) -> bool {
        self.toggles.contains(FeatureToggle::NoGsp)
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnectionConfig;
    use crate::error::ErrorKind;
    use crate::sink::{NQuadsWriter, OutputWriter, RdfSink};
    use crate::toggles::FeatureToggles;

    #[test]
    fn complete_export_query_text() {
        assert_eq!(
            COMPLETE_EXPORT_QUERY,
            "SELECT * WHERE { GRAPH ?g { ?s ?p ?o } }"
        );
    }

    #[test]
    fn named_graph_query_filters_on_graph_variable() {
        let query = named_graph_query("urn:g1");
        assert!(query.contains("FILTER(?g = <urn:g1>)"));
        assert!(query.starts_with("SELECT * WHERE { GRAPH ?g { ?s ?p ?o }"));
    }

    struct NeverOpened;

    impl RdfTarget for NeverOpened {
        fn create_output_writer(&self) -> Result<Box<dyn OutputWriter>> {
            panic!("output must not be opened for a rejected graph name");
        }

        fn create_rdf_writer<'a>(
            &self,
            output: &'a mut dyn OutputWriter,
            _toggles: &FeatureToggles,
        ) -> Result<Box<dyn RdfSink + 'a>> {
            Ok(Box::new(NQuadsWriter::new(output)))
        }
    }

    #[tokio::test]
    async fn invalid_graph_name_is_rejected_before_any_io() {
        let client =
            SparqlClient::new(ConnectionConfig::new(["db-1"], 8182), FeatureToggles::none())
                .unwrap();

        let err = client
            .export_named_graph(&NeverOpened, "not an iri")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
