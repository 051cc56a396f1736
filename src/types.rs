//! Core types for sparql-export

use oxrdf::{GraphName, NamedNode, NamedOrBlankNode, Quad, Term, Variable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// The three export protocols
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    /// SELECT query returning variable bindings
    Tuple,
    /// CONSTRUCT/DESCRIBE query returning statements
    Graph,
    /// Direct Graph Store Protocol fetch of a whole graph
    GraphStore,
}

impl QueryKind {
    /// Media type requested from the endpoint
    pub fn accept(&self) -> &'static str {
        match self {
            QueryKind::Tuple => "text/tab-separated-values",
            QueryKind::Graph | QueryKind::GraphStore => "application/n-triples",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKind::Tuple => write!(f, "tuple"),
            QueryKind::Graph => write!(f, "graph"),
            QueryKind::GraphStore => write!(f, "graph-store"),
        }
    }
}

/// Which graph a Graph Store Protocol fetch targets
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum GraphSelector {
    /// Everything the server exposes as its default graph
    Default,
    /// A single named graph
    Named(String),
}

impl GraphSelector {
    /// Query string sent on the wire, with the graph IRI percent-encoded
    pub fn query_string(&self) -> String {
        match self {
            GraphSelector::Default => "default".to_string(),
            GraphSelector::Named(iri) => format!("graph={}", urlencoding::encode(iri)),
        }
    }
}

impl fmt::Display for GraphSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphSelector::Default => write!(f, "default"),
            GraphSelector::Named(iri) => write!(f, "graph={iri}"),
        }
    }
}

/// One row of a tuple result: every bound variable in header order
///
/// Unbound variables are simply absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bindings {
    values: Vec<(Variable, Term)>,
}

impl Bindings {
    /// Empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `variable` to `value`
    pub fn push(&mut self, variable: Variable, value: Term) {
        self.values.push((variable, value));
    }

    /// Value bound to the variable named `name` (without `?`)
    pub fn get(&self, name: &str) -> Option<&Term> {
        self.values
            .iter()
            .find(|(variable, _)| variable.as_str() == name)
            .map(|(_, value)| value)
    }

    /// Bound variables in header order
    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &Term)> {
        self.values.iter().map(|(variable, value)| (variable, value))
    }

    /// Number of bound variables
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no variable is bound
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Statement described by a `?s ?p ?o [?g]` row
    ///
    /// Returns `None` when `s`, `p` or `o` is unbound, or when a position holds
    /// a term that cannot appear there (a literal subject, a non-IRI predicate,
    /// a literal graph name). An unbound `g` maps to the default graph.
    pub fn to_quad(&self) -> Option<Quad> {
        let subject = match self.get("s")? {
            Term::NamedNode(node) => NamedOrBlankNode::from(node.clone()),
            Term::BlankNode(node) => NamedOrBlankNode::from(node.clone()),
            _ => return None,
        };
        let predicate: NamedNode = match self.get("p")? {
            Term::NamedNode(node) => node.clone(),
            _ => return None,
        };
        let object = self.get("o")?.clone();
        let graph_name = match self.get("g") {
            None => GraphName::DefaultGraph,
            Some(Term::NamedNode(node)) => GraphName::from(node.clone()),
            Some(Term::BlankNode(node)) => GraphName::from(node.clone()),
            Some(_) => return None,
        };
        Some(Quad::new(subject, predicate, object, graph_name))
    }
}

/// Outcome of a completed export call
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportSummary {
    /// Endpoint that served the export
    pub endpoint: String,
    /// Protocol used
    pub kind: QueryKind,
    /// Rows (tuple) or statements (graph, graph store) forwarded to the writer
    pub records: u64,
    /// Wall-clock time from dispatch to writer finish
    pub elapsed: Duration,
}
