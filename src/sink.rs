//! Output sink collaborators
//!
//! A caller hands the client an [`RdfTarget`] per call. The target opens a
//! scoped [`OutputWriter`] (where bytes go) and builds an [`RdfSink`] bound to
//! it (how RDF is formatted). The client owns the output for the duration of
//! the call through an [`OutputGuard`], which releases it exactly once on
//! every exit path.

use crate::error::{Error, Result};
use crate::toggles::FeatureToggles;
use crate::types::Bindings;
use oxrdf::{GraphName, Triple};
use std::io::Write;

/// Scoped byte destination (file, stdout, object-store upload, ...)
pub trait OutputWriter: Write + Send {
    /// Release the destination
    ///
    /// Called exactly once per call, after the RDF writer has been dropped.
    /// The default flushes.
    fn close(&mut self) -> std::io::Result<()> {
        self.flush()
    }
}

/// Receiver of streamed RDF events
///
/// Events arrive in server-delivery order, one per tuple row or statement, as
/// soon as the bytes describing them have been received.
pub trait RdfSink: Send {
    /// One statement from a graph query or Graph Store fetch
    fn handle_triple(&mut self, triple: Triple) -> Result<()>;

    /// One row of a tuple query
    fn handle_bindings(&mut self, bindings: Bindings) -> Result<()>;

    /// The stream ended successfully
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Caller-supplied factory for the output and the writer bound to it
pub trait RdfTarget: Send + Sync {
    /// Open the byte destination for one call
    fn create_output_writer(&self) -> Result<Box<dyn OutputWriter>>;

    /// Build an RDF writer that serializes into `output`
    fn create_rdf_writer<'a>(
        &self,
        output: &'a mut dyn OutputWriter,
        toggles: &FeatureToggles,
    ) -> Result<Box<dyn RdfSink + 'a>>;
}

/// Owns an [`OutputWriter`] for one call and closes it exactly once
pub struct OutputGuard {
    output: Box<dyn OutputWriter>,
    closed: bool,
}

impl OutputGuard {
    /// Take ownership of an opened output
    pub fn new(output: Box<dyn OutputWriter>) -> Self {
        Self {
            output,
            closed: false,
        }
    }

    /// Borrow the output for building an RDF writer
    pub fn writer(&mut self) -> &mut dyn OutputWriter {
        self.output.as_mut()
    }

    /// Close the output, reporting the close failure
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        self.output.close().map_err(Error::from)
    }
}

impl Drop for OutputGuard {
    fn drop(&mut self) {
        if !self.closed
            && let Err(e) = self.output.close()
        {
            tracing::warn!(error = %e, "Failed to close output while unwinding");
        }
    }
}

/// Built-in writer producing N-Triples / N-Quads lines
///
/// Statements are written as `s p o .`. Tuple rows binding `?s ?p ?o` and
/// optionally `?g` become `s p o g .`; any other row shape is rejected.
pub struct NQuadsWriter<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> NQuadsWriter<W> {
    /// Writer over `out`
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Give back the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> RdfSink for NQuadsWriter<W> {
    fn handle_triple(&mut self, triple: Triple) -> Result<()> {
        writeln!(
            self.out,
            "{} {} {} .",
            triple.subject, triple.predicate, triple.object
        )?;
        Ok(())
    }

    fn handle_bindings(&mut self, bindings: Bindings) -> Result<()> {
        let quad = bindings.to_quad().ok_or_else(|| {
            Error::Protocol(format!(
                "row does not describe a statement (expected ?s ?p ?o [?g]): {bindings:?}"
            ))
        })?;
        match &quad.graph_name {
            GraphName::DefaultGraph => writeln!(
                self.out,
                "{} {} {} .",
                quad.subject, quad.predicate, quad.object
            )?,
            graph => writeln!(
                self.out,
                "{} {} {} {} .",
                quad.subject, quad.predicate, quad.object, graph
            )?,
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
