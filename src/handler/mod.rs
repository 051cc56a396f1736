//! Push-style result handlers.
//!
//! A handler receives response body chunks exactly as they come off the wire
//! and forwards every complete record to an [`RdfSink`] before returning. Only
//! the incomplete tail of the last chunk is kept between calls.
//!
//! - [`TupleQueryHandler`] - tab-separated variable bindings, one event per row
//! - [`GraphQueryHandler`] - N-Triples statements, one event per statement

mod graph;
mod tuple;

pub use graph::GraphQueryHandler;
pub use tuple::TupleQueryHandler;

use crate::error::Result;
use crate::sink::RdfSink;

/// Incremental decoder from body bytes to RDF events
pub trait ResultHandler: Send {
    /// Decode `chunk` and forward every record it completes
    fn on_data(&mut self, chunk: &[u8], sink: &mut dyn RdfSink) -> Result<()>;

    /// The body ended: flush the tail, failing on a truncated record
    fn on_end(&mut self, sink: &mut dyn RdfSink) -> Result<()>;

    /// Records forwarded so far
    fn records(&self) -> u64;
}
