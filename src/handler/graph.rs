//! Statements in N-Triples format, from graph queries and Graph Store fetches.

use super::ResultHandler;
use crate::error::{Error, Result};
use crate::sink::RdfSink;
use oxttl::NTriplesParser;
use oxttl::ntriples::LowLevelNTriplesParser;

/// Feeds body chunks to a push parser and forwards each statement
pub struct GraphQueryHandler {
    parser: LowLevelNTriplesParser,
    statements: u64,
}

impl GraphQueryHandler {
    /// Handler with strict IRI validation
    pub fn new() -> Self {
        Self::with_parser(NTriplesParser::new())
    }

    /// Handler that tolerates malformed IRIs in the response
    pub fn lenient() -> Self {
        Self::with_parser(NTriplesParser::new().lenient())
    }

    fn with_parser(parser: NTriplesParser) -> Self {
        Self {
            parser: parser.low_level(),
            statements: 0,
        }
    }

    fn forward_ready(&mut self, sink: &mut dyn RdfSink) -> Result<()> {
        while let Some(result) = self.parser.parse_next() {
            let triple = result.map_err(|e| Error::Protocol(format!("invalid N-Triples: {e}")))?;
            sink.handle_triple(triple)?;
            self.statements += 1;
        }
        Ok(())
    }
}

impl Default for GraphQueryHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultHandler for GraphQueryHandler {
    fn on_data(&mut self, chunk: &[u8], sink: &mut dyn RdfSink) -> Result<()> {
        self.parser.extend_from_slice(chunk);
        self.forward_ready(sink)
    }

    fn on_end(&mut self, sink: &mut dyn RdfSink) -> Result<()> {
        self.parser.end();
        self.forward_ready(sink)
    }

    fn records(&self) -> u64 {
        self.statements
    }
}
