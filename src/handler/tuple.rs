//! Tuple query results in SPARQL 1.1 TSV format.
//!
//! The first line lists the variables (`?s\t?p\t?o`); every following line is
//! one row whose fields are terms in Turtle/N-Triples syntax. An empty field
//! means the variable is unbound in that row.

use super::ResultHandler;
use crate::error::{Error, Result};
use crate::sink::RdfSink;
use crate::types::Bindings;
use oxrdf::{Term, Variable};
use std::str::FromStr;

/// Decodes TSV rows into one [`Bindings`] event each
#[derive(Debug, Default)]
pub struct TupleQueryHandler {
    pending: Vec<u8>,
    /// Prefix of `pending` already searched for a line break
    scanned: usize,
    variables: Option<Vec<Variable>>,
    line: u64,
    rows: u64,
}

impl TupleQueryHandler {
    /// Handler expecting a header line first
    pub fn new() -> Self {
        Self::default()
    }

    /// Variables announced by the header, once it has been read
    pub fn variables(&self) -> Option<&[Variable]> {
        self.variables.as_deref()
    }

    fn handle_line(&mut self, raw: &[u8], sink: &mut dyn RdfSink) -> Result<()> {
        self.line += 1;
        let line = std::str::from_utf8(raw)
            .map_err(|e| Error::Protocol(format!("line {} is not UTF-8: {e}", self.line)))?;
        let line = line.strip_suffix('\r').unwrap_or(line);

        let Some(variables) = &self.variables else {
            self.variables = Some(parse_header(line)?);
            return Ok(());
        };

        // A trailing newline after the last row shows up as an empty line.
        if line.is_empty() && variables.len() != 1 {
            return Ok(());
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != variables.len() {
            return Err(Error::Protocol(format!(
                "line {} has {} fields, header declared {} variables",
                self.line,
                fields.len(),
                variables.len()
            )));
        }

        let mut bindings = Bindings::new();
        for (variable, field) in variables.iter().zip(fields) {
            if field.is_empty() {
                continue;
            }
            let term = Term::from_str(field).map_err(|e| {
                Error::Protocol(format!(
                    "line {}: invalid value {field:?} for ?{}: {e}",
                    self.line,
                    variable.as_str()
                ))
            })?;
            bindings.push(variable.clone(), term);
        }

        sink.handle_bindings(bindings)?;
        self.rows += 1;
        Ok(())
    }
}

fn parse_header(line: &str) -> Result<Vec<Variable>> {
    if line.is_empty() {
        return Err(Error::Protocol("tuple result has an empty header".into()));
    }
    line.split('\t')
        .map(|name| {
            let bare = name
                .strip_prefix('?')
                .or_else(|| name.strip_prefix('$'))
                .unwrap_or(name);
            Variable::new(bare).map_err(|e| {
                Error::Protocol(format!("invalid variable {name:?} in tuple header: {e}"))
            })
        })
        .collect()
}

impl ResultHandler for TupleQueryHandler {
    fn on_data(&mut self, chunk: &[u8], sink: &mut dyn RdfSink) -> Result<()> {
        self.pending.extend_from_slice(chunk);
        let mut pending = std::mem::take(&mut self.pending);

        let mut start = 0;
        let mut scan_from = self.scanned;
        while let Some(offset) = pending[scan_from..].iter().position(|b| *b == b'\n') {
            let end = scan_from + offset;
            self.handle_line(&pending[start..end], sink)?;
            start = end + 1;
            scan_from = start;
        }

        pending.drain(..start);
        self.scanned = pending.len();
        self.pending = pending;
        Ok(())
    }

    fn on_end(&mut self, sink: &mut dyn RdfSink) -> Result<()> {
        if !self.pending.is_empty() {
            let tail = std::mem::take(&mut self.pending);
            self.scanned = 0;
            self.handle_line(&tail, sink)?;
        }
        if self.variables.is_none() {
            return Err(Error::Protocol(
                "tuple result ended before the header line".into(),
            ));
        }
        Ok(())
    }

    fn records(&self) -> u64 {
        self.rows
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::handler::test_sink::RecordingSink;
    use oxrdf::{Literal, NamedNode};

    fn iri(value: &str) -> Term {
        NamedNode::new(value).unwrap().into()
    }

    #[test]
    fn header_then_rows() {
        let mut handler = TupleQueryHandler::new();
        let mut sink = RecordingSink::default();

        handler
            .on_data(
                b"?s\t?p\t?o\n<http://ex.org/a>\t<http://ex.org/p>\t\"v\"\n",
                &mut sink,
            )
            .unwrap();
        handler.on_end(&mut sink).unwrap();

        let names: Vec<_> = handler
            .variables()
            .unwrap()
            .iter()
            .map(|v| v.as_str())
            .collect();
        assert_eq!(names, vec!["s", "p", "o"]);

        let rows = sink.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("s"), Some(&iri("http://ex.org/a")));
        assert_eq!(
            rows[0].get("o"),
            Some(&Term::from(Literal::new_simple_literal("v")))
        );
        assert_eq!(handler.records(), 1);
    }

    #[test]
    fn rows_are_emitted_as_soon_as_their_line_completes() {
        let mut handler = TupleQueryHandler::new();
        let mut sink = RecordingSink::default();

        handler.on_data(b"?s\n<urn:a>\n<urn:", &mut sink).unwrap();
        assert_eq!(sink.rows().len(), 1, "first row must not wait for more data");

        handler.on_data(b"b>\n", &mut sink).unwrap();
        assert_eq!(sink.rows().len(), 2);
        assert_eq!(sink.rows()[1].get("s"), Some(&iri("urn:b")));
    }

    #[test]
    fn long_row_in_tiny_chunks_is_scanned_once() {
        let mut handler = TupleQueryHandler::new();
        let mut sink = RecordingSink::default();

        let value = "x".repeat(4096);
        let body = format!("?o\n\"{value}\"\n");
        for byte in body.as_bytes().chunks(1) {
            handler.on_data(byte, &mut sink).unwrap();
            assert_eq!(handler.scanned, handler.pending.len());
        }
        handler.on_end(&mut sink).unwrap();

        let rows = sink.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].get("o"),
            Some(&Term::from(Literal::new_simple_literal(value)))
        );
        assert!(handler.pending.is_empty());
    }

    #[test]
    fn empty_fields_are_unbound() {
        let mut handler = TupleQueryHandler::new();
        let mut sink = RecordingSink::default();

        handler
            .on_data(b"?g\t?s\n\t<urn:s>\r\n", &mut sink)
            .unwrap();
        handler.on_end(&mut sink).unwrap();

        let row = sink.rows()[0];
        assert_eq!(row.len(), 1);
        assert!(row.get("g").is_none());
        assert_eq!(row.get("s"), Some(&iri("urn:s")));
    }

    #[test]
    fn last_row_without_newline_is_flushed_at_end() {
        let mut handler = TupleQueryHandler::new();
        let mut sink = RecordingSink::default();

        handler.on_data(b"?n\n\"1\"", &mut sink).unwrap();
        assert!(sink.rows().is_empty());
        handler.on_end(&mut sink).unwrap();
        assert_eq!(sink.rows().len(), 1);
    }

    #[test]
    fn header_only_result_has_no_rows() {
        let mut handler = TupleQueryHandler::new();
        let mut sink = RecordingSink::default();

        handler.on_data(b"?s\t?p\t?o\n", &mut sink).unwrap();
        handler.on_end(&mut sink).unwrap();
        assert_eq!(handler.records(), 0);
    }

    #[test]
    fn empty_body_is_a_protocol_error() {
        let mut handler = TupleQueryHandler::new();
        let mut sink = RecordingSink::default();

        let err = handler.on_end(&mut sink).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }

    #[test]
    fn field_count_mismatch_is_rejected() {
        let mut handler = TupleQueryHandler::new();
        let mut sink = RecordingSink::default();

        let err = handler
            .on_data(b"?s\t?p\n<urn:a>\n", &mut sink)
            .unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn invalid_term_is_rejected() {
        let mut handler = TupleQueryHandler::new();
        let mut sink = RecordingSink::default();

        let err = handler
            .on_data(b"?s\n<not closed\n", &mut sink)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert!(sink.rows().is_empty());
    }

    #[test]
    fn invalid_header_is_rejected() {
        let mut handler = TupleQueryHandler::new();
        let mut sink = RecordingSink::default();

        assert!(handler.on_data(b"?s\t?bad name\n", &mut sink).is_err());
    }
}
