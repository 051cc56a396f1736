//! Output targets that record what the client did with them

use oxrdf::Triple;
use sparql_export::{
    Bindings, Error, FeatureToggles, NQuadsWriter, OutputWriter, RdfSink, RdfTarget, Result,
};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Event observed by a [`RecordingTarget`] writer
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Triple(Triple),
    Bindings(Bindings),
    Finish,
}

/// Where a [`RecordingTarget`] should fail, if anywhere
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailAt {
    #[default]
    Nowhere,
    /// `create_rdf_writer` fails
    WriterCreation,
    /// The n-th event (1-based) fails with an I/O error
    Event(usize),
    /// `finish` fails
    Finish,
}

/// Counters and events shared between a target and the assertions
#[derive(Debug, Default)]
pub struct TargetState {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub events: Mutex<Vec<Recorded>>,
}

impl TargetState {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn events(&self) -> Vec<Recorded> {
        self.events.lock().unwrap().clone()
    }

    pub fn triples(&self) -> Vec<Triple> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Recorded::Triple(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    pub fn rows(&self) -> Vec<Bindings> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Recorded::Bindings(b) => Some(b),
                _ => None,
            })
            .collect()
    }
}

/// Target that counts opens/closes and records every RDF event
#[derive(Debug, Clone, Default)]
pub struct RecordingTarget {
    pub state: Arc<TargetState>,
    pub fail_at: FailAt,
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(fail_at: FailAt) -> Self {
        Self {
            fail_at,
            ..Self::default()
        }
    }
}

struct RecordingOutput {
    state: Arc<TargetState>,
}

impl Write for RecordingOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl OutputWriter for RecordingOutput {
    fn close(&mut self) -> std::io::Result<()> {
        self.state.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct RecordingWriter<'a> {
    _output: &'a mut dyn OutputWriter,
    state: Arc<TargetState>,
    fail_at: FailAt,
    seen: usize,
}

impl RecordingWriter<'_> {
    fn record(&mut self, event: Recorded) -> Result<()> {
        self.seen += 1;
        if self.fail_at == FailAt::Event(self.seen) {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::StorageFull,
                "disk full",
            )));
        }
        self.state.events.lock().unwrap().push(event);
        Ok(())
    }
}

impl RdfSink for RecordingWriter<'_> {
    fn handle_triple(&mut self, triple: Triple) -> Result<()> {
        self.record(Recorded::Triple(triple))
    }

    fn handle_bindings(&mut self, bindings: Bindings) -> Result<()> {
        self.record(Recorded::Bindings(bindings))
    }

    fn finish(&mut self) -> Result<()> {
        if self.fail_at == FailAt::Finish {
            return Err(Error::Io(std::io::Error::other("flush failed")));
        }
        self.state.events.lock().unwrap().push(Recorded::Finish);
        Ok(())
    }
}

impl RdfTarget for RecordingTarget {
    fn create_output_writer(&self) -> Result<Box<dyn OutputWriter>> {
        self.state.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(RecordingOutput {
            state: self.state.clone(),
        }))
    }

    fn create_rdf_writer<'a>(
        &self,
        output: &'a mut dyn OutputWriter,
        _toggles: &FeatureToggles,
    ) -> Result<Box<dyn RdfSink + 'a>> {
        if self.fail_at == FailAt::WriterCreation {
            return Err(Error::Protocol("unsupported output format".into()));
        }
        Ok(Box::new(RecordingWriter {
            _output: output,
            state: self.state.clone(),
            fail_at: self.fail_at,
            seen: 0,
        }))
    }
}

/// Target writing N-Quads to a file
pub struct FileTarget {
    pub path: PathBuf,
}

struct FileOutput(std::io::BufWriter<std::fs::File>);

impl Write for FileOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0.flush()
    }
}

impl OutputWriter for FileOutput {}

impl RdfTarget for FileTarget {
    fn create_output_writer(&self) -> Result<Box<dyn OutputWriter>> {
        let file = std::fs::File::create(&self.path)?;
        Ok(Box::new(FileOutput(std::io::BufWriter::new(file))))
    }

    fn create_rdf_writer<'a>(
        &self,
        output: &'a mut dyn OutputWriter,
        _toggles: &FeatureToggles,
    ) -> Result<Box<dyn RdfSink + 'a>> {
        Ok(Box::new(NQuadsWriter::new(output)))
    }
}
