use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use crate::data::capture::GeotagCapture;
use crate::errors::Result;
use crate::writer::FeatureWriter;

/// Serializes each capture verbatim onto a sink. Useful for smoke-testing a
/// pipeline without a store behind it.
pub struct EchoWriter<W: Write + Send> {
    sink: Mutex<W>,
}

impl EchoWriter<io::Stdout> {
    pub fn stdout() -> EchoWriter<io::Stdout> {
        EchoWriter::new(io::stdout())
    }
}

impl<W: Write + Send> EchoWriter<W> {
    pub fn new(sink: W) -> EchoWriter<W> {
        EchoWriter {
            sink: Mutex::new(sink),
        }
    }

    pub fn into_inner(self) -> W {
        self.sink.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> FeatureWriter for EchoWriter<W> {
    fn write_feature(&self, _uri: &str, capture: &GeotagCapture) -> Result<()> {
        let body = serde_json::to_vec(capture)?;

        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        sink.write_all(&body)?;
        sink.flush()?;

        Ok(())
    }
}
