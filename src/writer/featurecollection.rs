use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use url::Url;

use crate::errors::{Error, Result};
use crate::store::DocumentWriter;

const COLLECTION_OPEN: &[u8] = br#"{"type":"FeatureCollection","features":["#;
const COLLECTION_CLOSE: &[u8] = b"]}";
const FEATURE_SEPARATOR: &[u8] = b",";

/// Batches N consecutive document writes into one streamed
/// `FeatureCollection` JSON array on a shared sink, then rearms for the next
/// batch. Document bytes are copied verbatim, no re-parsing.
///
/// The whole write (bracket or separator, body copy, possible close, counter
/// update) runs under one lock; unsynchronized interleaving on the shared
/// sink would corrupt the output. `seen_hint` mirrors the counter for the
/// pre-lock fast reject and is heuristic only; the counter inside the lock
/// is authoritative.
pub struct FeatureCollectionWriter<W: Write + Send> {
    state: Mutex<BatchState<W>>,
    seen_hint: AtomicUsize,
    count_features: usize,
}

struct BatchState<W> {
    sink: W,
    seen: usize,
}

impl<W: Write + Send> FeatureCollectionWriter<W> {
    pub fn new(sink: W, count_features: usize) -> Result<FeatureCollectionWriter<W>> {
        if count_features < 1 {
            return Err(Error::InvalidConfiguration(
                "count_features must be >= 1".to_string(),
            ));
        }

        Ok(FeatureCollectionWriter {
            state: Mutex::new(BatchState { sink, seen: 0 }),
            seen_hint: AtomicUsize::new(0),
            count_features,
        })
    }

    /// Builds the writer from a construction address carrying a
    /// `count_features` query parameter. The destination handle is threaded
    /// in explicitly rather than discovered from ambient state.
    pub fn from_address(address: &Url, sink: W) -> Result<FeatureCollectionWriter<W>> {
        let mut raw_count = None;

        for (key, value) in address.query_pairs() {
            if key == "count_features" {
                raw_count = Some(value.into_owned());
            }
        }

        // absent and non-numeric are both reported as a missing parameter
        let raw_count = raw_count.ok_or(Error::MissingParam("count_features"))?;
        let count_features: usize = raw_count
            .parse()
            .map_err(|_| Error::MissingParam("count_features"))?;

        FeatureCollectionWriter::new(sink, count_features)
    }

    pub fn into_inner(self) -> W {
        self.state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .sink
    }
}

impl<W: Write + Send> DocumentWriter for FeatureCollectionWriter<W> {
    fn write(&self, _path: &str, body: &[u8]) -> Result<()> {
        if self.seen_hint.load(Ordering::Relaxed) == self.count_features {
            return Err(Error::ExceededCount);
        }

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        if state.seen == 0 {
            state.sink.write_all(COLLECTION_OPEN)?;
        } else {
            state.sink.write_all(FEATURE_SEPARATOR)?;
        }

        state.sink.write_all(body)?;
        state.seen += 1;

        if state.seen == self.count_features {
            state.sink.write_all(COLLECTION_CLOSE)?;
            state.sink.flush()?;
            state.seen = 0;
        }

        self.seen_hint.store(state.seen, Ordering::Relaxed);
        Ok(())
    }

    fn close(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.sink.flush()?;
        Ok(())
    }
}
