//! trace recorder
//!
//! enforces the capture contract on top of any [`WaveformSink`]: one entry
//! per evaluation, strictly increasing timestamps, a single finalization,
//! and no captures after it. a recorder that is dropped while still open
//! closes its sink so a waveform is never left without its tail.

use std::sync::mpsc;

use crate::probe::Probe;
use crate::signal::*;
use crate::Error;

/// destination of recorded waveform entries
pub trait WaveformSink {
    /// write whatever preamble the format needs for these declarations
    fn open(&mut self, decls: &Declarations) -> Result<(), Error>;

    /// record the full signal state at `time`
    fn dump(&mut self, time: Time, snapshot: &Snapshot) -> Result<(), Error>;

    /// flush and finalize the record
    fn close(&mut self) -> Result<(), Error>;
}

impl<S: WaveformSink + ?Sized> WaveformSink for Box<S> {
    fn open(&mut self, decls: &Declarations) -> Result<(), Error> {
        (**self).open(decls)
    }

    fn dump(&mut self, time: Time, snapshot: &Snapshot) -> Result<(), Error> {
        (**self).dump(time, snapshot)
    }

    fn close(&mut self) -> Result<(), Error> {
        (**self).close()
    }
}

// forward to both sinks, e.g. a file plus an in-memory log
impl<A: WaveformSink, B: WaveformSink> WaveformSink for (A, B) {
    fn open(&mut self, decls: &Declarations) -> Result<(), Error> {
        self.0.open(decls)?;
        self.1.open(decls)
    }

    fn dump(&mut self, time: Time, snapshot: &Snapshot) -> Result<(), Error> {
        self.0.dump(time, snapshot)?;
        self.1.dump(time, snapshot)
    }

    fn close(&mut self) -> Result<(), Error> {
        let first = self.0.close();
        let second = self.1.close();
        first.and(second)
    }
}

/// records model snapshots into a sink
pub struct TraceRecorder<S: WaveformSink> {
    sink: Option<S>,
    decls: Declarations,
    rx: mpsc::Receiver<Snapshot>,
    last: Option<Time>,
    entries: usize,
    finalized: bool,
}

impl<S: WaveformSink> TraceRecorder<S> {
    /// take over a registered probe and open the sink with its declarations
    pub fn attach(probe: Probe, mut sink: S) -> Result<Self, Error> {
        let (decls, rx) = probe.into_parts();
        sink.open(&decls)?;
        log::debug!("trace sink opened with {} signals", decls.len());
        Ok(Self {
            sink: Some(sink),
            decls,
            rx,
            last: None,
            entries: 0,
            finalized: false,
        })
    }

    pub fn declarations(&self) -> &Declarations {
        &self.decls
    }

    /// number of entries captured so far
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// timestamp of the most recent entry
    pub fn last_time(&self) -> Option<Time> {
        self.last
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// append one entry
    pub fn capture(&mut self, time: Time, snapshot: &Snapshot) -> Result<(), Error> {
        if self.finalized {
            return Err(Error::Finalized);
        }
        if snapshot.len() != self.decls.len() {
            return Err(Error::SnapshotLength(snapshot.len(), self.decls.len()));
        }
        if let Some(last) = self.last {
            if time <= last {
                return Err(Error::NonMonotonic(time, last));
            }
        }

        let sink = self.sink.as_mut().ok_or(Error::Finalized)?;
        sink.dump(time, snapshot)?;
        self.last = Some(time);
        self.entries += 1;
        Ok(())
    }

    /// capture the latest snapshot the model published since the last dump
    pub fn dump(&mut self, time: Time) -> Result<(), Error> {
        if self.finalized {
            return Err(Error::Finalized);
        }
        let latest = self.rx
            .try_iter()
            .last()
            .ok_or(Error::MissingSnapshot(time))?;
        self.capture(time, &latest)
    }

    /// close the sink; allowed exactly once
    pub fn finalize(&mut self) -> Result<(), Error> {
        if self.finalized {
            return Err(Error::Finalized);
        }
        self.finalized = true;
        let sink = self.sink.as_mut().ok_or(Error::Finalized)?;
        sink.close()?;
        log::debug!("trace sink closed after {} entries", self.entries);
        Ok(())
    }

    /// finalize if still open and hand back the sink
    pub fn into_sink(mut self) -> Result<S, Error> {
        if !self.finalized {
            self.finalize()?;
        }
        self.sink.take().ok_or(Error::Finalized)
    }
}

impl<S: WaveformSink> Drop for TraceRecorder<S> {
    fn drop(&mut self) {
        if self.finalized || self.sink.is_none() {
            return;
        }
        log::warn!("trace recorder dropped while open, closing sink");
        if let Err(err) = self.finalize() {
            log::warn!("failed to close trace sink: {}", err);
        }
    }
}
