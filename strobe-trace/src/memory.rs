//! in-memory trace log

use crate::recorder::WaveformSink;
use crate::signal::*;
use crate::Error;

/// one recorded evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    pub time: Time,
    pub snapshot: Snapshot,
}

/// a sink that keeps every entry in memory
#[derive(Debug, Clone, Default)]
pub struct TraceLog {
    decls: Declarations,
    entries: Vec<TraceEntry>,
    opened: bool,
    closed: bool,
}

impl TraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declarations(&self) -> &Declarations {
        &self.decls
    }

    /// get a slice of the recorded entries
    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// find a signal by path or unique local name
    pub fn lookup(&self, name: &str) -> Option<SignalId> {
        self.decls.lookup(name)
    }

    /// every recorded value of one signal, masked to its width
    pub fn column(&self, id: SignalId) -> Vec<u64> {
        let decl = self.decls.signal(id);
        self.entries
            .iter()
            .map(|entry| {
                let value = entry.snapshot.get(id);
                decl.map_or(value, |decl| decl.mask(value))
            })
            .collect()
    }

    /// recorded timestamps in order
    pub fn times(&self) -> Vec<Time> {
        self.entries.iter().map(|entry| entry.time).collect()
    }
}

impl WaveformSink for TraceLog {
    fn open(&mut self, decls: &Declarations) -> Result<(), Error> {
        if self.closed {
            return Err(Error::Finalized);
        }
        self.decls = decls.clone();
        self.opened = true;
        Ok(())
    }

    fn dump(&mut self, time: Time, snapshot: &Snapshot) -> Result<(), Error> {
        if self.closed {
            return Err(Error::Finalized);
        }
        if !self.opened {
            return Err(Error::NotOpen);
        }
        self.entries.push(TraceEntry { time, snapshot: snapshot.clone() });
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        if self.closed {
            return Err(Error::Finalized);
        }
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::Probe;

    #[test]
    fn lifecycle() {
        let mut log = TraceLog::new();
        assert!(matches!(log.dump(0, &Snapshot::zeroed(0)), Err(Error::NotOpen)));

        let mut probe = Probe::new();
        let nib = probe.declare("nib", 4).expect("declare");
        log.open(probe.declarations()).expect("open");
        log.dump(0, &Snapshot::from_values(vec![0x1f])).expect("dump");
        log.dump(3, &Snapshot::from_values(vec![0x02])).expect("dump");
        log.close().expect("close");

        assert_eq!(log.times(), vec![0, 3]);
        assert_eq!(log.column(nib), vec![0xf, 0x2]);
        assert!(matches!(log.dump(4, &Snapshot::zeroed(1)), Err(Error::Finalized)));
    }
}
