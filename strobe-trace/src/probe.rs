//! trace probe
//!
//! a model registers the signals it wants traced with a [`Probe`] and keeps
//! the returned [`Tap`]. after each evaluation the model publishes a
//! [`Snapshot`] through the tap; the recorder owning the other end of the
//! channel picks it up when it dumps.

use std::sync::mpsc;

use crate::signal::*;
use crate::{ Error, MAX_WIDTH };

/// scope and signal names end up as single tokens in waveform headers
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(|c| c.is_whitespace() || c.is_control())
}

/// trace registration handle
pub struct Probe {
    decls: Declarations,
    stack: Vec<String>,
    tx: mpsc::Sender<Snapshot>,
    rx: mpsc::Receiver<Snapshot>,
}

impl Probe {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            decls: Declarations::default(),
            stack: Vec::new(),
            tx,
            rx,
        }
    }

    /// open a nested scope; subsequent declarations land inside it
    pub fn push_scope(&mut self, name: impl Into<String>) -> Result<(), Error> {
        let name = name.into();
        if !is_valid_name(&name) {
            return Err(Error::Name(name));
        }
        self.decls.items.push(ScopeItem::Scope(name.clone()));
        self.stack.push(name);
        Ok(())
    }

    /// close the innermost scope
    pub fn pop_scope(&mut self) -> Result<(), Error> {
        self.stack.pop().ok_or(Error::ScopeUnderflow)?;
        self.decls.items.push(ScopeItem::Upscope);
        Ok(())
    }

    /// number of currently open scopes
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// declare a signal of `width` bits in the current scope
    pub fn declare(&mut self, name: impl Into<String>, width: u32) -> Result<SignalId, Error> {
        let name = name.into();
        if !is_valid_name(&name) {
            return Err(Error::Name(name));
        }
        let path = if self.stack.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", self.stack.join("."), name)
        };
        if width == 0 || width > MAX_WIDTH {
            return Err(Error::Width(path, width));
        }
        if self.decls.signals.iter().any(|decl| decl.path == path) {
            return Err(Error::Duplicate(path));
        }

        let id = SignalId(self.decls.signals.len());
        self.decls.signals.push(SignalDecl { id, name, path, width });
        self.decls.items.push(ScopeItem::Var(id));
        Ok(id)
    }

    /// signals declared so far
    pub fn declarations(&self) -> &Declarations {
        &self.decls
    }

    /// create a publishing handle sized to the current declarations
    ///
    /// call this after every signal has been declared
    pub fn tap(&self) -> Tap {
        Tap {
            tx: self.tx.clone(),
            len: self.decls.len(),
        }
    }

    /// close any open scopes and split into declarations and receiver
    pub(crate) fn into_parts(mut self) -> (Declarations, mpsc::Receiver<Snapshot>) {
        while self.stack.pop().is_some() {
            self.decls.items.push(ScopeItem::Upscope);
        }
        (self.decls, self.rx)
    }
}

impl Default for Probe {
    fn default() -> Self {
        Self::new()
    }
}

/// publishing side of a probe, owned by the model
#[derive(Clone)]
pub struct Tap {
    tx: mpsc::Sender<Snapshot>,
    len: usize,
}

impl Tap {
    /// a zeroed snapshot with one slot per declared signal
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::zeroed(self.len)
    }

    /// publish the values of one evaluation
    pub fn emit(&self, snapshot: Snapshot) -> Result<(), Error> {
        if snapshot.len() != self.len {
            return Err(Error::SnapshotLength(snapshot.len(), self.len));
        }
        self.tx.send(snapshot).map_err(|_| Error::Disconnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_nested_paths() {
        let mut probe = Probe::new();
        probe.push_scope("TOP").expect("scope TOP");
        let clk = probe.declare("clk", 1).expect("declare clk");
        probe.push_scope("pipe").expect("scope pipe");
        let word = probe.declare("stage0_word", 32).expect("declare word");
        assert_eq!(probe.depth(), 2);
        probe.pop_scope().expect("pop pipe");

        let decls = probe.declarations();
        assert_eq!(decls.signal(clk).map(|d| d.path.as_str()), Some("TOP.clk"));
        assert_eq!(decls.signal(word).map(|d| d.path.as_str()), Some("TOP.pipe.stage0_word"));

        let (decls, _rx) = probe.into_parts();
        // TOP left open, closed on split
        assert_eq!(decls.items().last(), Some(&ScopeItem::Upscope));
        let opens = decls.items().iter().filter(|i| matches!(i, ScopeItem::Scope(_))).count();
        let closes = decls.items().iter().filter(|i| matches!(i, ScopeItem::Upscope)).count();
        assert_eq!(opens, closes);
    }

    #[test]
    fn reject_bad_declarations() {
        let mut probe = Probe::new();
        assert!(matches!(probe.declare("wide", 65), Err(Error::Width(_, 65))));
        assert!(matches!(probe.declare("empty", 0), Err(Error::Width(_, 0))));
        probe.declare("x", 4).expect("declare x");
        assert!(matches!(probe.declare("x", 4), Err(Error::Duplicate(_))));
        assert!(matches!(probe.pop_scope(), Err(Error::ScopeUnderflow)));
    }

    #[test]
    fn reject_names_that_break_headers() {
        let mut probe = Probe::new();
        assert!(matches!(probe.push_scope("my top"), Err(Error::Name(_))));
        assert!(matches!(probe.push_scope(""), Err(Error::Name(_))));
        assert_eq!(probe.depth(), 0);
        assert!(matches!(probe.declare("stage 0", 1), Err(Error::Name(_))));
        assert!(matches!(probe.declare("a\tb", 1), Err(Error::Name(_))));
        assert!(probe.declarations().is_empty());

        probe.push_scope("TOP").expect("scope TOP");
        probe.declare("stage0_word", 32).expect("declare");
    }

    #[test]
    fn tap_checks_length_and_receiver() {
        let mut probe = Probe::new();
        let a = probe.declare("a", 8).expect("declare a");
        let tap = probe.tap();

        let mut snap = tap.snapshot();
        snap.set(a, 0x5a);
        tap.emit(snap).expect("emit");
        assert!(matches!(
            tap.emit(Snapshot::zeroed(3)),
            Err(Error::SnapshotLength(3, 1))
        ));

        let (_decls, rx) = probe.into_parts();
        assert_eq!(rx.try_recv().map(|s| s.get(a)).ok(), Some(0x5a));
        drop(rx);
        assert!(matches!(tap.emit(tap.snapshot()), Err(Error::Disconnected)));
    }
}
