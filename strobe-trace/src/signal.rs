//! signal types
//!
//! the vocabulary shared by models, recorders and sinks

use std::fmt;

/// simulation time in ticks (one tick per clock half-period)
pub type Time = u64;

/// dense index of a declared signal, in declaration order
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SignalId(pub usize);

impl SignalId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// a traced signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalDecl {
    pub id: SignalId,
    /// local name inside its scope
    pub name: String,
    /// dotted hierarchical name, e.g. `TOP.pipe.stage0_word`
    pub path: String,
    /// width in bits, 1..=64
    pub width: u32,
}

impl SignalDecl {
    /// mask a raw value down to the declared width
    pub fn mask(&self, value: u64) -> u64 {
        mask(value, self.width)
    }

    pub fn is_scalar(&self) -> bool {
        self.width == 1
    }
}

/// truncate `value` to its low `width` bits
pub fn mask(value: u64, width: u32) -> u64 {
    if width >= 64 {
        value
    } else {
        value & ((1u64 << width) - 1)
    }
}

/// scope structure in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeItem {
    Scope(String),
    Var(SignalId),
    Upscope,
}

/// everything a model registered with a probe
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declarations {
    pub(crate) items: Vec<ScopeItem>,
    pub(crate) signals: Vec<SignalDecl>,
}

impl Declarations {
    pub fn items(&self) -> &[ScopeItem] {
        &self.items
    }

    pub fn signals(&self) -> &[SignalDecl] {
        &self.signals
    }

    pub fn signal(&self, id: SignalId) -> Option<&SignalDecl> {
        self.signals.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// find a signal by full path, falling back to a unique local name
    pub fn lookup(&self, name: &str) -> Option<SignalId> {
        if let Some(decl) = self.signals.iter().find(|decl| decl.path == name) {
            return Some(decl.id);
        }
        let mut found = self.signals.iter().filter(|decl| decl.name == name);
        match (found.next(), found.next()) {
            (Some(decl), None) => Some(decl.id),
            _ => None,
        }
    }
}

/// a full set of signal values after one evaluation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Snapshot {
    values: Vec<u64>,
}

impl Snapshot {
    /// a snapshot of `len` signals, all zero
    pub fn zeroed(len: usize) -> Self {
        Self { values: vec![0; len] }
    }

    pub fn from_values(values: Vec<u64>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// value of a signal; zero if the id is out of range
    pub fn get(&self, id: SignalId) -> u64 {
        self.values.get(id.index()).copied().unwrap_or(0)
    }

    /// set a signal value; ids out of range are ignored
    pub fn set(&mut self, id: SignalId, value: u64) {
        if let Some(slot) = self.values.get_mut(id.index()) {
            *slot = value;
        }
    }

    pub fn values(&self) -> &[u64] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_widths() {
        assert_eq!(mask(0xffff_ffff_ffff_ffff, 1), 1);
        assert_eq!(mask(0x1_2345_6789, 32), 0x2345_6789);
        assert_eq!(mask(u64::MAX, 64), u64::MAX);
    }

    #[test]
    fn lookup_by_path_and_name() {
        let decls = Declarations {
            items: Vec::new(),
            signals: vec![
                SignalDecl { id: SignalId(0), name: "clk".into(), path: "TOP.clk".into(), width: 1 },
                SignalDecl { id: SignalId(1), name: "q".into(), path: "TOP.a.q".into(), width: 8 },
                SignalDecl { id: SignalId(2), name: "q".into(), path: "TOP.b.q".into(), width: 8 },
            ],
        };
        assert_eq!(decls.lookup("clk"), Some(SignalId(0)));
        assert_eq!(decls.lookup("TOP.b.q"), Some(SignalId(2)));
        // ambiguous local name
        assert_eq!(decls.lookup("q"), None);
    }
}
