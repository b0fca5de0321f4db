use std::collections::BTreeMap;

/// Identifier the host debugger assigned to a breakpoint or watchpoint.
pub type BreakpointId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakpointKind {
    /// Function entry
    Entry,
    /// Function return
    Return,
    /// First write to a variable (one-shot)
    Watch,
}

/// What a fired internal breakpoint means for the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalStop {
    FunctionEntry(String),
    VariableWrite(String),
    FunctionReturn(String),
}

/// Internal breakpoints installed by the session, keyed by host id.
#[derive(Debug, Default)]
pub struct BreakpointRegistry {
    entries: BTreeMap<BreakpointId, String>,
    returns: BTreeMap<BreakpointId, String>,
    watches: BTreeMap<BreakpointId, String>,
}

impl BreakpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self, kind: BreakpointKind) -> &BTreeMap<BreakpointId, String> {
        match kind {
            BreakpointKind::Entry => &self.entries,
            BreakpointKind::Return => &self.returns,
            BreakpointKind::Watch => &self.watches,
        }
    }

    fn map_mut(&mut self, kind: BreakpointKind) -> &mut BTreeMap<BreakpointId, String> {
        match kind {
            BreakpointKind::Entry => &mut self.entries,
            BreakpointKind::Return => &mut self.returns,
            BreakpointKind::Watch => &mut self.watches,
        }
    }

    pub fn add(&mut self, kind: BreakpointKind, id: BreakpointId, name: impl Into<String>) {
        let name = name.into();
        log::trace!("registered {:?} breakpoint {} for {}", kind, id, name);
        self.map_mut(kind).insert(id, name);
    }

    pub fn remove(&mut self, kind: BreakpointKind, id: BreakpointId) -> Option<String> {
        self.map_mut(kind).remove(&id)
    }

    pub fn get(&self, kind: BreakpointKind, id: BreakpointId) -> Option<&str> {
        self.map(kind).get(&id).map(String::as_str)
    }

    pub fn contains(&self, kind: BreakpointKind, id: BreakpointId) -> bool {
        self.map(kind).contains_key(&id)
    }

    pub fn len(&self, kind: BreakpointKind) -> usize {
        self.map(kind).len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.returns.is_empty() && self.watches.is_empty()
    }

    /// `(id, name)` pairs of one kind, ordered by id.
    pub fn iter(&self, kind: BreakpointKind) -> impl Iterator<Item = (BreakpointId, &str)> {
        self.map(kind).iter().map(|(id, name)| (*id, name.as_str()))
    }

    /// Which registry holds `id`. Ids are unique across kinds on the host.
    pub fn classify(&self, id: BreakpointId) -> Option<InternalStop> {
        if let Some(name) = self.entries.get(&id) {
            Some(InternalStop::FunctionEntry(name.clone()))
        } else if let Some(name) = self.watches.get(&id) {
            Some(InternalStop::VariableWrite(name.clone()))
        } else {
            self.returns
                .get(&id)
                .map(|name| InternalStop::FunctionReturn(name.clone()))
        }
    }

    /// Forget everything, returning every id that was registered.
    pub fn clear(&mut self) -> Vec<BreakpointId> {
        let ids = self
            .entries
            .keys()
            .chain(self.returns.keys())
            .chain(self.watches.keys())
            .copied()
            .collect();
        self.entries.clear();
        self.returns.clear();
        self.watches.clear();
        ids
    }
}
