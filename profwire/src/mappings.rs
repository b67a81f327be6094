//! Memory mapping table
//!
//! Ordered list of the profiled process's loaded regions, used to attribute
//! locations to the binary they live in. Entry 1 is always a synthetic
//! zero-range sentinel, so address attribution is total: an address outside
//! every real region falls back to the sentinel instead of failing.

use crate::domain::MappingId;

/// Per-mapping symbolization outcome, updated as locations are attributed.
///
/// A single failed lookup poisons the mapping: `has_functions` is reported
/// only when every location attributed to the mapping symbolized cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum SymbolState {
    /// No address in this mapping has been looked up yet.
    #[default]
    Untried,
    /// Every lookup so far succeeded.
    Resolved,
    /// At least one lookup failed.
    Failed,
}

impl SymbolState {
    /// Fold one lookup outcome into the running state.
    pub(crate) fn record(&mut self, resolved: bool) {
        *self = match (*self, resolved) {
            (SymbolState::Failed, _) | (_, false) => SymbolState::Failed,
            _ => SymbolState::Resolved,
        };
    }

    /// True when lookups were attempted and none failed.
    pub(crate) fn has_functions(self) -> bool {
        self == SymbolState::Resolved
    }
}

/// One loaded memory region (or the synthetic sentinel).
#[derive(Debug, Clone)]
pub(crate) struct Mapping {
    pub start: u64,
    pub limit: u64,
    pub offset: u64,
    pub file: String,
    pub build_id: String,
    pub symbols: SymbolState,
    pub fake: bool,
}

impl Mapping {
    /// Check if an address falls within this mapping's `[start, limit)` range.
    fn contains(&self, addr: u64) -> bool {
        addr >= self.start && addr < self.limit
    }
}

/// Insertion-ordered mapping table with 1-based IDs.
#[derive(Debug, Default)]
pub(crate) struct MappingTable {
    entries: Vec<Mapping>,
}

impl MappingTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Install the zero-range sentinel. Called exactly once, before any
    /// sample is accepted, so that ID 1 always exists.
    pub(crate) fn push_fake(&mut self) {
        self.entries.push(Mapping {
            start: 0,
            limit: 0,
            offset: 0,
            file: String::new(),
            build_id: String::new(),
            symbols: SymbolState::Untried,
            fake: true,
        });
    }

    /// Append a real region. Ranges are trusted input from the host-OS
    /// enumeration; no overlap validation is performed.
    pub(crate) fn push(&mut self, start: u64, limit: u64, offset: u64, file: &str, build_id: &str) {
        self.entries.push(Mapping {
            start,
            limit,
            offset,
            file: file.to_owned(),
            build_id: build_id.to_owned(),
            symbols: SymbolState::Untried,
            fake: false,
        });
    }

    /// Find the mapping for `addr`: the first entry, in insertion order,
    /// whose range contains the address. Overlapping regions are resolved
    /// by insertion order, not range specificity. Addresses matching no
    /// real region fall back to the sentinel.
    pub(crate) fn lookup_mut(&mut self, addr: u64) -> Option<(MappingId, &mut Mapping)> {
        let index = self
            .entries
            .iter()
            .position(|m| m.contains(addr))
            .or_else(|| self.entries.iter().position(|m| m.fake))?;
        Some((MappingId(index as u64 + 1), &mut self.entries[index]))
    }

    pub(crate) fn entries(&self) -> &[Mapping] {
        &self.entries
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
