//! Symbol lookup interface
//!
//! Symbolization lives outside this crate: the profiling runtime, a DWARF
//! reader, or a fixed table all work, as long as they can answer "what
//! source frame does this return address belong to". The builder only
//! depends on the [`SymbolLookup`] trait.
//!
//! Addresses handed to a lookup have return-PC semantics: the caller
//! adjusts the leaf frame's address (raw signal addresses point at the
//! executing instruction, one before the post-call return site).

use std::collections::HashMap;

/// A source-level frame for one instruction address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFrame {
    /// Package-qualified function name; also used as the function's
    /// deduplication key and its system name.
    pub function: String,
    /// Source file the function is defined in.
    pub file: String,
    /// Line number at the address (0 when unknown).
    pub line: i64,
}

/// Maps a raw instruction address to source-level information.
///
/// Returning `None` is not an error: the location is still emitted, anchored
/// to its memory mapping, just without a source line.
pub trait SymbolLookup {
    fn lookup(&self, addr: u64) -> Option<SourceFrame>;
}

/// A fixed symbol table, e.g. one pre-resolved by the profiling runtime.
impl SymbolLookup for HashMap<u64, SourceFrame> {
    fn lookup(&self, addr: u64) -> Option<SourceFrame> {
        self.get(&addr).cloned()
    }
}

/// Adapter for closure-based lookups, e.g. over a DWARF reader.
pub struct FnLookup<F>(pub F);

impl<F> SymbolLookup for FnLookup<F>
where
    F: Fn(u64) -> Option<SourceFrame>,
{
    fn lookup(&self, addr: u64) -> Option<SourceFrame> {
        (self.0)(addr)
    }
}

/// No symbolization at all: every location stays address-only.
impl SymbolLookup for () {
    fn lookup(&self, _addr: u64) -> Option<SourceFrame> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_lookup() {
        let mut table = HashMap::new();
        table.insert(
            0x1000,
            SourceFrame { function: "app::work".into(), file: "src/lib.rs".into(), line: 42 },
        );
        assert_eq!(table.lookup(0x1000).unwrap().line, 42);
        assert!(table.lookup(0x2000).is_none());
    }

    #[test]
    fn test_unit_lookup_resolves_nothing() {
        assert!(().lookup(0x1000).is_none());
    }

    #[test]
    fn test_closure_lookup() {
        let lookup = FnLookup(|addr: u64| {
            (addr == 0x40).then(|| SourceFrame {
                function: "main".into(),
                file: "main.rs".into(),
                line: 1,
            })
        });
        assert!(lookup.lookup(0x40).is_some());
        assert!(lookup.lookup(0x41).is_none());
    }
}
