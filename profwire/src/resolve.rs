//! Address-to-location resolution
//!
//! Each distinct stack address becomes exactly one Location message, emitted
//! the first time the address is seen and memoized afterwards. Resolution
//! also lazily discovers functions: the first address that symbolizes to a
//! given function name allocates a Function ID and emits the Function
//! message.
//!
//! Function messages cannot be written while the Location that discovered
//! them is still open (the wire format needs a message's length before its
//! bytes are framed), so they are queued and emitted right after the
//! Location closes.

use std::collections::HashMap;

use log::debug;

use crate::domain::{FunctionId, LocationId};
use crate::encode::{tags, WireBuffer};
use crate::mappings::MappingTable;
use crate::strings::StringTable;
use crate::symbols::SymbolLookup;

/// A function discovered mid-Location, waiting for the Location to close.
struct PendingFunction {
    id: FunctionId,
    name: String,
    file: String,
}

/// Memoizing resolver from raw addresses to 1-based location IDs.
#[derive(Default)]
pub(crate) struct LocationResolver {
    /// Raw address -> assigned location ID. Keyed by address identity;
    /// two addresses symbolizing identically still get distinct locations.
    locations: HashMap<u64, LocationId>,
    /// Qualified function name -> assigned function ID.
    functions: HashMap<String, FunctionId>,
}

impl LocationResolver {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn location_count(&self) -> usize {
        self.locations.len()
    }

    pub(crate) fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Return the location ID for `addr`, encoding a new Location message
    /// (and any newly discovered Function messages) on first sight.
    ///
    /// `addr` must have return-PC semantics; see [`crate::symbols`].
    /// Must be called between top-level messages: it emits to `buf` itself.
    pub(crate) fn resolve<S: SymbolLookup>(
        &mut self,
        addr: u64,
        symbols: &S,
        strings: &mut StringTable,
        mappings: &mut MappingTable,
        buf: &mut WireBuffer,
    ) -> LocationId {
        if let Some(&existing) = self.locations.get(&addr) {
            return existing;
        }

        let id = LocationId(self.locations.len() as u64 + 1);
        // Record the ID before encoding anything, so the address can never
        // be allocated twice.
        self.locations.insert(addr, id);
        debug!("new location {id} for address {addr:#x}");

        let mut pending: Vec<PendingFunction> = Vec::new();

        let mark = buf.start_message();
        buf.uint64_opt(tags::LOCATION_ID, id.0);

        let frame = symbols.lookup(addr);
        if let Some(frame) = &frame {
            let function_id = match self.functions.get(frame.function.as_str()) {
                Some(&known) => known,
                None => {
                    let allocated = FunctionId(self.functions.len() as u64 + 1);
                    self.functions.insert(frame.function.clone(), allocated);
                    debug!("new function {allocated}: {}", frame.function);
                    pending.push(PendingFunction {
                        id: allocated,
                        name: frame.function.clone(),
                        file: frame.file.clone(),
                    });
                    allocated
                }
            };

            let line_mark = buf.start_message();
            buf.uint64_opt(tags::LINE_FUNCTION_ID, function_id.0);
            buf.int64_opt(tags::LINE_LINE, frame.line);
            buf.end_message(tags::LOCATION_LINE, line_mark);
        }

        if let Some((mapping_id, mapping)) = mappings.lookup_mut(addr) {
            buf.uint64_opt(tags::LOCATION_MAPPING_ID, mapping_id.0);
            mapping.symbols.record(frame.is_some());
        }

        buf.end_message(tags::PROFILE_LOCATION, mark);

        // Functions found during frame expansion, now that the Location
        // is closed.
        for function in pending {
            let name = strings.intern(&function.name);
            let file = strings.intern(&function.file);
            let mark = buf.start_message();
            buf.uint64_opt(tags::FUNCTION_ID, function.id.0);
            buf.int64_opt(tags::FUNCTION_NAME, name.0);
            buf.int64_opt(tags::FUNCTION_SYSTEM_NAME, name.0);
            buf.int64_opt(tags::FUNCTION_FILENAME, file.0);
            buf.end_message(tags::PROFILE_FUNCTION, mark);
        }

        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SourceFrame;

    fn fixture() -> (StringTable, MappingTable, WireBuffer) {
        let mut mappings = MappingTable::new();
        mappings.push_fake();
        (StringTable::new(), mappings, WireBuffer::new())
    }

    fn frame(function: &str, file: &str, line: i64) -> SourceFrame {
        SourceFrame { function: function.into(), file: file.into(), line }
    }

    #[test]
    fn test_same_address_is_memoized() {
        let (mut strings, mut mappings, mut buf) = fixture();
        let mut resolver = LocationResolver::new();

        let first = resolver.resolve(0xabce, &(), &mut strings, &mut mappings, &mut buf);
        let emitted = buf.len();
        let second = resolver.resolve(0xabce, &(), &mut strings, &mut mappings, &mut buf);

        assert_eq!(first, second);
        assert_eq!(first, LocationId(1));
        // the second resolve must not emit another message
        assert_eq!(buf.len(), emitted);
        assert_eq!(resolver.location_count(), 1);
    }

    #[test]
    fn test_distinct_addresses_get_sequential_ids() {
        let (mut strings, mut mappings, mut buf) = fixture();
        let mut resolver = LocationResolver::new();

        let a = resolver.resolve(0x10, &(), &mut strings, &mut mappings, &mut buf);
        let b = resolver.resolve(0x20, &(), &mut strings, &mut mappings, &mut buf);
        assert_eq!(a, LocationId(1));
        assert_eq!(b, LocationId(2));
    }

    #[test]
    fn test_functions_deduplicated_by_name() {
        let (mut strings, mut mappings, mut buf) = fixture();
        let mut resolver = LocationResolver::new();

        let mut symbols = HashMap::new();
        symbols.insert(0x10, frame("app::hot", "src/hot.rs", 10));
        symbols.insert(0x20, frame("app::hot", "src/hot.rs", 25));

        resolver.resolve(0x10, &symbols, &mut strings, &mut mappings, &mut buf);
        resolver.resolve(0x20, &symbols, &mut strings, &mut mappings, &mut buf);

        assert_eq!(resolver.location_count(), 2);
        assert_eq!(resolver.function_count(), 1);
    }

    #[test]
    fn test_lookup_miss_emits_location_without_line() {
        let (mut strings, mut mappings, mut buf) = fixture();
        let mut resolver = LocationResolver::new();

        resolver.resolve(0x999, &(), &mut strings, &mut mappings, &mut buf);

        // no function, so nothing was interned beyond the reserved entry
        assert_eq!(resolver.function_count(), 0);
        assert_eq!(strings.len(), 1);
        // buffer is back at top level with a complete Location inside
        assert!(buf.is_top_level());
        assert_ne!(buf.len(), 0);
    }

    #[test]
    fn test_failed_lookup_poisons_mapping() {
        let (mut strings, mut mappings, mut buf) = fixture();
        mappings.push(0x1000, 0x2000, 0, "/bin/app", "");
        let mut resolver = LocationResolver::new();

        let mut symbols = HashMap::new();
        symbols.insert(0x1100, frame("app::ok", "src/app.rs", 1));

        resolver.resolve(0x1100, &symbols, &mut strings, &mut mappings, &mut buf);
        assert!(mappings.entries()[1].symbols.has_functions());

        resolver.resolve(0x1200, &symbols, &mut strings, &mut mappings, &mut buf);
        assert!(!mappings.entries()[1].symbols.has_functions());
    }
}
