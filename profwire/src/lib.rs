//! # profwire - Streaming pprof Profile Encoder
//!
//! profwire is the write path of a profiling pipeline: it encodes samples
//! (stack traces, counts, memory mappings) into the gzip-compressed
//! protobuf wire format consumed by standard profile tooling (`go tool
//! pprof`, Perfetto, Speedscope). Samples are serialized one at a time as
//! they arrive from a collector; the profile is never buffered whole.
//!
//! ## Architecture Overview
//!
//! ```text
//! samples / mappings            summary (finish)
//!        │                            │
//!        ▼                            ▼
//! ┌─────────────────────────────────────────────┐
//! │               ProfileBuilder                │
//! │                                             │
//! │  ┌───────────┐  ┌──────────────┐            │
//! │  │  String   │  │   Location   │            │
//! │  │  Table    │  │   Resolver   │──▶ SymbolLookup (external)
//! │  └───────────┘  └──────┬───────┘            │
//! │                        │ Mapping Table      │
//! │                        ▼                    │
//! │                  ┌───────────┐              │
//! │                  │ WireBuffer│ tag/length/  │
//! │                  └─────┬─────┘ value fields │
//! └────────────────────────┼────────────────────┘
//!                          ▼
//!                    ┌───────────┐
//!                    │ GzipSink  │ flush at top level only
//!                    └─────┬─────┘
//!                          ▼
//!                     destination
//! ```
//!
//! Data flows one way: samples → encoder primitives → byte buffer →
//! compression filter → destination. No component calls back upward.
//!
//! ## Module Structure
//!
//! - [`builder`]: the orchestrator; open-phase sample/mapping intake and
//!   one-shot finalize
//! - [`encode`] (private): protobuf varint/tag primitives with submessage
//!   framing and nesting tracking
//! - [`symbols`]: the address → (function, file, line) lookup interface
//! - [`domain`]: ID newtypes and error types
//!
//! ## Key Invariants
//!
//! - A submessage's length precedes its bytes on the wire, so nothing may
//!   be flushed while a message is open; the sink only flushes at nesting
//!   depth zero.
//! - String table index 0 is the empty string; indices are stable.
//! - Mapping ID 1 is a synthetic catch-all entry, so every address has a
//!   mapping reference.
//! - The same address always resolves to the same location ID; repeated
//!   strings, functions and locations are deduplicated across the stream.
//!
//! ## Typical Usage
//!
//! ```no_run
//! use profwire::{ProfileBuilder, SourceFrame};
//! use std::collections::HashMap;
//! use std::fs::File;
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), profwire::ProfileError> {
//! let symbols: HashMap<u64, SourceFrame> = HashMap::new();
//! let destination = File::create("cpu.pb.gz").map_err(profwire::ProfileError::Write)?;
//!
//! let mut builder =
//!     ProfileBuilder::with_period(destination, symbols, Duration::from_millis(10));
//! builder.add_mapping(0x1000, 0x2000, 0, "/usr/bin/app", "buildid");
//! // leaf address is +1: resolution expects return-PC semantics
//! builder.add_sample(&[1, 10_000_000], &[0x1234 + 1, 0x1300], &[])?;
//! builder.finish()?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod domain;
pub mod symbols;

mod encode;
mod mappings;
mod resolve;
mod sink;
mod strings;

pub use builder::{LabelValue, ProfileBuilder, SampleLabel};
pub use domain::{FunctionId, LocationId, MappingId, ProfileError, StringIndex};
pub use symbols::{FnLookup, SourceFrame, SymbolLookup};
