//! Incremental profile builder
//!
//! `ProfileBuilder` is the orchestrator: it accepts mappings and samples in
//! any interleaving while open, streams each sample out as it arrives, and
//! writes the summary fields (timestamps, sample-type descriptors, the
//! mapping list, the string table) when finished. The whole profile is
//! never held in memory.
//!
//! Lifecycle is `Created -> Open -> Finalized`: construction installs the
//! sentinel mapping and the builder is immediately open; [`ProfileBuilder::finish`]
//! consumes the builder, so finalizing twice or touching a finalized
//! profile is rejected at compile time.

use std::io::Write;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use log::info;

use crate::domain::{ProfileError, StringIndex};
use crate::encode::{tags, WireBuffer};
use crate::mappings::MappingTable;
use crate::resolve::LocationResolver;
use crate::sink::GzipSink;
use crate::strings::StringTable;
use crate::symbols::SymbolLookup;

/// A key/value annotation attached to one sample.
#[derive(Debug, Clone, Copy)]
pub struct SampleLabel<'a> {
    pub key: &'a str,
    pub value: LabelValue<'a>,
}

/// Label payload: either a string or a number.
#[derive(Debug, Clone, Copy)]
pub enum LabelValue<'a> {
    Str(&'a str),
    Num(i64),
}

/// Streaming encoder for one pprof profile.
///
/// `W` is the byte destination, `S` the symbol-lookup capability. The
/// builder exclusively owns all its tables; it is single-threaded and
/// must be driven to [`ProfileBuilder::finish`] for the compressed stream
/// to be valid.
pub struct ProfileBuilder<W: Write, S: SymbolLookup> {
    start_time: SystemTime,
    started: Instant,
    period_nanos: Option<i64>,
    symbols: S,
    buf: WireBuffer,
    sink: GzipSink<W>,
    strings: StringTable,
    mappings: MappingTable,
    resolver: LocationResolver,
    comments: Vec<StringIndex>,
    /// Scratch for resolved location IDs, reused across samples.
    location_ids: Vec<u64>,
    sample_count: u64,
}

impl<W: Write, S: SymbolLookup> ProfileBuilder<W, S> {
    /// Start a profile with no periodic-sampling metadata. The summary will
    /// carry a timestamp but no sample-type descriptors, duration or period.
    #[must_use]
    pub fn new(destination: W, symbols: S) -> Self {
        Self::start(destination, symbols, None)
    }

    /// Start a CPU profile sampled every `period`. The summary will carry
    /// the `samples/count` and `cpu/nanoseconds` sample types, the elapsed
    /// duration, and the period in nanoseconds.
    #[must_use]
    pub fn with_period(destination: W, symbols: S, period: Duration) -> Self {
        let nanos = i64::try_from(period.as_nanos()).unwrap_or(i64::MAX);
        Self::start(destination, symbols, Some(nanos))
    }

    fn start(destination: W, symbols: S, period_nanos: Option<i64>) -> Self {
        let mut mappings = MappingTable::new();
        // ID 1 must exist before any sample, so address resolution always
        // has a mapping to fall back on.
        mappings.push_fake();

        Self {
            start_time: SystemTime::now(),
            started: Instant::now(),
            period_nanos,
            symbols,
            buf: WireBuffer::new(),
            sink: GzipSink::new(destination),
            strings: StringTable::new(),
            mappings,
            resolver: LocationResolver::new(),
            comments: Vec::new(),
            location_ids: Vec::new(),
            sample_count: 0,
        }
    }

    /// Record a loaded memory region of the profiled process.
    ///
    /// Regions may arrive interleaved with samples; they are emitted
    /// together at finalize. Ranges are trusted as reported by the host-OS
    /// enumeration.
    pub fn add_mapping(&mut self, start: u64, limit: u64, offset: u64, file: &str, build_id: &str) {
        self.mappings.push(start, limit, offset, file, build_id);
    }

    /// Encode one sample: measurement values plus its call stack, leaf
    /// first.
    ///
    /// Stack addresses must have return-PC semantics: the caller increments
    /// the leaf frame's address, since a raw signal address points at the
    /// executing instruction rather than a post-call return site.
    ///
    /// # Errors
    /// Returns an error if flushing to the destination fails.
    pub fn add_sample(
        &mut self,
        values: &[i64],
        stack: &[u64],
        labels: &[SampleLabel<'_>],
    ) -> Result<(), ProfileError> {
        // Resolve the stack before the Sample message opens: resolution
        // emits Location and Function messages, which must land between
        // top-level messages.
        self.location_ids.clear();
        for &addr in stack {
            let id = self.resolver.resolve(
                addr,
                &self.symbols,
                &mut self.strings,
                &mut self.mappings,
                &mut self.buf,
            );
            self.sink.maybe_flush(&mut self.buf)?;
            self.location_ids.push(id.0);
        }

        let mark = self.buf.start_message();
        self.buf.int64s(tags::SAMPLE_VALUE, values);
        self.buf.uint64s(tags::SAMPLE_LOCATION, &self.location_ids);
        for label in labels {
            let label_mark = self.buf.start_message();
            self.buf.int64_opt(tags::LABEL_KEY, self.strings.intern(label.key).0);
            match label.value {
                LabelValue::Str(value) => {
                    self.buf.int64_opt(tags::LABEL_STR, self.strings.intern(value).0);
                }
                LabelValue::Num(value) => self.buf.int64_opt(tags::LABEL_NUM, value),
            }
            self.buf.end_message(tags::SAMPLE_LABEL, label_mark);
        }
        self.buf.end_message(tags::PROFILE_SAMPLE, mark);
        self.sample_count += 1;

        self.sink.maybe_flush(&mut self.buf)
    }

    /// Attach a free-form comment to the profile.
    pub fn add_comment(&mut self, comment: &str) {
        let index = self.strings.intern(comment);
        self.comments.push(index);
    }

    /// Write the profile summary and close the compressed stream, handing
    /// the destination back.
    ///
    /// Consuming `self` is the finalize-exactly-once contract: further
    /// samples or a second finalize no longer typecheck.
    ///
    /// # Errors
    /// Returns an error if the final flush or the compressor close fails.
    pub fn finish(mut self) -> Result<W, ProfileError> {
        let time_nanos = self
            .start_time
            .duration_since(UNIX_EPOCH)
            .map_or(0, |since| i64::try_from(since.as_nanos()).unwrap_or(i64::MAX));
        self.buf.int64_opt(tags::PROFILE_TIME_NANOS, time_nanos);

        if let Some(period) = self.period_nanos {
            // Periodic metadata implies a CPU profile: occurrence count
            // plus scaled time per sample.
            self.value_type(tags::PROFILE_SAMPLE_TYPE, "samples", "count");
            self.value_type(tags::PROFILE_SAMPLE_TYPE, "cpu", "nanoseconds");
            let duration = i64::try_from(self.started.elapsed().as_nanos()).unwrap_or(i64::MAX);
            self.buf.int64_opt(tags::PROFILE_DURATION_NANOS, duration);
            self.value_type(tags::PROFILE_PERIOD_TYPE, "cpu", "nanoseconds");
            self.buf.int64_opt(tags::PROFILE_PERIOD, period);
        }

        for (index, mapping) in self.mappings.entries().iter().enumerate() {
            let mark = self.buf.start_message();
            self.buf.uint64_opt(tags::MAPPING_ID, index as u64 + 1);
            self.buf.uint64_opt(tags::MAPPING_START, mapping.start);
            self.buf.uint64_opt(tags::MAPPING_LIMIT, mapping.limit);
            self.buf.uint64_opt(tags::MAPPING_OFFSET, mapping.offset);
            self.buf.int64_opt(tags::MAPPING_FILENAME, self.strings.intern(&mapping.file).0);
            self.buf.int64_opt(tags::MAPPING_BUILD_ID, self.strings.intern(&mapping.build_id).0);
            if mapping.symbols.has_functions() {
                self.buf.bool_field(tags::MAPPING_HAS_FUNCTIONS, true);
            }
            self.buf.end_message(tags::PROFILE_MAPPING, mark);
        }

        if !self.comments.is_empty() {
            let indices: Vec<i64> = self.comments.iter().map(|index| index.0).collect();
            self.buf.int64s(tags::PROFILE_COMMENT, &indices);
        }

        self.buf.strings(tags::PROFILE_STRING_TABLE, self.strings.entries());

        info!(
            "profile finalized: {} samples, {} locations, {} functions, {} mappings, {} strings",
            self.sample_count,
            self.resolver.location_count(),
            self.resolver.function_count(),
            self.mappings.len(),
            self.strings.len(),
        );

        self.sink.finish(&mut self.buf)
    }

    /// Encode a ValueType submessage under `tag`.
    fn value_type(&mut self, tag: u32, kind: &str, unit: &str) {
        let mark = self.buf.start_message();
        self.buf.int64(tags::VALUE_TYPE_TYPE, self.strings.intern(kind).0);
        self.buf.int64(tags::VALUE_TYPE_UNIT, self.strings.intern(unit).0);
        self.buf.end_message(tag, mark);
    }
}
