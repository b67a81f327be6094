//! Stream-level tests: gzip envelope, flush discipline under load, and
//! error surfacing from a failing destination.

use profwire::{FnLookup, ProfileBuilder, ProfileError, SourceFrame};
use std::io::{self, Write};

/// Destination that rejects every write.
#[derive(Debug)]
struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "destination gone"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "destination gone"))
    }
}

/// Destination that counts write calls before delegating to a buffer.
struct CountingWriter {
    writes: usize,
    bytes: Vec<u8>,
}

impl Write for CountingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writes += 1;
        self.bytes.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn wordy_symbols() -> FnLookup<impl Fn(u64) -> Option<SourceFrame>> {
    FnLookup(|addr: u64| {
        Some(SourceFrame {
            function: format!("namespace::module::very_descriptive_function_{addr:016x}"),
            file: format!("src/generated/module_{addr:08x}.rs"),
            line: i64::try_from(addr % 10_000).unwrap_or(0),
        })
    })
}

#[test]
fn test_output_starts_with_gzip_magic() {
    let mut builder = ProfileBuilder::new(Vec::new(), ());
    builder.add_sample(&[1], &[0x10], &[]).unwrap();
    let out = builder.finish().unwrap();
    assert_eq!(&out[..2], &[0x1f, 0x8b]);
}

#[test]
fn test_streaming_reaches_destination_before_finish() {
    let destination = CountingWriter { writes: 0, bytes: Vec::new() };
    let mut builder = ProfileBuilder::new(destination, wordy_symbols());
    for i in 0..5_000_u64 {
        builder.add_sample(&[1], &[0x0040_0000 + i * 0x10], &[]).unwrap();
    }
    let destination = builder.finish().unwrap();

    assert!(destination.writes > 1, "compressed stream should arrive incrementally");
    assert_eq!(&destination.bytes[..2], &[0x1f, 0x8b]);
}

#[test]
fn test_write_failure_surfaces_at_finish() {
    let mut builder = ProfileBuilder::new(FailingWriter, ());
    builder.add_sample(&[1], &[0x10], &[]).unwrap();

    let err = builder.finish().expect_err("failing destination must surface");
    assert!(matches!(err, ProfileError::Write(_) | ProfileError::Finish(_)));
}

#[test]
fn test_write_failure_surfaces_during_streaming() {
    // With enough poorly-compressing data, the compressor must push
    // output mid-stream and the failure surfaces before finalize.
    let mut builder = ProfileBuilder::new(FailingWriter, wordy_symbols());
    let mut streaming_error = None;
    for i in 0..50_000_u64 {
        if let Err(err) = builder.add_sample(&[1], &[0x0100_0000 + i * 0x10], &[]) {
            streaming_error = Some(err);
            break;
        }
    }

    match streaming_error {
        Some(err) => assert!(matches!(err, ProfileError::Write(_))),
        // in the worst case the failure still shows up at finish
        None => assert!(builder.finish().is_err()),
    }
}
