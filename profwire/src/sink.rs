//! Compressed output sink with flush discipline
//!
//! Profiles are gzip streams; this sink owns the compressor and decides
//! when pending encoded bytes move into it. Flushing is only legal between
//! top-level messages — an open message has no length header yet, and
//! splitting it across a flush would corrupt the stream.

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::domain::ProfileError;
use crate::encode::WireBuffer;

/// Pending bytes above this trigger a flush at the next top-level boundary.
const FLUSH_THRESHOLD: usize = 4096;

/// Gzip-compressing destination wrapper.
pub(crate) struct GzipSink<W: Write> {
    encoder: GzEncoder<W>,
}

impl<W: Write> GzipSink<W> {
    /// Wrap `destination` in a gzip filter. Fastest compression level: the
    /// encoder sits on the sample hot path and profile data compresses well
    /// regardless.
    pub(crate) fn new(destination: W) -> Self {
        Self { encoder: GzEncoder::new(destination, Compression::fast()) }
    }

    /// Push the pending buffer through the compressor if it has grown past
    /// the threshold. A no-op while any message is open.
    pub(crate) fn maybe_flush(&mut self, buf: &mut WireBuffer) -> Result<(), ProfileError> {
        if buf.is_top_level() && buf.len() > FLUSH_THRESHOLD {
            self.encoder.write_all(buf.as_bytes()).map_err(ProfileError::Write)?;
            buf.clear();
        }
        Ok(())
    }

    /// Write any remaining bytes, finish the gzip stream, and hand back the
    /// destination. Errors from the final flush and from closing the
    /// compressor both surface.
    pub(crate) fn finish(mut self, buf: &mut WireBuffer) -> Result<W, ProfileError> {
        self.encoder.write_all(buf.as_bytes()).map_err(ProfileError::Write)?;
        buf.clear();
        self.encoder.finish().map_err(ProfileError::Finish)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_buffer(bytes: usize) -> WireBuffer {
        let mut buf = WireBuffer::new();
        // two bytes per field
        for _ in 0..bytes / 2 {
            buf.uint64(1, 1);
        }
        buf
    }

    #[test]
    fn test_no_flush_below_threshold() {
        let mut sink = GzipSink::new(Vec::new());
        let mut buf = filled_buffer(FLUSH_THRESHOLD);

        sink.maybe_flush(&mut buf).unwrap();
        assert_eq!(buf.len(), FLUSH_THRESHOLD);
    }

    #[test]
    fn test_flush_above_threshold_clears_buffer() {
        let mut sink = GzipSink::new(Vec::new());
        let mut buf = filled_buffer(FLUSH_THRESHOLD + 2);

        sink.maybe_flush(&mut buf).unwrap();
        assert_eq!(buf.len(), 0);
    }

    #[test]
    fn test_no_flush_while_message_open() {
        let mut sink = GzipSink::new(Vec::new());
        let mut buf = filled_buffer(FLUSH_THRESHOLD + 2);
        let mark = buf.start_message();

        sink.maybe_flush(&mut buf).unwrap();
        assert!(buf.len() > FLUSH_THRESHOLD);

        buf.end_message(2, mark);
        sink.maybe_flush(&mut buf).unwrap();
        assert_eq!(buf.len(), 0);
    }

    #[test]
    fn test_finish_returns_destination_with_gzip_magic() {
        let sink = GzipSink::new(Vec::new());
        let mut buf = WireBuffer::new();
        buf.uint64(9, 123);

        let out = sink.finish(&mut buf).unwrap();
        assert_eq!(&out[..2], &[0x1f, 0x8b]);
    }
}
