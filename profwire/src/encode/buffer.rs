//! Low-level protobuf wire encoding
//!
//! `WireBuffer` writes tagged fields using the two wire types the pprof
//! format needs: varints and length-delimited payloads. Submessages are
//! framed with [`WireBuffer::start_message`] / [`WireBuffer::end_message`]:
//! the payload is written first and the tag + length header is rotated into
//! place when the message closes, since a length-delimited field's size must
//! precede its bytes on the wire.
//!
//! The buffer tracks nesting depth so the sink can tell whether a message is
//! currently open. While any message is open, no byte in the buffer may be
//! handed to the sink: its length header does not exist yet.

/// Varint wire type (int32, int64, uint64, bool, enum).
const WIRE_VARINT: u64 = 0;
/// Length-delimited wire type (string, bytes, submessages, packed fields).
const WIRE_LEN: u64 = 2;

/// Opaque position of an open message's first payload byte.
///
/// Returned by [`WireBuffer::start_message`] and consumed by the matching
/// [`WireBuffer::end_message`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct MessageMark(usize);

/// Accumulates encoded fields for the profile stream.
#[derive(Debug, Default)]
pub(crate) struct WireBuffer {
    data: Vec<u8>,
    nest: u32,
}

impl WireBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Number of pending bytes not yet handed to the sink.
    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    /// True when no submessage is open, i.e. every byte in the buffer is a
    /// complete top-level field and may be flushed.
    pub(crate) fn is_top_level(&self) -> bool {
        self.nest == 0
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Drop all pending bytes after the sink has consumed them.
    pub(crate) fn clear(&mut self) {
        self.data.clear();
    }

    fn varint(&mut self, mut value: u64) {
        while value >= 0x80 {
            self.data.push((value as u8 & 0x7f) | 0x80);
            value >>= 7;
        }
        self.data.push(value as u8);
    }

    fn key(&mut self, tag: u32, wire_type: u64) {
        self.varint(u64::from(tag) << 3 | wire_type);
    }

    /// Write a uint64 field.
    pub(crate) fn uint64(&mut self, tag: u32, value: u64) {
        self.key(tag, WIRE_VARINT);
        self.varint(value);
    }

    /// Write a uint64 field, omitting it when the value is the proto3
    /// default (zero).
    pub(crate) fn uint64_opt(&mut self, tag: u32, value: u64) {
        if value != 0 {
            self.uint64(tag, value);
        }
    }

    /// Write an int64 field. Negative values use the plain two's-complement
    /// varint form, as proto3 `int64` requires (not zigzag).
    pub(crate) fn int64(&mut self, tag: u32, value: i64) {
        self.uint64(tag, value as u64);
    }

    /// Write an int64 field, omitting the proto3 default (zero).
    pub(crate) fn int64_opt(&mut self, tag: u32, value: i64) {
        if value != 0 {
            self.int64(tag, value);
        }
    }

    /// Write a repeated uint64 field as a single packed field.
    ///
    /// An empty slice writes nothing: an absent repeated field decodes as
    /// empty.
    pub(crate) fn uint64s(&mut self, tag: u32, values: &[u64]) {
        if values.is_empty() {
            return;
        }
        let payload_start = self.data.len();
        for &value in values {
            self.varint(value);
        }
        self.close_delimited(tag, payload_start);
    }

    /// Write a repeated int64 field as a single packed field.
    pub(crate) fn int64s(&mut self, tag: u32, values: &[i64]) {
        if values.is_empty() {
            return;
        }
        let payload_start = self.data.len();
        for &value in values {
            self.varint(value as u64);
        }
        self.close_delimited(tag, payload_start);
    }

    /// Write a bool field. Callers emit `true` flags only and leave `false`
    /// to the proto3 default.
    pub(crate) fn bool_field(&mut self, tag: u32, value: bool) {
        self.uint64(tag, u64::from(value));
    }

    /// Write a string field. The empty string is written as a zero-length
    /// payload, which matters for the string table's reserved entry 0.
    pub(crate) fn string(&mut self, tag: u32, value: &str) {
        self.key(tag, WIRE_LEN);
        self.varint(value.len() as u64);
        self.data.extend_from_slice(value.as_bytes());
    }

    /// Write a repeated string field, one length-delimited entry per string.
    pub(crate) fn strings(&mut self, tag: u32, values: &[String]) {
        for value in values {
            self.string(tag, value);
        }
    }

    /// Open a submessage. Every `start_message` must be paired with exactly
    /// one [`WireBuffer::end_message`] before the buffer may be flushed.
    pub(crate) fn start_message(&mut self) -> MessageMark {
        self.nest += 1;
        MessageMark(self.data.len())
    }

    /// Close the submessage opened at `mark`, framing everything written
    /// since as a length-delimited field under `tag`.
    pub(crate) fn end_message(&mut self, tag: u32, mark: MessageMark) {
        self.close_delimited(tag, mark.0);
        self.nest -= 1;
    }

    /// Frame `data[payload_start..]` as a length-delimited field: append the
    /// tag + length header after the payload, then rotate it in front. The
    /// payload length is only known here, after the payload was written.
    fn close_delimited(&mut self, tag: u32, payload_start: usize) {
        let payload_len = self.data.len() - payload_start;
        let header_start = self.data.len();
        self.key(tag, WIRE_LEN);
        self.varint(payload_len as u64);
        let header_len = self.data.len() - header_start;
        self.data[payload_start..].rotate_right(header_len);
    }
}
