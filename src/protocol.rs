use arrayvec::ArrayString;
use heapless::Vec;
use static_assertions::const_assert;

use crate::registry::ChannelRegistry;

/// Bound on an unterminated input line. Anything longer is junk from a
/// malformed or unterminated stream and is dropped wholesale rather than
/// allowed to grow without bound.
pub const MAX_LINE_LEN: usize = 64;

/// Worst case: alternating one-byte segments and separators.
pub const MAX_SEGMENTS_PER_LINE: usize = 32;
const_assert!(MAX_SEGMENTS_PER_LINE * 2 >= MAX_LINE_LEN);

pub const SEGMENT_SEPARATOR: char = ';';
pub const TOKEN_SEPARATOR: char = ':';

pub type LineBuffer = ArrayString<MAX_LINE_LEN>;
pub type LineOutcomes = Vec<SegmentOutcome, MAX_SEGMENTS_PER_LINE>;

/// Structured result of one `;`-delimited segment. The command loop ignores
/// these (the protocol is fire-and-forget and never surfaces errors), but
/// returning them keeps the silent-drop policy observable in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentOutcome {
    /// Target stored, already clamped into the channel's safe range.
    Applied { channel: usize, target_deg: i16 },
    /// Wrong token shape or a non-numeric value; segment had no effect.
    DroppedMalformed,
    /// Well-formed token naming a channel outside the table.
    DroppedUnknownChannel,
}

/// Accumulates raw input bytes into delimiter-stripped lines.
///
/// `\r` is ignored so both line-ending conventions work. When the buffer
/// bound is exceeded the accumulated bytes are discarded and everything up
/// to the next terminator is ignored, so a runaway unterminated stream
/// costs bounded memory and exactly one lost line.
#[derive(Debug, Default)]
pub struct LineAssembler {
    buffer: LineBuffer,
    discarding: bool,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self {
            buffer: LineBuffer::new(),
            discarding: false,
        }
    }

    /// Feed one byte; returns the completed line when `byte` terminates one.
    pub fn push_byte(&mut self, byte: u8) -> Option<LineBuffer> {
        match byte {
            b'\r' => None,
            b'\n' => {
                if self.discarding {
                    self.discarding = false;
                    self.buffer.clear();
                    return None;
                }
                let line = self.buffer;
                self.buffer.clear();
                Some(line)
            }
            _ => {
                if self.discarding {
                    return None;
                }
                if self.buffer.try_push(char::from(byte)).is_err() {
                    // Overflow: drop the whole line, resume after the terminator.
                    self.buffer.clear();
                    self.discarding = true;
                }
                None
            }
        }
    }

    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_discarding(&self) -> bool {
        self.discarding
    }
}

/// Parse one delimiter-stripped line into target updates.
///
/// The line is split on `;` and each segment is handled independently, so a
/// garbled fragment never aborts the rest of the line. An empty line (or an
/// empty segment) is a no-op, not an error. Nothing here fails: every
/// malformed segment degrades to "no effect" and is recorded in the
/// returned outcome list.
pub fn parse_line(line: &str, registry: &mut ChannelRegistry) -> LineOutcomes {
    let mut outcomes = LineOutcomes::new();
    if line.is_empty() {
        return outcomes;
    }

    for segment in line.split(SEGMENT_SEPARATOR) {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        let _ = outcomes.push(parse_segment(segment, registry));
    }

    outcomes
}

/// Handle one trimmed, non-empty segment of the form `id:value`.
fn parse_segment(segment: &str, registry: &mut ChannelRegistry) -> SegmentOutcome {
    let mut parts = segment.splitn(2, TOKEN_SEPARATOR);
    let id_part = parts.next().unwrap_or_default().trim();
    let Some(value_part) = parts.next() else {
        // No ':' separator at all.
        return SegmentOutcome::DroppedMalformed;
    };

    let value_part = value_part.trim();
    if value_part.is_empty() || !value_part.bytes().all(|b| b.is_ascii_digit()) {
        // Unsigned decimal digits only; the wire format has no way to
        // express a sign or a fraction.
        return SegmentOutcome::DroppedMalformed;
    }

    if id_part.is_empty() {
        return SegmentOutcome::DroppedMalformed;
    }

    let Some(index) = registry.lookup(id_part) else {
        return SegmentOutcome::DroppedUnknownChannel;
    };

    // A digit run too large for u32 still clamps to the channel maximum.
    let requested = value_part.parse::<u32>().unwrap_or(u32::MAX);
    let requested_deg = requested.min(i16::MAX as u32) as i16;

    match registry.apply_target(index, requested_deg) {
        Some(target_deg) => SegmentOutcome::Applied {
            channel: index,
            target_deg,
        },
        None => SegmentOutcome::DroppedUnknownChannel,
    }
}
