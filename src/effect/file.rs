//! Parser for the RIFF/FORC effect container format.
//!
//! A file is a fixed 28-byte header followed by zero or more `LIST`
//! chunks. Each chunk payload starts with a NUL-terminated identifier
//! (padded to even length) followed by fixed-size effect records, each
//! of which becomes one device upload request.

use evdev::{FFEffectData, FFEffectKind, FFEnvelope, FFReplay, FFTrigger};
use thiserror::Error;

/// Fixed container header: "RIFF" tag, four reserved bytes, "FORC"
/// type tag, then the 16-byte format GUID. Compared exactly.
const HEADER: [u8; 28] =
    *b"RIFF\x00\x00\x00\x00FORC\x5c\x77\x7e\x19\xba\x34\xd3\x11\xab\xd5\x00\xc0\x4f\x8e\xc6\x27";

const LIST_TAG: [u8; 4] = *b"LIST";

/// Shortest input that can still be diagnosed as a signature mismatch
/// rather than garbage.
const MIN_LEN: usize = 9;

/// Encoded size of one effect record.
pub const RECORD_LEN: usize = 16;

const KIND_CONSTANT: u16 = 1;
const KIND_RUMBLE: u16 = 2;

/// Represents all possible errors parsing an effect file
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("Effect file is too short: {0} bytes")]
    TooShort(usize),
    #[error("Effect file header signature mismatch")]
    BadSignature,
    #[error("Expected LIST chunk tag at offset {0}")]
    BadChunkTag(usize),
    #[error("Chunk at offset {0} is truncated")]
    TruncatedChunk(usize),
    #[error("List identifier is missing a NUL terminator")]
    UnterminatedIdent,
    #[error("Trailing {0} bytes do not form a whole effect record")]
    TruncatedRecord(usize),
    #[error("Unknown effect record kind: {0}")]
    UnknownRecordKind(u16),
}

/// Parse an effect container into device upload requests.
///
/// Walks every chunk exactly once: after the header, each iteration
/// consumes a 4-byte `LIST` tag, a 4-byte little-endian payload
/// length, and the payload itself, until the cursor reaches the end of
/// the input.
pub fn parse(bytes: &[u8]) -> Result<Vec<FFEffectData>, FormatError> {
    if bytes.len() < MIN_LEN {
        return Err(FormatError::TooShort(bytes.len()));
    }
    if bytes.len() < HEADER.len() || bytes[..HEADER.len()] != HEADER {
        return Err(FormatError::BadSignature);
    }

    let mut records = Vec::new();
    let mut cursor = HEADER.len();
    while cursor < bytes.len() {
        let chunk = &bytes[cursor..];
        if chunk.len() < 8 || chunk[..4] != LIST_TAG {
            return Err(FormatError::BadChunkTag(cursor));
        }
        let len = u32_le(chunk, 4) as usize;
        if chunk.len() - 8 < len {
            return Err(FormatError::TruncatedChunk(cursor));
        }
        parse_list(&chunk[8..8 + len], &mut records)?;
        cursor += 8 + len;
    }

    Ok(records)
}

/// Consume one list payload: identifier, optional pad byte, then a
/// whole number of effect records.
fn parse_list(payload: &[u8], records: &mut Vec<FFEffectData>) -> Result<(), FormatError> {
    let nul = payload
        .iter()
        .position(|&b| b == 0)
        .ok_or(FormatError::UnterminatedIdent)?;
    log::trace!(
        "Effect list '{}', {} bytes",
        String::from_utf8_lossy(&payload[..nul]),
        payload.len()
    );

    // Identifiers are padded so records start on an even offset
    let mut rest = &payload[nul + 1..];
    if rest.len() % 2 == 1 {
        rest = &rest[1..];
    }

    if rest.len() % RECORD_LEN != 0 {
        return Err(FormatError::TruncatedRecord(rest.len() % RECORD_LEN));
    }
    for record in rest.chunks_exact(RECORD_LEN) {
        records.push(decode_record(record)?);
    }

    Ok(())
}

/// Decode one 16-byte record. All multi-byte fields are little-endian.
fn decode_record(record: &[u8]) -> Result<FFEffectData, FormatError> {
    let kind = match u16_le(record, 0) {
        KIND_CONSTANT => FFEffectKind::Constant {
            level: u16_le(record, 8) as i16,
            envelope: FFEnvelope {
                attack_length: 0,
                attack_level: 0,
                fade_length: 0,
                fade_level: 0,
            },
        },
        KIND_RUMBLE => FFEffectKind::Rumble {
            strong_magnitude: u16_le(record, 8),
            weak_magnitude: u16_le(record, 10),
        },
        other => return Err(FormatError::UnknownRecordKind(other)),
    };

    Ok(FFEffectData {
        direction: u16_le(record, 2),
        trigger: FFTrigger {
            button: u16_le(record, 12),
            interval: u16_le(record, 14),
        },
        replay: FFReplay {
            length: u16_le(record, 4),
            delay: u16_le(record, 6),
        },
        kind,
    })
}

/// Decode a little-endian u32 starting at `at`.
fn u32_le(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Decode a little-endian u16 starting at `at`.
fn u16_le(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}
