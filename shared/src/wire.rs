//! Fixed-layout record encoding for the peer protocol.
//!
//! Every [`Packet`] occupies exactly [`RECORD_LEN`] bytes on the wire:
//! `tag: u32 | player: i32 | body length: i32 | 100 coordinate slots`,
//! all little-endian. The record is a plain serde struct run through
//! bincode's fixint encoding, which lays the fields out back to back and
//! writes the coordinate array without a length prefix. Unused slots are
//! zero. The length field is validated into `0..=BODY_CAPACITY` on
//! receipt; anything outside that range (or an unknown tag) is a malformed
//! record the caller discards while keeping the connection alive.

use crate::{BoundedBody, Coord, Packet, PlayerId, BODY_CAPACITY};
use bincode::{deserialize, serialize};
use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;
use thiserror::Error;

/// Size of one message record: 12 header bytes plus 100 8-byte slots.
pub const RECORD_LEN: usize = 12 + BODY_CAPACITY * 8;

/// Size of the greeting record: the magic string plus the assigned id.
pub const HANDSHAKE_LEN: usize = 9;

pub const HANDSHAKE_MAGIC: &[u8; 5] = b"hello";

const TAG_NONE: u32 = 0;
const TAG_BODY: u32 = 1;
const TAG_PICKUP: u32 = 2;
const TAG_ASSIGN: u32 = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("record of {got} bytes is shorter than {need}")]
    Truncated { got: usize, need: usize },
    #[error("unknown record tag {0}")]
    UnknownTag(u32),
    #[error("body length {0} outside 0..={BODY_CAPACITY}")]
    BodyLength(i32),
    #[error("food assignment carries no cell")]
    MissingCell,
    #[error("handshake magic mismatch")]
    BadMagic,
    #[error("record codec error: {0}")]
    Codec(String),
}

/// On-wire form of every message. All four packet variants share this one
/// layout; the unused tail of `cells` stays zeroed.
#[derive(Serialize, Deserialize)]
struct WireRecord {
    tag: u32,
    player: PlayerId,
    len: i32,
    #[serde(with = "BigArray")]
    cells: [Coord; BODY_CAPACITY],
}

pub fn encode_packet(packet: &Packet) -> Result<Vec<u8>, WireError> {
    let (tag, player, cells): (u32, PlayerId, &[Coord]) = match packet {
        Packet::None => (TAG_NONE, 0, &[]),
        Packet::BodyUpdate { player, body } => (TAG_BODY, *player, body.cells()),
        Packet::FoodPickup { player } => (TAG_PICKUP, *player, &[]),
        Packet::FoodAssign { player, cell } => (TAG_ASSIGN, *player, std::slice::from_ref(cell)),
    };

    let mut record = WireRecord {
        tag,
        player,
        len: cells.len() as i32,
        cells: [Coord::default(); BODY_CAPACITY],
    };
    record.cells[..cells.len()].copy_from_slice(cells);

    serialize(&record).map_err(|e| WireError::Codec(e.to_string()))
}

pub fn decode_packet(buf: &[u8]) -> Result<Packet, WireError> {
    if buf.len() < RECORD_LEN {
        return Err(WireError::Truncated {
            got: buf.len(),
            need: RECORD_LEN,
        });
    }
    let record: WireRecord =
        deserialize(&buf[..RECORD_LEN]).map_err(|e| WireError::Codec(e.to_string()))?;

    if record.len < 0 || record.len as usize > BODY_CAPACITY {
        return Err(WireError::BodyLength(record.len));
    }
    let count = record.len as usize;

    match record.tag {
        TAG_NONE => Ok(Packet::None),
        TAG_BODY => {
            let body = BoundedBody::from_cells(&record.cells[..count])
                .map_err(|_| WireError::BodyLength(record.len))?;
            Ok(Packet::BodyUpdate {
                player: record.player,
                body,
            })
        }
        TAG_PICKUP => Ok(Packet::FoodPickup {
            player: record.player,
        }),
        TAG_ASSIGN => {
            if count == 0 {
                return Err(WireError::MissingCell);
            }
            Ok(Packet::FoodAssign {
                player: record.player,
                cell: record.cells[0],
            })
        }
        other => Err(WireError::UnknownTag(other)),
    }
}

pub fn encode_handshake(player: PlayerId) -> [u8; HANDSHAKE_LEN] {
    let mut buf = [0u8; HANDSHAKE_LEN];
    buf[..5].copy_from_slice(HANDSHAKE_MAGIC);
    buf[5..9].copy_from_slice(&player.to_le_bytes());
    buf
}

/// Validates the magic string and returns the id the host assigned.
pub fn decode_handshake(buf: &[u8]) -> Result<PlayerId, WireError> {
    if buf.len() < HANDSHAKE_LEN {
        return Err(WireError::Truncated {
            got: buf.len(),
            need: HANDSHAKE_LEN,
        });
    }
    if &buf[..5] != HANDSHAKE_MAGIC {
        return Err(WireError::BadMagic);
    }
    Ok(read_i32(buf, 5))
}

/// Reassembles fixed-size records from an arbitrarily chunked byte stream.
///
/// Bytes short of a full record stay buffered until a later feed completes
/// them; a complete but malformed record is consumed and returned as an
/// error so the stream position never desynchronizes.
#[derive(Debug, Default)]
pub struct RecordBuffer {
    bytes: Vec<u8>,
}

impl RecordBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend_from_slice(&mut self, chunk: &[u8]) {
        self.bytes.extend_from_slice(chunk);
    }

    /// Decodes the next complete record, or `None` if more bytes are needed.
    pub fn next_packet(&mut self) -> Option<Result<Packet, WireError>> {
        if self.bytes.len() < RECORD_LEN {
            return None;
        }
        let record: Vec<u8> = self.bytes.drain(..RECORD_LEN).collect();
        Some(decode_packet(&record))
    }

    pub fn buffered(&self) -> usize {
        self.bytes.len()
    }
}

fn read_i32(buf: &[u8], at: usize) -> i32 {
    i32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}
