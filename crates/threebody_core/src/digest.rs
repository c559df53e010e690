//! Digest parsing and the digest → initial state mapping.
//!
//! A digest is 64 lowercase hex characters. The mapper reads it as eighteen
//! consecutive 3-character chunks: nine position components followed by nine
//! velocity components. Only the first 54 characters are consumed; the last
//! ten are accepted but never read.

use crate::error::SolveError;
use crate::settings::MapperBounds;
use crate::system::{State, STATE_DIM};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const DIGEST_LEN: usize = 64;
pub const CHUNK_LEN: usize = 3;
/// Number of leading digest characters the mapper reads.
pub const CONSUMED_LEN: usize = STATE_DIM * CHUNK_LEN;

/// A validated 64-character lowercase hex digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest {
    text: String,
    nibbles: [u8; DIGEST_LEN],
}

impl Digest {
    pub fn parse(value: &str) -> Result<Self, SolveError> {
        let invalid: Vec<char> = value
            .chars()
            .filter(|c| !matches!(*c, '0'..='9' | 'a'..='f'))
            .collect();
        if !invalid.is_empty() {
            return Err(SolveError::InvalidInput(format!(
                "digest contains invalid symbols {invalid:?}"
            )));
        }
        if value.len() != DIGEST_LEN {
            return Err(SolveError::InvalidInput(format!(
                "digest length is {}, expected {DIGEST_LEN}",
                value.len()
            )));
        }

        let mut nibbles = [0u8; DIGEST_LEN];
        for (slot, byte) in nibbles.iter_mut().zip(value.bytes()) {
            *slot = hex_value(byte).ok_or_else(|| {
                SolveError::InvalidInput(format!("digest contains invalid byte {byte:#04x}"))
            })?;
        }
        Ok(Self {
            text: value.to_string(),
            nibbles,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Nibbles of chunk `index`, or `None` past the last chunk.
    pub fn chunk(&self, index: usize) -> Option<[u8; CHUNK_LEN]> {
        let start = index.checked_mul(CHUNK_LEN)?;
        let nibbles = self.nibbles.get(start..start + CHUNK_LEN)?;
        let mut chunk = [0u8; CHUNK_LEN];
        chunk.copy_from_slice(nibbles);
        Some(chunk)
    }

    /// The [`STATE_DIM`] chunks the mapper reads, in state order.
    pub(crate) fn state_chunks(&self) -> impl Iterator<Item = [u8; CHUNK_LEN]> + '_ {
        self.nibbles[..CONSUMED_LEN]
            .chunks_exact(CHUNK_LEN)
            .map(|nibbles| [nibbles[0], nibbles[1], nibbles[2]])
    }

    /// The characters the mapper never reads.
    pub fn unused_tail(&self) -> &str {
        &self.text[CONSUMED_LEN..]
    }
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        _ => None,
    }
}

impl FromStr for Digest {
    type Err = SolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Digest::parse(s)
    }
}

impl AsRef<str> for Digest {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Digest::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Maps three hex nibbles onto `[min, max]` with 4096 levels.
///
/// `000` gives `min` and `fff` gives `max`. The last nibble is weighted by
/// 1/15 of the middle step rather than 1/16, which is what lets `fff` land
/// exactly on `max`.
pub fn bound(nibbles: [u8; CHUNK_LEN], min: f64, max: f64) -> f64 {
    let range = max - min;
    let big_step = range / 16.0;
    let little_step = big_step / 16.0;
    let tiny_step = little_step / 15.0;

    let big = f64::from(nibbles[0]) * big_step;
    let little = f64::from(nibbles[1]) * little_step;
    let tiny = f64::from(nibbles[2]) * tiny_step;

    big + little + tiny + min
}

/// Maps a digest onto the 18-component initial state using the default bounds.
pub fn map_digest(digest: &Digest) -> State {
    map_digest_with(digest, &MapperBounds::default())
}

/// Maps a digest onto the 18-component initial state.
///
/// Layout: x1 y1 z1 x2 y2 z2 x3 y3 z3, then vx1 .. vz3.
pub fn map_digest_with(digest: &Digest, bounds: &MapperBounds) -> State {
    let mut state = [0.0; STATE_DIM];
    for (index, (value, nibbles)) in state.iter_mut().zip(digest.state_chunks()).enumerate() {
        let (min, max) = if index < STATE_DIM / 2 {
            bounds.position
        } else {
            bounds.velocity
        };
        *value = bound(nibbles, min, max);
    }
    state
}

/// Parses `hex` and maps it with the default bounds.
pub fn map_hex(hex: &str) -> Result<State, SolveError> {
    Ok(map_digest(&Digest::parse(hex)?))
}
