//! Session identifiers issued by the remote endpoint
//!
//! An identifier is 128 random bits held as two 64-bit halves. On the wire it
//! is a fixed 22-character string: each half is written as 11 base-57 digits,
//! most significant first, high half before low half. The alphabet leaves out
//! look-alike characters (`I`, `O`, `l`, `0`, `1`).

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::error::ProtocolError;

/// Number base of the textual form
pub const BASE: u64 = 57;

/// Characters per 64-bit half
pub const CHARS_PER_HALF: usize = 11;

/// Length of the textual form
pub const ENCODED_LEN: usize = CHARS_PER_HALF * 2;

const ALPHABET: &[u8; BASE as usize] =
    b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz23456789";

/// Opaque, globally-unique name of a logical connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier {
    hi: u64,
    lo: u64,
}

impl Identifier {
    pub fn new(hi: u64, lo: u64) -> Self {
        Self { hi, lo }
    }

    /// Generate a fresh random identifier
    pub fn random() -> Self {
        let (hi, lo) = Uuid::new_v4().as_u64_pair();
        Self { hi, lo }
    }

    pub fn hi(&self) -> u64 {
        self.hi
    }

    pub fn lo(&self) -> u64 {
        self.lo
    }

    /// Parse the 22-character textual form. No other form is accepted.
    pub fn parse(value: &str) -> Result<Self, ProtocolError> {
        if value.is_empty() {
            return Err(ProtocolError::MissingId);
        }

        let malformed = |reason: String| ProtocolError::MalformedId {
            value: value.to_string(),
            reason,
        };

        let bytes = value.as_bytes();
        if bytes.len() != ENCODED_LEN {
            return Err(malformed(format!(
                "expected {} characters, got {}",
                ENCODED_LEN,
                value.chars().count()
            )));
        }

        let (hi, lo) = bytes.split_at(CHARS_PER_HALF);
        let hi = decode_half(hi).map_err(&malformed)?;
        let lo = decode_half(lo).map_err(&malformed)?;
        Ok(Self { hi, lo })
    }
}

fn digit(c: u8) -> Option<u64> {
    ALPHABET.iter().position(|&a| a == c).map(|p| p as u64)
}

fn decode_half(chars: &[u8]) -> Result<u64, String> {
    chars.iter().try_fold(0u64, |acc, &c| {
        let d = digit(c).ok_or_else(|| format!("invalid character {:?}", c as char))?;
        acc.checked_mul(BASE)
            .and_then(|v| v.checked_add(d))
            .ok_or_else(|| "value exceeds 64 bits".to_string())
    })
}

fn encode_half(mut value: u64, out: &mut [u8]) {
    for slot in out.iter_mut().rev() {
        *slot = ALPHABET[(value % BASE) as usize];
        value /= BASE;
    }
}

impl FromStr for Identifier {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = [0u8; ENCODED_LEN];
        let (hi, lo) = buf.split_at_mut(CHARS_PER_HALF);
        encode_half(self.hi, hi);
        encode_half(self.lo, lo);
        // Alphabet is ASCII
        f.write_str(std::str::from_utf8(&buf).map_err(|_| fmt::Error)?)
    }
}
