//! 12-byte document ids rendered as 24 hex characters
//!
//! Layout: 4-byte big-endian seconds timestamp, 5 random bytes fixed per
//! process, 3-byte big-endian counter.

use std::fmt;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;

use lazy_static::lazy_static;
use rand::Rng;
use rand::RngCore;

use crate::TwiqError;
use crate::Result;

lazy_static! {
    static ref PROCESS_UNIQUE: [u8; 5] = {
        let mut bytes = [0u8; 5];
        rand::thread_rng().fill_bytes(&mut bytes);
        bytes
    };
    static ref COUNTER: AtomicU32 = AtomicU32::new(rand::thread_rng().gen_range(0..0x00FF_FFFF));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    #[must_use]
    pub fn new() -> Self {
        let secs = u32::try_from(chrono::Utc::now().timestamp()).unwrap_or(u32::MAX);
        let count = COUNTER.fetch_add(1, Ordering::Relaxed) & 0x00FF_FFFF;
        Self::from_parts(secs, *PROCESS_UNIQUE, count)
    }

    fn from_parts(secs: u32, unique: [u8; 5], count: u32) -> Self {
        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(&unique);
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        Self(bytes)
    }

    /// Parse a hex id, reporting failures as "Invalid postId"
    pub fn parse(raw: &str) -> Result<Self> {
        Self::parse_labeled(raw, "postId")
    }

    /// Parse a hex id, reporting failures as "Invalid {label}"
    pub fn parse_labeled(raw: &str, label: &str) -> Result<Self> {
        let bad = || TwiqError::Validation(format!("Invalid {label}"));
        let decoded = hex::decode(raw).map_err(|_| bad())?;
        let bytes: [u8; 12] = decoded.try_into().map_err(|_| bad())?;
        Ok(Self(bytes))
    }

    /// Seconds since the epoch encoded in the id
    #[must_use]
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
