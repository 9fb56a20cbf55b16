//! TSID Generator
//!
//! Time-sorted identifiers rendered as 13 Crockford Base32 characters.
//! Lexicographic order follows creation time at millisecond granularity and
//! ids are unique, so `_id` gives the stores a stable tie-break for paging.

use std::sync::atomic::{AtomicU16, Ordering};

use chrono::Utc;

/// Crockford Base32 alphabet (excludes I, L, O, U)
const ALPHABET: &[u8] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

const TSID_LEN: usize = 13;

static COUNTER: AtomicU16 = AtomicU16::new(0);

pub struct TsidGenerator;

impl TsidGenerator {
    /// Layout (64 bits): 42 bits of epoch millis, 10 random bits, 12 counter bits.
    pub fn generate() -> String {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let counter = COUNTER.fetch_add(1, Ordering::Relaxed) as u64;
        let random = rand::random::<u16>() as u64 & 0x3FF;

        let tsid = ((now & 0x3FF_FFFF_FFFF) << 22) | (random << 12) | (counter & 0xFFF);
        encode_crockford(tsid)
    }
}

fn encode_crockford(mut value: u64) -> String {
    let mut out = [b'0'; TSID_LEN];
    for slot in out.iter_mut().rev() {
        *slot = ALPHABET[(value & 0x1F) as usize];
        value >>= 5;
    }
    out.iter().map(|&b| b as char).collect()
}
