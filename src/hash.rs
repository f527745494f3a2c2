//! Deterministic, seeded, non-cryptographic hash functions
//!
//! `hash64` and `hash128` are the identity hashes used throughout the crate:
//! words and URLs are keyed by `hash64`, page content by `hash128`. The
//! remaining functions are small self-contained 64-bit hashes with fixed
//! constants, kept for callers that want a digest independent of any
//! third-party implementation.

use xxhash_rust::xxh3::{xxh3_128_with_seed, xxh3_64_with_seed};

/// Hash of a normalized word
pub type WordHash = u64;

/// Hash of a canonical URL
pub type UrlHash = u64;

/// Hash of raw page content
pub type ContentHash = u128;

/// Seed shared by `hash64` and `hash128`.
///
/// Changing it invalidates every persisted index.
pub const HASH_SEED: u64 = 0x666F_7373_656E_0001;

const MWC64_ALPHA: u64 = 0x0000_7F54_5454_5437;
const FNV64_INITIAL_OFFSET: u64 = 0xCBF2_9CE4_8422_2325;
const FNV64_PRIME: u64 = 0x0000_0100_0000_01B3;
const XORSHIFT64_ALPHA: u64 = 0x2545_F491_4F6C_DD1D;
const XORSHIFT64_INITIAL_OFFSET: u64 = 0x7A64_3C25_D6ED_AD19;

/// 64-bit hash used for word and URL identity
///
/// # Examples
///
/// ```
/// use fossen::hash::hash64;
///
/// assert_eq!(hash64(b"alpha"), hash64(b"alpha"));
/// assert_ne!(hash64(b"alpha"), hash64(b"beta"));
/// ```
pub fn hash64(data: &[u8]) -> u64 {
    xxh3_64_with_seed(data, HASH_SEED)
}

/// 128-bit hash used for content identity
pub fn hash128(data: &[u8]) -> u128 {
    xxh3_128_with_seed(data, HASH_SEED)
}

/// FNV-1a, 64-bit variant
pub fn fnv1a_64(data: &[u8]) -> u64 {
    data.iter().fold(FNV64_INITIAL_OFFSET, |acc, &byte| {
        (acc ^ u64::from(byte)).wrapping_mul(FNV64_PRIME)
    })
}

/// Multiply-with-carry hash over bytes
pub fn mwc_64(data: &[u8]) -> u64 {
    data.iter().fold(FNV64_INITIAL_OFFSET, |acc, &byte| {
        let acc = acc.wrapping_add(u64::from(byte));
        (acc & u64::from(u32::MAX))
            .wrapping_mul(MWC64_ALPHA)
            .wrapping_add(acc >> 32)
    })
}

/// Xorshift* hash; mixes every byte twice
pub fn xorshift_star_64(data: &[u8]) -> u64 {
    let mut result = (data.len() as u64).wrapping_add(XORSHIFT64_INITIAL_OFFSET);
    for _ in 0..2 {
        for &byte in data {
            result = result.wrapping_add(u64::from(byte));
            result = xorshift_star_step(result);
        }
    }
    result
}

fn xorshift_star_step(mut val: u64) -> u64 {
    val ^= val >> 13;
    val ^= val << 25;
    val ^= val >> 27;
    val.wrapping_mul(XORSHIFT64_ALPHA)
}
