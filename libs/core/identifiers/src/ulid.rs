// [libs/core/identifiers/src/ulid.rs]
//! A minimal ULID-style identifier: a 48-bit millisecond timestamp
//! followed by 80 bits of randomness, encoded with Crockford's base32.
//!
//! This is intentionally not a byte-for-byte ULID implementation (no
//! external crate is pulled in for a 40-line encoder); it preserves
//! the property mission and node ids rely on for ordering -- lexicographic
//! sort order matches creation order.

const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Generates a new time-sortable identifier.
pub fn new_ulid() -> String {
    let millis = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;
    let randomness: [u8; 10] = rand::random();
    encode(millis, &randomness)
}

fn encode(timestamp_millis: u64, randomness: &[u8; 10]) -> String {
    let mut bits: Vec<u8> = Vec::with_capacity(128);
    // 48 bits of timestamp, most-significant first.
    for i in (0..48).rev() {
        bits.push(((timestamp_millis >> i) & 1) as u8);
    }
    // 80 bits of randomness.
    for byte in randomness {
        for i in (0..8).rev() {
            bits.push((byte >> i) & 1);
        }
    }

    let mut out = String::with_capacity(26);
    for chunk in bits.chunks(5) {
        let mut value = 0u8;
        for (i, bit) in chunk.iter().enumerate() {
            value |= bit << (chunk.len() - 1 - i);
        }
        out.push(CROCKFORD_ALPHABET[value as usize] as char);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_to_26_characters() {
        assert_eq!(encode(0, &[0; 10]).len(), 26);
        assert_eq!(encode(u64::MAX, &[0xFF; 10]).len(), 26);
    }

    #[test]
    fn higher_timestamp_sorts_after() {
        let earlier = encode(1_000, &[0; 10]);
        let later = encode(2_000, &[0; 10]);
        assert!(earlier < later);
    }
}
