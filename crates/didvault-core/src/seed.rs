//! Textual DID seed codec.
//!
//! Seeds are exchanged as multibase base58btc strings: a leading `z`
//! followed by the base58 encoding of a 34-byte buffer holding an
//! identity multihash header (`0x00 0x20`) and the 32-byte secret seed.
//! This is the same encoding produced by common DID tooling, so seeds
//! generated here are interchangeable with seeds provisioned out of band.

use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::RngCore;
use rand::rngs::OsRng;

use crate::error::SeedError;

/// Multibase prefix for base58btc.
const MULTIBASE_BASE58_BTC: char = 'z';

/// Identity multihash header: code `0x00`, length `0x20` (32 bytes).
const MULTIHASH_IDENTITY_HEADER: [u8; 2] = [0x00, 0x20];

/// Length of the decoded buffer: header plus seed.
const DECODED_LEN: usize = MULTIHASH_IDENTITY_HEADER.len() + SEED_LEN;

/// Length of the raw secret seed.
pub const SEED_LEN: usize = 32;

/// Decoded DID seed material.
///
/// Holds the 32-byte secret seed an Ed25519 keypair is derived from.
/// The raw bytes never appear in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct DidSeed([u8; SEED_LEN]);

impl DidSeed {
    /// Raw secret seed bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; SEED_LEN] {
        &self.0
    }

    /// Derives the Ed25519 signing key for this seed.
    #[must_use]
    pub fn signing_key(&self) -> SigningKey {
        SigningKey::from_bytes(&self.0)
    }

    /// Derives the Ed25519 public key for this seed.
    #[must_use]
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key().verifying_key()
    }
}

impl std::fmt::Debug for DidSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print secret material
        f.write_str("DidSeed(..)")
    }
}

/// Decodes a textual seed into key material.
///
/// # Errors
///
/// Returns a [`SeedError`] if the input is empty, lacks the multibase
/// prefix, is not valid base58, or does not decode to a 32-byte seed
/// with the expected identity multihash header.
pub fn decode_seed(text: &str) -> Result<DidSeed, SeedError> {
    if text.is_empty() {
        return Err(SeedError::Empty);
    }

    let payload = text
        .strip_prefix(MULTIBASE_BASE58_BTC)
        .ok_or(SeedError::MissingMultibasePrefix)?;

    let decoded = bs58::decode(payload).into_vec()?;
    if decoded.len() != DECODED_LEN {
        return Err(SeedError::InvalidLength {
            expected: DECODED_LEN,
            actual: decoded.len(),
        });
    }
    if decoded[..2] != MULTIHASH_IDENTITY_HEADER {
        return Err(SeedError::InvalidHeader);
    }

    let mut seed = [0u8; SEED_LEN];
    seed.copy_from_slice(&decoded[2..]);
    Ok(DidSeed(seed))
}

/// Generates a fresh random seed in the textual encoding.
///
/// Used both for the `generate` sentinel in environment overrides and
/// for the always-present random test tenant.
#[must_use]
pub fn generate_secret_key_seed() -> String {
    let mut seed = [0u8; SEED_LEN];
    OsRng.fill_bytes(&mut seed);

    let mut buf = [0u8; DECODED_LEN];
    buf[..2].copy_from_slice(&MULTIHASH_IDENTITY_HEADER);
    buf[2..].copy_from_slice(&seed);

    format!("{MULTIBASE_BASE58_BTC}{}", bs58::encode(buf).into_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tenant::DEFAULT_TEST_SEED;

    #[test]
    fn decodes_well_known_seed() {
        let seed = decode_seed(DEFAULT_TEST_SEED).expect("fixed seed decodes");
        assert_eq!(seed.as_bytes().len(), SEED_LEN);
        // Decoding is deterministic
        assert_eq!(seed, decode_seed(DEFAULT_TEST_SEED).unwrap());
    }

    #[test]
    fn generated_seed_roundtrips() {
        let text = generate_secret_key_seed();
        assert!(text.starts_with('z'));
        let seed = decode_seed(&text).expect("generated seed decodes");
        assert_eq!(seed.signing_key().verifying_key(), seed.verifying_key());
    }

    #[test]
    fn generated_seeds_differ() {
        let a = generate_secret_key_seed();
        let b = generate_secret_key_seed();
        assert_ne!(a, b);
        assert_ne!(decode_seed(&a).unwrap(), decode_seed(&b).unwrap());
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(decode_seed(""), Err(SeedError::Empty)));
    }

    #[test]
    fn rejects_missing_prefix() {
        assert!(matches!(
            decode_seed("1AeiPT496wWmo9BG2QYXeTusgFSZPNG3T9wNeTtjrQ3rCB"),
            Err(SeedError::MissingMultibasePrefix)
        ));
    }

    #[test]
    fn rejects_non_base58_payload() {
        // '0' and 'l' are not in the base58 alphabet
        assert!(matches!(
            decode_seed("z0l0l0l"),
            Err(SeedError::InvalidBase58(_))
        ));
    }

    #[test]
    fn rejects_wrong_length() {
        let short = format!("z{}", bs58::encode([0x00, 0x20, 0x01]).into_string());
        assert!(matches!(
            decode_seed(&short),
            Err(SeedError::InvalidLength { expected: 34, .. })
        ));
    }

    #[test]
    fn rejects_wrong_header() {
        let mut buf = [0u8; DECODED_LEN];
        buf[0] = 0x12; // sha2-256 code instead of identity
        buf[1] = 0x20;
        let text = format!("z{}", bs58::encode(buf).into_string());
        assert!(matches!(decode_seed(&text), Err(SeedError::InvalidHeader)));
    }

    #[test]
    fn debug_output_is_redacted() {
        let seed = decode_seed(DEFAULT_TEST_SEED).unwrap();
        assert_eq!(format!("{seed:?}"), "DidSeed(..)");
    }
}
