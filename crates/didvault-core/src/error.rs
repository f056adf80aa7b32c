use thiserror::Error;

/// Errors produced while decoding textual DID seeds.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Seed is empty")]
    Empty,

    #[error("Seed is not multibase base58btc encoded (expected 'z' prefix)")]
    MissingMultibasePrefix,

    #[error("Seed payload is not valid base58: {0}")]
    InvalidBase58(#[from] bs58::decode::Error),

    #[error("Seed decodes to {actual} bytes, expected {expected}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Seed header is not a 32-byte identity multihash")]
    InvalidHeader,
}
