pub mod error;
pub mod seed;
pub mod tenant;

pub use error::SeedError;
pub use seed::{DidSeed, decode_seed, generate_secret_key_seed};
pub use tenant::{
    DEFAULT_TEST_SEED, DidMethod, RANDOM_TENANT_NAME, SECOND_TEST_TENANT_NAME, TEST_TENANT_NAME,
    TenantSeedEntry,
};
