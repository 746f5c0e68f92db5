pub mod account;
#[cfg(feature = "test-utils")]
pub mod memory;

pub use account::PostgresAccountRepository;
#[cfg(feature = "test-utils")]
pub use memory::InMemoryAccountRepository;
