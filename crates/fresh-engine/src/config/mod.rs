pub mod loader;
pub mod schema;

pub use loader::{CONFIG_ENV, ConfigError, ConfigLoader, LoadedConfig};
pub use schema::{FreshConfig, TimeoutConfig};
