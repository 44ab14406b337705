mod env_overrides;
mod loader;
#[cfg(test)]
mod test_env;
mod types;

pub use types::{Config, DEFAULT_MODEL, DEFAULT_PROVIDER, ReliabilityConfig};
