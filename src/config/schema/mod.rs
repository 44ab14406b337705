mod core;
mod diary;
mod observability;
mod store;

pub use self::core::{Config, DEFAULT_MODEL, DEFAULT_PROVIDER, ReliabilityConfig};
pub use diary::{DiaryConfig, GovernorConfig};
pub use observability::ObservabilityConfig;
pub use store::{StoreBackend, StoreConfig};
