pub mod schema;

pub use schema::{
    Config, DiaryConfig, GovernorConfig, ObservabilityConfig, ReliabilityConfig, StoreBackend,
    StoreConfig,
};
