pub mod diagnostics;
pub mod observability;
