//! Domain-level building blocks shared by the API, storage and lookup crates:
//! the customer aggregate model, the storage and lookup contracts it depends
//! on, environment configuration, telemetry wiring and the aggregate service
//! that ties them together.

pub mod config;
pub mod lookup;
pub mod model;
pub mod services;
pub mod storage;

pub use lookup::*;
pub use model::*;
pub use storage::*;
