//! Shared services: the customer aggregate workflow, the address memo and
//! telemetry wiring.

pub mod cache;
pub mod customers;
pub mod telemetry;

pub use cache::*;
pub use customers::*;
pub use telemetry::*;
