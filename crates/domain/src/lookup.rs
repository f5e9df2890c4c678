//! Contracts for the external lookup services. Implementations live in the
//! `petcare_lookup` crate; tests substitute in-memory fakes.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{Address, Breed, BreedId, PostalCode};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("{0} not found by lookup service")]
    NotFound(String),
    #[error("lookup service unreachable: {0}")]
    Unreachable(String),
    #[error("unexpected lookup response: {0}")]
    InvalidResponse(String),
}

/// Resolves a postal code into a full address. One remote call per
/// invocation, no retries.
#[async_trait]
pub trait AddressLookup: Send + Sync {
    async fn resolve(&self, postal_code: &PostalCode) -> Result<Address, LookupError>;
}

#[async_trait]
pub trait BreedLookup: Send + Sync {
    async fn breed(&self, id: &BreedId) -> Result<Breed, LookupError>;
}
