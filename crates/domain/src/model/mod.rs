//! Data structures shared across the API, storage and lookup crates.

use std::fmt;

use thiserror::Error;

/// Number of digits in a Brazilian postal code (CEP).
pub const POSTAL_CODE_DIGITS: usize = 8;

/// Name given to pets created through the attach shortcut.
pub const PLACEHOLDER_PET_NAME: &str = "New Pet";

/// Species tag given to pets created through the attach shortcut.
pub const DEFAULT_SPECIES: &str = "Dog";

/// Errors emitted when a user-supplied postal code fails validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PostalCodeError {
    #[error("postal code must not be empty")]
    Empty,
    #[error("postal code must have exactly {POSTAL_CODE_DIGITS} digits")]
    WrongLength,
    #[error("postal code contains non-digit characters")]
    NonDigit,
}

/// Canonical `NNNNN-NNN` postal code. Also the address cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostalCode(String);

impl PostalCode {
    /// Accepts `NNNNNNNN` or `NNNNN-NNN` (surrounding whitespace ignored).
    pub fn parse(raw: &str) -> Result<Self, PostalCodeError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PostalCodeError::Empty);
        }

        let digits: String = match trimmed.split_once('-') {
            Some((head, tail)) if head.len() == 5 => format!("{head}{tail}"),
            Some(_) => return Err(PostalCodeError::NonDigit),
            None => trimmed.to_owned(),
        };

        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(PostalCodeError::NonDigit);
        }
        if digits.len() != POSTAL_CODE_DIGITS {
            return Err(PostalCodeError::WrongLength);
        }

        Ok(Self(format!("{}-{}", &digits[..5], &digits[5..])))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The eight digits without the separator, as external services expect.
    pub fn digits(&self) -> String {
        self.0.replace('-', "")
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BreedIdError {
    #[error("breed id must not be blank")]
    Blank,
}

/// Opaque breed identifier in the breed lookup service's namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BreedId(String);

impl BreedId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn parse(raw: &str) -> Result<Self, BreedIdError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(BreedIdError::Blank);
        }
        Ok(Self::new(trimmed))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for BreedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CustomerId(i64);

impl CustomerId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PetId(i64);

impl PetId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for PetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Address record keyed by postal code. Treated as an immutable fact once
/// stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub postal_code: PostalCode,
    pub street: String,
    pub complement: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pet {
    pub id: PetId,
    pub owner: CustomerId,
    pub name: String,
    pub species: String,
    pub breed: BreedId,
}

/// Pet that has not been persisted yet; ownership is assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPet {
    pub name: String,
    pub species: String,
    pub breed: BreedId,
}

impl NewPet {
    pub fn placeholder(breed: BreedId) -> Self {
        Self {
            name: PLACEHOLDER_PET_NAME.to_owned(),
            species: DEFAULT_SPECIES.to_owned(),
            breed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub address: Address,
    pub pets: Vec<Pet>,
}

/// Insert candidate: the address is still an unresolved postal code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub name: String,
    pub postal_code: PostalCode,
    pub pets: Vec<NewPet>,
}

/// Fields an update may rewrite. Pets are not part of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerChanges {
    pub name: String,
    pub postal_code: PostalCode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breed {
    pub id: BreedId,
    pub name: String,
    pub description: String,
    pub hypoallergenic: bool,
}
