//! Newtype IDs for type-safe identifiers.
//!
//! Using newtypes prevents accidentally mixing up different ID types,
//! e.g., passing a SubCategoryId where a ProductId is expected. The API
//! issues integer keys, so every ID wraps a `u64` and serializes as a bare
//! number.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($name:ident) => {
        /// A unique identifier.
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Create an ID from its integer key.
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// The integer key.
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

// Catalog
define_id!(MainCategoryId);
define_id!(SubCategoryId);
define_id!(ProductId);

// Phone cases
define_id!(CaseMainCategoryId);
define_id!(CasePhoneId);
define_id!(CaseModelId);
define_id!(CaseProductId);
define_id!(CaseVariantId);
define_id!(ModelMappingId);

// Accounts
define_id!(UserId);

/// Hands out increasing integer keys, starting at 1.
#[derive(Debug, Clone, Default)]
pub struct IdSequence {
    last: u64,
}

impl IdSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next key in the sequence.
    pub fn next<T: From<u64>>(&mut self) -> T {
        self.last += 1;
        T::from(self.last)
    }
}
