//! Numeric building blocks: location hashing and structural validation.

pub mod hash;
pub mod validation;

pub use hash::{hash, hash_signed, hash_unchecked, scale_signed, scale_unsigned};
