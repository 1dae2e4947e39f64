//! Wire types shared between the biotools client crates.

pub mod domain;
pub mod error;
pub mod protocol;
