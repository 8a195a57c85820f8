//! Core types shared by every gopm module.
//!
//! Currently this is the error taxonomy and its user-facing rendering; see [`error`].

pub mod error;

pub use error::{ErrorContext, GopmError, user_friendly_error};
