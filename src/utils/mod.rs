//! Utility functions for code generation, URL validation and password hashing.
//!
//! - [`code_generator`] - Short code generation, validation and decoding
//! - [`url_validator`] - Destination URL checks
//! - [`password`] - Argon2id hashing

pub mod code_generator;
pub mod password;
pub mod url_validator;
