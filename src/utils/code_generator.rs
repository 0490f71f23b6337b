//! Short code generation, validation and decoding.
//!
//! Codes are drawn uniformly from a 62-symbol alphabet (`0-9A-Za-z`) using a
//! cryptographically secure generator, so consecutive codes cannot be
//! enumerated. The generator only supplies candidates; uniqueness is enforced
//! by the link store.

use crate::error::AppError;
use rand::Rng;
use serde_json::json;

/// Base-62 alphabet in digit order.
pub const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Produces fixed-length random short codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeGenerator {
    length: usize,
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LENGTH)
    }
}

impl CodeGenerator {
    pub const DEFAULT_LENGTH: usize = 8;

    /// Creates a generator for codes of `length` symbols (at least one).
    pub fn new(length: usize) -> Self {
        Self {
            length: length.max(1),
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Generates a random candidate code.
    ///
    /// Uses the thread-local CSPRNG, which is seeded from the operating system.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let code = CodeGenerator::new(8).generate();
    /// assert_eq!(code.len(), 8);
    /// assert!(CodeGenerator::is_valid(&code));
    /// ```
    pub fn generate(&self) -> String {
        let mut rng = rand::rng();

        (0..self.length)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect()
    }

    /// Returns true if `code` is non-empty and uses only alphabet symbols.
    ///
    /// Length is not checked: codes minted under an earlier length setting
    /// stay resolvable.
    pub fn is_valid(code: &str) -> bool {
        !code.is_empty() && code.bytes().all(|b| digit_value(b).is_some())
    }

    /// Decodes a code as a big-endian base-62 number into big-endian bytes.
    ///
    /// Intended for diagnostics. A code made only of `0` decodes to `[0]`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the code is empty or contains a
    /// symbol outside the alphabet.
    pub fn decode(code: &str) -> Result<Vec<u8>, AppError> {
        if code.is_empty() {
            return Err(AppError::bad_request(
                "Short code must not be empty",
                json!({}),
            ));
        }

        // Little-endian accumulator, reversed at the end.
        let mut acc: Vec<u8> = Vec::with_capacity(code.len());

        for (position, symbol) in code.bytes().enumerate() {
            let digit = digit_value(symbol).ok_or_else(|| {
                AppError::bad_request(
                    "Short code contains an invalid character",
                    json!({ "position": position }),
                )
            })?;

            let mut carry = u32::from(digit);
            for byte in acc.iter_mut() {
                let value = u32::from(*byte) * 62 + carry;
                *byte = (value & 0xff) as u8;
                carry = value >> 8;
            }
            while carry > 0 {
                acc.push((carry & 0xff) as u8);
                carry >>= 8;
            }
        }

        if acc.is_empty() {
            acc.push(0);
        }

        acc.reverse();
        Ok(acc)
    }
}

fn digit_value(symbol: u8) -> Option<u8> {
    match symbol {
        b'0'..=b'9' => Some(symbol - b'0'),
        b'A'..=b'Z' => Some(symbol - b'A' + 10),
        b'a'..=b'z' => Some(symbol - b'a' + 36),
        _ => None,
    }
}
