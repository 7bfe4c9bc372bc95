use crate::Generator;
use tether_core::ShortCode;
use uuid::Uuid;

/// Default number of characters in a generated code.
pub const DEFAULT_CODE_LENGTH: usize = 6;

const MIN_CODE_LENGTH: usize = 4;
const MAX_CODE_LENGTH: usize = 16;

/// Generates codes by slicing a fresh random UUID.
///
/// The v4 UUID is base58-encoded and the trailing `length` characters are
/// kept. The leading base58 digits of a 128-bit value are heavily skewed,
/// the trailing ones are not. Six characters give roughly 3.8e10 codes, so
/// collisions are rare but possible; they surface as store conflicts.
#[derive(Debug, Clone, Copy)]
pub struct TokenGenerator {
    length: usize,
}

impl TokenGenerator {
    pub fn new() -> Self {
        Self {
            length: DEFAULT_CODE_LENGTH,
        }
    }

    /// Creates a generator for codes of `length` characters, clamped to 4..=16.
    pub fn with_length(length: usize) -> Self {
        Self {
            length: length.clamp(MIN_CODE_LENGTH, MAX_CODE_LENGTH),
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for TokenGenerator {
    fn generate(&self) -> ShortCode {
        let token = bs58::encode(Uuid::new_v4().as_bytes()).into_string();
        // base58 of 16 bytes is at least 16 characters, all ASCII.
        let start = token.len().saturating_sub(self.length);
        ShortCode::generated(&token[start..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn produces_six_character_generated_codes() {
        let generator = TokenGenerator::new();

        let code = generator.generate();

        assert!(code.is_generated());
        assert_eq!(code.as_str().len(), 6);
        assert!(code.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn codes_are_valid_aliases_too() {
        let generator = TokenGenerator::new();

        for _ in 0..100 {
            let code = generator.generate();
            assert!(ShortCode::new(code.as_str()).is_ok());
        }
    }

    #[test]
    fn length_is_clamped() {
        assert_eq!(TokenGenerator::with_length(1).length(), 4);
        assert_eq!(TokenGenerator::with_length(64).length(), 16);
        assert_eq!(TokenGenerator::with_length(10).generate().as_str().len(), 10);
    }

    #[test]
    fn successive_codes_differ() {
        let generator = TokenGenerator::new();

        let codes: HashSet<String> = (0..1000)
            .map(|_| generator.generate().as_str().to_owned())
            .collect();

        // Birthday collisions in 1000 draws from 58^6 are vanishingly rare.
        assert!(codes.len() >= 999);
    }
}
