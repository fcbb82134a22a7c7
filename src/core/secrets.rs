//! Random secret generation for passwords and application secret keys.
//!
//! Always drawn from the operating system's CSPRNG. The default alphabet is
//! safe to embed unquoted in shell command lines and `KEY=VALUE` files: it
//! excludes `=`, quotes, backticks and whitespace.

use rand::rngs::OsRng;
use rand::Rng;

use crate::core::error::{Error, Result};

const DEFAULT_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*(-_+)";

/// Alphabet for generated database passwords, kept conservative so the
/// value survives being spliced into `psql -c` command lines.
pub const PASSWORD_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a random string of exactly `length` characters drawn from
/// `alphabet` (or the default shell-safe alphabet).
pub fn generate(length: usize, alphabet: Option<&str>) -> Result<String> {
    if length == 0 {
        return Err(Error::validation_invalid_argument(
            "length",
            "Secret length must be at least 1",
            Some(length.to_string()),
        ));
    }

    let chars: Vec<char> = alphabet.unwrap_or(DEFAULT_ALPHABET).chars().collect();
    if chars.is_empty() {
        return Err(Error::validation_invalid_argument(
            "alphabet",
            "Alphabet must contain at least one character",
            None,
        ));
    }

    let mut rng = OsRng;
    Ok((0..length).map(|_| chars[rng.gen_range(0..chars.len())]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_exact_length() {
        for n in [1, 20, 50, 128] {
            assert_eq!(generate(n, None).unwrap().chars().count(), n);
        }
    }

    #[test]
    fn stays_within_alphabet() {
        let secret = generate(200, None).unwrap();
        assert!(secret.chars().all(|c| DEFAULT_ALPHABET.contains(c)));
    }

    #[test]
    fn respects_custom_alphabet() {
        let secret = generate(64, Some(PASSWORD_ALPHABET)).unwrap();
        assert!(secret.chars().all(|c| PASSWORD_ALPHABET.contains(c)));
    }

    #[test]
    fn successive_calls_differ() {
        // 50 chars over a 50-symbol alphabet; a collision would be astronomical.
        assert_ne!(generate(50, None).unwrap(), generate(50, None).unwrap());
    }

    #[test]
    fn zero_length_fails() {
        assert!(generate(0, None).is_err());
    }

    #[test]
    fn empty_alphabet_fails() {
        assert!(generate(10, Some("")).is_err());
    }
}
