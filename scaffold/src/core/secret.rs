//! Secret key generation.

use rand::Rng;
use std::fmt;

/// Length of generated keys, matching Django's `get_random_secret_key`.
pub const SECRET_KEY_LENGTH: usize = 50;

// No quotes or backslashes, so keys embed in a Python literal unescaped.
const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*(-_=+)";

/// A generated secret key.
///
/// The `Debug` output is redacted so keys never reach the logs.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(String);

impl SecretKey {
    /// Returns the raw key.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns the key as a single-quoted Python string literal.
    #[must_use]
    pub fn to_python_literal(&self) -> String {
        format!("'{}'", self.0)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(***)")
    }
}

/// Generates a fresh secret key from the thread-local CSPRNG.
#[must_use]
pub fn generate_secret_key() -> SecretKey {
    let mut rng = rand::thread_rng();
    let key = (0..SECRET_KEY_LENGTH)
        .map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]))
        .collect();
    SecretKey(key)
}
