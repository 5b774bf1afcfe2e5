//! Public order codes (`FXS-XXXXXX`)

use rand::Rng;

/// Prefix shared by every order code
pub const PREFIX: &str = "FXS-";

/// Number of random characters after the prefix
pub const CODE_LEN: usize = 6;

/// Attempts before giving up on finding an unused code
pub const MAX_ATTEMPTS: usize = 10;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a random order code using the thread-local RNG.
pub fn generate() -> String {
    generate_with(&mut rand::thread_rng())
}

/// Generate a random order code from the given RNG.
pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut code = String::with_capacity(PREFIX.len() + CODE_LEN);
    code.push_str(PREFIX);
    for _ in 0..CODE_LEN {
        let idx = rng.gen_range(0..ALPHABET.len());
        code.push(ALPHABET[idx] as char);
    }
    code
}

/// Normalise a code typed by a customer for lookup.
pub fn normalize(code: &str) -> String {
    code.trim().to_uppercase()
}
