//! Confirmation code generation.
//!
//! A confirmation code is the public identifier of a ticket: the letter `F`
//! followed by seven uppercase alphanumerics, e.g. `F3K9QZ2A`. Codes are
//! random; uniqueness is enforced by the database, and callers retry on a
//! duplicate-key error.

use rand::Rng;

/// Alphabet for the random portion of a confirmation code.
const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Fixed prefix of every confirmation code.
pub const CODE_PREFIX: char = 'F';

/// Number of random characters after the prefix.
pub const CODE_RANDOM_LEN: usize = 7;

/// Total length of a confirmation code.
pub const CODE_LEN: usize = CODE_RANDOM_LEN + 1;

/// Generate a fresh confirmation code.
pub fn confirmation_code() -> String {
    let mut rng = rand::rng();
    let mut code = String::with_capacity(CODE_LEN);
    code.push(CODE_PREFIX);
    for _ in 0..CODE_RANDOM_LEN {
        let idx = rng.random_range(0..CODE_CHARSET.len());
        code.push(CODE_CHARSET[idx] as char);
    }
    code
}
