//! Credential generation for ephemeral principals

use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::Rng;

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";

/// Generate a random credential that satisfies the warehouse's default
/// password policy: at least one lowercase letter, one uppercase letter,
/// and one digit.
///
/// The result is `min_len` alphanumeric characters drawn from the operating
/// system's CSPRNG plus the three guaranteed characters, shuffled uniformly,
/// so the final length is `min_len + 3`.
pub fn generate_password(min_len: usize) -> String {
    let mut rng = OsRng;

    let mut chars: Vec<char> = (&mut rng)
        .sample_iter(Alphanumeric)
        .take(min_len)
        .map(char::from)
        .collect();

    chars.push(char::from(LOWERCASE[rng.gen_range(0..LOWERCASE.len())]));
    chars.push(char::from(UPPERCASE[rng.gen_range(0..UPPERCASE.len())]));
    chars.push(char::from(DIGITS[rng.gen_range(0..DIGITS.len())]));

    chars.shuffle(&mut rng);
    chars.into_iter().collect()
}
