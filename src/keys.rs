//! License key generation.

use rand::Rng;

/// Generated keys are always exactly this long.
pub const LICENSE_KEY_LEN: usize = 24;

/// Key alphabet. Drops glyphs that read ambiguously in email clients and
/// support tickets (0/O, 1/I/l).
pub const LICENSE_KEY_ALPHABET: &str =
    "ABCDEFGHJKLMNPQRSTUVWXYZ23456789abcdefghijkmnopqrstuvwxyz";

/// Generate a fresh license key from a cryptographically strong RNG.
///
/// `gen_range` keeps the draw uniform over the alphabet (no modulo bias).
pub fn generate_license_key() -> String {
    let mut rng = rand::thread_rng();
    let chars: Vec<char> = LICENSE_KEY_ALPHABET.chars().collect();

    (0..LICENSE_KEY_LEN)
        .map(|_| chars[rng.gen_range(0..chars.len())])
        .collect()
}
