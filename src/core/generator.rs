//! Random password generation.

use crate::constants;
use rand::rngs::OsRng;
use rand::seq::SliceRandom;

const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub password: String,
    pub requested: usize,
    /// Set when `requested` fell outside the supported range.
    pub clamped_to: Option<usize>,
}

pub fn clamp_length(requested: usize) -> usize {
    requested.clamp(constants::MIN_GENERATED_LENGTH, constants::MAX_GENERATED_LENGTH)
}

/// Generate a password with at least one lowercase, uppercase, digit, and
/// punctuation character. Randomness comes from the OS.
pub fn generate(requested: usize) -> Generated {
    let length = clamp_length(requested);
    let mut rng = OsRng;
    let all: Vec<u8> = [LOWER, UPPER, DIGITS, constants::PUNCTUATION].concat();

    let mut chars: Vec<u8> = Vec::with_capacity(length);
    for class in [LOWER, UPPER, DIGITS, constants::PUNCTUATION] {
        if let Some(c) = class.choose(&mut rng) {
            chars.push(*c);
        }
    }
    while chars.len() < length {
        if let Some(c) = all.choose(&mut rng) {
            chars.push(*c);
        }
    }
    chars.shuffle(&mut rng);

    Generated {
        password: chars.into_iter().map(char::from).collect(),
        requested,
        clamped_to: (length != requested).then_some(length),
    }
}
