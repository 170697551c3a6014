use anyhow::{Context, Result};
use std::{fs, path::Path};

pub const LETTER_COUNT: usize = 26;

/// Occurrences of each letter in a document, indexed by rank ('A' = 0).
pub type CountVector = [u64; LETTER_COUNT];

/// P(letter | language), indexed by rank ('A' = 0).
pub type ProbabilityVector = [f64; LETTER_COUNT];

pub fn index_from_letter(letter: u8) -> Option<usize> {
    letter
        .is_ascii_uppercase()
        .then(|| (letter - b'A') as usize)
}

pub fn letter_from_index(index: usize) -> char {
    (b'A' + index as u8) as char
}

/// Case-folds the text and counts the letters A to Z, ignoring everything else.
pub fn shred(text: &str) -> CountVector {
    let mut counts = [0; LETTER_COUNT];
    for byte in text.bytes() {
        if let Some(index) = index_from_letter(byte.to_ascii_uppercase()) {
            counts[index] += 1;
        }
    }
    counts
}

pub fn read_counts<P: AsRef<Path>>(path: P) -> Result<CountVector> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read document {}", path.display()))?;

    let counts = shred(&text);
    tracing::debug!(
        path = %path.display(),
        letters = counts.iter().sum::<u64>(),
        "shredded document"
    );

    Ok(counts)
}
