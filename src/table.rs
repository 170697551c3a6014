use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, StringRecord};
use std::{fs::File, io::Read, path::Path};

use crate::letters::{index_from_letter, ProbabilityVector, LETTER_COUNT};

/// Reads a character-probability table, one `<LETTER> <probability>` line per letter.
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<ProbabilityVector> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("failed to open probability table {}", path.display()))?;

    let probs = parse_table(file)
        .with_context(|| format!("malformed probability table {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded probability table");

    Ok(probs)
}

pub fn parse_table<R: Read>(mut input: R) -> Result<ProbabilityVector> {
    let mut text = String::new();
    input.read_to_string(&mut text)?;

    // Strip each line before it is split on the space separator:
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let text = lines.join("\n");

    let mut reader = ReaderBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    // Letters missing from the table stay at zero:
    let mut probs = [0.0; LETTER_COUNT];
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |pos| pos.line());
        let (index, prob) = parse_entry(&record).with_context(|| format!("line {}", line))?;
        probs[index] = prob;
    }

    Ok(probs)
}

fn parse_entry(record: &StringRecord) -> Result<(usize, f64)> {
    if record.len() != 2 {
        bail!(
            "expected `<LETTER> <probability>`, found {} field(s)",
            record.len()
        );
    }

    let letter = &record[0];
    let index = match letter.as_bytes() {
        &[byte] => index_from_letter(byte),
        _ => None,
    }
    .with_context(|| format!("`{}` is not an uppercase letter A-Z", letter))?;

    let prob = record[1]
        .parse::<f64>()
        .with_context(|| format!("`{}` is not a probability", &record[1]))?;

    Ok((index, prob))
}
