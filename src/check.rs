//! Strict-format checker for the 8-line classifier output.
//!
//! Compares a student's output against an answer key line by line. Every line
//! is checked and reported, mismatches do not stop the run.

use anyhow::{bail, Context, Result};
use std::{fmt, fs, path::Path};

pub const EXPECTED_LINES: usize = 8;

#[derive(Debug, Clone, Copy)]
enum Slot {
    Header(&'static str),
    Value(&'static str),
}

const LAYOUT: [Slot; EXPECTED_LINES] = [
    Slot::Header("Q1"),
    Slot::Value("Q1 (X1 log e1)"),
    Slot::Value("Q1 (X1 log s1)"),
    Slot::Header("Q2"),
    Slot::Value("Q2 (F English)"),
    Slot::Value("Q2 (F Spanish)"),
    Slot::Header("Q3"),
    Slot::Value("Q3 (Posterior)"),
];

/// Reads a file into lines, keeping interior blank lines so they can be flagged.
pub fn read_lines_strict<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(split_lines_strict(&content))
}

pub fn split_lines_strict(content: &str) -> Vec<String> {
    content
        .trim()
        .split('\n')
        .map(|line| line.trim_matches('\r').to_string())
        .collect()
}

/// The outcome of checking one line (or the whole file, for a line-count error).
#[derive(Debug, Clone, PartialEq)]
pub enum Finding {
    HeaderMatch {
        line: usize,
        found: String,
    },
    ValueMatch {
        line: usize,
        label: &'static str,
        value: f64,
    },
    LineCount {
        found: usize,
    },
    EmptyLine {
        line: usize,
        expected: &'static str,
    },
    HeaderMismatch {
        line: usize,
        found: String,
        expected: &'static str,
    },
    NotANumber {
        line: usize,
        label: &'static str,
        found: String,
    },
    ValueMismatch {
        line: usize,
        label: &'static str,
        found: f64,
        expected: f64,
    },
}

impl Finding {
    pub fn is_failure(&self) -> bool {
        !matches!(self, Finding::HeaderMatch { .. } | Finding::ValueMatch { .. })
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::HeaderMatch { line, found } => {
                write!(f, "[ok]   Line {}: Header '{}' matches.", line, found)
            }
            Finding::ValueMatch { line, label, value } => {
                write!(f, "[ok]   Line {}: {} matches ({})", line, label, value)
            }
            Finding::LineCount { found } => {
                writeln!(f, "[FAIL] Format Error: Incorrect line count.")?;
                writeln!(f, "       Expected exactly {} lines.", EXPECTED_LINES)?;
                write!(f, "       Your output has {} lines.", found)
            }
            Finding::EmptyLine { line, expected } => {
                writeln!(f, "[FAIL] Line {}: Found an EMPTY line!", line)?;
                write!(f, "       Expected: {}", expected)
            }
            Finding::HeaderMismatch {
                line,
                found,
                expected,
            } => {
                writeln!(f, "[FAIL] Line {}: Header Mismatch.", line)?;
                writeln!(f, "       Student:  '{}'", found)?;
                write!(f, "       Expected: '{}'", expected)
            }
            Finding::NotANumber { line, label, found } => {
                writeln!(
                    f,
                    "[FAIL] Line {}: Format Error. Expected number for {}.",
                    line, label
                )?;
                write!(f, "       Found text: '{}'", found)
            }
            Finding::ValueMismatch {
                line,
                label,
                found,
                expected,
            } => {
                writeln!(f, "[FAIL] Line {}: {} Value Mismatch.", line, label)?;
                writeln!(f, "       Student:  {}", found)?;
                writeln!(f, "       Expected: {}", expected)?;
                write!(f, "       Diff:     {}", found - expected)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    pub findings: Vec<Finding>,
}

impl CheckReport {
    pub fn passed(&self) -> bool {
        !self.findings.iter().any(Finding::is_failure)
    }

    pub fn failures(&self) -> usize {
        self.findings.iter().filter(|finding| finding.is_failure()).count()
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for finding in &self.findings {
            writeln!(f, "{}", finding)?;
        }
        writeln!(f, "{}", "-".repeat(60))?;
        if self.passed() {
            write!(f, "All strict checks PASSED!")
        } else {
            write!(f, "Checks FAILED ({} problem(s)).", self.failures())
        }
    }
}

/// Checks the student's lines against the answer key's lines.
pub fn compare<S: AsRef<str>>(student: &[S], key: &[S]) -> Result<CheckReport> {
    // A wrong line count makes the per-line layout meaningless:
    if student.len() != EXPECTED_LINES {
        return Ok(CheckReport {
            findings: vec![Finding::LineCount {
                found: student.len(),
            }],
        });
    }
    if key.len() != EXPECTED_LINES {
        bail!(
            "answer key has {} lines, expected {}",
            key.len(),
            EXPECTED_LINES
        );
    }

    let mut findings = Vec::with_capacity(EXPECTED_LINES);
    for (index, slot) in LAYOUT.iter().enumerate() {
        let line = index + 1;
        let found = student[index].as_ref().trim();

        if found.is_empty() {
            let expected = match *slot {
                Slot::Header(header) => header,
                Slot::Value(_) => "Number",
            };
            findings.push(Finding::EmptyLine { line, expected });
            continue;
        }

        let finding = match *slot {
            Slot::Header(header) if found == header => Finding::HeaderMatch {
                line,
                found: student[index].as_ref().to_string(),
            },
            Slot::Header(expected) => Finding::HeaderMismatch {
                line,
                found: student[index].as_ref().to_string(),
                expected,
            },
            Slot::Value(label) => {
                let expected = key[index]
                    .as_ref()
                    .trim()
                    .parse::<f64>()
                    .with_context(|| format!("answer key line {} is not a number", line))?;
                match found.parse::<f64>() {
                    Ok(value) if value == expected => Finding::ValueMatch { line, label, value },
                    Ok(value) => Finding::ValueMismatch {
                        line,
                        label,
                        found: value,
                        expected,
                    },
                    Err(_) => Finding::NotANumber {
                        line,
                        label,
                        found: found.to_string(),
                    },
                }
            }
        };
        findings.push(finding);
    }

    Ok(CheckReport { findings })
}

pub fn check_files<P: AsRef<Path>>(student_path: P, key_path: P) -> Result<CheckReport> {
    let student = read_lines_strict(&student_path)?;
    let key = read_lines_strict(&key_path)?;
    tracing::debug!(
        student_lines = student.len(),
        key_lines = key.len(),
        "comparing outputs"
    );

    compare(&student, &key)
}
