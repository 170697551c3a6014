use anyhow::Result;
use std::{fmt, path::Path};

use crate::{
    letters::{CountVector, ProbabilityVector},
    table,
};

/// Stand-in for ln(0): a strong but finite penalty.
pub const SAFE_LOG_FLOOR: f64 = -1e8;

/// Log-posterior gap past which the posterior is reported as exactly 0 or 1.
pub const POSTERIOR_CUTOFF: f64 = 100.0;

/// The Q1 line always reports letter 'A'.
const REPORTED_LETTER: usize = 0;

pub fn safe_log(p: f64) -> f64 {
    if p <= 0.0 {
        SAFE_LOG_FLOOR
    } else {
        p.ln()
    }
}

/// Contribution of a single letter to the log-likelihood, `count * ln(p)`.
pub fn letter_contribution(count: u64, prob: f64) -> f64 {
    if count == 0 {
        0.0
    } else {
        count as f64 * safe_log(prob)
    }
}

/// `ln(prior) + sum(counts[i] * ln(probs[i]))`, summed in letter order.
///
/// Letters that never occur are skipped, so a zero probability only matters
/// when the letter is actually present in the document.
pub fn unnormalized_log_posterior(
    counts: &CountVector,
    probs: &ProbabilityVector,
    prior: f64,
) -> f64 {
    counts
        .iter()
        .zip(probs.iter())
        .filter(|&(&count, _)| count != 0)
        .fold(prior.ln(), |acc, (&count, &prob)| {
            acc + count as f64 * safe_log(prob)
        })
}

/// P(first | document) given both unnormalized log-posteriors.
pub fn posterior_probability(log_first: f64, log_second: f64) -> f64 {
    let diff = log_second - log_first;
    if diff >= POSTERIOR_CUTOFF {
        0.0
    } else if diff <= -POSTERIOR_CUTOFF {
        1.0
    } else {
        1.0 / (1.0 + diff.exp())
    }
}

pub struct Hypothesis {
    pub name: &'static str,
    pub probs: ProbabilityVector,
    pub prior: f64,
}

pub struct LanguageClassifier {
    english: Hypothesis,
    spanish: Hypothesis,
}

impl LanguageClassifier {
    pub fn new(english: Hypothesis, spanish: Hypothesis) -> Self {
        LanguageClassifier { english, spanish }
    }

    pub fn from_paths<P: AsRef<Path>>(
        english_path: P,
        spanish_path: P,
        prior_english: f64,
        prior_spanish: f64,
    ) -> Result<Self> {
        let english = Hypothesis {
            name: "English",
            probs: table::read_table(english_path)?,
            prior: prior_english,
        };
        let spanish = Hypothesis {
            name: "Spanish",
            probs: table::read_table(spanish_path)?,
            prior: prior_spanish,
        };

        Ok(Self::new(english, spanish))
    }

    /// Scores a document's letter counts under both languages.
    pub fn predict(&self, counts: &CountVector) -> Report {
        let letter_english = letter_contribution(
            counts[REPORTED_LETTER],
            self.english.probs[REPORTED_LETTER],
        );
        let letter_spanish = letter_contribution(
            counts[REPORTED_LETTER],
            self.spanish.probs[REPORTED_LETTER],
        );

        let log_english =
            unnormalized_log_posterior(counts, &self.english.probs, self.english.prior);
        let log_spanish =
            unnormalized_log_posterior(counts, &self.spanish.probs, self.spanish.prior);

        let posterior_english = posterior_probability(log_english, log_spanish);
        tracing::debug!(
            log_english,
            log_spanish,
            posterior_english,
            "scored document as {} vs {}",
            self.english.name,
            self.spanish.name
        );

        Report {
            letter_english,
            letter_spanish,
            log_english,
            log_spanish,
            posterior_english,
        }
    }
}

/// The three graded answers, printed as the fixed 8-line block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Report {
    pub letter_english: f64,
    pub letter_spanish: f64,
    pub log_english: f64,
    pub log_spanish: f64,
    pub posterior_english: f64,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Q1")?;
        writeln!(f, "{:.4}", self.letter_english)?;
        writeln!(f, "{:.4}", self.letter_spanish)?;
        writeln!(f, "Q2")?;
        writeln!(f, "{:.4}", self.log_english)?;
        writeln!(f, "{:.4}", self.log_spanish)?;
        writeln!(f, "Q3")?;
        writeln!(f, "{:.4}", self.posterior_english)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::letters::LETTER_COUNT;

    fn classifier(
        english: ProbabilityVector,
        spanish: ProbabilityVector,
        (prior_english, prior_spanish): (f64, f64),
    ) -> LanguageClassifier {
        LanguageClassifier::new(
            Hypothesis {
                name: "English",
                probs: english,
                prior: prior_english,
            },
            Hypothesis {
                name: "Spanish",
                probs: spanish,
                prior: prior_spanish,
            },
        )
    }

    fn uniform() -> ProbabilityVector {
        [1.0 / LETTER_COUNT as f64; LETTER_COUNT]
    }

    #[test]
    fn safe_log_matches_ln_for_positive_values() {
        for p in [1e-300, 0.001, 0.25, 0.5, 1.0, 3.0] {
            assert_eq!(safe_log(p), p.ln());
        }
    }

    #[test]
    fn safe_log_floors_non_positive_values() {
        assert_eq!(safe_log(0.0), -1e8);
        assert_eq!(safe_log(-0.0), -1e8);
        assert_eq!(safe_log(-0.5), -1e8);
        assert_eq!(safe_log(f64::NEG_INFINITY), -1e8);
    }

    #[test]
    fn zero_count_letters_do_not_affect_the_sum() {
        let mut counts = [0; LETTER_COUNT];
        counts[1] = 4;
        counts[7] = 2;

        let base = unnormalized_log_posterior(&counts, &uniform(), 0.6);
        for prob in [0.0, 0.3, 0.9] {
            let mut probs = uniform();
            probs[0] = prob;
            assert_eq!(unnormalized_log_posterior(&counts, &probs, 0.6), base);
        }
    }

    #[test]
    fn zero_probability_for_present_letter_is_finite() {
        let mut counts = [0; LETTER_COUNT];
        counts[2] = 2;
        let mut probs = uniform();
        probs[2] = 0.0;

        let log = unnormalized_log_posterior(&counts, &probs, 0.5);
        assert!(log.is_finite());
        assert_eq!(log, 0.5f64.ln() + 2.0 * -1e8);
    }

    #[test]
    fn log_posterior_sums_in_letter_order() {
        let counts: CountVector = std::array::from_fn(|i| i as u64 % 3);
        let probs: ProbabilityVector = std::array::from_fn(|i| (i + 1) as f64 / 400.0);

        let mut expected = 0.4f64.ln();
        for i in 0..LETTER_COUNT {
            if counts[i] != 0 {
                expected += counts[i] as f64 * probs[i].ln();
            }
        }
        assert_eq!(unnormalized_log_posterior(&counts, &probs, 0.4), expected);
    }

    #[test]
    fn posterior_saturates_past_cutoff() {
        assert_eq!(posterior_probability(0.0, 100.0), 0.0);
        assert_eq!(posterior_probability(-50.0, 250.0), 0.0);
        assert_eq!(posterior_probability(100.0, 0.0), 1.0);
        assert_eq!(posterior_probability(-1e8, -2e8), 1.0);
    }

    #[test]
    fn posterior_is_symmetric() {
        for (a, b) in [(-10.0, -12.5), (-300.0, -330.0), (0.0, 99.0), (-7.25, -7.25)] {
            let sum = posterior_probability(a, b) + posterior_probability(b, a);
            assert!((sum - 1.0).abs() < 1e-12, "{} + {} gave {}", a, b, sum);
        }
    }

    #[test]
    fn posterior_is_monotonic_in_first_log() {
        let mut previous = 0.0;
        for step in -300..=300 {
            let p = posterior_probability(step as f64, 0.0);
            assert!(p >= previous);
            previous = p;
        }
    }

    #[test]
    fn letter_contribution_for_a() {
        assert_eq!(format!("{:.4}", letter_contribution(3, 0.10)), "-6.9078");
        assert_eq!(format!("{:.4}", letter_contribution(3, 0.05)), "-8.9872");
        assert_eq!(letter_contribution(0, 0.0), 0.0);
    }

    #[test]
    fn empty_document_reports_priors() {
        let report = classifier(uniform(), uniform(), (0.6, 0.4)).predict(&[0; LETTER_COUNT]);

        assert_eq!(report.letter_english, 0.0);
        assert_eq!(report.letter_spanish, 0.0);
        assert_eq!(report.log_english, 0.6f64.ln());
        assert_eq!(report.log_spanish, 0.4f64.ln());
        assert_eq!(
            report.posterior_english,
            1.0 / (1.0 + (0.4f64.ln() - 0.6f64.ln()).exp())
        );
        assert!(report.to_string().starts_with("Q1\n0.0000\n0.0000\nQ2\n"));
    }

    #[test]
    fn identical_hypotheses_split_evenly() {
        let mut counts = [0; LETTER_COUNT];
        counts[4] = 11;
        counts[18] = 3;

        let report = classifier(uniform(), uniform(), (0.5, 0.5)).predict(&counts);
        assert_eq!(report.log_english, report.log_spanish);
        assert_eq!(report.posterior_english, 0.5);
    }

    #[test]
    fn report_prints_eight_lines() {
        let mut english = uniform();
        let mut spanish = uniform();
        english[0] = 0.10;
        spanish[0] = 0.05;
        let mut counts = [0; LETTER_COUNT];
        counts[0] = 3;

        let text = classifier(english, spanish, (0.5, 0.5)).predict(&counts).to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], "Q1");
        assert_eq!(lines[1], "-6.9078");
        assert_eq!(lines[2], "-8.9872");
        assert_eq!(lines[3], "Q2");
        assert_eq!(lines[6], "Q3");
        assert_eq!(lines[7], "0.8889");
        assert!(text.ends_with('\n') && !text.ends_with("\n\n"));
    }
}
