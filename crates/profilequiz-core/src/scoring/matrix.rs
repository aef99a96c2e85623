//! Score matrix compiled from answer weight strings.
//!
//! Each answer option carries a field like `"explorer=2,guardian=-1"`. The
//! matrix turns every option into a list of [`ScoreEntry`] values, one per
//! comma-separated token, in token order:
//!
//! ```text
//! matrix[question][option] -> [ScoreEntry { personality_index, score }, ...]
//! ```
//!
//! Tokens are split on their **last** `=`: the score is the part after it and
//! the beneficiary is everything before it. Beneficiaries are matched against
//! personality names ignoring case. Unknown names and unparsable scores yield
//! inert entries; building never fails.

use serde::{Deserialize, Serialize};

use crate::content::{Personality, Question};

/// One weight assignment of an answer option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    /// Position of the beneficiary in the personality list, `None` if the
    /// name did not match any personality.
    pub personality_index: Option<usize>,
    pub score: f64,
    /// Score text was not a number; `score` is 0 in that case.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub malformed: bool,
}

impl ScoreEntry {
    /// Whether this entry contributes to any total.
    pub fn is_effective(&self) -> bool {
        self.personality_index.is_some() && self.score != 0.0
    }
}

/// Immutable `[question][option]` lookup of score entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreMatrix {
    rows: Vec<Vec<Vec<ScoreEntry>>>,
}

impl ScoreMatrix {
    /// Compile the weights of every answer option.
    pub fn build(questions: &[Question], personalities: &[Personality]) -> Self {
        let names: Vec<String> = personalities
            .iter()
            .map(|personality| personality.name.trim().to_lowercase())
            .collect();

        let rows = questions
            .iter()
            .enumerate()
            .map(|(question_index, question)| {
                question
                    .answers
                    .iter()
                    .enumerate()
                    .map(|(option_index, answer)| {
                        let entries = parse_weights(&answer.personality, &names);
                        for entry in entries.iter().filter(|entry| entry.malformed) {
                            tracing::warn!(
                                question = question_index,
                                option = option_index,
                                field = %answer.personality,
                                personality = ?entry.personality_index,
                                "weight is not a number, counting it as 0"
                            );
                        }
                        entries
                    })
                    .collect()
            })
            .collect();

        Self { rows }
    }

    pub fn question_count(&self) -> usize {
        self.rows.len()
    }

    pub fn option_count(&self, question: usize) -> usize {
        self.rows.get(question).map(Vec::len).unwrap_or(0)
    }

    /// Entries of one option; empty for indexes outside the matrix.
    pub fn entries(&self, question: usize, option: usize) -> &[ScoreEntry] {
        self.rows
            .get(question)
            .and_then(|options| options.get(option))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Parse one weight field against lowercased personality names.
fn parse_weights(field: &str, names: &[String]) -> Vec<ScoreEntry> {
    field
        .split(',')
        .map(|token| {
            let (beneficiary, score_text) = token.rsplit_once('=').unwrap_or(("", token));
            let beneficiary = beneficiary.trim().to_lowercase();
            let personality_index = names.iter().position(|name| *name == beneficiary);

            let (score, malformed) = match score_text.trim().parse::<f64>() {
                Ok(score) if score.is_finite() => (score, false),
                _ => (0.0, true),
            };

            ScoreEntry {
                personality_index,
                score,
                malformed,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::AnswerOption;
    use proptest::prelude::*;

    fn personalities(names: &[&str]) -> Vec<Personality> {
        names.iter().map(|name| Personality::new(*name)).collect()
    }

    fn single(field: &str, names: &[&str]) -> Vec<ScoreEntry> {
        let questions = vec![Question::new("q", vec![AnswerOption::new("o", field)])];
        ScoreMatrix::build(&questions, &personalities(names))
            .entries(0, 0)
            .to_vec()
    }

    #[test]
    fn shape_follows_questions_and_options() {
        let questions = vec![
            Question::new("q1", vec![AnswerOption::new("a", "a=1"), AnswerOption::new("b", "b=1")]),
            Question::new("q2", vec![AnswerOption::new("c", "a=1,b=2,c=3")]),
        ];
        let matrix = ScoreMatrix::build(&questions, &personalities(&["A", "B"]));

        assert_eq!(matrix.question_count(), 2);
        assert_eq!(matrix.option_count(0), 2);
        assert_eq!(matrix.option_count(1), 1);
        assert_eq!(matrix.entries(1, 0).len(), 3);
    }

    #[test]
    fn names_match_ignoring_case() {
        let entries = single("EXPLORER=2, guardian=-1", &["Explorer", "Guardian"]);
        assert_eq!(entries[0].personality_index, Some(0));
        assert_eq!(entries[0].score, 2.0);
        assert_eq!(entries[1].personality_index, Some(1));
        assert_eq!(entries[1].score, -1.0);
    }

    #[test]
    fn splits_on_last_equals_sign() {
        let entries = single("x=y=3", &["x=y"]);
        assert_eq!(entries[0].personality_index, Some(0));
        assert_eq!(entries[0].score, 3.0);
    }

    #[test]
    fn unknown_personality_is_inert() {
        let entries = single("nobody=5", &["A"]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].personality_index, None);
        assert!(!entries[0].is_effective());
    }

    #[test]
    fn non_numeric_score_counts_as_zero() {
        let entries = single("a=,a=lots,a", &["A"]);
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|entry| entry.score == 0.0 && entry.malformed));
        // "a" alone has no beneficiary at all
        assert_eq!(entries[2].personality_index, None);
    }

    #[test]
    fn empty_field_yields_one_inert_entry() {
        let entries = single("", &["A"]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].personality_index, None);
    }

    #[test]
    fn out_of_range_lookup_is_empty() {
        let matrix = ScoreMatrix::build(&[], &[]);
        assert!(matrix.entries(3, 1).is_empty());
        assert_eq!(matrix.option_count(3), 0);
    }

    proptest! {
        #[test]
        fn one_entry_per_token_in_order(scores in prop::collection::vec(-50i32..50, 1..8)) {
            let field = scores
                .iter()
                .enumerate()
                .map(|(i, score)| format!("p{}={}", i % 3, score))
                .collect::<Vec<_>>()
                .join(",");
            let entries = single(&field, &["p0", "p1", "p2"]);

            prop_assert_eq!(entries.len(), scores.len());
            for (i, (entry, score)) in entries.iter().zip(&scores).enumerate() {
                prop_assert_eq!(entry.personality_index, Some(i % 3));
                prop_assert_eq!(entry.score, f64::from(*score));
            }
        }
    }
}
