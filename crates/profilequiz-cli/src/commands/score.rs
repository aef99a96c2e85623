use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use profilequiz_core::quiz::NavigationController;
use profilequiz_core::{AnswerRecord, OutcomeResolver, QuizConfig, ScoreMatrix};

#[derive(Args)]
pub struct ScoreArgs {
    /// Quiz content file (JSON)
    content: PathBuf,
    /// Answers as "question:option[,option];..." with 0-based indexes
    #[arg(short, long, default_value = "")]
    answers: String,
    /// Seed for the tie-break (overrides behaviour.tie_break_seed)
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Serialize)]
struct ScoreReport {
    personality: Option<String>,
    scores: Vec<f64>,
    winners: Vec<String>,
    tie_break_used: bool,
}

pub fn run(args: ScoreArgs) -> Result<(), Box<dyn std::error::Error>> {
    let content = super::load_content(&args.content)?.sanitized();
    let config = QuizConfig::load_or_default();
    let answers = parse_answers(&args.answers)?;

    let matrix = ScoreMatrix::build(&content.questions, &content.personalities);
    let mut navigation = NavigationController::new(&content.questions, config.appearance(), false);
    navigation.reset(&answers, None, &[]);

    let seed = args.seed.or(config.behaviour.tie_break_seed);
    let mut resolver = OutcomeResolver::from_seed_option(seed);
    let outcome = resolver.resolve(navigation.panels(), &matrix, content.personalities.len());

    let name = |index: usize| {
        content
            .personalities
            .get(index)
            .map(|personality| personality.name.clone())
            .unwrap_or_default()
    };
    let report = match outcome {
        Some(outcome) => ScoreReport {
            personality: Some(name(outcome.personality_index)),
            winners: outcome.winners.iter().map(|&index| name(index)).collect(),
            scores: outcome.scores,
            tie_break_used: outcome.tie_break_used,
        },
        None => ScoreReport {
            personality: None,
            scores: Vec::new(),
            winners: Vec::new(),
            tie_break_used: false,
        },
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Parse "0:1;1:0,2" into answer records.
fn parse_answers(input: &str) -> Result<Vec<AnswerRecord>, String> {
    input
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (question, options) = part
                .split_once(':')
                .ok_or_else(|| format!("invalid answer '{part}', expected question:option"))?;
            let question = question
                .trim()
                .parse()
                .map_err(|_| format!("invalid question index '{question}'"))?;
            let options = options
                .split(',')
                .map(|option| {
                    option
                        .trim()
                        .parse()
                        .map_err(|_| format!("invalid option index '{option}'"))
                })
                .collect::<Result<Vec<usize>, String>>()?;
            Ok(AnswerRecord { question, options })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_answers() {
        let answers = parse_answers("0:1; 1:0,2").unwrap();
        assert_eq!(
            answers,
            vec![
                AnswerRecord { question: 0, options: vec![1] },
                AnswerRecord { question: 1, options: vec![0, 2] },
            ]
        );
        assert!(parse_answers("").unwrap().is_empty());
    }

    #[test]
    fn rejects_malformed_answers() {
        assert!(parse_answers("0").is_err());
        assert!(parse_answers("x:1").is_err());
        assert!(parse_answers("0:a").is_err());
    }
}
