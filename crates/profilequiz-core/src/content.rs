//! Authored quiz content: personalities, questions and answer options.
//!
//! Content is read from the JSON shape the authoring tool produces
//! (`camelCase` keys). Only the fields the scoring engine and the result
//! screen read are modelled. [`QuizContent::sanitized`] cleans the data once
//! before a quiz is built from it.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ContentError;

/// Image reference as stored by the authoring tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

/// Opaque visualization content attached to a personality.
///
/// The core never renders it; it only needs to know whether one is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visualization {
    /// Library name of the embedded content, e.g. `H5P.Image`.
    #[serde(default)]
    pub library: String,
    #[serde(default)]
    pub params: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_height: Option<String>,
}

impl Visualization {
    pub fn is_present(&self) -> bool {
        self.params
            .as_object()
            .map(|params| !params.is_empty())
            .unwrap_or(false)
    }
}

/// A candidate outcome of the quiz.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Personality {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visualization: Option<Visualization>,
}

impl Personality {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether a dedicated visualization area is needed on the result screen.
    pub fn has_visualization(&self) -> bool {
        self.visualization
            .as_ref()
            .map(Visualization::is_present)
            .unwrap_or(false)
    }
}

/// One selectable answer of a question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOption {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
    /// Weight assignments, e.g. `"Explorer=2,Guardian=-1"`.
    #[serde(default)]
    pub personality: String,
}

impl AnswerOption {
    pub fn new(text: impl Into<String>, personality: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
            personality: personality.into(),
        }
    }
}

/// How answer options of a panel are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionMode {
    Text,
    /// Every option carries an image.
    Image,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub answers: Vec<AnswerOption>,
    #[serde(default)]
    pub allows_multiple_choices: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
}

impl Question {
    pub fn new(text: impl Into<String>, answers: Vec<AnswerOption>) -> Self {
        Self {
            text: text.into(),
            answers,
            allows_multiple_choices: false,
            image: None,
        }
    }

    pub fn multiple_choice(mut self) -> Self {
        self.allows_multiple_choices = true;
        self
    }

    pub fn has_image(&self) -> bool {
        self.image
            .as_ref()
            .map(|image| !image.path.is_empty())
            .unwrap_or(false)
    }

    pub fn option_mode(&self) -> OptionMode {
        let all_images = !self.answers.is_empty()
            && self.answers.iter().all(|answer| {
                answer
                    .image
                    .as_ref()
                    .map(|image| !image.path.is_empty())
                    .unwrap_or(false)
            });

        if all_images {
            OptionMode::Image
        } else {
            OptionMode::Text
        }
    }
}

/// Everything an author configures for one quiz.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub personalities: Vec<Personality>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl QuizContent {
    pub fn new(personalities: Vec<Personality>, questions: Vec<Question>) -> Self {
        Self {
            title: None,
            personalities,
            questions,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ContentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a content file from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid content JSON.
    pub fn load(path: &Path) -> Result<Self, ContentError> {
        let json = std::fs::read_to_string(path).map_err(|source| ContentError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Clean authored data.
    ///
    /// - markup is stripped from names and texts, names are trimmed
    /// - personalities with an empty name or a name already used (ignoring
    ///   case) are dropped
    /// - questions without any answer option are dropped
    ///
    /// Weight fields are left alone; unknown names in them are tolerated later.
    pub fn sanitized(mut self) -> Self {
        let mut seen = HashSet::new();
        self.personalities = self
            .personalities
            .into_iter()
            .filter_map(|mut personality| {
                personality.name = purify_html(&personality.name).trim().to_string();
                if personality.name.is_empty() {
                    tracing::warn!("dropping personality without a name");
                    return None;
                }
                if !seen.insert(personality.name.to_lowercase()) {
                    tracing::warn!(name = %personality.name, "dropping duplicate personality");
                    return None;
                }
                Some(personality)
            })
            .collect();

        self.questions = self
            .questions
            .into_iter()
            .filter_map(|mut question| {
                if question.answers.is_empty() {
                    tracing::warn!(text = %question.text, "dropping question without answer options");
                    return None;
                }
                question.text = purify_html(&question.text);
                for answer in &mut question.answers {
                    answer.text = purify_html(&answer.text);
                }
                Some(question)
            })
            .collect();

        self
    }

    /// Personality whose name matches exactly.
    pub fn personality_by_name(&self, name: &str) -> Option<(usize, &Personality)> {
        self.personalities
            .iter()
            .enumerate()
            .find(|(_, personality)| personality.name == name)
    }
}

/// Strip markup tags and decode the handful of entities authoring tools emit.
pub fn purify_html(text: &str) -> String {
    let mut plain = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => plain.push(c),
            _ => {}
        }
    }

    plain
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn parses_authoring_json() {
        let content = QuizContent::from_json_str(indoc! {r#"
            {
              "title": "Which hiker are you?",
              "personalities": [
                { "name": "Explorer", "description": "Always off-trail." },
                { "name": "Guardian" }
              ],
              "questions": [
                {
                  "text": "Pick a trail",
                  "allowsMultipleChoices": true,
                  "answers": [
                    { "text": "Unmarked", "personality": "explorer=2" },
                    { "text": "Well-kept", "personality": "guardian=1,explorer=-1" }
                  ]
                }
              ]
            }
        "#})
        .unwrap();

        assert_eq!(content.title.as_deref(), Some("Which hiker are you?"));
        assert_eq!(content.personalities.len(), 2);
        assert!(content.questions[0].allows_multiple_choices);
        assert_eq!(content.questions[0].answers[1].personality, "guardian=1,explorer=-1");
    }

    #[test]
    fn missing_fields_default() {
        let content = QuizContent::from_json_str(r#"{ "questions": [ { "answers": [ {} ] } ] }"#).unwrap();
        assert!(content.personalities.is_empty());
        assert_eq!(content.questions[0].answers[0].personality, "");
        assert!(!content.questions[0].allows_multiple_choices);
    }

    #[test]
    fn sanitize_drops_empty_and_duplicate_personalities() {
        let content = QuizContent::new(
            vec![
                Personality::new(" Explorer "),
                Personality::new(""),
                Personality::new("<b></b>"),
                Personality::new("EXPLORER"),
                Personality::new("Guardian"),
            ],
            vec![],
        )
        .sanitized();

        let names: Vec<_> = content.personalities.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Explorer", "Guardian"]);
    }

    #[test]
    fn sanitize_drops_questions_without_answers() {
        let content = QuizContent::new(
            vec![Personality::new("A")],
            vec![
                Question::new("empty", vec![]),
                Question::new("<p>kept</p>", vec![AnswerOption::new("<em>yes</em>", "a=1")]),
            ],
        )
        .sanitized();

        assert_eq!(content.questions.len(), 1);
        assert_eq!(content.questions[0].text, "kept");
        assert_eq!(content.questions[0].answers[0].text, "yes");
    }

    #[test]
    fn purify_html_strips_tags_and_entities() {
        assert_eq!(purify_html("<p>Fish &amp; chips&nbsp;</p>"), "Fish & chips ");
        assert_eq!(purify_html("plain"), "plain");
    }

    #[test]
    fn option_mode_requires_every_option_to_have_an_image() {
        let mut question = Question::new(
            "q",
            vec![AnswerOption::new("a", ""), AnswerOption::new("b", "")],
        );
        assert_eq!(question.option_mode(), OptionMode::Text);

        for answer in &mut question.answers {
            answer.image = Some(Image { path: "img.png".into(), alt: None });
        }
        assert_eq!(question.option_mode(), OptionMode::Image);
    }

    #[test]
    fn visualization_presence_depends_on_params() {
        let mut personality = Personality::new("A");
        assert!(!personality.has_visualization());

        personality.visualization = Some(Visualization::default());
        assert!(!personality.has_visualization());

        personality.visualization = Some(Visualization {
            library: "H5P.Image".into(),
            params: serde_json::json!({ "file": { "path": "a.png" } }),
            max_height: None,
        });
        assert!(personality.has_visualization());
    }
}
