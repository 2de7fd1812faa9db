use serde::{Deserialize, Serialize};

/// One assessable item, embedded in a quiz's question snapshot.
///
/// Kind-specific payloads live in [`QuestionDetails`] so a choice question
/// can never carry a canonical answer string and vice versa.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    #[serde(default)]
    pub id: i32,
    pub kind: QuestionKind,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_points")]
    pub points: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(flatten)]
    pub details: QuestionDetails,
}

fn default_points() -> f64 {
    1.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
    FillBlank,
    Essay,
}

/// Used only to balance generated question sets, never consulted by grading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionDetails {
    /// multiple_choice / true_false
    Choice { options: Vec<AnswerOption> },
    /// short_answer / fill_blank
    FreeText { correct_answer: String },
    /// essay: nothing gradable automatically
    Essay {},
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerOption {
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

impl Question {
    pub fn correct_option(&self) -> Option<(usize, &AnswerOption)> {
        match &self.details {
            QuestionDetails::Choice { options } => {
                options.iter().enumerate().find(|(_, o)| o.is_correct)
            }
            _ => None,
        }
    }

    pub fn correct_answer_text(&self) -> Option<&str> {
        match &self.details {
            QuestionDetails::FreeText { correct_answer } => Some(correct_answer.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_details_round_trip_with_flatten() {
        let raw = serde_json::json!({
            "kind": "multiple_choice",
            "prompt": "Which keyword declares a constant binding in JavaScript?",
            "options": [
                {"text": "var", "is_correct": false},
                {"text": "const", "is_correct": true},
                {"text": "mutable", "is_correct": false}
            ],
            "difficulty": "easy"
        });
        let q: Question = serde_json::from_value(raw).unwrap();
        assert_eq!(q.kind, QuestionKind::MultipleChoice);
        assert_eq!(q.points, 1.0);
        let (idx, opt) = q.correct_option().unwrap();
        assert_eq!(idx, 1);
        assert_eq!(opt.text, "const");
    }

    #[test]
    fn free_text_details_parse() {
        let raw = serde_json::json!({
            "kind": "short_answer",
            "prompt": "What does DOM stand for?",
            "correct_answer": "Document Object Model",
            "points": 2
        });
        let q: Question = serde_json::from_value(raw).unwrap();
        assert_eq!(q.kind, QuestionKind::ShortAnswer);
        assert_eq!(q.correct_answer_text(), Some("Document Object Model"));
        assert_eq!(q.points, 2.0);
    }

    #[test]
    fn essay_has_no_gradable_payload() {
        let raw = serde_json::json!({
            "kind": "essay",
            "prompt": "Discuss trade-offs between REST and GraphQL."
        });
        let q: Question = serde_json::from_value(raw).unwrap();
        assert_eq!(q.kind, QuestionKind::Essay);
        assert!(q.correct_option().is_none());
        assert!(q.correct_answer_text().is_none());
    }
}
