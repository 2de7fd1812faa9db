use crate::models::attempt::AnswerRecord;
use crate::models::question::{Question, QuestionDetails, QuestionKind};
use crate::services::text_generator::TextGenerator;
use crate::utils::similarity::normalized_similarity;
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// AI judge acceptance threshold for free-text answers.
pub const AI_SCORE_THRESHOLD: f64 = 0.7;
/// Degraded threshold for the Levenshtein fallback when no judge is available.
pub const SIMILARITY_THRESHOLD: f64 = 0.6;
/// Partial credit for a containment ("mostly correct") match.
pub const PARTIAL_CREDIT_FACTOR: f64 = 0.8;

/// One (question_id, submitted value) pair from the client. Values may be an
/// option index, an option text, or free text depending on question kind.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: i32,
    #[serde(default)]
    pub answer: JsonValue,
    #[serde(default)]
    pub time_spent_seconds: i32,
}

#[derive(Debug, Clone)]
pub struct GradeOutcome {
    pub score_percent: f64,
    pub points_earned: f64,
    pub points_possible: f64,
    pub passed: bool,
    pub graded: Vec<AnswerRecord>,
}

/// Scores a full answer set against a quiz's questions.
///
/// Objective kinds are graded deterministically. Free-text kinds run a
/// three-tier evaluation: exact match, containment, then AI-or-similarity.
/// A missing or empty answer is simply incorrect, never an error.
#[derive(Clone)]
pub struct GradingService {
    text: Arc<dyn TextGenerator>,
}

impl GradingService {
    pub fn new(text: Arc<dyn TextGenerator>) -> Self {
        Self { text }
    }

    pub async fn grade(
        &self,
        questions: &[Question],
        answers: &[SubmittedAnswer],
        passing_score: f64,
    ) -> GradeOutcome {
        let mut points_possible = 0.0;
        let mut points_earned = 0.0;
        let mut graded = Vec::with_capacity(questions.len());

        for question in questions {
            points_possible += question.points;
            // Unmatched question ids in the payload are simply ignored.
            let submitted = answers.iter().find(|a| a.question_id == question.id);
            let answer = submitted.map(|a| a.answer.clone()).unwrap_or(JsonValue::Null);
            let time_spent = submitted.map(|a| a.time_spent_seconds).unwrap_or(0);

            let mut record = match question.kind {
                QuestionKind::MultipleChoice | QuestionKind::TrueFalse => {
                    Self::grade_objective(question, &answer)
                }
                QuestionKind::ShortAnswer | QuestionKind::FillBlank => {
                    self.grade_free_text(question, &answer).await
                }
                QuestionKind::Essay => AnswerRecord {
                    question_id: question.id,
                    answer: answer.clone(),
                    is_correct: None,
                    points_awarded: 0.0,
                    time_spent_seconds: 0,
                    feedback: Some("Submitted for manual review".to_string()),
                },
            };
            record.time_spent_seconds = time_spent;
            points_earned += record.points_awarded;
            graded.push(record);
        }

        let score_percent = if points_possible > 0.0 {
            (100.0 * points_earned / points_possible).round()
        } else {
            0.0
        };
        let passed = score_percent >= passing_score;

        GradeOutcome {
            score_percent,
            points_earned,
            points_possible,
            passed,
            graded,
        }
    }

    /// Exact option matching, no partial credit. The submitted value may be
    /// an option index (into the stored order) or the option's text.
    fn grade_objective(question: &Question, answer: &JsonValue) -> AnswerRecord {
        let mut record = AnswerRecord {
            question_id: question.id,
            answer: answer.clone(),
            is_correct: Some(false),
            points_awarded: 0.0,
            time_spent_seconds: 0,
            feedback: None,
        };

        let blank = match answer {
            JsonValue::Null => true,
            JsonValue::String(s) => s.trim().is_empty(),
            _ => false,
        };
        if blank {
            record.feedback = Some("No answer provided".to_string());
            return record;
        }

        let Some((correct_idx, correct_opt)) = question.correct_option() else {
            record.feedback = Some("Question has no correct option".to_string());
            return record;
        };

        let selected_correct = match answer {
            JsonValue::Number(n) => n.as_i64() == Some(correct_idx as i64),
            JsonValue::String(s) => s.trim().eq_ignore_ascii_case(correct_opt.text.trim()),
            JsonValue::Bool(b) => {
                // true_false convenience: a bare boolean selects True/False.
                let text = if *b { "true" } else { "false" };
                correct_opt.text.trim().eq_ignore_ascii_case(text)
            }
            _ => false,
        };

        if selected_correct {
            record.is_correct = Some(true);
            record.points_awarded = question.points;
            record.feedback = Some("Correct".to_string());
        } else {
            record.feedback = Some(
                question
                    .explanation
                    .clone()
                    .unwrap_or_else(|| "Incorrect".to_string()),
            );
        }
        record
    }

    async fn grade_free_text(&self, question: &Question, answer: &JsonValue) -> AnswerRecord {
        let mut record = AnswerRecord {
            question_id: question.id,
            answer: answer.clone(),
            is_correct: Some(false),
            points_awarded: 0.0,
            time_spent_seconds: 0,
            feedback: None,
        };

        let submitted = answer.as_str().unwrap_or("").trim().to_string();
        if submitted.is_empty() {
            record.feedback = Some("No answer provided".to_string());
            return record;
        }

        let Some(expected) = question.correct_answer_text() else {
            record.feedback = Some("Question has no canonical answer".to_string());
            return record;
        };

        let submitted_lower = submitted.to_lowercase();
        let expected_lower = expected.trim().to_lowercase();

        // Tier 1: exact case-insensitive trimmed match.
        if submitted_lower == expected_lower {
            record.is_correct = Some(true);
            record.points_awarded = question.points;
            record.feedback = Some("Correct".to_string());
            return record;
        }

        // Tier 2: containment either direction counts as mostly correct.
        if submitted_lower.contains(&expected_lower) || expected_lower.contains(&submitted_lower) {
            record.is_correct = Some(true);
            record.points_awarded = question.points * PARTIAL_CREDIT_FACTOR;
            record.feedback = Some("Mostly correct".to_string());
            return record;
        }

        // Tier 3: AI judge when configured, Levenshtein similarity otherwise.
        if self.text.enabled() {
            if let Some(judgement) = self.ai_evaluate(question, &submitted, expected).await {
                if judgement.is_correct || judgement.score >= AI_SCORE_THRESHOLD {
                    record.is_correct = Some(true);
                    record.points_awarded = question.points * judgement.score.clamp(0.0, 1.0);
                } else {
                    record.points_awarded = 0.0;
                }
                record.feedback = Some(judgement.feedback);
                return record;
            }
            tracing::warn!(
                question_id = question.id,
                "Free-text AI evaluation failed, falling back to similarity"
            );
        }

        let similarity = normalized_similarity(&submitted, expected);
        if similarity > SIMILARITY_THRESHOLD {
            record.is_correct = Some(true);
            record.points_awarded = question.points * similarity;
            record.feedback = Some("Close enough to the expected answer".to_string());
        } else {
            record.feedback = Some(format!("Expected: {}", expected));
        }
        record
    }

    async fn ai_evaluate(
        &self,
        question: &Question,
        submitted: &str,
        expected: &str,
    ) -> Option<FreeTextJudgement> {
        let prompt = format!(
            r#"You are grading a short-answer quiz question. Accept synonyms and
alternative phrasing that convey the same meaning.

Question: {}
Expected answer: {}
Student answer: {}

Respond with ONLY a strict JSON object, no markdown fences:
{{"is_correct": true|false, "score": 0.0-1.0, "feedback": "one short sentence"}}"#,
            question.prompt, expected, submitted
        );

        let raw = self.text.generate_text(&prompt).await.ok()?;
        let cleaned = crate::services::generator_service::QuestionGenerator::strip_code_fences(&raw);
        serde_json::from_str::<FreeTextJudgement>(cleaned).ok()
    }
}

#[derive(Debug, serde::Deserialize)]
struct FreeTextJudgement {
    is_correct: bool,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    feedback: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{AnswerOption, Difficulty};
    use crate::services::text_generator::{MockTextGenerator, NoopTextGenerator};
    use serde_json::json;

    fn mc_question(id: i32, points: f64) -> Question {
        Question {
            id,
            kind: QuestionKind::MultipleChoice,
            prompt: "Pick the right one".to_string(),
            description: None,
            points,
            explanation: Some("B is right".to_string()),
            difficulty: Difficulty::Medium,
            details: QuestionDetails::Choice {
                options: vec![
                    AnswerOption { text: "A".to_string(), is_correct: false },
                    AnswerOption { text: "B".to_string(), is_correct: true },
                    AnswerOption { text: "C".to_string(), is_correct: false },
                ],
            },
        }
    }

    fn sa_question(id: i32, expected: &str) -> Question {
        Question {
            id,
            kind: QuestionKind::ShortAnswer,
            prompt: "Answer briefly".to_string(),
            description: None,
            points: 1.0,
            explanation: None,
            difficulty: Difficulty::Medium,
            details: QuestionDetails::FreeText {
                correct_answer: expected.to_string(),
            },
        }
    }

    fn essay_question(id: i32) -> Question {
        Question {
            id,
            kind: QuestionKind::Essay,
            prompt: "Discuss".to_string(),
            description: None,
            points: 5.0,
            explanation: None,
            difficulty: Difficulty::Hard,
            details: QuestionDetails::Essay {},
        }
    }

    fn answer(question_id: i32, value: JsonValue) -> SubmittedAnswer {
        SubmittedAnswer {
            question_id,
            answer: value,
            time_spent_seconds: 0,
        }
    }

    fn offline_grader() -> GradingService {
        GradingService::new(Arc::new(NoopTextGenerator))
    }

    #[tokio::test]
    async fn objective_grading_by_index_and_text() {
        let grader = offline_grader();
        let questions = vec![mc_question(1, 1.0), mc_question(2, 1.0)];
        let answers = vec![answer(1, json!(1)), answer(2, json!("b"))];

        let outcome = grader.grade(&questions, &answers, 35.0).await;
        assert_eq!(outcome.points_earned, 2.0);
        assert_eq!(outcome.score_percent, 100.0);
        assert!(outcome.passed);
    }

    #[tokio::test]
    async fn objective_grading_is_deterministic() {
        let grader = offline_grader();
        let questions = vec![mc_question(1, 2.0), mc_question(2, 1.0)];
        let answers = vec![answer(1, json!(1)), answer(2, json!(0))];

        let first = grader.grade(&questions, &answers, 35.0).await;
        let second = grader.grade(&questions, &answers, 35.0).await;
        assert_eq!(first.score_percent, second.score_percent);
        assert_eq!(first.points_earned, second.points_earned);
        // 2 of 3 points => 67%
        assert_eq!(first.score_percent, 67.0);
    }

    #[tokio::test]
    async fn wrong_option_earns_zero_with_explanation_feedback() {
        let grader = offline_grader();
        let questions = vec![mc_question(1, 1.0)];
        let answers = vec![answer(1, json!("C"))];

        let outcome = grader.grade(&questions, &answers, 35.0).await;
        assert_eq!(outcome.points_earned, 0.0);
        assert_eq!(outcome.graded[0].is_correct, Some(false));
        assert_eq!(outcome.graded[0].feedback.as_deref(), Some("B is right"));
    }

    #[tokio::test]
    async fn exact_free_text_match_earns_full_points() {
        let grader = offline_grader();
        let questions = vec![sa_question(1, "Document Object Model")];
        let answers = vec![answer(1, json!("  document object model "))];

        let outcome = grader.grade(&questions, &answers, 35.0).await;
        assert_eq!(outcome.points_earned, 1.0);
        assert_eq!(outcome.graded[0].is_correct, Some(true));
    }

    #[tokio::test]
    async fn containment_earns_partial_credit() {
        let grader = offline_grader();
        let questions = vec![sa_question(1, "closure")];
        let answers = vec![answer(1, json!("it is called a closure in JS"))];

        let outcome = grader.grade(&questions, &answers, 35.0).await;
        assert_eq!(outcome.points_earned, PARTIAL_CREDIT_FACTOR);
        assert_eq!(outcome.graded[0].feedback.as_deref(), Some("Mostly correct"));
    }

    #[tokio::test]
    async fn similarity_fallback_accepts_near_misses() {
        let grader = offline_grader();
        let questions = vec![sa_question(1, "hoisting")];
        // one-letter typo: similarity 1 - 1/8 = 0.875 > 0.6
        let answers = vec![answer(1, json!("hoistng"))];

        let outcome = grader.grade(&questions, &answers, 35.0).await;
        let record = &outcome.graded[0];
        assert_eq!(record.is_correct, Some(true));
        assert!(record.points_awarded > 0.8 && record.points_awarded < 1.0);
    }

    #[tokio::test]
    async fn similarity_fallback_rejects_unrelated_answers() {
        let grader = offline_grader();
        let questions = vec![sa_question(1, "recursion")];
        let answers = vec![answer(1, json!("banana"))];

        let outcome = grader.grade(&questions, &answers, 35.0).await;
        assert_eq!(outcome.graded[0].is_correct, Some(false));
        assert_eq!(outcome.points_earned, 0.0);
    }

    #[tokio::test]
    async fn empty_and_missing_answers_are_incorrect_not_errors() {
        let grader = offline_grader();
        let questions = vec![sa_question(1, "queue"), mc_question(2, 1.0)];
        // question 1 gets an empty string, question 2 is absent entirely
        let answers = vec![answer(1, json!(""))];

        let outcome = grader.grade(&questions, &answers, 35.0).await;
        assert_eq!(outcome.points_earned, 0.0);
        assert_eq!(outcome.graded[0].feedback.as_deref(), Some("No answer provided"));
        assert_eq!(outcome.graded[1].feedback.as_deref(), Some("No answer provided"));
    }

    #[tokio::test]
    async fn blank_choice_answer_reports_no_answer_not_incorrect() {
        let grader = offline_grader();
        let questions = vec![mc_question(1, 1.0), mc_question(2, 1.0)];
        let answers = vec![answer(1, json!("")), answer(2, json!("   "))];

        let outcome = grader.grade(&questions, &answers, 35.0).await;
        for record in &outcome.graded {
            assert_eq!(record.is_correct, Some(false));
            assert_eq!(record.feedback.as_deref(), Some("No answer provided"));
        }
    }

    #[tokio::test]
    async fn unmatched_question_ids_are_ignored() {
        let grader = offline_grader();
        let questions = vec![mc_question(1, 1.0)];
        let answers = vec![answer(1, json!(1)), answer(99, json!("stray"))];

        let outcome = grader.grade(&questions, &answers, 35.0).await;
        assert_eq!(outcome.graded.len(), 1);
        assert_eq!(outcome.score_percent, 100.0);
    }

    #[tokio::test]
    async fn essays_are_never_auto_graded() {
        let grader = offline_grader();
        let questions = vec![essay_question(1)];
        let answers = vec![answer(1, json!("A long reflection..."))];

        let outcome = grader.grade(&questions, &answers, 35.0).await;
        assert_eq!(outcome.graded[0].is_correct, None);
        assert_eq!(outcome.graded[0].points_awarded, 0.0);
    }

    #[tokio::test]
    async fn passing_boundary_is_inclusive() {
        let grader = offline_grader();
        // 20 questions, 7 correct => 35%
        let mut questions = Vec::new();
        let mut answers = Vec::new();
        for i in 1..=20 {
            questions.push(mc_question(i, 1.0));
            answers.push(answer(i, json!(if i <= 7 { 1 } else { 0 })));
        }

        let outcome = grader.grade(&questions, &answers, 35.0).await;
        assert_eq!(outcome.score_percent, 35.0);
        assert!(outcome.passed);

        // 17 correct of 50 => exactly 34%, one point shy of the bar
        let questions: Vec<Question> = (1..=50).map(|i| mc_question(i, 1.0)).collect();
        let answers: Vec<SubmittedAnswer> = (1..=50)
            .map(|i| answer(i, json!(if i <= 17 { 1 } else { 0 })))
            .collect();
        let outcome = grader.grade(&questions, &answers, 35.0).await;
        assert_eq!(outcome.score_percent, 34.0);
        assert!(!outcome.passed);
    }

    #[tokio::test]
    async fn zero_total_points_scores_zero() {
        let grader = offline_grader();
        let outcome = grader.grade(&[], &[], 35.0).await;
        assert_eq!(outcome.score_percent, 0.0);
        assert!(!outcome.passed);
    }

    #[tokio::test]
    async fn ai_judge_accepts_synonyms() {
        let mut mock = MockTextGenerator::new();
        mock.expect_enabled().return_const(true);
        mock.expect_generate_text().returning(|_| {
            Ok(r#"{"is_correct": true, "score": 0.9, "feedback": "Synonym accepted"}"#.to_string())
        });

        let grader = GradingService::new(Arc::new(mock));
        let questions = vec![sa_question(1, "function declaration lifting")];
        let answers = vec![answer(1, json!("definitions move to scope top"))];

        let outcome = grader.grade(&questions, &answers, 35.0).await;
        let record = &outcome.graded[0];
        assert_eq!(record.is_correct, Some(true));
        assert!((record.points_awarded - 0.9).abs() < 1e-9);
        assert_eq!(record.feedback.as_deref(), Some("Synonym accepted"));
    }

    #[tokio::test]
    async fn ai_judge_failure_falls_back_to_similarity() {
        let mut mock = MockTextGenerator::new();
        mock.expect_enabled().return_const(true);
        mock.expect_generate_text()
            .returning(|_| Ok("I think that's probably right!".to_string()));

        let grader = GradingService::new(Arc::new(mock));
        let questions = vec![sa_question(1, "generator")];
        let answers = vec![answer(1, json!("generatr"))];

        let outcome = grader.grade(&questions, &answers, 35.0).await;
        // parse failure => Levenshtein path; 8/9 similarity passes 0.6
        assert_eq!(outcome.graded[0].is_correct, Some(true));
    }
}
