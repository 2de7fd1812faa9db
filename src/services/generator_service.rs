use crate::models::question::{Question, QuestionDetails, QuestionKind};
use crate::services::question_bank;
use crate::services::text_generator::TextGenerator;
use std::sync::Arc;

/// Course fields the generator consumes. Title is the only required input;
/// the rest enriches the prompt and topic detection.
#[derive(Debug, Clone, Default)]
pub struct CourseMetadata {
    pub title: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub objectives: Vec<String>,
}

impl From<&crate::models::course::Course> for CourseMetadata {
    fn from(course: &crate::models::course::Course) -> Self {
        Self {
            title: course.title.clone(),
            category: course.category.clone(),
            description: course.description.clone(),
            objectives: course.objective_list(),
        }
    }
}

/// Produces a fixed-size set of typed questions from course metadata.
///
/// The generative path is best-effort: any call or parse failure degrades
/// silently to the curated topic banks. Nothing here errors past the
/// component boundary.
#[derive(Clone)]
pub struct QuestionGenerator {
    text: Arc<dyn TextGenerator>,
}

impl QuestionGenerator {
    pub fn new(text: Arc<dyn TextGenerator>) -> Self {
        Self { text }
    }

    pub async fn generate(&self, meta: &CourseMetadata, desired: usize) -> Vec<Question> {
        let desired = desired.max(1);

        if self.text.enabled() {
            let prompt = Self::build_prompt(meta, desired);
            match self.text.generate_text(&prompt).await {
                Ok(raw) => {
                    let questions = Self::parse_questions(&raw, desired);
                    if !questions.is_empty() {
                        tracing::info!(
                            count = questions.len(),
                            course = %meta.title,
                            "Generated quiz questions via text generator"
                        );
                        return questions;
                    }
                    tracing::warn!(
                        course = %meta.title,
                        "Generator response yielded no usable questions, using fallback bank"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        course = %meta.title,
                        error = ?e,
                        "Question generation failed, using fallback bank"
                    );
                }
            }
        }

        question_bank::fallback_questions(&meta.title, meta.category.as_deref(), desired)
    }

    /// Kind distribution: 5 multiple-choice : 2 true-false : 3 short-answer
    /// per 10 questions, scaled proportionally.
    pub fn kind_plan(desired: usize) -> (usize, usize, usize) {
        let mc = desired * 5 / 10;
        let tf = desired * 2 / 10;
        let sa = desired - mc - tf;
        (mc, tf, sa)
    }

    /// Difficulty distribution: 2 easy : 5 medium : 3 hard per 10.
    pub fn difficulty_plan(desired: usize) -> (usize, usize, usize) {
        let easy = desired * 2 / 10;
        let hard = desired * 3 / 10;
        let medium = desired - easy - hard;
        (easy, medium, hard)
    }

    fn build_prompt(meta: &CourseMetadata, desired: usize) -> String {
        let (mc, tf, sa) = Self::kind_plan(desired);
        let (easy, medium, hard) = Self::difficulty_plan(desired);

        let mut context = format!("Course title: {}\n", meta.title);
        if let Some(category) = &meta.category {
            context.push_str(&format!("Category: {}\n", category));
        }
        if let Some(description) = &meta.description {
            context.push_str(&format!("Description: {}\n", description));
        }
        if !meta.objectives.is_empty() {
            context.push_str(&format!("Learning objectives: {}\n", meta.objectives.join("; ")));
        }

        format!(
            r#"You are an expert course instructor writing a completion quiz.

{context}
Generate exactly {desired} quiz questions testing understanding of this course:
- {mc} of kind "multiple_choice" with exactly 4 options, exactly one marked correct
- {tf} of kind "true_false" with options "True" and "False", one marked correct
- {sa} of kind "short_answer" with a concise canonical "correct_answer" string
- difficulty spread: {easy} "easy", {medium} "medium", {hard} "hard"

Respond with ONLY a strict JSON array, no prose and no markdown fences.
Each element must match one of these shapes:
{{"kind":"multiple_choice","prompt":"...","points":1,"difficulty":"medium","explanation":"...","options":[{{"text":"...","is_correct":true}},{{"text":"...","is_correct":false}}]}}
{{"kind":"true_false","prompt":"...","points":1,"difficulty":"easy","explanation":"...","options":[{{"text":"True","is_correct":true}},{{"text":"False","is_correct":false}}]}}
{{"kind":"short_answer","prompt":"...","points":1,"difficulty":"hard","correct_answer":"..."}}"#
        )
    }

    /// Strip optional markdown code fences (``` or ```json) around a response.
    pub fn strip_code_fences(raw: &str) -> &str {
        let trimmed = raw.trim();
        let Some(rest) = trimmed.strip_prefix("```") else {
            return trimmed;
        };
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        let rest = rest.strip_suffix("```").unwrap_or(rest);
        rest.trim()
    }

    /// Parse and sanitize a generator response. Unusable entries are skipped,
    /// not fatal; an unparsable payload yields an empty vec (fallback trigger).
    pub fn parse_questions(raw: &str, desired: usize) -> Vec<Question> {
        let cleaned = Self::strip_code_fences(raw);
        let parsed: Vec<Question> = match serde_json::from_str(cleaned) {
            Ok(qs) => qs,
            Err(e) => {
                tracing::debug!(error = %e, "Generator response was not a valid question array");
                return Vec::new();
            }
        };

        let mut questions: Vec<Question> = parsed
            .into_iter()
            .filter(|q| Self::is_usable(q))
            .take(desired)
            .collect();

        for (idx, q) in questions.iter_mut().enumerate() {
            q.id = (idx as i32) + 1;
            if q.points <= 0.0 {
                q.points = 1.0;
            }
        }
        questions
    }

    fn is_usable(q: &Question) -> bool {
        if q.prompt.trim().is_empty() {
            return false;
        }
        match (&q.kind, &q.details) {
            (QuestionKind::MultipleChoice | QuestionKind::TrueFalse, QuestionDetails::Choice { options }) => {
                options.len() >= 2 && options.iter().filter(|o| o.is_correct).count() == 1
            }
            (QuestionKind::ShortAnswer | QuestionKind::FillBlank, QuestionDetails::FreeText { correct_answer }) => {
                !correct_answer.trim().is_empty()
            }
            (QuestionKind::Essay, QuestionDetails::Essay {}) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::text_generator::{MockTextGenerator, NoopTextGenerator};

    fn meta(title: &str) -> CourseMetadata {
        CourseMetadata {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn kind_plan_matches_spec_ratio() {
        assert_eq!(QuestionGenerator::kind_plan(10), (5, 2, 3));
        assert_eq!(QuestionGenerator::kind_plan(20), (10, 4, 6));
        let (mc, tf, sa) = QuestionGenerator::kind_plan(7);
        assert_eq!(mc + tf + sa, 7);
    }

    #[test]
    fn difficulty_plan_matches_spec_ratio() {
        assert_eq!(QuestionGenerator::difficulty_plan(10), (2, 5, 3));
        let (e, m, h) = QuestionGenerator::difficulty_plan(13);
        assert_eq!(e + m + h, 13);
    }

    #[test]
    fn strips_json_code_fences() {
        let fenced = "```json\n[{\"a\": 1}]\n```";
        assert_eq!(QuestionGenerator::strip_code_fences(fenced), "[{\"a\": 1}]");
        let bare = "  [1, 2]  ";
        assert_eq!(QuestionGenerator::strip_code_fences(bare), "[1, 2]");
        let plain_fence = "```\n[]\n```";
        assert_eq!(QuestionGenerator::strip_code_fences(plain_fence), "[]");
    }

    #[test]
    fn parse_skips_malformed_entries() {
        let raw = r#"[
            {"kind":"multiple_choice","prompt":"Pick one","options":[
                {"text":"a","is_correct":true},{"text":"b","is_correct":false}]},
            {"kind":"multiple_choice","prompt":"No correct option","options":[
                {"text":"a","is_correct":false},{"text":"b","is_correct":false}]},
            {"kind":"short_answer","prompt":"Name it","correct_answer":"thing"},
            {"kind":"short_answer","prompt":"Empty answer","correct_answer":"  "}
        ]"#;
        let qs = QuestionGenerator::parse_questions(raw, 10);
        assert_eq!(qs.len(), 2);
        assert_eq!(qs[0].id, 1);
        assert_eq!(qs[1].id, 2);
    }

    #[test]
    fn parse_rejects_non_array_payloads() {
        assert!(QuestionGenerator::parse_questions("not json at all", 10).is_empty());
        assert!(QuestionGenerator::parse_questions("{\"questions\": []}", 10).is_empty());
    }

    #[tokio::test]
    async fn disabled_generator_uses_fallback_bank() {
        let generator = QuestionGenerator::new(Arc::new(NoopTextGenerator));
        let qs = generator.generate(&meta("Intro to React"), 10).await;
        assert_eq!(qs.len(), 10);
    }

    #[tokio::test]
    async fn generation_error_degrades_to_fallback() {
        let mut mock = MockTextGenerator::new();
        mock.expect_enabled().return_const(true);
        mock.expect_generate_text()
            .returning(|_| Err(crate::error::Error::Internal("boom".to_string())));

        let generator = QuestionGenerator::new(Arc::new(mock));
        let qs = generator.generate(&meta("JS Basics"), 10).await;
        assert_eq!(qs.len(), 10);
    }

    #[tokio::test]
    async fn unparsable_response_degrades_to_fallback() {
        let mut mock = MockTextGenerator::new();
        mock.expect_enabled().return_const(true);
        mock.expect_generate_text()
            .returning(|_| Ok("Sure! Here are your questions:".to_string()));

        let generator = QuestionGenerator::new(Arc::new(mock));
        let qs = generator.generate(&meta("Python for Beginners"), 10).await;
        assert_eq!(qs.len(), 10);
    }

    #[tokio::test]
    async fn valid_response_is_used_verbatim() {
        let mut mock = MockTextGenerator::new();
        mock.expect_enabled().return_const(true);
        mock.expect_generate_text().returning(|_| {
            Ok(r#"```json
            [{"kind":"true_false","prompt":"Water is wet","options":[
                {"text":"True","is_correct":true},{"text":"False","is_correct":false}]}]
            ```"#
                .to_string())
        });

        let generator = QuestionGenerator::new(Arc::new(mock));
        let qs = generator.generate(&meta("Chemistry"), 10).await;
        assert_eq!(qs.len(), 1);
        assert_eq!(qs[0].prompt, "Water is wet");
    }
}
