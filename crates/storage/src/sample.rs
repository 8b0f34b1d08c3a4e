//! Built-in mock test used to seed an empty database.

use quiz_core::model::{MockTest, MockTestError, MockTestId, Question, QuestionError, QuestionId};
use serde::Deserialize;
use thiserror::Error;

/// Id the built-in mock test is stored under.
pub const SAMPLE_MOCK_TEST_ID: u64 = 1;

/// 14h 44m.
pub const SAMPLE_DURATION_SECS: u32 = 14 * 3600 + 44 * 60;

const SAMPLE_QUESTIONS: [(&str, [&str; 4]); 10] = [
    (
        "Which planet is known as the Red Planet?",
        ["Venus", "Mars", "Jupiter", "Mercury"],
    ),
    (
        "What is the chemical symbol for sodium?",
        ["S", "So", "Na", "Sd"],
    ),
    (
        "Which of the following are prime numbers?",
        ["2", "9", "11", "15"],
    ),
    (
        "What is the value of 7 × 8?",
        ["54", "56", "58", "64"],
    ),
    (
        "Which gas do plants absorb during photosynthesis?",
        ["Oxygen", "Nitrogen", "Carbon dioxide", "Hydrogen"],
    ),
    (
        "Which of these are renewable energy sources?",
        ["Solar", "Coal", "Wind", "Natural gas"],
    ),
    (
        "What is the boiling point of water at sea level in Celsius?",
        ["90", "100", "110", "120"],
    ),
    (
        "Which organ pumps blood through the human body?",
        ["Lungs", "Liver", "Kidneys", "Heart"],
    ),
    (
        "Which of the following are SI base units?",
        ["Metre", "Litre", "Kelvin", "Calorie"],
    ),
    (
        "What is the square root of 144?",
        ["10", "11", "12", "14"],
    ),
];

/// The reference mock test: ten four-option questions.
///
/// # Panics
///
/// Panics if the embedded question table fails validation, which is a
/// programming error caught by this module's tests.
#[must_use]
pub fn sample_mock_test() -> MockTest {
    let questions = SAMPLE_QUESTIONS
        .iter()
        .zip(1_u64..)
        .map(|((prompt, options), id)| {
            Question::with_options(QuestionId::new(id), *prompt, &options[..])
                .expect("embedded sample question is valid")
        })
        .collect();

    MockTest::new(
        MockTestId::new(SAMPLE_MOCK_TEST_ID),
        "General Knowledge Mock Test",
        SAMPLE_DURATION_SECS,
        questions,
    )
    .expect("embedded sample mock test is valid")
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ImportError {
    #[error("invalid mock test file: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    MockTest(#[from] MockTestError),
}

#[derive(Debug, Deserialize)]
struct MockTestFile {
    title: String,
    duration_secs: u32,
    questions: Vec<QuestionFile>,
}

#[derive(Debug, Deserialize)]
struct QuestionFile {
    id: u64,
    prompt: String,
    options: Vec<String>,
}

/// Parse a mock test from its JSON file form and store it under `id`.
///
/// ```json
/// { "title": "...", "duration_secs": 600,
///   "questions": [{ "id": 1, "prompt": "...", "options": ["A", "B"] }] }
/// ```
///
/// # Errors
///
/// Returns `ImportError` for malformed JSON or a question or mock test that
/// fails validation.
pub fn mock_test_from_json(id: MockTestId, raw: &str) -> Result<MockTest, ImportError> {
    let file: MockTestFile = serde_json::from_str(raw)?;
    let questions = file
        .questions
        .into_iter()
        .map(|q| Question::new(QuestionId::new(q.id), q.prompt, q.options))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(MockTest::new(id, file.title, file.duration_secs, questions)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imports_mock_test_from_json() {
        let raw = r#"{
            "title": "Capitals",
            "duration_secs": 600,
            "questions": [
                { "id": 7, "prompt": "Capital of France?", "options": ["Paris", "Lyon"] },
                { "id": 9, "prompt": "Capital of Japan?", "options": ["Osaka", "Tokyo", "Kyoto"] }
            ]
        }"#;
        let test = mock_test_from_json(MockTestId::new(3), raw).unwrap();
        assert_eq!(test.id(), MockTestId::new(3));
        assert_eq!(test.title(), "Capitals");
        assert_eq!(test.duration_secs(), 600);
        assert_eq!(test.question_count(), 2);
        assert_eq!(test.questions()[1].option_count(), 3);
    }

    #[test]
    fn import_rejects_invalid_questions_and_json() {
        let blank_option = r#"{"title": "T", "duration_secs": 60,
            "questions": [{ "id": 1, "prompt": "Q?", "options": ["A", " "] }]}"#;
        assert!(matches!(
            mock_test_from_json(MockTestId::new(1), blank_option),
            Err(ImportError::Question(_))
        ));
        assert!(matches!(
            mock_test_from_json(MockTestId::new(1), "{"),
            Err(ImportError::Json(_))
        ));
    }

    #[test]
    fn sample_has_ten_four_option_questions() {
        let test = sample_mock_test();
        assert_eq!(test.question_count(), 10);
        assert!(test.questions().iter().all(|q| q.option_count() == 4));
        assert_eq!(test.duration_secs(), 53_040);
    }
}
