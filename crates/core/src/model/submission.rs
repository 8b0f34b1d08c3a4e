use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::model::ids::AttemptId;

/// Selected option indices keyed by question index.
///
/// A key with an empty set means the question was touched and then cleared;
/// it is kept apart from "never answered" but neither counts as answered.
pub type AnswerMap = BTreeMap<usize, BTreeSet<usize>>;

/// Counts questions whose selection set is non-empty.
#[must_use]
pub fn count_answered(answers: &AnswerMap) -> usize {
    answers.values().filter(|set| !set.is_empty()).count()
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SubmissionError {
    #[error("submitted_at is before started_at")]
    InvalidTimeRange,

    #[error("answer recorded for question {index} but only {total} questions exist")]
    QuestionOutOfRange { index: usize, total: usize },

    #[error("answered count ({answered}) does not match answers ({actual})")]
    CountMismatch { answered: usize, actual: usize },
}

/// Final result of a quiz attempt, handed to the submission sink.
///
/// Deserialization runs the same checks as [`SubmissionSummary::from_persisted`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SummaryRecord")]
pub struct SubmissionSummary {
    attempt_id: AttemptId,
    started_at: DateTime<Utc>,
    submitted_at: DateTime<Utc>,
    time_remaining_secs: u32,
    total_questions: usize,
    answered_count: usize,
    answers: AnswerMap,
}

#[derive(Deserialize)]
struct SummaryRecord {
    attempt_id: AttemptId,
    started_at: DateTime<Utc>,
    submitted_at: DateTime<Utc>,
    time_remaining_secs: u32,
    total_questions: usize,
    answered_count: usize,
    answers: AnswerMap,
}

impl TryFrom<SummaryRecord> for SubmissionSummary {
    type Error = SubmissionError;

    fn try_from(record: SummaryRecord) -> Result<Self, Self::Error> {
        Self::from_persisted(
            record.attempt_id,
            record.started_at,
            record.submitted_at,
            record.time_remaining_secs,
            record.total_questions,
            record.answered_count,
            record.answers,
        )
    }
}

impl SubmissionSummary {
    pub(crate) fn from_session(
        attempt_id: AttemptId,
        started_at: DateTime<Utc>,
        submitted_at: DateTime<Utc>,
        time_remaining_secs: u32,
        total_questions: usize,
        answers: AnswerMap,
    ) -> Self {
        let answered_count = count_answered(&answers);
        Self {
            attempt_id,
            started_at,
            // Clamped so the summary always passes `from_persisted`.
            submitted_at: submitted_at.max(started_at),
            time_remaining_secs,
            total_questions,
            answered_count,
            answers,
        }
    }

    /// Rehydrate a summary from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `SubmissionError::InvalidTimeRange` if timestamps are inverted,
    /// `SubmissionError::QuestionOutOfRange` if an answer key exceeds the
    /// question count, and `SubmissionError::CountMismatch` if the stored
    /// answered count disagrees with the answers.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        attempt_id: AttemptId,
        started_at: DateTime<Utc>,
        submitted_at: DateTime<Utc>,
        time_remaining_secs: u32,
        total_questions: usize,
        answered_count: usize,
        answers: AnswerMap,
    ) -> Result<Self, SubmissionError> {
        if submitted_at < started_at {
            return Err(SubmissionError::InvalidTimeRange);
        }
        if let Some(&index) = answers.keys().find(|&&index| index >= total_questions) {
            return Err(SubmissionError::QuestionOutOfRange {
                index,
                total: total_questions,
            });
        }
        let actual = count_answered(&answers);
        if actual != answered_count {
            return Err(SubmissionError::CountMismatch {
                answered: answered_count,
                actual,
            });
        }

        Ok(Self {
            attempt_id,
            started_at,
            submitted_at,
            time_remaining_secs,
            total_questions,
            answered_count,
            answers,
        })
    }

    #[must_use]
    pub fn attempt_id(&self) -> AttemptId {
        self.attempt_id
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    #[must_use]
    pub fn time_remaining_secs(&self) -> u32 {
        self.time_remaining_secs
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.total_questions
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answered_count
    }

    #[must_use]
    pub fn unanswered_count(&self) -> usize {
        self.total_questions.saturating_sub(self.answered_count)
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    /// Whether the attempt ran out of time before it was submitted.
    #[must_use]
    pub fn timed_out(&self) -> bool {
        self.time_remaining_secs == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn answers(entries: &[(usize, &[usize])]) -> AnswerMap {
        entries
            .iter()
            .map(|(q, opts)| (*q, opts.iter().copied().collect()))
            .collect()
    }

    #[test]
    fn empty_sets_do_not_count_as_answered() {
        let map = answers(&[(0, &[1]), (1, &[]), (2, &[0, 3])]);
        assert_eq!(count_answered(&map), 2);
    }

    #[test]
    fn from_persisted_rejects_inconsistent_counts() {
        let now = fixed_now();
        let err = SubmissionSummary::from_persisted(
            AttemptId::generate(),
            now,
            now,
            0,
            3,
            2,
            answers(&[(0, &[1])]),
        )
        .unwrap_err();
        assert_eq!(
            err,
            SubmissionError::CountMismatch {
                answered: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn from_persisted_rejects_answers_past_question_count() {
        let now = fixed_now();
        let err = SubmissionSummary::from_persisted(
            AttemptId::generate(),
            now,
            now,
            0,
            2,
            1,
            answers(&[(5, &[0])]),
        )
        .unwrap_err();
        assert_eq!(err, SubmissionError::QuestionOutOfRange { index: 5, total: 2 });
    }

    #[test]
    fn from_persisted_rejects_inverted_time_range() {
        let now = fixed_now();
        let err = SubmissionSummary::from_persisted(
            AttemptId::generate(),
            now,
            now - chrono::Duration::seconds(1),
            10,
            1,
            0,
            AnswerMap::new(),
        )
        .unwrap_err();
        assert_eq!(err, SubmissionError::InvalidTimeRange);
    }

    #[test]
    fn serializes_answer_map_as_json_object() {
        let now = fixed_now();
        let summary = SubmissionSummary::from_persisted(
            AttemptId::generate(),
            now,
            now,
            0,
            3,
            2,
            answers(&[(0, &[1]), (1, &[0, 2])]),
        )
        .unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["answers"]["1"], serde_json::json!([0, 2]));
        let back: SubmissionSummary = serde_json::from_value(json).unwrap();
        assert_eq!(back, summary);
    }

    #[test]
    fn deserialize_rejects_answers_past_question_count() {
        let now = fixed_now();
        let summary = SubmissionSummary::from_persisted(
            AttemptId::generate(),
            now,
            now,
            0,
            3,
            1,
            answers(&[(2, &[0])]),
        )
        .unwrap();
        let mut json = serde_json::to_value(&summary).unwrap();
        json["total_questions"] = serde_json::json!(2);
        let err = serde_json::from_value::<SubmissionSummary>(json).unwrap_err();
        assert!(err.to_string().contains("only 2 questions exist"), "{err}");

        let mut json = serde_json::to_value(&summary).unwrap();
        json["answered_count"] = serde_json::json!(3);
        assert!(serde_json::from_value::<SubmissionSummary>(json).is_err());
    }
}
