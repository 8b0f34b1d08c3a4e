use services::SubmissionRow;

use crate::vm::time_fmt::{format_datetime, format_remaining};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnswerLineVm {
    pub number: usize,
    pub label: String,
}

/// Detail view of one stored submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionDetailVm {
    pub id: i64,
    pub mock_test_id: u64,
    pub started_at_str: String,
    pub submitted_at_str: String,
    pub time_left_str: String,
    pub timed_out: bool,
    pub answered: usize,
    pub unanswered: usize,
    pub total: usize,
    pub answers: Vec<AnswerLineVm>,
}

impl From<&SubmissionRow> for SubmissionDetailVm {
    fn from(row: &SubmissionRow) -> Self {
        let summary = &row.summary;
        let answers = (0..summary.total_questions())
            .map(|index| {
                let label = match summary.answers().get(&index) {
                    Some(set) if !set.is_empty() => set
                        .iter()
                        .map(|option| option_letter(*option))
                        .collect::<Vec<_>>()
                        .join(", "),
                    _ => "Not answered".to_string(),
                };
                AnswerLineVm {
                    number: index + 1,
                    label,
                }
            })
            .collect();

        Self {
            id: row.id,
            mock_test_id: row.mock_test_id.value(),
            started_at_str: format_datetime(summary.started_at()),
            submitted_at_str: format_datetime(summary.submitted_at()),
            time_left_str: format_remaining(summary.time_remaining_secs()),
            timed_out: summary.timed_out(),
            answered: summary.answered_count(),
            unanswered: summary.unanswered_count(),
            total: summary.total_questions(),
            answers,
        }
    }
}

/// Compact row for submission history lists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionCardVm {
    pub id: i64,
    pub submitted_at_str: String,
    pub score_label: String,
}

impl From<&SubmissionRow> for SubmissionCardVm {
    fn from(row: &SubmissionRow) -> Self {
        Self {
            id: row.id,
            submitted_at_str: format_datetime(row.summary.submitted_at()),
            score_label: format!(
                "{} / {} answered",
                row.summary.answered_count(),
                row.summary.total_questions()
            ),
        }
    }
}

#[must_use]
pub fn map_submission_cards(rows: &[SubmissionRow]) -> Vec<SubmissionCardVm> {
    rows.iter().map(SubmissionCardVm::from).collect()
}

/// `A`, `B`, ... for the first 26 options, then the 1-based number.
fn option_letter(index: usize) -> String {
    u8::try_from(index)
        .ok()
        .filter(|&i| i < 26)
        .map_or_else(|| (index + 1).to_string(), |i| char::from(b'A' + i).to_string())
}
