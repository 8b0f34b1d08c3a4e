use services::MockTestListItem;

use crate::vm::time_fmt::format_remaining;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockTestCardVm {
    pub id: u64,
    pub title: String,
    pub detail: String,
}

impl From<&MockTestListItem> for MockTestCardVm {
    fn from(item: &MockTestListItem) -> Self {
        Self {
            id: item.id.value(),
            title: item.title.clone(),
            detail: format!(
                "{} questions · {}",
                item.question_count,
                format_remaining(item.duration_secs)
            ),
        }
    }
}

#[must_use]
pub fn map_mock_test_cards(items: &[MockTestListItem]) -> Vec<MockTestCardVm> {
    items.iter().map(MockTestCardVm::from).collect()
}
