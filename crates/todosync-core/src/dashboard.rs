use crate::remote::ProjectItem;
use crate::types::BoardStatus;
use serde::Serialize;

/// One board column.
#[derive(Debug, Clone, Serialize)]
pub struct Column {
    pub status: BoardStatus,
    pub titles: Vec<String>,
}

/// Board items grouped into Todo, In Progress and Done, in that order.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub columns: Vec<Column>,
}

impl Dashboard {
    /// Items without a recognised status are shown as Todo.
    pub fn from_items(items: &[ProjectItem]) -> Self {
        let columns = BoardStatus::all()
            .iter()
            .map(|&status| Column {
                status,
                titles: items
                    .iter()
                    .filter(|i| i.status.unwrap_or(BoardStatus::Todo) == status)
                    .map(|i| i.title.clone())
                    .collect(),
            })
            .collect();
        Self { columns }
    }

    pub fn total(&self) -> usize {
        self.columns.iter().map(|c| c.titles.len()).sum()
    }

    pub fn count(&self, status: BoardStatus) -> usize {
        self.columns
            .iter()
            .find(|c| c.status == status)
            .map_or(0, |c| c.titles.len())
    }
}
