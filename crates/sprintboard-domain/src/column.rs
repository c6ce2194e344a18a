use serde::Serialize;
use sprintboard_core::{BoardError, BoardResult, ColumnConfig};

use crate::{Issue, IssueStatus};

/// A board column; `key` is the issue status it collects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub key: IssueStatus,
    pub name: String,
}

impl Column {
    pub fn new(key: IssueStatus, name: impl Into<String>) -> Self {
        Self {
            key,
            name: name.into(),
        }
    }

    pub fn from_config(config: &ColumnConfig) -> BoardResult<Self> {
        let key = config.key.parse::<IssueStatus>()?;
        Ok(Self::new(key, config.name.clone()))
    }
}

/// Builds the column list from config, rejecting unknown or repeated keys.
pub fn columns_from_config(configs: &[ColumnConfig]) -> BoardResult<Vec<Column>> {
    let mut columns: Vec<Column> = Vec::with_capacity(configs.len());
    for config in configs {
        let column = Column::from_config(config)?;
        if columns.iter().any(|c| c.key == column.key) {
            return Err(BoardError::Validation(format!(
                "Column '{}' is configured twice",
                column.key
            )));
        }
        columns.push(column);
    }
    Ok(columns)
}

pub fn default_columns() -> Vec<Column> {
    vec![
        Column::new(IssueStatus::Todo, "Todo"),
        Column::new(IssueStatus::InProgress, "In Progress"),
        Column::new(IssueStatus::InReview, "In Review"),
        Column::new(IssueStatus::Done, "Done"),
    ]
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnView<'a> {
    pub column: &'a Column,
    pub issues: Vec<&'a Issue>,
}

/// Issues grouped for display. Issues whose status has no column are
/// kept aside instead of being dropped.
#[derive(Debug, Clone, Serialize)]
pub struct BoardLayout<'a> {
    pub columns: Vec<ColumnView<'a>>,
    pub unplaced: Vec<&'a Issue>,
}

pub fn layout_issues<'a>(columns: &'a [Column], issues: &'a [Issue]) -> BoardLayout<'a> {
    let mut views: Vec<ColumnView<'a>> = columns
        .iter()
        .map(|column| ColumnView {
            column,
            issues: Vec::new(),
        })
        .collect();
    let mut unplaced = Vec::new();

    for issue in issues {
        match views.iter_mut().find(|view| view.column.key == issue.status) {
            Some(view) => view.issues.push(issue),
            None => unplaced.push(issue),
        }
    }

    BoardLayout {
        columns: views,
        unplaced,
    }
}
