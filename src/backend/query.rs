//! Query description shared by the backend implementations
//!
//! A `SelectQuery` is built by `BackendHandle::from(..).select(..)` and handed
//! to a `Backend`. Identifiers are checked against the known schema before
//! any backend sees them.

use crate::utils::errors::{BackendError, BackendResult};

/// Tables and their columns
pub const SCHEMA: &[(&str, &[&str])] = &[
    (
        "profiles",
        &[
            "id",
            "first_name",
            "preferred_name",
            "email",
            "major",
            "graduation_year",
            "instrument",
            "role",
        ],
    ),
    (
        "events",
        &[
            "id",
            "title",
            "description",
            "location",
            "start_time",
            "end_time",
            "image_url",
        ],
    ),
    (
        "resources",
        &["id", "name", "link", "description", "is_pinned", "created_at"],
    ),
    ("tags", &["id", "name", "display_order"]),
    ("resource_tags", &["resource_id", "tag_id"]),
];

/// Columns of a table, if the table is known
pub fn table_columns(table: &str) -> Option<&'static [&'static str]> {
    SCHEMA
        .iter()
        .find(|(name, _)| *name == table)
        .map(|(_, columns)| *columns)
}

pub fn validate_table(table: &str) -> BackendResult<()> {
    table_columns(table)
        .map(|_| ())
        .ok_or_else(|| BackendError::InvalidQuery(format!("unknown table '{}'", table)))
}

pub fn validate_column(table: &str, column: &str) -> BackendResult<()> {
    let columns = table_columns(table)
        .ok_or_else(|| BackendError::InvalidQuery(format!("unknown table '{}'", table)))?;
    if columns.contains(&column) {
        Ok(())
    } else {
        Err(BackendError::InvalidQuery(format!(
            "unknown column '{}' on '{}'",
            column, table
        )))
    }
}

/// Row filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Eq { column: String, value: String },
    Gte { column: String, value: String },
}

impl Filter {
    pub fn column(&self) -> &str {
        match self {
            Filter::Eq { column, .. } | Filter::Gte { column, .. } => column,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Filter::Eq { value, .. } | Filter::Gte { value, .. } => value,
        }
    }

    /// PostgREST operator name
    pub fn operator(&self) -> &'static str {
        match self {
            Filter::Eq { .. } => "eq",
            Filter::Gte { .. } => "gte",
        }
    }

    pub fn sql_operator(&self) -> &'static str {
        match self {
            Filter::Eq { .. } => "=",
            Filter::Gte { .. } => ">=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// Related rows embedded into each selected row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Embed {
    /// `tags` array on each resource, through `resource_tags`,
    /// ordered by `display_order` then `name`
    ResourceTags,
}

impl Embed {
    /// Table the embedding is defined on
    pub fn parent_table(&self) -> &'static str {
        match self {
            Embed::ResourceTags => "resources",
        }
    }
}

/// Column list of a select: `*` or explicit names
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Columns {
    All,
    Named(Vec<String>),
}

impl Columns {
    pub fn parse(columns: &str) -> Self {
        let trimmed = columns.trim();
        if trimmed.is_empty() || trimmed == "*" {
            return Columns::All;
        }
        Columns::Named(
            trimmed
                .split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
        )
    }

    /// PostgREST `select=` value
    pub fn to_select_param(&self) -> String {
        match self {
            Columns::All => "*".to_string(),
            Columns::Named(names) => names.join(","),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
    pub table: String,
    pub columns: Columns,
    pub filters: Vec<Filter>,
    pub order: Vec<Order>,
    pub embed: Option<Embed>,
    pub limit: Option<usize>,
}

impl SelectQuery {
    pub fn new(table: &str, columns: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: Columns::parse(columns),
            filters: Vec::new(),
            order: Vec::new(),
            embed: None,
            limit: None,
        }
    }

    /// Check every identifier against the schema
    pub fn validate(&self) -> BackendResult<()> {
        validate_table(&self.table)?;
        if let Columns::Named(names) = &self.columns {
            for name in names {
                validate_column(&self.table, name)?;
            }
        }
        validate_filters(&self.table, &self.filters)?;
        for order in &self.order {
            validate_column(&self.table, &order.column)?;
        }
        if let Some(embed) = self.embed {
            if embed.parent_table() != self.table {
                return Err(BackendError::InvalidQuery(format!(
                    "embedding is not defined on '{}'",
                    self.table
                )));
            }
        }
        Ok(())
    }
}

pub fn validate_filters(table: &str, filters: &[Filter]) -> BackendResult<()> {
    for filter in filters {
        validate_column(table, filter.column())?;
    }
    Ok(())
}
