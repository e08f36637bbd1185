//! Resource filtering by tag
//!
//! Runs over the already fetched list; selecting a tag never queries the
//! backend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::ResourceWithTags;

/// Value of the "all" tab
pub const ALL: &str = "all";

/// Selected tab on the resources page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "id")]
pub enum TagSelection {
    #[default]
    All,
    Tag(Uuid),
}

impl TagSelection {
    /// `None`, `"all"` and unparseable values select everything
    pub fn from_query(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.parse().ok())
            .unwrap_or(TagSelection::All)
    }

    /// Tab value: `"all"` or the tag id
    pub fn value(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TagSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagSelection::All => f.write_str(ALL),
            TagSelection::Tag(id) => write!(f, "{}", id),
        }
    }
}

impl FromStr for TagSelection {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == ALL {
            return Ok(TagSelection::All);
        }
        Uuid::parse_str(s).map(TagSelection::Tag)
    }
}

/// Resources carrying the selected tag, in their original order
pub fn filter_by_tag<'a>(
    resources: &'a [ResourceWithTags],
    selection: &TagSelection,
) -> Vec<&'a ResourceWithTags> {
    match selection {
        TagSelection::All => resources.iter().collect(),
        TagSelection::Tag(id) => resources.iter().filter(|r| r.has_tag(id)).collect(),
    }
}
