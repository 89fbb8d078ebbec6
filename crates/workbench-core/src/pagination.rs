//! In-memory sort and pagination over JSON records.
//!
//! `offset` is a 1-based page number, not a skip count: page `n` covers
//! items `(n - 1) * limit .. n * limit` of the sorted input.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{WorkbenchError, WorkbenchResult};

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: usize = 50;

/// A single record: a JSON object.
pub type Record = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = WorkbenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(WorkbenchError::Validation {
                message: format!("invalid sort order: {other}"),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-based page number.
    pub offset: usize,
    pub limit: usize,
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: SortOrder,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            offset: 1,
            limit: MAX_PAGE_SIZE,
            sort_by: None,
            sort_order: SortOrder::Asc,
        }
    }
}

/// One page of results plus metadata for the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub count: usize,
    pub total_count: usize,
    pub next_available: bool,
}

/// Ordering key of one field value.
///
/// Missing, null and empty-string values share `Empty`, which orders
/// before every other value whatever the column's type.
#[derive(Debug)]
enum SortKey {
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl SortKey {
    fn of(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => SortKey::Empty,
            Some(Value::String(s)) if s.is_empty() => SortKey::Empty,
            Some(Value::Bool(b)) => SortKey::Bool(*b),
            Some(Value::Number(n)) => SortKey::Number(n.as_f64().unwrap_or(f64::NAN)),
            Some(Value::String(s)) => SortKey::Text(s.to_lowercase()),
            Some(other) => SortKey::Text(other.to_string().to_lowercase()),
        }
    }

    fn variant_rank(&self) -> u8 {
        match self {
            SortKey::Empty => 0,
            SortKey::Bool(_) => 1,
            SortKey::Number(_) => 2,
            SortKey::Text(_) => 3,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Bool(a), SortKey::Bool(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            _ => self.variant_rank().cmp(&other.variant_rank()),
        }
    }
}

fn validate(request: &PageRequest, valid_keys: &[&str]) -> WorkbenchResult<()> {
    if request.limit == 0 || request.limit > MAX_PAGE_SIZE {
        return Err(WorkbenchError::InvalidPageSize {
            limit: request.limit,
            max: MAX_PAGE_SIZE,
        });
    }
    if request.offset == 0 {
        return Err(WorkbenchError::Validation {
            message: "offset is a 1-based page number".into(),
        });
    }
    if let Some(field) = &request.sort_by
        && !valid_keys.contains(&field.as_str())
    {
        return Err(WorkbenchError::InvalidSortField {
            field: field.clone(),
        });
    }
    Ok(())
}

/// Sort `data` (stable) and return the requested page.
///
/// String fields compare case-insensitively. Missing and null fields
/// order as an empty string, which comes first in ascending order in
/// text and numeric columns alike. An offset past the end yields an
/// empty page.
pub fn paginate(
    mut data: Vec<Record>,
    valid_keys: &[&str],
    request: &PageRequest,
) -> WorkbenchResult<Page<Record>> {
    validate(request, valid_keys)?;

    if let Some(field) = &request.sort_by {
        data.sort_by(|a, b| {
            let ord = SortKey::of(a.get(field)).compare(&SortKey::of(b.get(field)));
            match request.sort_order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
    }

    let total_count = data.len();
    let start = (request.offset - 1).saturating_mul(request.limit);
    let end = request.offset.saturating_mul(request.limit);
    let items: Vec<Record> = if start >= total_count {
        Vec::new()
    } else {
        data.drain(start..end.min(total_count)).collect()
    };

    Ok(Page {
        count: items.len(),
        total_count,
        next_available: end < total_count,
        items,
    })
}
