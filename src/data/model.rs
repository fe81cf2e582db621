use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::{DataError, Result};

// ---------------------------------------------------------------------------
// Column names of the census extract
// ---------------------------------------------------------------------------

pub const AGE: &str = "age";
pub const SEX: &str = "sex";
pub const EDUCATION: &str = "education";
pub const WORKCLASS: &str = "workclass";
pub const HOURS_PER_WEEK: &str = "hours.per.week";
pub const INCOME: &str = "income";

/// Columns every source file must provide.
pub const REQUIRED_COLUMNS: [&str; 6] = [AGE, SEX, EDUCATION, WORKCLASS, HOURS_PER_WEEK, INCOME];

/// Columns read as counts rather than categories.
pub fn is_numeric_column(column: &str) -> bool {
    matches!(column, AGE | HOURS_PER_WEEK)
}

/// Label used wherever a missing categorical value has to be shown as text.
pub const MISSING_LABEL: &str = "<missing>";

static MISSING: Category = Category::Missing;

// ---------------------------------------------------------------------------
// Category – a single categorical cell
// ---------------------------------------------------------------------------

/// A categorical value. Null / absent cells become [`Category::Missing`] so
/// grouping never drops a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Value(String),
    Missing,
}

impl Category {
    /// Inverse of `Display`: `<missing>` maps back to [`Category::Missing`].
    pub fn from_label(label: &str) -> Self {
        if label == MISSING_LABEL {
            Category::Missing
        } else {
            Category::Value(label.to_string())
        }
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Category::Value(s.to_string())
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        Category::Value(s)
    }
}

/// Numeric-looking text ("9", "10", "12.5") sorts by value before any plain
/// text; plain text sorts lexically; `Missing` sorts last.
impl Ord for Category {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Category::Value(a), Category::Value(b)) => natural_cmp(a, b),
            (Category::Value(_), Category::Missing) => Ordering::Less,
            (Category::Missing, Category::Value(_)) => Ordering::Greater,
            (Category::Missing, Category::Missing) => Ordering::Equal,
        }
    }
}

impl PartialOrd for Category {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn as_number(s: &str) -> Option<f64> {
    let looks_numeric = !s.is_empty()
        && s.bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'))
        && s.bytes().any(|b| b.is_ascii_digit());
    if looks_numeric {
        s.parse::<f64>().ok()
    } else {
        None
    }
}

fn natural_cmp(a: &str, b: &str) -> Ordering {
    match (as_number(a), as_number(b)) {
        // Tie-break on the text so "1" and "1.0" stay distinct.
        (Some(x), Some(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Value(s) => write!(f, "{s}"),
            Category::Missing => write!(f, "{MISSING_LABEL}"),
        }
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Category::Value(s) => serializer.serialize_str(s),
            Category::Missing => serializer.serialize_none(),
        }
    }
}

// ---------------------------------------------------------------------------
// CensusRecord – one row of the extract
// ---------------------------------------------------------------------------

/// A single row with the fields the dashboard interprets, plus any other
/// columns of the source file carried along untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct CensusRecord {
    pub age: u32,
    pub sex: Category,
    pub education: Category,
    pub workclass: Category,
    pub hours_per_week: u32,
    pub income: Category,
    /// Uninterpreted columns: column_name → value.
    pub passthrough: BTreeMap<String, Category>,
}

impl CensusRecord {
    pub fn new(
        age: u32,
        sex: &str,
        education: &str,
        workclass: &str,
        hours_per_week: u32,
        income: &str,
    ) -> Self {
        CensusRecord {
            age,
            sex: sex.into(),
            education: education.into(),
            workclass: workclass.into(),
            hours_per_week,
            income: income.into(),
            passthrough: BTreeMap::new(),
        }
    }

    pub fn with_passthrough(mut self, column: &str, value: Category) -> Self {
        self.passthrough.insert(column.to_string(), value);
        self
    }

    /// Categorical value of `column`, or `None` for numeric / unknown columns.
    pub fn category(&self, column: &str) -> Option<&Category> {
        match column {
            SEX => Some(&self.sex),
            EDUCATION => Some(&self.education),
            WORKCLASS => Some(&self.workclass),
            INCOME => Some(&self.income),
            AGE | HOURS_PER_WEEK => None,
            other => self.passthrough.get(other),
        }
    }

    /// Like [`category`](Self::category) but an absent cell reads as `Missing`.
    pub fn category_or_missing(&self, column: &str) -> &Category {
        self.category(column).unwrap_or(&MISSING)
    }
}

// ---------------------------------------------------------------------------
// CensusDataset – the complete loaded extract
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// The full parsed dataset. Immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct CensusDataset {
    records: Vec<CensusRecord>,
    /// Header order of the source file.
    column_names: Vec<String>,
}

impl CensusDataset {
    /// Build from a header and already-parsed rows. Fails if the header lacks
    /// any required column.
    pub fn new(column_names: Vec<String>, records: Vec<CensusRecord>) -> Result<Self> {
        for required in REQUIRED_COLUMNS {
            if !column_names.iter().any(|c| c == required) {
                return Err(DataError::format(
                    "header",
                    format!("missing required column '{required}'"),
                ));
            }
        }
        Ok(CensusDataset {
            records,
            column_names,
        })
    }

    /// Build from rows alone: the header is the required columns followed by
    /// every passthrough column seen, in sorted order.
    pub fn from_records(records: Vec<CensusRecord>) -> Self {
        let extra: BTreeSet<&String> = records
            .iter()
            .flat_map(|r| r.passthrough.keys())
            .collect();
        let column_names = REQUIRED_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(extra.into_iter().cloned())
            .collect();
        CensusDataset {
            records,
            column_names,
        }
    }

    pub fn records(&self) -> &[CensusRecord] {
        &self.records
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_kind(&self, column: &str) -> Option<ColumnKind> {
        if !self.column_names.iter().any(|c| c == column) {
            return None;
        }
        if is_numeric_column(column) {
            Some(ColumnKind::Numeric)
        } else {
            Some(ColumnKind::Categorical)
        }
    }

    /// Check that `column` exists and can be grouped / filtered on.
    pub fn require_categorical(&self, column: &str) -> Result<()> {
        match self.column_kind(column) {
            Some(ColumnKind::Categorical) => Ok(()),
            Some(ColumnKind::Numeric) => Err(DataError::schema(column, "column is numeric, not categorical")),
            None => Err(DataError::schema(column, "column not present in dataset")),
        }
    }
}
