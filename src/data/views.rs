use std::collections::BTreeMap;

use serde::Serialize;

use super::filter::FilteredSubset;
use super::model::{CensusRecord, Category, INCOME};

// ---------------------------------------------------------------------------
// Chart-ready aggregations over a filtered subset
// ---------------------------------------------------------------------------
//
// Every view takes any iterator of records, so it works on a
// `FilteredSubset`, a whole dataset or a test slice alike. None of them
// depend on row order (except that the paired samples keep it), and all of
// them return empty results for empty input.

/// income value → number of records. Outcomes with no records are absent.
pub type OutcomeDistribution = BTreeMap<Category, usize>;

/// (column value, income value) → number of records. Sparse.
pub type CategoryOutcomeCounts = BTreeMap<(Category, Category), usize>;

/// One point of the age / working-hours scatter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairedSample {
    pub age: u32,
    pub hours_per_week: u32,
    pub income: Category,
}

pub fn outcome_distribution<'a>(
    records: impl IntoIterator<Item = &'a CensusRecord>,
) -> OutcomeDistribution {
    let mut counts = OutcomeDistribution::new();
    for rec in records {
        *counts.entry(rec.income.clone()).or_default() += 1;
    }
    counts
}

/// Straight projection; duplicates are kept.
pub fn paired_samples<'a>(
    records: impl IntoIterator<Item = &'a CensusRecord>,
) -> Vec<PairedSample> {
    records
        .into_iter()
        .map(|rec| PairedSample {
            age: rec.age,
            hours_per_week: rec.hours_per_week,
            income: rec.income.clone(),
        })
        .collect()
}

/// Two-key histogram of `column` against income. A record without a value
/// for `column` lands in the `Missing` bucket.
pub fn category_by_outcome<'a>(
    records: impl IntoIterator<Item = &'a CensusRecord>,
    column: &str,
) -> CategoryOutcomeCounts {
    let mut counts = CategoryOutcomeCounts::new();
    for rec in records {
        let key = (
            rec.category_or_missing(column).clone(),
            rec.category_or_missing(INCOME).clone(),
        );
        *counts.entry(key).or_default() += 1;
    }
    counts
}

/// Distinct outcomes appearing in a breakdown, sorted.
pub fn outcomes_of(counts: &CategoryOutcomeCounts) -> Vec<Category> {
    let mut outcomes: Vec<Category> = counts.keys().map(|(_, o)| o.clone()).collect();
    outcomes.sort();
    outcomes.dedup();
    outcomes
}

// ---------------------------------------------------------------------------
// DashboardViews – everything one recomputation produces
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBreakdown {
    pub column: String,
    pub counts: CategoryOutcomeCounts,
}

/// All chart inputs for one selection, plus the row counts shown above them.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardViews {
    pub total_rows: usize,
    pub filtered_rows: usize,
    pub outcomes: OutcomeDistribution,
    pub samples: Vec<PairedSample>,
    pub breakdowns: Vec<CategoryBreakdown>,
}

impl DashboardViews {
    pub fn compute<S: AsRef<str>>(subset: &FilteredSubset<'_>, breakdown_columns: &[S]) -> Self {
        DashboardViews {
            total_rows: subset.dataset().len(),
            filtered_rows: subset.len(),
            outcomes: outcome_distribution(subset.records()),
            samples: paired_samples(subset.records()),
            breakdowns: breakdown_columns
                .iter()
                .map(|col| CategoryBreakdown {
                    column: col.as_ref().to_string(),
                    counts: category_by_outcome(subset.records(), col.as_ref()),
                })
                .collect(),
        }
    }

    pub fn breakdown(&self, column: &str) -> Option<&CategoryOutcomeCounts> {
        self.breakdowns
            .iter()
            .find(|b| b.column == column)
            .map(|b| &b.counts)
    }
}
