use std::collections::BTreeMap;
use std::fmt;

use super::model::{CensusDataset, CensusRecord, Category, is_numeric_column};

/// Label of the "no constraint" option shown first in every filter.
pub const ALL_LABEL: &str = "All";

static ALL: FilterChoice = FilterChoice::All;

// ---------------------------------------------------------------------------
// Filter predicate: one choice per column
// ---------------------------------------------------------------------------

/// What the user picked for one filterable column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterChoice {
    /// No constraint on this column.
    All,
    /// Keep only records whose value equals this category.
    Only(Category),
}

impl FilterChoice {
    /// Parse user text: `All` is the sentinel, anything else a category label.
    /// Knows nothing about the column, so a real value spelled `All` or
    /// `<missing>` is misread; prefer `FilterRegistry::resolve_label`.
    pub fn parse(label: &str) -> Self {
        if label == ALL_LABEL {
            FilterChoice::All
        } else {
            FilterChoice::Only(Category::from_label(label))
        }
    }

    pub fn admits(&self, value: &Category) -> bool {
        match self {
            FilterChoice::All => true,
            FilterChoice::Only(wanted) => wanted == value,
        }
    }
}

impl fmt::Display for FilterChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterChoice::All => write!(f, "{ALL_LABEL}"),
            FilterChoice::Only(c) => write!(f, "{c}"),
        }
    }
}

/// Per-column selection: column_name → choice.
/// A column that is absent, or mapped to [`FilterChoice::All`], is unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    choices: BTreeMap<String, FilterChoice>,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: &str, choice: FilterChoice) -> Self {
        self.set(column, choice);
        self
    }

    pub fn set(&mut self, column: &str, choice: FilterChoice) {
        self.choices.insert(column.to_string(), choice);
    }

    /// Current choice for `column`; unset columns read as `All`.
    pub fn get(&self, column: &str) -> &FilterChoice {
        self.choices.get(column).unwrap_or(&ALL)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterChoice)> {
        self.choices.iter().map(|(col, choice)| (col.as_str(), choice))
    }

    /// Only the columns that actually constrain the result.
    pub fn constraints(&self) -> impl Iterator<Item = (&str, &Category)> {
        self.choices.iter().filter_map(|(col, choice)| match choice {
            FilterChoice::All => None,
            FilterChoice::Only(value) => Some((col.as_str(), value)),
        })
    }

    pub fn is_unconstrained(&self) -> bool {
        self.constraints().next().is_none()
    }

    pub fn matches(&self, record: &CensusRecord) -> bool {
        self.choices.iter().all(|(col, choice)| match choice {
            FilterChoice::All => true,
            // Counts have no categories to compare against.
            FilterChoice::Only(_) if is_numeric_column(col) => false,
            // A record lacking the column compares as Missing.
            FilterChoice::Only(_) => choice.admits(record.category_or_missing(col)),
        })
    }
}

impl<K: AsRef<str>> FromIterator<(K, FilterChoice)> for FilterSelection {
    fn from_iter<I: IntoIterator<Item = (K, FilterChoice)>>(iter: I) -> Self {
        let mut selection = FilterSelection::new();
        for (col, choice) in iter {
            selection.set(col.as_ref(), choice);
        }
        selection
    }
}

// ---------------------------------------------------------------------------
// FilteredSubset – rows of the dataset passing a selection
// ---------------------------------------------------------------------------

/// Records of a dataset that pass a selection, in dataset order.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredSubset<'a> {
    dataset: &'a CensusDataset,
    indices: Vec<usize>,
}

impl<'a> FilteredSubset<'a> {
    /// Positions of the kept records inside the dataset (strictly increasing).
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn records(&self) -> impl Iterator<Item = &'a CensusRecord> + '_ {
        let records = self.dataset.records();
        self.indices.iter().map(move |&i| &records[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn dataset(&self) -> &'a CensusDataset {
        self.dataset
    }

    /// Narrow this subset further; equivalent to applying both selections
    /// to the dataset at once.
    pub fn refine(&self, selection: &FilterSelection) -> FilteredSubset<'a> {
        let records = self.dataset.records();
        let indices = self
            .indices
            .iter()
            .copied()
            .filter(|&i| selection.matches(&records[i]))
            .collect();
        FilteredSubset {
            dataset: self.dataset,
            indices,
        }
    }
}

/// Return the records that pass every non-`All` choice in `selection`.
///
/// A record passes a column when:
/// * the column is absent from `selection` or set to `All` → no constraint
/// * the record's value equals the chosen category → passes
///
/// Choices combine with AND, so the order they were set in is irrelevant.
/// A selection matching nothing gives an empty subset.
///
/// `selection` is not checked here: pass it through
/// `FilterRegistry::validate` first. Unchecked, a value choice on a numeric
/// column such as `age` keeps no record.
pub fn apply<'a>(dataset: &'a CensusDataset, selection: &FilterSelection) -> FilteredSubset<'a> {
    let indices = dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, rec)| selection.matches(rec))
        .map(|(i, _)| i)
        .collect();
    FilteredSubset { dataset, indices }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{AGE, EDUCATION, HOURS_PER_WEEK, SEX, WORKCLASS};

    fn only(value: &str) -> FilterChoice {
        FilterChoice::Only(Category::from(value))
    }

    fn sample() -> CensusDataset {
        let mut missing_sex = CensusRecord::new(51, "", "Masters", "Local-gov", 45, ">50K");
        missing_sex.sex = Category::Missing;
        CensusDataset::from_records(vec![
            CensusRecord::new(35, "Male", "Bachelors", "Private", 40, ">50K"),
            CensusRecord::new(22, "Female", "HS-grad", "Private", 20, "<=50K"),
            CensusRecord::new(47, "Male", "HS-grad", "Self-emp", 60, "<=50K"),
            CensusRecord::new(29, "Female", "Bachelors", "Private", 38, ">50K"),
            CensusRecord::new(63, "Male", "HS-grad", "Private", 40, ">50K"),
            missing_sex,
            CensusRecord::new(35, "Male", "Bachelors", "Private", 40, ">50K"),
        ])
    }

    fn all_selections() -> Vec<FilterSelection> {
        let sexes = [FilterChoice::All, only("Male"), only("Female"), FilterChoice::Only(Category::Missing)];
        let educations = [FilterChoice::All, only("Bachelors"), only("HS-grad")];
        let workclasses = [FilterChoice::All, only("Private"), only("Self-emp")];
        let mut out = Vec::new();
        for s in &sexes {
            for e in &educations {
                for w in &workclasses {
                    out.push(
                        FilterSelection::new()
                            .with(SEX, s.clone())
                            .with(EDUCATION, e.clone())
                            .with(WORKCLASS, w.clone()),
                    );
                }
            }
        }
        out
    }

    #[test]
    fn all_selection_is_identity() {
        let ds = sample();
        let selection = FilterSelection::new()
            .with(SEX, FilterChoice::All)
            .with(EDUCATION, FilterChoice::All)
            .with(WORKCLASS, FilterChoice::All);
        let subset = apply(&ds, &selection);
        assert_eq!(subset.indices(), (0..ds.len()).collect::<Vec<_>>().as_slice());
        assert!(apply(&ds, &FilterSelection::new()).records().eq(ds.records().iter()));
    }

    #[test]
    fn constraint_order_does_not_matter() {
        let ds = sample();
        let a = FilterSelection::new()
            .with(SEX, only("Male"))
            .with(EDUCATION, only("HS-grad"));
        let b = FilterSelection::new()
            .with(EDUCATION, only("HS-grad"))
            .with(SEX, only("Male"));
        assert_eq!(apply(&ds, &a), apply(&ds, &b));
        assert_eq!(apply(&ds, &a).indices(), &[2, 4]);

        // Sequential single-column passes, in either order, agree with the
        // combined selection.
        let by_sex = FilterSelection::new().with(SEX, only("Male"));
        let by_edu = FilterSelection::new().with(EDUCATION, only("HS-grad"));
        let sex_then_edu = apply(&ds, &by_sex).refine(&by_edu);
        let edu_then_sex = apply(&ds, &by_edu).refine(&by_sex);
        assert_eq!(sex_then_edu, edu_then_sex);
        assert_eq!(sex_then_edu, apply(&ds, &a));
    }

    #[test]
    fn every_selection_is_an_ordered_subset_and_idempotent() {
        let ds = sample();
        for selection in all_selections() {
            let subset = apply(&ds, &selection);
            assert!(subset.len() <= ds.len());
            assert!(subset.indices().windows(2).all(|w| w[0] < w[1]));
            assert!(subset.records().all(|r| selection.matches(r)));
            // Nothing that matches is left out.
            let expected = ds.records().iter().filter(|r| selection.matches(r)).count();
            assert_eq!(subset.len(), expected);
            assert_eq!(subset.refine(&selection), subset);
            assert_eq!(apply(&ds, &selection), subset);
        }
    }

    #[test]
    fn unmatched_conjunction_is_empty_not_error() {
        let ds = sample();
        let selection = FilterSelection::new()
            .with(SEX, only("Female"))
            .with(WORKCLASS, only("Self-emp"));
        let subset = apply(&ds, &selection);
        assert!(subset.is_empty());
        assert_eq!(subset.records().count(), 0);
    }

    #[test]
    fn missing_values_are_selectable() {
        let ds = sample();
        let selection = FilterSelection::new().with(SEX, FilterChoice::Only(Category::Missing));
        assert_eq!(apply(&ds, &selection).indices(), &[5]);
    }

    #[test]
    fn value_choice_on_numeric_column_keeps_nothing() {
        let ds = sample();
        let missing_age = FilterSelection::new().with(AGE, FilterChoice::Only(Category::Missing));
        assert!(apply(&ds, &missing_age).is_empty());
        let exact_hours = FilterSelection::new().with(HOURS_PER_WEEK, only("40"));
        assert!(apply(&ds, &exact_hours).is_empty());
        // `All` on the same column is still no constraint.
        let any_age = FilterSelection::new().with(AGE, FilterChoice::All);
        assert_eq!(apply(&ds, &any_age).len(), ds.len());
    }

    #[test]
    fn duplicate_rows_are_kept() {
        let ds = sample();
        let selection = FilterSelection::new()
            .with(SEX, only("Male"))
            .with(EDUCATION, only("Bachelors"));
        assert_eq!(apply(&ds, &selection).indices(), &[0, 6]);
    }

    #[test]
    fn choice_parsing_and_display() {
        assert_eq!(FilterChoice::parse("All"), FilterChoice::All);
        assert_eq!(FilterChoice::parse("Male"), only("Male"));
        assert_eq!(FilterChoice::parse("<missing>"), FilterChoice::Only(Category::Missing));
        assert_eq!(only("HS-grad").to_string(), "HS-grad");
        assert_eq!(FilterChoice::All.to_string(), ALL_LABEL);
    }

    #[test]
    fn selection_from_pairs() {
        let selection: FilterSelection =
            [(SEX, only("Male")), (WORKCLASS, FilterChoice::All)].into_iter().collect();
        assert_eq!(selection.get(SEX), &only("Male"));
        assert_eq!(selection.get(EDUCATION), &FilterChoice::All);
        assert_eq!(selection.constraints().count(), 1);
        assert!(!selection.is_unconstrained());
    }
}
