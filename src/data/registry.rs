use std::collections::{BTreeMap, BTreeSet};

use super::filter::{FilterChoice, FilterSelection};
use super::model::{CensusDataset, Category};
use crate::error::{DataError, Result};

// ---------------------------------------------------------------------------
// Filter registry: the closed set of options per filterable column
// ---------------------------------------------------------------------------

/// Distinct values of each filterable column, taken once from the full
/// dataset so the options never shrink with the current selection.
#[derive(Debug, Clone)]
pub struct FilterRegistry {
    /// Filterable columns in the configured order.
    columns: Vec<String>,
    /// column → sorted distinct values (no sentinel).
    values: BTreeMap<String, Vec<Category>>,
}

impl FilterRegistry {
    /// Fails with `SchemaMismatch` if any column is absent or numeric.
    pub fn new<S: AsRef<str>>(dataset: &CensusDataset, columns: &[S]) -> Result<Self> {
        let mut order = Vec::with_capacity(columns.len());
        let mut values = BTreeMap::new();

        for column in columns {
            let column = column.as_ref();
            dataset.require_categorical(column)?;
            if values.contains_key(column) {
                continue;
            }
            let distinct: BTreeSet<&Category> = dataset
                .records()
                .iter()
                .map(|r| r.category_or_missing(column))
                .collect();
            log::debug!("Filter '{column}': {} distinct values", distinct.len());
            values.insert(column.to_string(), distinct.into_iter().cloned().collect());
            order.push(column.to_string());
        }

        Ok(FilterRegistry {
            columns: order,
            values,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Sorted distinct values of `column`, without the `All` sentinel.
    pub fn distinct_values(&self, column: &str) -> Option<&[Category]> {
        self.values.get(column).map(Vec::as_slice)
    }

    /// The options offered for `column`: `All` first, then every distinct value.
    pub fn available_values(&self, column: &str) -> Option<Vec<FilterChoice>> {
        let values = self.values.get(column)?;
        Some(
            std::iter::once(FilterChoice::All)
                .chain(values.iter().cloned().map(FilterChoice::Only))
                .collect(),
        )
    }

    /// Check a single choice against the closed set of options.
    pub fn validate_choice(&self, column: &str, choice: &FilterChoice) -> Result<()> {
        let values = self
            .values
            .get(column)
            .ok_or_else(|| DataError::invalid_selection(column, choice.to_string()))?;
        match choice {
            FilterChoice::All => Ok(()),
            FilterChoice::Only(value) => {
                if values.binary_search(value).is_ok() {
                    Ok(())
                } else {
                    Err(DataError::invalid_selection(column, value.to_string()))
                }
            }
        }
    }

    pub fn validate(&self, selection: &FilterSelection) -> Result<()> {
        selection
            .iter()
            .try_for_each(|(column, choice)| self.validate_choice(column, choice))
    }

    /// Turn the text of one option back into a choice for `column`.
    ///
    /// A value the column really holds wins over the `All` and `<missing>`
    /// labels, so every option listed by [`available_values`](Self::available_values)
    /// resolves to itself.
    pub fn resolve_label(&self, column: &str, label: &str) -> Result<FilterChoice> {
        let values = self
            .values
            .get(column)
            .ok_or_else(|| DataError::invalid_selection(column, label))?;
        let literal = Category::from(label);
        if values.binary_search(&literal).is_ok() {
            return Ok(FilterChoice::Only(literal));
        }
        let choice = FilterChoice::parse(label);
        self.validate_choice(column, &choice)?;
        Ok(choice)
    }

    /// Build a validated selection from user text pairs such as `("sex", "Male")`.
    pub fn parse_selection<I, K, V>(&self, pairs: I) -> Result<FilterSelection>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut selection = FilterSelection::new();
        for (column, label) in pairs {
            let choice = self.resolve_label(column.as_ref(), label.as_ref())?;
            selection.set(column.as_ref(), choice);
        }
        Ok(selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{LoadOptions, load_csv_reader};
    use crate::data::model::{AGE, CensusRecord, EDUCATION, HOURS_PER_WEEK, SEX, WORKCLASS};

    fn sample() -> CensusDataset {
        let mut unknown = CensusRecord::new(40, "Female", "Some-college", "?", 30, "<=50K");
        unknown.education = Category::Missing;
        CensusDataset::from_records(vec![
            CensusRecord::new(35, "Male", "Bachelors", "Private", 40, ">50K"),
            CensusRecord::new(22, "Female", "HS-grad", "Private", 20, "<=50K"),
            CensusRecord::new(47, "Male", "HS-grad", "Self-emp", 60, "<=50K"),
            unknown,
        ])
    }

    #[test]
    fn options_are_sorted_deduplicated_with_all_first() {
        let ds = sample();
        let registry = FilterRegistry::new(&ds, &[SEX, EDUCATION, WORKCLASS]).unwrap();
        assert_eq!(registry.columns(), [SEX, EDUCATION, WORKCLASS]);

        let labels = |col: &str| -> Vec<String> {
            registry
                .available_values(col)
                .unwrap()
                .iter()
                .map(|c| c.to_string())
                .collect()
        };
        assert_eq!(labels(SEX), ["All", "Female", "Male"]);
        assert_eq!(labels(EDUCATION), ["All", "Bachelors", "HS-grad", "<missing>"]);
        assert_eq!(labels(WORKCLASS), ["All", "?", "Private", "Self-emp"]);
    }

    #[test]
    fn options_come_from_the_full_dataset() {
        let ds = sample();
        let registry = FilterRegistry::new(&ds, &[SEX]).unwrap();
        // Selecting a value never changes what the registry offers.
        let selection = registry.parse_selection([(SEX, "Male")]).unwrap();
        assert!(!crate::data::filter::apply(&ds, &selection).is_empty());
        assert_eq!(registry.distinct_values(SEX).unwrap().len(), 2);
    }

    #[test]
    fn absent_column_is_schema_mismatch_at_construction() {
        let ds = sample();
        let err = FilterRegistry::new(&ds, &[SEX, "marital.status"]).unwrap_err();
        assert!(matches!(err, DataError::SchemaMismatch { column, .. } if column == "marital.status"));
    }

    #[test]
    fn numeric_column_is_schema_mismatch() {
        let ds = sample();
        assert!(matches!(
            FilterRegistry::new(&ds, &[AGE]),
            Err(DataError::SchemaMismatch { .. })
        ));
        assert!(matches!(
            FilterRegistry::new(&ds, &[HOURS_PER_WEEK]),
            Err(DataError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn unknown_value_is_invalid_selection() {
        let ds = sample();
        let registry = FilterRegistry::new(&ds, &[SEX, EDUCATION, WORKCLASS]).unwrap();
        let err = registry
            .parse_selection([(WORKCLASS, "Nonexistent")])
            .unwrap_err();
        match err {
            DataError::InvalidSelection { column, value } => {
                assert_eq!(column, WORKCLASS);
                assert_eq!(value, "Nonexistent");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unregistered_column_is_invalid_selection() {
        let ds = sample();
        let registry = FilterRegistry::new(&ds, &[SEX]).unwrap();
        let selection = FilterSelection::new().with(WORKCLASS, FilterChoice::All);
        assert!(matches!(
            registry.validate(&selection),
            Err(DataError::InvalidSelection { .. })
        ));
    }

    #[test]
    fn sentinel_and_missing_are_valid_choices() {
        let ds = sample();
        let registry = FilterRegistry::new(&ds, &[SEX, EDUCATION]).unwrap();
        let selection = registry
            .parse_selection([(SEX, "All"), (EDUCATION, "<missing>")])
            .unwrap();
        assert_eq!(selection.get(EDUCATION), &FilterChoice::Only(Category::Missing));
        assert!(registry.validate(&selection).is_ok());
    }

    #[test]
    fn every_listed_option_resolves_from_its_label() {
        let text = "\
age,sex,education,workclass,hours.per.week,income
35,<missing>,Bachelors,All,40,>50K
22,Female,HS-grad,Private,20,<=50K
47,Male,HS-grad,Private,60,<=50K
";
        let ds = load_csv_reader(text.as_bytes(), &LoadOptions::default()).unwrap();
        let registry = FilterRegistry::new(&ds, &[SEX, WORKCLASS]).unwrap();

        for column in [SEX, WORKCLASS] {
            for value in registry.distinct_values(column).unwrap() {
                let label = value.to_string();
                let resolved = registry.resolve_label(column, &label).unwrap();
                assert_eq!(resolved, FilterChoice::Only(value.clone()), "{column}={label}");
            }
        }

        // The text "<missing>" is a real sex value here.
        let selection = registry.parse_selection([(SEX, "<missing>")]).unwrap();
        assert_eq!(selection.get(SEX), &FilterChoice::Only(Category::from("<missing>")));
        assert_eq!(crate::data::filter::apply(&ds, &selection).indices(), &[0]);

        // Likewise a workclass literally called "All" constrains the result.
        let selection = registry.parse_selection([(WORKCLASS, "All")]).unwrap();
        assert_eq!(selection.get(WORKCLASS), &FilterChoice::Only(Category::from("All")));
        assert_eq!(crate::data::filter::apply(&ds, &selection).len(), 1);
    }

    #[test]
    fn labels_of_absent_values_are_still_rejected() {
        let ds = sample();
        let registry = FilterRegistry::new(&ds, &[SEX]).unwrap();
        // No missing sex in this dataset, so the label has nothing to select.
        assert!(matches!(
            registry.resolve_label(SEX, "<missing>"),
            Err(DataError::InvalidSelection { .. })
        ));
        assert_eq!(registry.resolve_label(SEX, "All").unwrap(), FilterChoice::All);
    }
}
