use std::sync::Arc;

use crate::config::DashboardConfig;
use crate::data::filter::{self, FilterChoice, FilterSelection, FilteredSubset};
use crate::data::model::CensusDataset;
use crate::data::registry::FilterRegistry;
use crate::data::views::DashboardViews;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Dashboard session: one request/response cycle per interaction
// ---------------------------------------------------------------------------

/// The per-user view onto a shared, immutable dataset.
///
/// Holds the last *valid* selection and the views computed from it. A
/// rejected selection leaves both untouched.
#[derive(Debug, Clone)]
pub struct DashboardSession {
    dataset: Arc<CensusDataset>,
    registry: FilterRegistry,
    breakdown_columns: Vec<String>,
    selection: FilterSelection,
    views: DashboardViews,
}

impl DashboardSession {
    pub fn new(dataset: Arc<CensusDataset>, config: &DashboardConfig) -> Result<Self> {
        Self::with_columns(dataset, &config.filter_columns, &config.breakdown_columns)
    }

    /// Fails with `SchemaMismatch` if a filter or breakdown column is unusable.
    pub fn with_columns<F: AsRef<str>, B: AsRef<str>>(
        dataset: Arc<CensusDataset>,
        filter_columns: &[F],
        breakdown_columns: &[B],
    ) -> Result<Self> {
        let registry = FilterRegistry::new(&dataset, filter_columns)?;
        let breakdown_columns = breakdown_columns
            .iter()
            .map(|col| -> Result<String> {
                dataset.require_categorical(col.as_ref())?;
                Ok(col.as_ref().to_string())
            })
            .collect::<Result<Vec<_>>>()?;

        let selection = Self::unconstrained(&registry);
        let views = DashboardViews::compute(&filter::apply(&dataset, &selection), &breakdown_columns);
        log::info!(
            "Session ready: {} rows, filters {:?}, breakdowns {:?}",
            dataset.len(),
            registry.columns(),
            breakdown_columns
        );

        Ok(DashboardSession {
            dataset,
            registry,
            breakdown_columns,
            selection,
            views,
        })
    }

    fn unconstrained(registry: &FilterRegistry) -> FilterSelection {
        registry
            .columns()
            .iter()
            .map(|col| (col, FilterChoice::All))
            .collect()
    }

    /// Change one filter and recompute.
    pub fn select(&mut self, column: &str, choice: FilterChoice) -> Result<&DashboardViews> {
        let candidate = self.selection.clone().with(column, choice);
        self.apply_validated(candidate)
    }

    /// Replace the whole selection; columns it does not mention go back to `All`.
    pub fn apply_selection(&mut self, selection: &FilterSelection) -> Result<&DashboardViews> {
        let mut candidate = Self::unconstrained(&self.registry);
        for (column, choice) in selection.iter() {
            candidate.set(column, choice.clone());
        }
        self.apply_validated(candidate)
    }

    pub fn reset(&mut self) -> &DashboardViews {
        let selection = Self::unconstrained(&self.registry);
        if selection != self.selection {
            self.selection = selection;
            self.recompute();
        }
        &self.views
    }

    fn apply_validated(&mut self, candidate: FilterSelection) -> Result<&DashboardViews> {
        if let Err(e) = self.registry.validate(&candidate) {
            log::warn!("Rejected selection: {e}");
            return Err(e);
        }
        if candidate != self.selection {
            self.selection = candidate;
            self.recompute();
        }
        Ok(&self.views)
    }

    fn recompute(&mut self) {
        let subset = filter::apply(&self.dataset, &self.selection);
        self.views = DashboardViews::compute(&subset, &self.breakdown_columns);
        log::debug!(
            "Recomputed views: {} of {} rows after filtering",
            self.views.filtered_rows,
            self.views.total_rows
        );
    }

    /// Rows passing the current selection.
    pub fn filtered(&self) -> FilteredSubset<'_> {
        filter::apply(&self.dataset, &self.selection)
    }

    pub fn filtered_rows(&self) -> usize {
        self.views.filtered_rows
    }

    pub fn dataset(&self) -> &Arc<CensusDataset> {
        &self.dataset
    }

    pub fn registry(&self) -> &FilterRegistry {
        &self.registry
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn views(&self) -> &DashboardViews {
        &self.views
    }

    pub fn breakdown_columns(&self) -> &[String] {
        &self.breakdown_columns
    }
}
