use std::path::Path;
use std::sync::Arc;

use census_dashboard::data::filter::{FilterChoice, FilterSelection};
use census_dashboard::data::loader;
use census_dashboard::data::model::CensusDataset;
use census_dashboard::{DashboardConfig, DashboardSession};

use crate::color::OutcomePalette;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Session over the loaded dataset (None until a file is loaded).
    pub session: Option<DashboardSession>,

    /// Colours per income value of the loaded dataset.
    pub palette: Option<OutcomePalette>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            session: None,
            palette: None,
            status_message: None,
        }
    }

    /// Start a session on a newly loaded dataset. On failure the previous
    /// session stays in place.
    pub fn set_dataset(&mut self, dataset: CensusDataset) -> census_dashboard::Result<()> {
        let dataset = Arc::new(dataset);
        let session = DashboardSession::new(Arc::clone(&dataset), &self.config)?;
        self.palette = Some(OutcomePalette::for_dataset(&dataset));
        self.session = Some(session);
        self.status_message = None;
        Ok(())
    }

    /// Load a file chosen in the UI and report problems in the status line.
    pub fn open_path(&mut self, path: &Path) {
        let result = loader::load_file(path, &self.config.load_options())
            .and_then(|dataset| self.set_dataset(dataset));
        match result {
            Ok(()) => self.config.data_path = path.to_path_buf(),
            Err(e) => {
                log::error!("Failed to open {}: {e:#}", path.display());
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    pub fn select(&mut self, column: &str, choice: FilterChoice) {
        let Some(session) = &mut self.session else {
            return;
        };
        match session.select(column, choice) {
            Ok(_) => self.status_message = None,
            Err(e) => self.status_message = Some(format!("Error: {e}")),
        }
    }

    pub fn apply_selection(&mut self, selection: &FilterSelection) -> census_dashboard::Result<()> {
        if let Some(session) = &mut self.session {
            session.apply_selection(selection)?;
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        if let Some(session) = &mut self.session {
            session.reset();
        }
        self.status_message = None;
    }
}
