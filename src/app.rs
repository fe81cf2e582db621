use std::path::{Path, PathBuf};

use eframe::egui;

use census_dashboard::DashboardSession;

use crate::state::AppState;
use crate::ui::{charts, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CensusDashboardApp {
    state: AppState,
    /// Dataset the window title currently names.
    titled_path: Option<PathBuf>,
}

impl CensusDashboardApp {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            titled_path: None,
        }
    }

    /// Retitle the window after a different file has been opened.
    fn sync_title(&mut self, ctx: &egui::Context) {
        let loaded = self
            .state
            .session
            .as_ref()
            .map(|_| self.state.config.data_path.clone());
        if loaded != self.titled_path {
            let title = window_title(&self.state.config.title, loaded.as_deref());
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title));
            self.titled_path = loaded;
        }
    }
}

impl eframe::App for CensusDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.sync_title(ctx);

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // Full width, so it goes in before the side panel.
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            match &self.state.session {
                Some(session) => ui.label(status_line(session)),
                None => ui.weak("Open a census extract with File → Open…"),
            };
        });

        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            charts::dashboard(ui, &self.state);
        });
    }
}

fn window_title(title: &str, data_path: Option<&Path>) -> String {
    match data_path.and_then(Path::file_name) {
        Some(name) => format!("{title} - {}", name.to_string_lossy()),
        None => title.to_string(),
    }
}

/// `"2 of 3 rows | sex = Male | charts: education, sex"`
fn status_line(session: &DashboardSession) -> String {
    let constraints: Vec<String> = session
        .selection()
        .constraints()
        .map(|(column, value)| format!("{column} = {value}"))
        .collect();
    let filters = if constraints.is_empty() {
        "no filters".to_string()
    } else {
        constraints.join(", ")
    };
    format!(
        "{} of {} rows | {filters} | charts: {}",
        session.filtered_rows(),
        session.dataset().len(),
        session.breakdown_columns().join(", ")
    )
}
