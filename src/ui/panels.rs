use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use census_dashboard::data::filter::FilterChoice;

use super::column_title;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Adult Census Income");
    ui.label(
        "Key demographic and employment factors that influence whether \
         income exceeds $50K per year.",
    );
    ui.separator();

    ui.heading("Filters");

    let Some(session) = &state.session else {
        ui.label("No dataset loaded.");
        return;
    };

    // Copy out what the widgets need so the state can be mutated afterwards.
    let filters: Vec<(String, Vec<FilterChoice>, FilterChoice)> = session
        .registry()
        .columns()
        .iter()
        .map(|col| {
            (
                col.clone(),
                session.registry().available_values(col).unwrap_or_default(),
                session.selection().get(col).clone(),
            )
        })
        .collect();

    let mut change: Option<(String, FilterChoice)> = None;
    let mut reset = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (col, options, current) in &filters {
                ui.strong(column_title(col));
                egui::ComboBox::from_id_salt(col.as_str())
                    .selected_text(current.to_string())
                    .width(ui.available_width())
                    .show_ui(ui, |ui: &mut Ui| {
                        for option in options {
                            if ui
                                .selectable_label(option == current, option.to_string())
                                .clicked()
                            {
                                change = Some((col.clone(), option.clone()));
                            }
                        }
                    });
                ui.add_space(6.0);
            }

            ui.separator();
            if ui.button("Reset filters").clicked() {
                reset = true;
            }
        });

    if let Some((col, choice)) = change {
        state.select(&col, choice);
    }
    if reset {
        state.reset();
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(session) = &state.session {
            ui.label(format!(
                "{} records loaded from {}",
                session.dataset().len(),
                state.config.data_path.display()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open census extract")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}
