use eframe::egui::{Align2, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoint, PlotPoints, Points, Text};

use census_dashboard::data::model::{AGE, HOURS_PER_WEEK};
use census_dashboard::data::views::{CategoryBreakdown, DashboardViews, outcomes_of};

use super::column_title;
use crate::color::OutcomePalette;
use crate::state::AppState;

const CHART_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Central panel – the chart page
// ---------------------------------------------------------------------------

/// Render the row count and every chart for the current selection.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let (Some(session), Some(palette)) = (&state.session, &state.palette) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a census extract to start  (File → Open…)");
        });
        return;
    };
    let views = session.views();

    ui.heading(&state.config.title);
    ui.label(
        RichText::new(format!(
            "Dataset size after filtering: {} rows",
            views.filtered_rows
        ))
        .strong(),
    );
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            outcome_section(ui, views, palette);
            ui.separator();
            paired_scatter(ui, views, palette);
            for breakdown in &views.breakdowns {
                ui.separator();
                breakdown_chart(ui, breakdown, palette);
            }
        });
}

// ---------------------------------------------------------------------------
// Income distribution
// ---------------------------------------------------------------------------

fn outcome_section(ui: &mut Ui, views: &DashboardViews, palette: &OutcomePalette) {
    ui.strong("Income Distribution");

    Plot::new("income_distribution")
        .height(CHART_HEIGHT * 0.8)
        .legend(Legend::default())
        .allow_scroll(false)
        .show_x(false)
        .show(ui, |plot_ui| {
            for (i, (income, &count)) in views.outcomes.iter().enumerate() {
                let bar = Bar::new(i as f64, count as f64)
                    .width(0.6)
                    .name(income.to_string());
                let chart = BarChart::new(vec![bar])
                    .name(income.to_string())
                    .color(palette.color_for(income));
                plot_ui.bar_chart(chart);
            }
        });

    let total = views.filtered_rows.max(1) as f64;
    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .column(Column::auto().at_least(100.0))
        .column(Column::auto().at_least(60.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Income");
            });
            header.col(|ui| {
                ui.strong("Rows");
            });
            header.col(|ui| {
                ui.strong("Share");
            });
        })
        .body(|mut body| {
            for (income, &count) in &views.outcomes {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.colored_label(palette.color_for(income), income.to_string());
                    });
                    row.col(|ui| {
                        ui.label(count.to_string());
                    });
                    row.col(|ui| {
                        ui.label(format!("{:.1}%", 100.0 * count as f64 / total));
                    });
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Age and working hours vs income
// ---------------------------------------------------------------------------

fn paired_scatter(ui: &mut Ui, views: &DashboardViews, palette: &OutcomePalette) {
    ui.strong("Age and Working Hours vs Income");

    // One series per outcome so the legend doubles as the colour key.
    let mut series: Vec<(String, Color32, Vec<[f64; 2]>)> = Vec::new();
    for income in views.outcomes.keys() {
        let points = views
            .samples
            .iter()
            .filter(|s| &s.income == income)
            .map(|s| [s.age as f64, s.hours_per_week as f64])
            .collect();
        series.push((income.to_string(), palette.color_for(income), points));
    }

    Plot::new("age_hours_scatter")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .allow_scroll(false)
        .x_axis_label(AGE)
        .y_axis_label(HOURS_PER_WEEK)
        .show(ui, |plot_ui| {
            for (name, color, points) in series {
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .name(name)
                        .color(color.gamma_multiply(0.7))
                        .radius(2.0),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Category vs income (grouped bars)
// ---------------------------------------------------------------------------

fn breakdown_chart(ui: &mut Ui, breakdown: &CategoryBreakdown, palette: &OutcomePalette) {
    let title = format!("{} vs Income", column_title(&breakdown.column));
    ui.strong(&title);

    let mut categories: Vec<_> = breakdown.counts.keys().map(|(c, _)| c.clone()).collect();
    categories.dedup();
    let outcomes = outcomes_of(&breakdown.counts);

    let group_width = 0.8;
    let bar_width = group_width / outcomes.len().max(1) as f64;

    Plot::new(format!("breakdown_{}", breakdown.column))
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .allow_scroll(false)
        .show_x(false)
        .show(ui, |plot_ui| {
            for (j, outcome) in outcomes.iter().enumerate() {
                let offset = (j as f64 + 0.5) * bar_width - group_width / 2.0;
                let bars: Vec<Bar> = categories
                    .iter()
                    .enumerate()
                    .filter_map(|(i, category)| {
                        let count = breakdown.counts.get(&(category.clone(), outcome.clone()))?;
                        Some(
                            Bar::new(i as f64 + offset, *count as f64)
                                .width(bar_width)
                                .name(format!("{category} / {outcome}")),
                        )
                    })
                    .collect();
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .name(outcome.to_string())
                        .color(palette.color_for(outcome)),
                );
            }

            for (i, category) in categories.iter().enumerate() {
                plot_ui.text(
                    Text::new(PlotPoint::new(i as f64, 0.0), category.to_string())
                        .anchor(Align2::CENTER_TOP)
                        .color(Color32::GRAY),
                );
            }
        });
}
