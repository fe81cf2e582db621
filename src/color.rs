use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use census_dashboard::data::model::{CensusDataset, Category};
use census_dashboard::data::views::outcome_distribution;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// `n` evenly spaced hues for outcomes without a fixed colour. Starts at
/// green so the first few stay clear of the income blue and orange.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    let step = 360.0 / n as f32;
    (0..n)
        .map(|i| {
            let hsl = Hsl::new(120.0 + step * i as f32, 0.55, 0.45);
            let rgb: Srgb = hsl.into_color();
            let rgb: Srgb<u8> = rgb.into_format();
            Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Outcome colours: income value → Color32
// ---------------------------------------------------------------------------

/// The adult extract's two income brackets. Test files write them with a
/// trailing period (`>50K.`), which gets the same colour.
const INCOME_COLORS: [(&str, Color32); 2] = [
    ("<=50K", Color32::from_rgb(66, 126, 196)),
    (">50K", Color32::from_rgb(232, 142, 44)),
];

const MISSING_COLOR: Color32 = Color32::DARK_GRAY;

fn fixed_color(outcome: &Category) -> Option<Color32> {
    match outcome {
        Category::Missing => Some(MISSING_COLOR),
        Category::Value(label) => {
            let label = label.trim_end_matches('.');
            INCOME_COLORS
                .iter()
                .find(|(known, _)| *known == label)
                .map(|(_, color)| *color)
        }
    }
}

/// One colour per income value of the *full* dataset, so a category keeps
/// its colour whatever the filters hide.
#[derive(Debug, Clone)]
pub struct OutcomePalette {
    mapping: BTreeMap<Category, Color32>,
}

impl OutcomePalette {
    pub fn for_dataset(dataset: &CensusDataset) -> Self {
        let outcomes = outcome_distribution(dataset.records());
        let unknown = outcomes.keys().filter(|o| fixed_color(o).is_none()).count();
        let mut generated = generate_palette(unknown).into_iter();

        let mapping = outcomes
            .into_keys()
            .map(|outcome| {
                let color = fixed_color(&outcome)
                    .or_else(|| generated.next())
                    .unwrap_or(Color32::GRAY);
                (outcome, color)
            })
            .collect();
        OutcomePalette { mapping }
    }

    pub fn color_for(&self, outcome: &Category) -> Color32 {
        self.mapping.get(outcome).copied().unwrap_or(Color32::GRAY)
    }
}
