use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::model::Category;
use crate::data::views::{DashboardViews, PairedSample};
use crate::session::DashboardSession;

// ---------------------------------------------------------------------------
// Headless JSON report of one recomputation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct OutcomeCount {
    pub income: Category,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupCount {
    pub category: Category,
    pub income: Category,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BreakdownReport {
    pub column: String,
    pub groups: Vec<GroupCount>,
}

/// Everything the page shows, flattened into JSON-friendly lists.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub title: String,
    /// column → chosen label (`All` when unconstrained).
    pub selection: BTreeMap<String, String>,
    pub total_rows: usize,
    pub filtered_rows: usize,
    pub outcome_distribution: Vec<OutcomeCount>,
    pub paired_samples: Vec<PairedSample>,
    pub breakdowns: Vec<BreakdownReport>,
}

impl DashboardReport {
    pub fn from_session(title: &str, session: &DashboardSession) -> Self {
        let selection = session
            .selection()
            .iter()
            .map(|(col, choice)| (col.to_string(), choice.to_string()))
            .collect();
        Self::from_views(title, selection, session.views())
    }

    fn from_views(title: &str, selection: BTreeMap<String, String>, views: &DashboardViews) -> Self {
        DashboardReport {
            title: title.to_string(),
            selection,
            total_rows: views.total_rows,
            filtered_rows: views.filtered_rows,
            outcome_distribution: views
                .outcomes
                .iter()
                .map(|(income, &count)| OutcomeCount {
                    income: income.clone(),
                    count,
                })
                .collect(),
            paired_samples: views.samples.clone(),
            breakdowns: views
                .breakdowns
                .iter()
                .map(|b| BreakdownReport {
                    column: b.column.clone(),
                    groups: b
                        .counts
                        .iter()
                        .map(|((category, income), &count)| GroupCount {
                            category: category.clone(),
                            income: income.clone(),
                            count,
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
