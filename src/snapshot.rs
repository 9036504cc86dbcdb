use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::aggregate::{ChartData, FormattedMetrics, KeyMetrics};
use crate::data::model::FilterField;
use crate::state::DashboardSession;

/// Everything the presentation layer needs to draw one dashboard frame.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub total_employees: usize,
    pub visible_employees: usize,
    /// Current choice per filter control ("All" when unconstrained).
    pub selections: BTreeMap<&'static str, String>,
    pub options: BTreeMap<&'static str, Vec<String>>,
    pub metrics: KeyMetrics,
    pub metric_labels: FormattedMetrics,
    pub charts: ChartData,
}

impl Snapshot {
    pub fn capture(session: &DashboardSession) -> Self {
        let view = session.view();
        let selections = FilterField::ALL
            .into_iter()
            .map(|f| (f.key(), session.selections().get(f).to_string()))
            .collect();
        let options = FilterField::ALL
            .into_iter()
            .map(|f| (f.key(), session.filter_options(f)))
            .collect();

        Snapshot {
            total_employees: session.dataset().len(),
            visible_employees: view.len(),
            selections,
            options,
            metric_labels: view.metrics.formatted(),
            metrics: view.metrics,
            charts: view.charts,
        }
    }
}
