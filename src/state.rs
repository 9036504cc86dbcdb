use std::sync::Arc;

use crate::data::filter::{
    filter_options, filtered_indices, FilterSelections, FilteredView, Selection,
};
use crate::data::model::{Dataset, FilterField};

// ---------------------------------------------------------------------------
// Dashboard session
// ---------------------------------------------------------------------------

/// One viewer's state. Sessions share the dataset and own everything else.
#[derive(Debug, Clone)]
pub struct DashboardSession {
    dataset: Arc<Dataset>,

    /// Per-field filter selections.
    selections: FilterSelections,

    /// Indices of records passing the current selections.
    visible_indices: Vec<usize>,
}

impl DashboardSession {
    /// Start with every filter at "All".
    pub fn new(dataset: Arc<Dataset>) -> Self {
        let visible_indices = (0..dataset.len()).collect();
        Self {
            dataset,
            selections: FilterSelections::default(),
            visible_indices,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn selections(&self) -> &FilterSelections {
        &self.selections
    }

    pub fn visible_indices(&self) -> &[usize] {
        &self.visible_indices
    }

    /// Choices for one filter control, "All" first.
    pub fn filter_options(&self, field: FilterField) -> Vec<String> {
        filter_options(&self.dataset, field)
    }

    /// Apply one control's choice (its label, "All" included) and rerun the
    /// filter over the whole dataset.
    pub fn select(&mut self, field: FilterField, choice: &str) {
        let selection = Selection::from_choice(choice);
        if let Selection::Only(value) = &selection {
            if !self.dataset.unique_values(field).contains(value) {
                log::debug!("{field} = {value:?} matches no records");
            }
        }
        self.selections.set(field, selection);
        self.refilter();
    }

    /// Put every control back to "All".
    pub fn reset(&mut self) {
        self.selections = FilterSelections::default();
        self.refilter();
    }

    /// Recompute `visible_indices` after a selection change.
    fn refilter(&mut self) {
        self.visible_indices = filtered_indices(&self.dataset, &self.selections);
        log::debug!(
            "{} of {} employees visible",
            self.visible_indices.len(),
            self.dataset.len()
        );
    }

    /// Metrics and chart groupings for the visible records.
    pub fn view(&self) -> FilteredView<'_> {
        FilteredView::from_indices(&self.dataset, &self.visible_indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::Metric;
    use crate::data::model::EmployeeRecord;

    fn dataset() -> Arc<Dataset> {
        let rows = [
            ("a", "Sales", "Kim", "CA", 1),
            ("b", "Sales", "Lee", "NY", 0),
            ("c", "Eng", "Kim", "TX", 0),
            ("d", "Eng", "Lee", "ZZ", 1),
        ];
        let records = rows
            .iter()
            .map(|(name, dept, mgr, state, termd)| EmployeeRecord {
                name: name.to_string(),
                department: Some(dept.to_string()),
                manager_name: Some(mgr.to_string()),
                state: Some(state.to_string()),
                termd: Some(*termd),
                ..Default::default()
            })
            .collect();
        Arc::new(Dataset::from_records(records))
    }

    fn visible_names(session: &DashboardSession) -> Vec<String> {
        session.view().records().iter().map(|r| r.name.clone()).collect()
    }

    #[test]
    fn starts_unfiltered() {
        let session = DashboardSession::new(dataset());
        assert_eq!(session.visible_indices(), &[0, 1, 2, 3]);
        assert_eq!(session.view().metrics.turnover_rate, Metric::Value(50.0));
    }

    #[test]
    fn selections_narrow_and_reset() {
        let mut session = DashboardSession::new(dataset());
        session.select(FilterField::Manager, "Kim");
        assert_eq!(visible_names(&session), vec!["a", "c"]);

        session.select(FilterField::Region, "South");
        assert_eq!(visible_names(&session), vec!["c"]);

        session.select(FilterField::Region, "All");
        assert_eq!(visible_names(&session), vec!["a", "c"]);

        session.reset();
        assert_eq!(visible_names(&session).len(), 4);
    }

    #[test]
    fn unknown_choice_is_an_empty_view() {
        let mut session = DashboardSession::new(dataset());
        session.select(FilterField::Department, "Legal");
        let view = session.view();
        assert!(view.is_empty());
        assert_eq!(view.metrics.avg_satisfaction, Metric::NoData);
        assert_eq!(view.metrics.formatted().turnover_rate, "no data");
    }

    #[test]
    fn sessions_are_independent() {
        let ds = dataset();
        let mut first = DashboardSession::new(Arc::clone(&ds));
        let second = DashboardSession::new(Arc::clone(&ds));

        first.select(FilterField::Department, "Eng");
        assert_eq!(visible_names(&first), vec!["c", "d"]);
        assert_eq!(visible_names(&second).len(), 4);
        assert_eq!(ds.len(), 4);
    }

    #[test]
    fn options_come_from_the_dataset() {
        let session = DashboardSession::new(dataset());
        assert_eq!(
            session.filter_options(FilterField::Manager),
            vec!["All", "Kim", "Lee"]
        );
        assert_eq!(
            session.filter_options(FilterField::State),
            vec!["All", "CA", "NY", "TX", "ZZ"]
        );
    }
}
