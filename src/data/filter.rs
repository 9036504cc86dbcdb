use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::aggregate::{ChartData, KeyMetrics};
use super::model::{Dataset, EmployeeRecord, FilterField};

/// Label of the "no constraint" choice shown first in every filter control.
pub const ALL: &str = "All";

// ---------------------------------------------------------------------------
// Selections
// ---------------------------------------------------------------------------

/// One filter control's choice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    /// Interpret a control's label: [`ALL`] is the sentinel, anything else
    /// is a concrete value.
    pub fn from_choice(choice: &str) -> Self {
        if choice == ALL {
            Selection::All
        } else {
            Selection::Only(choice.to_string())
        }
    }

    /// Absent values never match a concrete selection.
    pub fn matches(&self, value: Option<&str>) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(want) => value == Some(want.as_str()),
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Selection::All => None,
            Selection::Only(v) => Some(v.as_str()),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value().unwrap_or(ALL))
    }
}

/// Per-field selections. Fields without an entry are unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelections {
    selections: BTreeMap<FilterField, Selection>,
}

impl FilterSelections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, field: FilterField, selection: Selection) -> Self {
        self.set(field, selection);
        self
    }

    pub fn set(&mut self, field: FilterField, selection: Selection) {
        match selection {
            Selection::All => {
                self.selections.remove(&field);
            }
            concrete => {
                self.selections.insert(field, concrete);
            }
        }
    }

    pub fn get(&self, field: FilterField) -> &Selection {
        static UNCONSTRAINED: Selection = Selection::All;
        self.selections.get(&field).unwrap_or(&UNCONSTRAINED)
    }

    pub fn is_unconstrained(&self) -> bool {
        self.selections.is_empty()
    }

    /// Whether a record passes every concrete selection.
    pub fn accepts(&self, record: &EmployeeRecord) -> bool {
        self.selections
            .iter()
            .all(|(field, sel)| sel.matches(record.field(*field)))
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Return indices of records that pass all active selections, in row order.
pub fn filtered_indices(dataset: &Dataset, selections: &FilterSelections) -> Vec<usize> {
    if selections.is_unconstrained() {
        return (0..dataset.len()).collect();
    }
    dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, rec)| selections.accepts(rec))
        .map(|(i, _)| i)
        .collect()
}

/// Sorted distinct values for a filter control, prefixed with [`ALL`].
pub fn filter_options(dataset: &Dataset, field: FilterField) -> Vec<String> {
    std::iter::once(ALL.to_string())
        .chain(dataset.unique_values(field).iter().cloned())
        .collect()
}

// ---------------------------------------------------------------------------
// FilteredView
// ---------------------------------------------------------------------------

/// The result of one pipeline run: the matching rows plus everything the
/// dashboard draws from them. Rebuilt from scratch on every selection change.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    records: Vec<&'a EmployeeRecord>,
    pub metrics: KeyMetrics,
    pub charts: ChartData,
}

impl<'a> FilteredView<'a> {
    /// Build a view from pre-computed row indices.
    pub fn from_indices(dataset: &'a Dataset, indices: &[usize]) -> Self {
        let all = dataset.records();
        let records: Vec<&EmployeeRecord> = indices.iter().filter_map(|&i| all.get(i)).collect();
        let metrics = KeyMetrics::compute(&records);
        let charts = ChartData::compute(dataset, &records);
        FilteredView {
            records,
            metrics,
            charts,
        }
    }

    /// Matching rows in their original order.
    pub fn records(&self) -> &[&'a EmployeeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// An empty view is a valid state; metrics read "no data".
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Copy the matching rows into a standalone dataset.
    pub fn to_dataset(&self) -> Dataset {
        Dataset::from_records(self.records.iter().map(|r| (*r).clone()).collect())
    }
}

/// Run the full filter-and-aggregate pipeline.
pub fn apply<'a>(dataset: &'a Dataset, selections: &FilterSelections) -> FilteredView<'a> {
    let indices = filtered_indices(dataset, selections);
    FilteredView::from_indices(dataset, &indices)
}
