use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use super::region::{classify, Region};

// ---------------------------------------------------------------------------
// FilterField – the categorical columns a viewer can narrow by
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum FilterField {
    Department,
    Position,
    Manager,
    Region,
    State,
}

impl FilterField {
    pub const ALL: [FilterField; 5] = [
        FilterField::Department,
        FilterField::Position,
        FilterField::Manager,
        FilterField::Region,
        FilterField::State,
    ];

    /// Lower-case key used on the command line and in JSON output.
    pub fn key(&self) -> &'static str {
        match self {
            FilterField::Department => "department",
            FilterField::Position => "position",
            FilterField::Manager => "manager",
            FilterField::Region => "region",
            FilterField::State => "state",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        FilterField::ALL
            .into_iter()
            .find(|f| f.key().eq_ignore_ascii_case(key))
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FilterField::Department => "Department",
            FilterField::Position => "Position",
            FilterField::Manager => "Manager",
            FilterField::Region => "Region",
            FilterField::State => "State",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// EmployeeRecord – one row of the source CSV
// ---------------------------------------------------------------------------

/// A single employee. Every column except the name may be absent: empty
/// cells and cells that fail to parse both end up as `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeRecord {
    pub name: String,
    pub emp_id: Option<String>,

    pub department: Option<String>,
    pub position: Option<String>,
    pub manager_name: Option<String>,
    pub state: Option<String>,
    pub sex: Option<String>,
    pub race_desc: Option<String>,
    /// Textual performance label ("Exceeds", "Fully Meets", …).
    pub performance_score: Option<String>,

    /// Derived from `state` when the record enters a [`Dataset`].
    pub region: Option<Region>,

    pub salary: Option<f64>,
    pub tenure_years: Option<f64>,
    pub performance_score_num: Option<f64>,
    pub emp_satisfaction: Option<f64>,
    pub engagement_survey: Option<f64>,
    pub absences: Option<u32>,

    /// 1 = terminated, 0 = active.
    pub termd: Option<u8>,

    pub date_of_hire: Option<NaiveDate>,
    pub date_of_termination: Option<NaiveDate>,
    pub dob: Option<NaiveDate>,
    pub last_performance_review: Option<NaiveDate>,
}

impl EmployeeRecord {
    /// The record's value for a filterable field.
    pub fn field(&self, field: FilterField) -> Option<&str> {
        match field {
            FilterField::Department => self.department.as_deref(),
            FilterField::Position => self.position.as_deref(),
            FilterField::Manager => self.manager_name.as_deref(),
            FilterField::Region => self.region.map(|r| r.as_str()),
            FilterField::State => self.state.as_deref(),
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.termd == Some(1)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// Immutable employee table with pre-computed distinct values per filter
/// field. Build one with [`Dataset::from_records`]; there is no way to
/// mutate the rows afterwards.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<EmployeeRecord>,
    unique_values: BTreeMap<FilterField, BTreeSet<String>>,
}

impl Dataset {
    /// Attach regions and build the distinct-value index.
    pub fn from_records(mut records: Vec<EmployeeRecord>) -> Self {
        for rec in &mut records {
            rec.region = rec.state.as_deref().and_then(classify);
        }

        let mut unique_values: BTreeMap<FilterField, BTreeSet<String>> = FilterField::ALL
            .into_iter()
            .map(|f| (f, BTreeSet::new()))
            .collect();

        for rec in &records {
            for field in FilterField::ALL {
                if let Some(val) = rec.field(field) {
                    unique_values
                        .entry(field)
                        .or_default()
                        .insert(val.to_string());
                }
            }
        }

        Dataset {
            records,
            unique_values,
        }
    }

    pub fn records(&self) -> &[EmployeeRecord] {
        &self.records
    }

    /// Sorted distinct non-absent values of `field`.
    pub fn unique_values(&self, field: FilterField) -> &BTreeSet<String> {
        static EMPTY: BTreeSet<String> = BTreeSet::new();
        self.unique_values.get(&field).unwrap_or(&EMPTY)
    }

    /// Number of employees.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(name: &str, dept: &str, state: &str) -> EmployeeRecord {
        EmployeeRecord {
            name: name.into(),
            department: Some(dept.into()),
            state: Some(state.into()),
            ..Default::default()
        }
    }

    #[test]
    fn regions_are_attached_on_build() {
        let ds = Dataset::from_records(vec![
            employee("a", "Sales", "CA"),
            employee("b", "Sales", "ZZ"),
            EmployeeRecord {
                name: "c".into(),
                ..Default::default()
            },
        ]);
        let regions: Vec<_> = ds.records().iter().map(|r| r.region).collect();
        assert_eq!(regions, vec![Some(Region::West), None, None]);
    }

    #[test]
    fn stale_region_is_recomputed() {
        let mut rec = employee("a", "Sales", "TX");
        rec.region = Some(Region::West);
        let ds = Dataset::from_records(vec![rec]);
        assert_eq!(ds.records()[0].region, Some(Region::South));
    }

    #[test]
    fn unique_values_skip_absent_and_sort() {
        let ds = Dataset::from_records(vec![
            employee("a", "Sales", "NY"),
            employee("b", "Admin", "ZZ"),
            employee("c", "Sales", "CA"),
        ]);
        let depts: Vec<_> = ds.unique_values(FilterField::Department).iter().cloned().collect();
        assert_eq!(depts, vec!["Admin", "Sales"]);

        let regions: Vec<_> = ds.unique_values(FilterField::Region).iter().cloned().collect();
        assert_eq!(regions, vec!["Northeast", "West"]);

        assert!(ds.unique_values(FilterField::Manager).is_empty());
    }

    #[test]
    fn filter_field_keys_round_trip() {
        for field in FilterField::ALL {
            assert_eq!(FilterField::from_key(field.key()), Some(field));
        }
        assert_eq!(FilterField::from_key("Department"), Some(FilterField::Department));
        assert_eq!(FilterField::from_key("salary"), None);
    }
}
