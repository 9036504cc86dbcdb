use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::model::{Dataset, EmployeeRecord, FilterField};
use crate::color::{sex_color, Color, ColorMap};

// ---------------------------------------------------------------------------
// Metric – a scalar that may be undefined
// ---------------------------------------------------------------------------

/// A summary statistic. `NoData` is what a mean over nothing produces; it
/// serializes as `null` and displays as "no data", never as NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Metric {
    Value(f64),
    NoData,
}

impl Metric {
    /// Arithmetic mean of the present values.
    pub fn mean(values: impl IntoIterator<Item = f64>) -> Self {
        let (sum, n) = values
            .into_iter()
            .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
        if n == 0 {
            Metric::NoData
        } else {
            Metric::Value(sum / n as f64)
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Metric::Value(v) => Some(*v),
            Metric::NoData => None,
        }
    }

    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self {
            Metric::Value(v) => Metric::Value(f(v)),
            Metric::NoData => Metric::NoData,
        }
    }

    fn render(&self, f: impl FnOnce(f64) -> String) -> String {
        self.value().map(f).unwrap_or_else(|| NO_DATA.to_string())
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Value(v) => write!(f, "{v}"),
            Metric::NoData => f.write_str(NO_DATA),
        }
    }
}

pub const NO_DATA: &str = "no data";

// ---------------------------------------------------------------------------
// Key metrics
// ---------------------------------------------------------------------------

/// The four headline numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KeyMetrics {
    /// Percentage of employees with `Termd == 1`.
    pub turnover_rate: Metric,
    pub avg_salary: Metric,
    pub avg_performance: Metric,
    pub avg_satisfaction: Metric,
}

impl KeyMetrics {
    pub fn compute(records: &[&EmployeeRecord]) -> Self {
        KeyMetrics {
            turnover_rate: Metric::mean(records.iter().filter_map(|r| r.termd.map(f64::from)))
                .map(|rate| rate * 100.0),
            avg_salary: Metric::mean(records.iter().filter_map(|r| r.salary)),
            avg_performance: Metric::mean(records.iter().filter_map(|r| r.performance_score_num)),
            avg_satisfaction: Metric::mean(records.iter().filter_map(|r| r.emp_satisfaction)),
        }
    }

    /// Display strings for the metric cards.
    pub fn formatted(&self) -> FormattedMetrics {
        FormattedMetrics {
            turnover_rate: self.turnover_rate.render(|v| format!("{v:.1}%")),
            avg_salary: self.avg_salary.render(format_currency),
            avg_performance: self.avg_performance.render(|v| format!("{v:.2}")),
            avg_satisfaction: self.avg_satisfaction.render(|v| format!("{v:.2}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedMetrics {
    pub turnover_rate: String,
    pub avg_salary: String,
    pub avg_performance: String,
    pub avg_satisfaction: String,
}

/// Whole dollars with thousands separators: `55000.4` → `"$55,000"`.
pub fn format_currency(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if rounded < 0 { "-" } else { "" };
    format!("{sign}${grouped}")
}

// ---------------------------------------------------------------------------
// Chart groupings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyledCount {
    pub label: String,
    pub count: usize,
    pub color: Color,
}

/// Row category → column category → count.
pub type CrossTab<R, C> = BTreeMap<R, BTreeMap<C, usize>>;

/// Five-number summary plus box-plot whiskers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Smallest value within `q1 - 1.5 * IQR`.
    pub lower_whisker: f64,
    /// Largest value within `q3 + 1.5 * IQR`.
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl Distribution {
    /// `None` when there are no values.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile(&sorted, 0.25);
        let q3 = quantile(&sorted, 0.75);
        let iqr = q3 - q1;
        let (low, high) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        let within = |v: &f64| (low..=high).contains(v);
        let lower_whisker = sorted.iter().copied().find(within).unwrap_or(q1);
        let upper_whisker = sorted.iter().rev().copied().find(within).unwrap_or(q3);

        Some(Distribution {
            count: sorted.len(),
            min: sorted[0],
            q1,
            median: quantile(&sorted, 0.5),
            q3,
            max: sorted[sorted.len() - 1],
            lower_whisker,
            upper_whisker,
            outliers: sorted
                .iter()
                .copied()
                .filter(|v| !within(v))
                .collect(),
        })
    }
}

/// Linear interpolation between closest ranks. `sorted` must be non-empty.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    /// Hover label (employee name).
    pub label: String,
}

/// All points of one department, drawn in one colour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSeries {
    pub group: String,
    pub color: Color,
    pub points: Vec<ScatterPoint>,
}

/// Terminations in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthBucket {
    /// First day of the month.
    pub month: NaiveDate,
    pub count: usize,
}

/// Everything the dashboard charts, computed from one filtered subset.
/// Records whose grouping value is absent are left out of that grouping.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    pub race: Vec<CategoryCount>,
    pub sex: Vec<StyledCount>,
    pub terminations_by_department: CrossTab<String, u8>,
    pub positions: Vec<CategoryCount>,
    pub salary: Option<Distribution>,
    pub tenure_vs_performance: Vec<ScatterSeries>,
    pub engagement_vs_satisfaction: Vec<ScatterSeries>,
    pub absences_by_department: CrossTab<u32, String>,
    pub termination_timeline: Vec<MonthBucket>,
}

impl ChartData {
    /// `dataset` supplies the department palette; `records` is the subset.
    pub fn compute(dataset: &Dataset, records: &[&EmployeeRecord]) -> Self {
        let departments = ColorMap::new(dataset.unique_values(FilterField::Department));

        ChartData {
            race: count_by(records, |r| r.race_desc.as_deref()),
            sex: count_by(records, |r| r.sex.as_deref())
                .into_iter()
                .map(|c| StyledCount {
                    color: sex_color(&c.label),
                    label: c.label,
                    count: c.count,
                })
                .collect(),
            terminations_by_department: cross_tab(records, |r| {
                Some((r.department.clone()?, r.termd?))
            }),
            positions: count_by(records, |r| r.position.as_deref()),
            salary: Distribution::from_values(records.iter().filter_map(|r| r.salary)),
            tenure_vs_performance: scatter_by_department(records, &departments, |r| {
                Some((r.tenure_years?, r.performance_score_num?))
            }),
            engagement_vs_satisfaction: scatter_by_department(records, &departments, |r| {
                Some((r.engagement_survey?, r.emp_satisfaction?))
            }),
            absences_by_department: cross_tab(records, |r| {
                Some((r.absences?, r.department.clone()?))
            }),
            termination_timeline: monthly_counts(
                records.iter().filter_map(|r| r.date_of_termination),
            ),
        }
    }

    /// True when every grouping is empty (i.e. the subset was empty).
    pub fn is_empty(&self) -> bool {
        self.race.is_empty()
            && self.sex.is_empty()
            && self.terminations_by_department.is_empty()
            && self.positions.is_empty()
            && self.salary.is_none()
            && self.tenure_vs_performance.is_empty()
            && self.engagement_vs_satisfaction.is_empty()
            && self.absences_by_department.is_empty()
            && self.termination_timeline.is_empty()
    }
}

fn count_by<'r>(
    records: &[&'r EmployeeRecord],
    key: impl Fn(&'r EmployeeRecord) -> Option<&'r str>,
) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for rec in records {
        if let Some(k) = key(*rec) {
            *counts.entry(k).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|(label, count)| CategoryCount {
            label: label.to_string(),
            count,
        })
        .collect()
}

fn cross_tab<R: Ord, C: Ord>(
    records: &[&EmployeeRecord],
    key: impl Fn(&EmployeeRecord) -> Option<(R, C)>,
) -> CrossTab<R, C> {
    let mut table: CrossTab<R, C> = BTreeMap::new();
    for (row, col) in records.iter().filter_map(|r| key(*r)) {
        *table.entry(row).or_default().entry(col).or_default() += 1;
    }
    table
}

fn scatter_by_department(
    records: &[&EmployeeRecord],
    colors: &ColorMap,
    xy: impl Fn(&EmployeeRecord) -> Option<(f64, f64)>,
) -> Vec<ScatterSeries> {
    let mut groups: BTreeMap<&str, Vec<ScatterPoint>> = BTreeMap::new();
    for rec in records {
        let (Some(dept), Some((x, y))) = (rec.department.as_deref(), xy(*rec)) else {
            continue;
        };
        groups.entry(dept).or_default().push(ScatterPoint {
            x,
            y,
            label: rec.name.clone(),
        });
    }
    groups
        .into_iter()
        .map(|(group, points)| ScatterSeries {
            color: colors.color_for(group),
            group: group.to_string(),
            points,
        })
        .collect()
}

/// Monthly counts from the earliest to the latest date, with empty months in
/// between reported as zero.
fn monthly_counts(dates: impl Iterator<Item = NaiveDate>) -> Vec<MonthBucket> {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for date in dates {
        if let Some(month) = date.with_day(1) {
            *counts.entry(month).or_default() += 1;
        }
    }

    let (Some(&first), Some(&last)) = (counts.keys().next(), counts.keys().next_back()) else {
        return Vec::new();
    };

    let mut buckets = Vec::new();
    let mut month = first;
    while month <= last {
        buckets.push(MonthBucket {
            month,
            count: counts.get(&month).copied().unwrap_or(0),
        });
        let Some(next) = month.checked_add_months(chrono::Months::new(1)) else {
            break;
        };
        month = next;
    }
    buckets
}
