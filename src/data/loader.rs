use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};

use super::model::{Dataset, EmployeeRecord};
use crate::error::DataLoadError;

// ---------------------------------------------------------------------------
// Column layout
// ---------------------------------------------------------------------------

pub const COL_NAME: &str = "Employee_Name";
pub const COL_EMP_ID: &str = "EmpID";
pub const COL_DEPARTMENT: &str = "Department";
pub const COL_POSITION: &str = "Position";
pub const COL_MANAGER: &str = "ManagerName";
pub const COL_STATE: &str = "State";
pub const COL_SEX: &str = "Sex";
pub const COL_RACE: &str = "RaceDesc";
pub const COL_PERF_LABEL: &str = "PerformanceScore";
pub const COL_SALARY: &str = "Salary";
pub const COL_TENURE: &str = "Tenure_Years";
pub const COL_PERF_NUM: &str = "PerformanceScore_Num";
pub const COL_SATISFACTION: &str = "EmpSatisfaction";
pub const COL_ENGAGEMENT: &str = "EngagementSurvey";
pub const COL_ABSENCES: &str = "Absences";
pub const COL_TERMD: &str = "Termd";
pub const COL_HIRE_DATE: &str = "DateofHire";
pub const COL_TERM_DATE: &str = "DateofTermination";
pub const COL_DOB: &str = "DOB";
pub const COL_REVIEW_DATE: &str = "LastPerformanceReview_Date";

/// Columns that must be present in the header row.
pub const REQUIRED_COLUMNS: &[&str] = &[
    COL_NAME,
    COL_DEPARTMENT,
    COL_POSITION,
    COL_MANAGER,
    COL_STATE,
    COL_SEX,
    COL_RACE,
    COL_SALARY,
    COL_TENURE,
    COL_PERF_NUM,
    COL_SATISFACTION,
    COL_ENGAGEMENT,
    COL_ABSENCES,
    COL_TERMD,
    COL_HIRE_DATE,
    COL_TERM_DATE,
    COL_DOB,
    COL_REVIEW_DATE,
];

/// Month-first layouts. `%y` comes before `%Y` because `%Y` happily reads
/// "83" as the year 83.
const MONTH_FIRST_FORMATS: &[&str] = &["%m/%d/%y", "%m/%d/%Y"];
/// Year-first layouts, only tried when the value starts with a 4-digit year.
const YEAR_FIRST_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Header name → column position, validated against [`REQUIRED_COLUMNS`].
struct ColumnIndex {
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    fn new(path: &Path, headers: &StringRecord) -> Result<Self, DataLoadError> {
        let positions: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_string(), i))
            .collect();

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|col| !positions.contains_key(**col))
            .map(|col| col.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DataLoadError::MissingColumns {
                path: path.to_path_buf(),
                columns: missing,
            });
        }

        Ok(ColumnIndex { positions })
    }

    fn get(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the employee table from a CSV file.
pub fn load_file(path: &Path) -> Result<Dataset, DataLoadError> {
    let file = File::open(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = load_reader(path, file)?;
    log::info!(
        "Loaded {} employees from {}",
        dataset.len(),
        path.display()
    );
    Ok(dataset)
}

/// Parse CSV from any reader. `origin` is only used in error messages.
pub fn load_reader<R: Read>(origin: &Path, reader: R) -> Result<Dataset, DataLoadError> {
    let csv_err = |source| DataLoadError::Csv {
        path: origin.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers = reader.headers().map_err(csv_err)?.clone();
    let columns = ColumnIndex::new(origin, &headers)?;

    let mut issues: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut records = Vec::new();

    for result in reader.records() {
        let raw = result.map_err(csv_err)?;
        let mut row = Row {
            raw: &raw,
            columns: &columns,
            issues: &mut issues,
        };
        records.push(row.employee());
    }

    for (column, count) in &issues {
        log::warn!("{column}: {count} value(s) could not be parsed and were treated as absent");
    }

    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// Loaded datasets keyed by canonical source path. Owned by whoever drives
/// the dashboard; sessions receive the shared `Arc<Dataset>`.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<PathBuf, Arc<Dataset>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset for `path`, loading it on first access.
    /// Failed loads are not cached.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<Dataset>, DataLoadError> {
        let key = path.canonicalize().map_err(|source| DataLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(ds) = self.entries.get(&key) {
            log::debug!("Dataset cache hit for {}", key.display());
            return Ok(Arc::clone(ds));
        }

        let ds = Arc::new(load_file(&key)?);
        self.entries.insert(key, Arc::clone(&ds));
        Ok(ds)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Row parsing
// ---------------------------------------------------------------------------

struct Row<'a> {
    raw: &'a StringRecord,
    columns: &'a ColumnIndex,
    issues: &'a mut BTreeMap<&'static str, usize>,
}

impl Row<'_> {
    fn employee(&mut self) -> EmployeeRecord {
        EmployeeRecord {
            name: self.text(COL_NAME).unwrap_or_default(),
            emp_id: self.text(COL_EMP_ID),
            department: self.text(COL_DEPARTMENT),
            position: self.text(COL_POSITION),
            manager_name: self.text(COL_MANAGER),
            state: self.text(COL_STATE),
            sex: self.text(COL_SEX),
            race_desc: self.text(COL_RACE),
            performance_score: self.text(COL_PERF_LABEL),
            region: None,
            salary: self.non_negative(COL_SALARY),
            tenure_years: self.non_negative(COL_TENURE),
            performance_score_num: self.number(COL_PERF_NUM),
            emp_satisfaction: self.number(COL_SATISFACTION),
            engagement_survey: self.number(COL_ENGAGEMENT),
            absences: self.count(COL_ABSENCES),
            termd: self.flag(COL_TERMD),
            date_of_hire: self.date(COL_HIRE_DATE),
            date_of_termination: self.date(COL_TERM_DATE),
            dob: self.date(COL_DOB),
            last_performance_review: self.date(COL_REVIEW_DATE),
        }
    }

    fn text(&self, column: &str) -> Option<String> {
        let idx = self.columns.get(column)?;
        match self.raw.get(idx) {
            Some(s) if !s.is_empty() => Some(s.to_string()),
            _ => None,
        }
    }

    /// Parse a non-empty cell, recording a failure against `column`.
    fn parsed<T>(&mut self, column: &'static str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
        let s = self.text(column)?;
        let value = parse(&s);
        if value.is_none() {
            *self.issues.entry(column).or_default() += 1;
        }
        value
    }

    fn number(&mut self, column: &'static str) -> Option<f64> {
        self.parsed(column, |s| s.parse::<f64>().ok().filter(|v| v.is_finite()))
    }

    fn non_negative(&mut self, column: &'static str) -> Option<f64> {
        self.parsed(column, |s| {
            s.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0)
        })
    }

    /// Whole, non-negative counts. Accepts "3" and "3.0".
    fn count(&mut self, column: &'static str) -> Option<u32> {
        self.parsed(column, |s| {
            s.parse::<f64>()
                .ok()
                .filter(|v| *v >= 0.0 && v.fract() == 0.0 && *v <= u32::MAX as f64)
                .map(|v| v as u32)
        })
    }

    fn flag(&mut self, column: &'static str) -> Option<u8> {
        self.parsed(column, |s| match s.parse::<f64>().ok()? {
            v if v == 0.0 => Some(0),
            v if v == 1.0 => Some(1),
            _ => None,
        })
    }

    fn date(&mut self, column: &'static str) -> Option<NaiveDate> {
        self.parsed(column, parse_date)
    }
}

/// Parse a calendar date in any of the accepted layouts.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let date = |formats: &[&str]| {
        formats
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    };

    if let Some(d) = date(MONTH_FIRST_FORMATS) {
        return Some(d);
    }
    if !starts_with_full_year(s) {
        return None;
    }
    date(YEAR_FIRST_FORMATS).or_else(|| {
        DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .map(|dt| dt.date())
    })
}

/// `%Y` accepts one or two digits, so "12/10/15" would otherwise become the
/// year 12.
fn starts_with_full_year(s: &str) -> bool {
    let year = s.split(['-', '/']).next().unwrap_or_default();
    year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::region::Region;

    const HEADER: &str = "Employee_Name,EmpID,Department,Position,ManagerName,State,Sex,RaceDesc,\
PerformanceScore,Salary,Tenure_Years,PerformanceScore_Num,EmpSatisfaction,EngagementSurvey,\
Absences,Termd,DateofHire,DateofTermination,DOB,LastPerformanceReview_Date";

    fn load_str(csv: &str) -> Result<Dataset, DataLoadError> {
        load_reader(Path::new("inline.csv"), csv.as_bytes())
    }

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn parses_a_complete_row() {
        let csv = format!(
            "{HEADER}\n\
             \"Adinolfi, Wilson\",10026,Production,Technician I,Michael Albert,MA,Male,White,\
             Exceeds,62506,10.5,4,5,4.6,1,0,2011-07-05,,1983-07-10,2019-01-17\n"
        );
        let ds = load_str(&csv).unwrap();
        assert_eq!(ds.len(), 1);

        let rec = &ds.records()[0];
        assert_eq!(rec.name, "Adinolfi, Wilson");
        assert_eq!(rec.emp_id.as_deref(), Some("10026"));
        assert_eq!(rec.department.as_deref(), Some("Production"));
        assert_eq!(rec.region, Some(Region::Northeast));
        assert_eq!(rec.salary, Some(62506.0));
        assert_eq!(rec.tenure_years, Some(10.5));
        assert_eq!(rec.performance_score_num, Some(4.0));
        assert_eq!(rec.engagement_survey, Some(4.6));
        assert_eq!(rec.absences, Some(1));
        assert_eq!(rec.termd, Some(0));
        assert_eq!(rec.date_of_hire, date(2011, 7, 5));
        assert_eq!(rec.date_of_termination, None);
        assert_eq!(rec.dob, date(1983, 7, 10));
        assert_eq!(rec.last_performance_review, date(2019, 1, 17));
    }

    #[test]
    fn bad_cells_become_absent() {
        let csv = format!(
            "{HEADER}\n\
             Doe,1,Sales,Rep,Boss,ZZ,Female,Asian,,n/a,-3,x,5,4,2.5,7,not a date,13/45/2020,,\n"
        );
        let ds = load_str(&csv).unwrap();
        let rec = &ds.records()[0];
        assert_eq!(rec.region, None);
        assert_eq!(rec.performance_score, None);
        assert_eq!(rec.salary, None);
        assert_eq!(rec.tenure_years, None);
        assert_eq!(rec.performance_score_num, None);
        assert_eq!(rec.absences, None);
        assert_eq!(rec.termd, None);
        assert_eq!(rec.date_of_hire, None);
        assert_eq!(rec.date_of_termination, None);
        assert_eq!(rec.dob, None);
    }

    #[test]
    fn optional_columns_may_be_missing() {
        let header: Vec<&str> = REQUIRED_COLUMNS.to_vec();
        let row = vec![
            "Roe", "IT", "DBA", "Jo", "TX", "Male", "Black", "90000", "3", "3", "4", "4.1", "0",
            "1", "2015-01-05", "2018-02-01", "1980-01-01", "2017-12-01",
        ];
        let csv = format!("{}\n{}\n", header.join(","), row.join(","));
        let ds = load_str(&csv).unwrap();
        let rec = &ds.records()[0];
        assert_eq!(rec.emp_id, None);
        assert_eq!(rec.performance_score, None);
        assert!(rec.is_terminated());
        assert_eq!(rec.date_of_termination, date(2018, 2, 1));
    }

    #[test]
    fn reports_every_missing_column() {
        let err = load_str("Employee_Name,Department\nA,Sales\n").unwrap_err();
        match err {
            DataLoadError::MissingColumns { columns, .. } => {
                assert!(columns.contains(&"Salary".to_string()));
                assert!(columns.contains(&"DOB".to_string()));
                assert!(!columns.contains(&"Department".to_string()));
                assert_eq!(columns.len(), REQUIRED_COLUMNS.len() - 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_input_is_missing_columns() {
        assert!(matches!(
            load_str(""),
            Err(DataLoadError::MissingColumns { .. })
        ));
    }

    #[test]
    fn ragged_rows_are_fatal() {
        let csv = format!("{HEADER}\nonly,three,cells\n");
        assert!(matches!(load_str(&csv), Err(DataLoadError::Csv { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_file(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, DataLoadError::Io { .. }));
    }

    #[test]
    fn date_layouts() {
        assert_eq!(parse_date("2011-07-05"), date(2011, 7, 5));
        assert_eq!(parse_date("2011/07/05"), date(2011, 7, 5));
        assert_eq!(parse_date("7/5/2011"), date(2011, 7, 5));
        assert_eq!(parse_date("07/10/83"), date(1983, 7, 10));
        assert_eq!(parse_date("7/5/11"), date(2011, 7, 5));
        assert_eq!(parse_date("12/10/15"), date(2015, 12, 10));
        assert_eq!(parse_date("12-10-15"), None);
        assert_eq!(parse_date("2016-04-20T08:30:00"), date(2016, 4, 20));
        assert_eq!(parse_date("2016-04-20 00:00:00"), date(2016, 4, 20));
        assert_eq!(parse_date("2016-02-30"), None);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn short_year_terminations_stay_in_range() {
        let csv = format!(
            "{HEADER}\n\
             A,1,Sales,Rep,Kim,CA,Male,White,,1,1,3,3,3,0,1,1/4/10,12/10/15,,\n\
             B,2,Sales,Rep,Kim,CA,Male,White,,1,1,3,3,3,0,1,1/4/10,2016-04-15,,\n"
        );
        let ds = load_str(&csv).unwrap();
        assert_eq!(ds.records()[0].date_of_hire, date(2010, 1, 4));
        assert_eq!(ds.records()[0].date_of_termination, date(2015, 12, 10));

        let view = crate::data::filter::apply(&ds, &Default::default());
        assert_eq!(view.charts.termination_timeline.len(), 5);
    }
}
