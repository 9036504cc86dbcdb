use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};

use hr_insight::data::loader::{COL_EMP_ID, COL_PERF_LABEL, REQUIRED_COLUMNS};
use hr_insight::data::region::REGION_TABLE;

/// Deterministic splitmix64 so every run writes the same file.
struct SampleRng(u64);

impl SampleRng {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.unit() * n as f64) as usize
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.below(items.len())]
    }

    fn between(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.unit()
    }
}

const DEPARTMENTS: &[(&str, &[&str], f64)] = &[
    ("Production", &["Production Technician I", "Production Technician II", "Area Sales Manager"], 55_000.0),
    ("IT/IS", &["Database Administrator", "Network Engineer", "Sr. Network Engineer"], 90_000.0),
    ("Software Engineering", &["Software Engineer", "Software Engineering Manager"], 95_000.0),
    ("Sales", &["Sales Manager", "Area Sales Manager"], 65_000.0),
    ("Admin Offices", &["Administrative Assistant", "Accountant I"], 60_000.0),
];
const MANAGERS: &[&str] = &["Brannon Miller", "Kelley Spirea", "Ketsia Liebig", "Simon Roup", "Janet King"];
const RACES: &[&str] = &["White", "Black or African American", "Asian", "Two or more races", "Hispanic"];
const SEXES: &[&str] = &["Male", "Female"];
const SCORES: &[(&str, u8)] = &[("PIP", 1), ("Needs Improvement", 2), ("Fully Meets", 3), ("Exceeds", 4)];
const FIRST: &[&str] = &["Alex", "Jordan", "Sam", "Taylor", "Morgan", "Casey", "Riley", "Jamie"];
const LAST: &[&str] = &["Adinolfi", "Becker", "Chen", "Dolan", "Estrada", "Foss", "Gold", "Huang"];

const EMPLOYEES: u64 = 300;
const OUTPUT: &str = "hr_cleaned.csv";

fn main() -> Result<()> {
    let mut rng = SampleRng(42);
    let as_of = NaiveDate::from_ymd_opt(2019, 12, 31).context("reference date")?;
    let first_hire = NaiveDate::from_ymd_opt(2006, 1, 9).context("reference date")?;
    let span_days = (as_of - first_hire).num_days() as u64;

    let mut writer = csv::Writer::from_path(OUTPUT).with_context(|| format!("creating {OUTPUT}"))?;

    let mut header: Vec<&str> = vec![COL_EMP_ID, COL_PERF_LABEL];
    header.extend_from_slice(REQUIRED_COLUMNS);
    writer.write_record(&header).context("writing header")?;

    for id in 0..EMPLOYEES {
        let (department, positions, base_salary) = DEPARTMENTS[rng.below(DEPARTMENTS.len())];
        let (score_label, score) = SCORES[rng.below(SCORES.len())];
        // A few unmapped codes so some employees have no region.
        let state = if rng.unit() < 0.05 {
            "DC"
        } else {
            REGION_TABLE[rng.below(REGION_TABLE.len())].0
        };

        let hired = first_hire + Days::new(rng.next_u64() % span_days);
        let terminated = (rng.unit() < 0.33).then(|| {
            let remaining = (as_of - hired).num_days().max(1) as u64;
            hired + Days::new(rng.next_u64() % remaining)
        });
        let ended = terminated.unwrap_or(as_of);
        let tenure = (ended - hired).num_days() as f64 / 365.25;
        let born = hired - Days::new(365 * (22 + rng.below(30) as u64));
        let review = ended - Days::new(rng.below(300) as u64);

        let salary = (base_salary * rng.between(0.8, 1.4)).round();
        let satisfaction = (1 + rng.below(5)).to_string();
        let engagement = format!("{:.2}", rng.between(1.5, 5.0));
        let absences = (1 + rng.below(20)).to_string();
        let name = format!("{}, {}", rng.pick(LAST), rng.pick(FIRST));

        let row: Vec<String> = vec![
            (10000 + id).to_string(),
            score_label.to_string(),
            name,
            department.to_string(),
            rng.pick(positions).to_string(),
            rng.pick(MANAGERS).to_string(),
            state.to_string(),
            rng.pick(SEXES).to_string(),
            rng.pick(RACES).to_string(),
            format!("{salary:.0}"),
            format!("{tenure:.2}"),
            score.to_string(),
            satisfaction,
            engagement,
            absences,
            u8::from(terminated.is_some()).to_string(),
            hired.to_string(),
            terminated.map(|d| d.to_string()).unwrap_or_default(),
            born.to_string(),
            review.to_string(),
        ];
        writer.write_record(&row).context("writing row")?;
    }

    writer.flush().context("flushing output")?;
    println!("Wrote {EMPLOYEES} employees to {OUTPUT}");
    Ok(())
}
