use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Region – coarse US geography derived from a state code
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Region {
    West,
    Midwest,
    South,
    Northeast,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::West,
        Region::Midwest,
        Region::South,
        Region::Northeast,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::West => "West",
            Region::Midwest => "Midwest",
            Region::South => "South",
            Region::Northeast => "Northeast",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Lookup table
// ---------------------------------------------------------------------------

/// State code → region. Codes missing from this table (DC, AK, HI, typos)
/// have no region.
pub static REGION_TABLE: &[(&str, Region)] = &[
    ("WA", Region::West),
    ("OR", Region::West),
    ("CA", Region::West),
    ("NV", Region::West),
    ("AZ", Region::West),
    ("ID", Region::West),
    ("MT", Region::West),
    ("WY", Region::West),
    ("CO", Region::West),
    ("NM", Region::West),
    ("ND", Region::Midwest),
    ("SD", Region::Midwest),
    ("NE", Region::Midwest),
    ("KS", Region::Midwest),
    ("MN", Region::Midwest),
    ("IA", Region::Midwest),
    ("MO", Region::Midwest),
    ("WI", Region::Midwest),
    ("IL", Region::Midwest),
    ("IN", Region::Midwest),
    ("MI", Region::Midwest),
    ("OH", Region::Midwest),
    ("TX", Region::South),
    ("OK", Region::South),
    ("AR", Region::South),
    ("LA", Region::South),
    ("MS", Region::South),
    ("AL", Region::South),
    ("TN", Region::South),
    ("KY", Region::South),
    ("GA", Region::South),
    ("FL", Region::South),
    ("SC", Region::South),
    ("NC", Region::South),
    ("VA", Region::South),
    ("WV", Region::South),
    ("MD", Region::South),
    ("DE", Region::South),
    ("PA", Region::Northeast),
    ("NJ", Region::Northeast),
    ("NY", Region::Northeast),
    ("CT", Region::Northeast),
    ("RI", Region::Northeast),
    ("MA", Region::Northeast),
    ("VT", Region::Northeast),
    ("NH", Region::Northeast),
    ("ME", Region::Northeast),
];

/// Map a two-letter state code to its region. Matching is exact
/// (case-sensitive, no trimming); anything unknown yields `None`.
pub fn classify(state_code: &str) -> Option<Region> {
    REGION_TABLE
        .iter()
        .find(|(code, _)| *code == state_code)
        .map(|(_, region)| *region)
}
