use std::path::PathBuf;

use clap::Parser;

use crate::data::model::FilterField;
use crate::error::ConfigError;

/// Environment variable naming the CSV when no path argument is given.
pub const DATA_ENV_VAR: &str = "HR_INSIGHT_DATA";
pub const DEFAULT_SOURCE: &str = "hr_cleaned.csv";

/// Print the HR dashboard view for a set of filter selections as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "hr-insight", version, about)]
pub struct Cli {
    /// Employee CSV to load
    #[arg(env = DATA_ENV_VAR, default_value = DEFAULT_SOURCE)]
    pub source: PathBuf,

    /// Filter selection FIELD=VALUE (department, position, manager, region,
    /// state); repeat for several, applied in order
    #[arg(short, long = "select", value_name = "FIELD=VALUE", value_parser = parse_selector)]
    pub selections: Vec<Selector>,
}

/// One `FIELD=VALUE` pair from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub field: FilterField,
    pub choice: String,
}

fn parse_selector(arg: &str) -> Result<Selector, ConfigError> {
    let (key, choice) = arg
        .split_once('=')
        .ok_or_else(|| ConfigError::MalformedSelection(arg.to_string()))?;
    let field = FilterField::from_key(key.trim())
        .ok_or_else(|| ConfigError::UnknownField(key.to_string()))?;
    Ok(Selector {
        field,
        choice: choice.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn defaults_to_the_cleaned_export() {
        // The env fallback would override the default.
        if std::env::var_os(DATA_ENV_VAR).is_some() {
            return;
        }
        let cli = Cli::try_parse_from(["hr-insight"]).unwrap();
        assert_eq!(cli.source, PathBuf::from(DEFAULT_SOURCE));
        assert!(cli.selections.is_empty());
    }

    #[test]
    fn path_and_selections_in_order() {
        let cli = Cli::try_parse_from([
            "hr-insight",
            "hr.csv",
            "--select",
            "department=Sales",
            "-s",
            "Region=West",
            "--select=manager=Brannon Miller",
        ])
        .unwrap();
        assert_eq!(cli.source, PathBuf::from("hr.csv"));

        let pairs: Vec<_> = cli
            .selections
            .iter()
            .map(|s| (s.field, s.choice.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                (FilterField::Department, "Sales"),
                (FilterField::Region, "West"),
                (FilterField::Manager, "Brannon Miller"),
            ]
        );
    }

    #[test]
    fn rejects_bad_selections() {
        assert_eq!(
            parse_selector("salary=1"),
            Err(ConfigError::UnknownField("salary".into()))
        );
        assert_eq!(
            parse_selector("region"),
            Err(ConfigError::MalformedSelection("region".into()))
        );

        let err = Cli::try_parse_from(["hr-insight", "--select", "salary=1"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn rejects_extra_positionals() {
        let err = Cli::try_parse_from(["hr-insight", "a.csv", "b.csv"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }
}
