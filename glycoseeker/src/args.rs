use std::fmt::Display;

use clap::parser::ValueSource;
use clap::{ArgMatches, ValueEnum};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use glycoseek::ScoringMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArgScoringMode {
    #[default]
    /// Sum matched intensities of the normalized spectrum
    Simple,
    /// Sum squared matched intensities relative to the spectrum's squared intensity
    Weighted,
}

impl From<ArgScoringMode> for ScoringMode {
    fn from(value: ArgScoringMode) -> Self {
        match value {
            ArgScoringMode::Simple => ScoringMode::Simple,
            ArgScoringMode::Weighted => ScoringMode::Weighted,
        }
    }
}

impl Display for ArgScoringMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The report formats, chosen by the output path's extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    CsvGz,
    Json,
}

impl ReportFormat {
    pub fn infer(path: &str) -> Self {
        let lower = path.to_ascii_lowercase();
        if lower.ends_with(".json") {
            Self::Json
        } else if lower.ends_with(".gz") {
            Self::CsvGz
        } else {
            Self::Csv
        }
    }
}

pub(crate) fn non_negative_int(s: &str) -> Result<i64, String> {
    let value = s.parse::<i64>().map_err(|e| e.to_string())?;
    if value < 0 {
        Err(format!("`{s}` is less than zero"))
    } else {
        Ok(value)
    }
}

/// The serialized fields of `args` that were typed on the command line, keyed by
/// field name. These are merged over configuration files and the environment.
pub fn explicit_arguments<T: Serialize>(matches: &ArgMatches, args: &T) -> Map<String, Value> {
    match serde_json::to_value(args) {
        Ok(Value::Object(fields)) => fields
            .into_iter()
            .filter(|(name, _)| {
                matches.ids().any(|id| id.as_str() == name.as_str())
                    && matches.value_source(name) == Some(ValueSource::CommandLine)
            })
            .collect(),
        _ => Map::new(),
    }
}
