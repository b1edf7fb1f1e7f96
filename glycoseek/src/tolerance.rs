//! Validation and textual forms for [`mzpeaks::Tolerance`].
//!
//! A search tolerance must be positive and finite. [`validate`] checks an existing
//! value and [`parse`] reads and checks the `<value><unit>` text used on the command
//! line and in configuration files, e.g. `10ppm` or `0.01da`.
pub use mzpeaks::{Tolerance, ToleranceParsingError};

use thiserror::Error;

#[derive(Debug, PartialEq, Error)]
pub enum ToleranceError {
    #[error("A mass tolerance must be positive and finite, but {0} was given")]
    NotPositive(f64),
    #[error("Failed to parse mass tolerance {0:?}: {1}")]
    Parse(String, #[source] ToleranceParsingError),
}

pub fn validate(tolerance: Tolerance) -> Result<Tolerance, ToleranceError> {
    let value = tolerance.tol();
    if value.is_finite() && value > 0.0 {
        Ok(tolerance)
    } else {
        Err(ToleranceError::NotPositive(value))
    }
}

/// Parse and validate a tolerance, ignoring surrounding whitespace
pub fn parse(text: &str) -> Result<Tolerance, ToleranceError> {
    let text = text.trim();
    let tolerance = text
        .parse::<Tolerance>()
        .map_err(|e| ToleranceError::Parse(text.to_string(), e))?;
    validate(tolerance)
}

/// Serialize a [`Tolerance`] as its text form, for use with `#[serde(with = ...)]`
#[cfg(feature = "serde")]
pub mod text {
    use super::Tolerance;

    pub fn serialize<S: serde::Serializer>(tolerance: &Tolerance, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(tolerance)
    }

    pub fn deserialize<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<Tolerance, D::Error> {
        let text = <String as serde::Deserialize>::deserialize(deserializer)?;
        super::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(parse("10ppm").unwrap(), Tolerance::PPM(10.0));
        assert_eq!(parse("0.01Da").unwrap(), Tolerance::Da(0.01));
        assert_eq!(parse(" 20PPM ").unwrap(), Tolerance::PPM(20.0));
        assert_eq!(parse("1e-3da").unwrap(), Tolerance::Da(0.001));
        assert_eq!(parse(&Tolerance::Da(0.5).to_string()).unwrap(), Tolerance::Da(0.5));
    }

    #[test]
    fn test_invalid() {
        assert_eq!(parse("0ppm"), Err(ToleranceError::NotPositive(0.0)));
        assert!(matches!(parse("-1da"), Err(ToleranceError::NotPositive(_))));
        assert!(matches!(
            parse("10mz"),
            Err(ToleranceError::Parse(_, ToleranceParsingError::UnknownUnit))
        ));
        assert!(matches!(
            parse("x.1da"),
            Err(ToleranceError::Parse(_, ToleranceParsingError::InvalidMagnitude))
        ));
        assert!(validate(Tolerance::Da(f64::NAN)).is_err());
        assert!(validate(Tolerance::PPM(f64::INFINITY)).is_err());
        assert_eq!(validate(Tolerance::PPM(5.0)), Ok(Tolerance::PPM(5.0)));
    }
}
