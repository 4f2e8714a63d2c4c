//! Sensor readings and the serial line formats they arrive in.
//!
//! Two line schemes exist in deployed firmware:
//!
//! - **Delimited**: `temperature<delim>humidity`, e.g. `37.42|58.10`
//! - **JSON**: `{"temperature": 37.42, "humidity": 58.1}`

use serde::{Deserialize, Serialize};

use crate::error::ReadingParseError;
use crate::time::Timestamp;

/// Field separator used by the delimited scheme unless configured otherwise.
pub const DEFAULT_DELIMITER: char = '|';

/// One temperature/humidity sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Temperature in °C.
    pub temperature: f64,
    /// Relative humidity in %.
    pub humidity: f64,
    /// When the sample was received.
    pub observed_at: Timestamp,
}

impl SensorReading {
    #[must_use]
    pub const fn new(temperature: f64, humidity: f64, observed_at: Timestamp) -> Self {
        Self {
            temperature,
            humidity,
            observed_at,
        }
    }

    /// Parse one raw serial line.
    ///
    /// Surrounding whitespace (including the trailing `\r\n`) is ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`ReadingParseError`] describing why the line was rejected.
    pub fn parse_line(
        line: &str,
        format: LineFormat,
        observed_at: Timestamp,
    ) -> Result<Self, ReadingParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ReadingParseError::Empty);
        }

        let (temperature, humidity) = match format {
            LineFormat::Delimited(delimiter) => parse_delimited(line, delimiter)?,
            LineFormat::Json => parse_json(line)?,
        };

        Ok(Self::new(
            finite("temperature", temperature)?,
            finite("humidity", humidity)?,
            observed_at,
        ))
    }
}

/// Wire scheme of incoming sensor lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineFormat {
    Delimited(char),
    Json,
}

impl Default for LineFormat {
    fn default() -> Self {
        Self::Delimited(DEFAULT_DELIMITER)
    }
}

fn parse_delimited(line: &str, delimiter: char) -> Result<(f64, f64), ReadingParseError> {
    let fields: Vec<&str> = line.split(delimiter).map(str::trim).collect();
    let [temperature, humidity] = fields.as_slice() else {
        return Err(ReadingParseError::FieldCount {
            actual: fields.len(),
        });
    };
    Ok((
        parse_number("temperature", temperature)?,
        parse_number("humidity", humidity)?,
    ))
}

fn parse_number(field: &'static str, value: &str) -> Result<f64, ReadingParseError> {
    value
        .parse::<f64>()
        .map_err(|_| ReadingParseError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

#[derive(Deserialize)]
struct JsonLine {
    temperature: f64,
    humidity: f64,
}

fn parse_json(line: &str) -> Result<(f64, f64), ReadingParseError> {
    let raw: JsonLine = serde_json::from_str(line).map_err(ReadingParseError::Json)?;
    Ok((raw.temperature, raw.humidity))
}

fn finite(field: &'static str, value: f64) -> Result<f64, ReadingParseError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ReadingParseError::NonFinite { field })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::now;

    fn delimited(line: &str) -> Result<SensorReading, ReadingParseError> {
        SensorReading::parse_line(line, LineFormat::default(), now())
    }

    #[test]
    fn should_parse_delimited_line_exactly() {
        let reading = delimited("37.42|58.1").unwrap();
        assert!((reading.temperature - 37.42).abs() < f64::EPSILON);
        assert!((reading.humidity - 58.1).abs() < f64::EPSILON);
    }

    #[test]
    fn should_keep_parsed_values_bit_for_bit() {
        for (t, h) in [(35.0, 55.0), (-4.25, 0.0), (99.999, 100.0), (0.1, 12.5)] {
            let reading = delimited(&format!("{t}|{h}")).unwrap();
            assert_eq!(reading.temperature.to_bits(), f64::to_bits(t));
            assert_eq!(reading.humidity.to_bits(), f64::to_bits(h));
        }
    }

    #[test]
    fn should_tolerate_crlf_and_padding() {
        let reading = delimited(" 36.5 | 61 \r\n").unwrap();
        assert!((reading.temperature - 36.5).abs() < f64::EPSILON);
        assert!((reading.humidity - 61.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_use_configured_delimiter() {
        let reading =
            SensorReading::parse_line("36.5,61", LineFormat::Delimited(','), now()).unwrap();
        assert!((reading.humidity - 61.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_stamp_reading_with_given_time() {
        let ts = now();
        let reading = SensorReading::parse_line("1|2", LineFormat::default(), ts).unwrap();
        assert_eq!(reading.observed_at, ts);
    }

    #[test]
    fn should_reject_empty_line() {
        assert!(matches!(delimited("  \r\n"), Err(ReadingParseError::Empty)));
    }

    #[test]
    fn should_reject_wrong_field_count() {
        assert!(matches!(
            delimited("37.0"),
            Err(ReadingParseError::FieldCount { actual: 1 })
        ));
        assert!(matches!(
            delimited("37.0|55|1"),
            Err(ReadingParseError::FieldCount { actual: 3 })
        ));
    }

    #[test]
    fn should_reject_non_numeric_field() {
        let err = delimited("warm|55").unwrap_err();
        assert!(matches!(
            err,
            ReadingParseError::InvalidNumber {
                field: "temperature",
                ..
            }
        ));
        let err = delimited("37|").unwrap_err();
        assert!(matches!(
            err,
            ReadingParseError::InvalidNumber {
                field: "humidity",
                ..
            }
        ));
    }

    #[test]
    fn should_reject_non_finite_values() {
        assert!(matches!(
            delimited("NaN|55"),
            Err(ReadingParseError::NonFinite {
                field: "temperature"
            })
        ));
        assert!(matches!(
            delimited("37|inf"),
            Err(ReadingParseError::NonFinite { field: "humidity" })
        ));
    }

    #[test]
    fn should_parse_json_line() {
        let reading = SensorReading::parse_line(
            r#"{"temperature": 37.8, "humidity": 64.2}"#,
            LineFormat::Json,
            now(),
        )
        .unwrap();
        assert!((reading.temperature - 37.8).abs() < f64::EPSILON);
        assert!((reading.humidity - 64.2).abs() < f64::EPSILON);
    }

    #[test]
    fn should_reject_json_missing_key() {
        let err = SensorReading::parse_line(r#"{"temperature": 37.8}"#, LineFormat::Json, now())
            .unwrap_err();
        assert!(matches!(err, ReadingParseError::Json(_)));
    }

    #[test]
    fn should_reject_delimited_line_in_json_mode() {
        let err = SensorReading::parse_line("37.8|64.2", LineFormat::Json, now()).unwrap_err();
        assert!(matches!(err, ReadingParseError::Json(_)));
    }
}
