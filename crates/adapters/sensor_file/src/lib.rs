//! # terrarium-adapter-sensor-file
//!
//! Temperature sensor backed by a file on disk, typically the sysfs node of
//! a DS18B20 1-Wire probe.
//!
//! Two formats are understood:
//!
//! | Source | Content |
//! |--------|---------|
//! | `temperature` node | `21562` |
//! | `w1_slave` node | `... crc=2f YES` then `... t=21562` |
//!
//! Values are in millidegrees by default and rounded to whole degrees.
//!
//! ## Dependency rule
//!
//! Depends on `terrarium-app` (port traits) only.

use std::path::{Path, PathBuf};

use terrarium_app::ports::TemperatureProvider;

/// Failure to obtain a reading.
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error("failed to read sensor file")]
    Io(#[from] std::io::Error),
    #[error("sensor reported a checksum failure")]
    Checksum,
    #[error("unexpected sensor content {0:?}")]
    Parse(String),
}

/// Terrarium temperature read from a file at every call.
#[derive(Debug, Clone)]
pub struct FileTemperatureSensor {
    path: PathBuf,
    millidegrees: bool,
}

impl FileTemperatureSensor {
    /// Sensor reading millidegrees from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            millidegrees: true,
        }
    }

    /// Whether the file holds millidegrees (`true`) or whole degrees.
    #[must_use]
    pub fn with_millidegrees(mut self, millidegrees: bool) -> Self {
        self.millidegrees = millidegrees;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and convert the current value.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError`] when the file cannot be read, the sensor
    /// reports a checksum failure or the content is not an integer.
    pub fn read(&self) -> Result<i32, SensorError> {
        let content = std::fs::read_to_string(&self.path)?;
        let raw = parse_raw(&content)?;
        let degrees = if self.millidegrees {
            round_millidegrees(raw)
        } else {
            raw
        };
        i32::try_from(degrees).map_err(|_| SensorError::Parse(content.trim().to_string()))
    }
}

impl TemperatureProvider for FileTemperatureSensor {
    fn terrarium_temperature(&self) -> Option<i32> {
        match self.read() {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "temperature unavailable");
                None
            }
        }
    }
}

fn parse_raw(content: &str) -> Result<i64, SensorError> {
    let value = if content.contains("crc=") {
        let valid = content
            .lines()
            .next()
            .is_some_and(|line| line.trim_end().ends_with("YES"));
        if !valid {
            return Err(SensorError::Checksum);
        }
        content
            .rsplit_once("t=")
            .map(|(_, value)| value)
            .ok_or_else(|| SensorError::Parse(content.trim().to_string()))?
    } else {
        content
    };
    value
        .trim()
        .parse()
        .map_err(|_| SensorError::Parse(value.trim().to_string()))
}

/// Round half up, like the probe's firmware tools.
fn round_millidegrees(raw: i64) -> i64 {
    raw.saturating_add(500).div_euclid(1000)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sensor_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "terrarium-sensor-{}-{name}",
            std::process::id()
        ));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn should_round_millidegrees() {
        assert_eq!(round_millidegrees(21_499), 21);
        assert_eq!(round_millidegrees(21_500), 22);
        assert_eq!(round_millidegrees(-1_500), -1);
        assert_eq!(round_millidegrees(-1_501), -2);
    }

    #[test]
    fn should_read_plain_temperature_node() {
        let path = sensor_file("plain", "25562\n");
        let sensor = FileTemperatureSensor::new(&path);
        assert_eq!(sensor.read().unwrap(), 26);
        assert_eq!(sensor.terrarium_temperature(), Some(26));
    }

    #[test]
    fn should_read_whole_degrees_when_configured() {
        let path = sensor_file("degrees", "24");
        let sensor = FileTemperatureSensor::new(&path).with_millidegrees(false);
        assert_eq!(sensor.read().unwrap(), 24);
    }

    #[test]
    fn should_read_w1_slave_node() {
        let path = sensor_file(
            "w1",
            "72 01 4b 46 7f ff 0e 10 57 : crc=57 YES\n72 01 4b 46 7f ff 0e 10 57 t=23125\n",
        );
        assert_eq!(FileTemperatureSensor::new(&path).read().unwrap(), 23);
    }

    #[test]
    fn should_reject_checksum_failure() {
        let path = sensor_file(
            "crc",
            "72 01 4b 46 7f ff 0e 10 57 : crc=57 NO\n72 01 4b 46 7f ff 0e 10 57 t=23125\n",
        );
        let result = FileTemperatureSensor::new(&path).read();
        assert!(matches!(result, Err(SensorError::Checksum)));
    }

    #[test]
    fn should_yield_no_reading_on_garbage() {
        let path = sensor_file("garbage", "not a number");
        let sensor = FileTemperatureSensor::new(&path);
        assert!(matches!(sensor.read(), Err(SensorError::Parse(_))));
        assert_eq!(sensor.terrarium_temperature(), None);
    }

    #[test]
    fn should_reject_out_of_range_reading() {
        let path = sensor_file("huge", &format!("{}\n", i64::MAX));
        let sensor = FileTemperatureSensor::new(&path);
        assert!(matches!(sensor.read(), Err(SensorError::Parse(_))));
        assert_eq!(sensor.terrarium_temperature(), None);
    }

    #[test]
    fn should_yield_no_reading_when_file_is_missing() {
        let sensor = FileTemperatureSensor::new("/nonexistent/terrarium/temperature");
        assert!(matches!(sensor.read(), Err(SensorError::Io(_))));
        assert_eq!(sensor.terrarium_temperature(), None);
    }
}
