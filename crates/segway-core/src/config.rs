//! Controller configuration
//!
//! Every tunable of the balance loop lives here: loop period, filter time
//! constants, wheel geometry, control gains, nominal battery voltage and the
//! duty limit. Defaults reproduce the stock tuning of the small EV3-class
//! robot the controller was developed on.

use segway_errors::{SegwayError, ValidationError, ensure_positive, ensure_valid};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Current configuration schema identifier.
pub const SCHEMA_VERSION: &str = "segway.config/1";

const SCHEMA_PREFIX: &str = "segway.config/";

/// Largest accepted differentiator window, in samples.
pub const MAX_DIFFERENTIATOR_WINDOW: usize = 4096;

/// Cutoff of both stock high-pass filters, in Hz.
const DEFAULT_HIGHPASS_CUTOFF_HZ: f64 = 0.02;

/// Complete controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegwayConfig {
    /// Configuration schema version
    pub schema_version: String,
    /// Loop timing
    pub timing: TimingConfig,
    /// Filter parameters
    pub filters: FilterConfig,
    /// Wheel geometry
    pub geometry: GeometryConfig,
    /// Control law gains
    pub gains: GainConfig,
    /// Battery compensation
    pub battery: BatteryConfig,
    /// Actuator limits
    pub actuation: ActuationConfig,
}

/// Loop timing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Control period in seconds
    pub loop_period_s: f64,
}

/// Filter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Time constant of the high-pass on the raw gyro rate, seconds
    pub rate_highpass_tau_s: f64,
    /// Time constant of the high-pass on the integrated angle, seconds
    pub angle_highpass_tau_s: f64,
    /// Samples spanned by the speed differentiator
    pub differentiator_window: usize,
}

/// Wheel geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Wheel diameter in centimetres
    pub wheel_diameter_cm: f64,
}

/// Weights of the six feedback terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GainConfig {
    /// Filtered tilt rate
    pub rate: f64,
    /// Tilt angle
    pub angle: f64,
    /// Integrated tilt angle
    pub angle_sum: f64,
    /// Wheel speed
    pub speed: f64,
    /// Position error against the reference
    pub distance_error: f64,
    /// Integrated position error
    pub distance_error_sum: f64,
}

/// Battery compensation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatteryConfig {
    /// Voltage the gains were tuned at
    pub nominal_voltage: f64,
}

/// Actuator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActuationConfig {
    /// Per-wheel duty clamp (symmetric). `None` passes duty through
    /// unclamped.
    pub duty_limit: Option<f64>,
}

impl Default for SegwayConfig {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            timing: TimingConfig::default(),
            filters: FilterConfig::default(),
            geometry: GeometryConfig::default(),
            gains: GainConfig::default(),
            battery: BatteryConfig::default(),
            actuation: ActuationConfig::default(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            loop_period_s: 0.02,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        let tau = segway_filters::high_pass::time_constant_for_cutoff(DEFAULT_HIGHPASS_CUTOFF_HZ);
        Self {
            rate_highpass_tau_s: tau,
            angle_highpass_tau_s: tau,
            differentiator_window: 15,
        }
    }
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            wheel_diameter_cm: 4.32,
        }
    }
}

impl Default for GainConfig {
    fn default() -> Self {
        Self {
            rate: 1.0,
            angle: 70.0,
            angle_sum: 2.0,
            speed: 6.0,
            distance_error: 16.0,
            distance_error_sum: 5.0,
        }
    }
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            nominal_voltage: 8.0,
        }
    }
}

impl Default for ActuationConfig {
    fn default() -> Self {
        Self {
            duty_limit: Some(100.0),
        }
    }
}

impl GainConfig {
    /// Gains as an array in control-law order.
    pub fn as_array(&self) -> [f64; 6] {
        [
            self.rate,
            self.angle,
            self.angle_sum,
            self.speed,
            self.distance_error,
            self.distance_error_sum,
        ]
    }
}

impl GeometryConfig {
    /// Linear travel per degree of wheel rotation, in centimetres.
    pub fn distance_per_degree(&self) -> f64 {
        PI / 180.0 * self.wheel_diameter_cm / 2.0
    }
}

/// On-disk encoding, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.json`
    Json,
    /// `.yaml` / `.yml`
    Yaml,
}

impl ConfigFormat {
    /// Format for `path`. Anything that is not YAML is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

impl SegwayConfig {
    /// Loop period as a [`Duration`].
    ///
    /// # Errors
    ///
    /// Fails for a non-finite, non-positive or unrepresentable period.
    pub fn loop_period(&self) -> Result<Duration, ValidationError> {
        let period_s = self.timing.loop_period_s;
        ensure_positive!("timing.loop_period_s", period_s);
        Duration::try_from_secs_f64(period_s).map_err(|err| {
            ValidationError::constraint(format!("timing.loop_period_s {period_s}: {err}"))
        })
    }

    /// Reject degenerate configurations.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.schema_version.starts_with(SCHEMA_PREFIX) {
            return Err(ValidationError::SchemaVersion {
                found: self.schema_version.clone(),
                expected: SCHEMA_VERSION.to_string(),
            });
        }

        self.loop_period()?;
        ensure_positive!("filters.rate_highpass_tau_s", self.filters.rate_highpass_tau_s);
        ensure_positive!("filters.angle_highpass_tau_s", self.filters.angle_highpass_tau_s);
        let window = self.filters.differentiator_window;
        ensure_valid!(
            (1..=MAX_DIFFERENTIATOR_WINDOW).contains(&window),
            ValidationError::out_of_range(
                "filters.differentiator_window",
                window,
                1,
                MAX_DIFFERENTIATOR_WINDOW,
            )
        );
        ensure_positive!("geometry.wheel_diameter_cm", self.geometry.wheel_diameter_cm);
        ensure_positive!("battery.nominal_voltage", self.battery.nominal_voltage);

        let gain_names = [
            "gains.rate",
            "gains.angle",
            "gains.angle_sum",
            "gains.speed",
            "gains.distance_error",
            "gains.distance_error_sum",
        ];
        for (name, gain) in gain_names.iter().zip(self.gains.as_array()) {
            ensure_valid!(gain.is_finite(), ValidationError::non_finite(*name, gain));
        }

        if let Some(limit) = self.actuation.duty_limit {
            ensure_positive!("actuation.duty_limit", limit);
        }

        Ok(())
    }

    /// Parse from a string in the given format.
    ///
    /// # Errors
    ///
    /// Returns [`SegwayError::Config`] on malformed input.
    pub fn from_str_with_format(content: &str, format: ConfigFormat) -> Result<Self, SegwayError> {
        match format {
            ConfigFormat::Json => serde_json::from_str(content)
                .map_err(|err| SegwayError::config(format!("invalid JSON config: {err}"))),
            ConfigFormat::Yaml => serde_yaml::from_str(content)
                .map_err(|err| SegwayError::config(format!("invalid YAML config: {err}"))),
        }
    }

    /// Serialize to a pretty-printed string in the given format.
    ///
    /// # Errors
    ///
    /// Returns [`SegwayError::Config`] if serialization fails.
    pub fn to_string_with_format(&self, format: ConfigFormat) -> Result<String, SegwayError> {
        match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self)
                .map_err(|err| SegwayError::config(format!("failed to encode JSON: {err}"))),
            ConfigFormat::Yaml => serde_yaml::to_string(self)
                .map_err(|err| SegwayError::config(format!("failed to encode YAML: {err}"))),
        }
    }

    /// Load and validate a configuration file.
    ///
    /// # Errors
    ///
    /// I/O, parse and validation failures.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, SegwayError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_str_with_format(&content, ConfigFormat::from_path(path))?;
        config.validate()?;
        debug!(path = %path.display(), "loaded controller config");
        Ok(config)
    }

    /// Write the configuration, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// I/O and serialization failures.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), SegwayError> {
        let path = path.as_ref();
        self.save_to_path_with_format(path, ConfigFormat::from_path(path))
    }

    /// Write the configuration in an explicit format, whatever the extension.
    ///
    /// # Errors
    ///
    /// I/O and serialization failures.
    pub fn save_to_path_with_format<P: AsRef<Path>>(
        &self,
        path: P,
        format: ConfigFormat,
    ) -> Result<(), SegwayError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let content = self.to_string_with_format(format)?;
        std::fs::write(path, content)?;
        debug!(path = %path.display(), ?format, "saved controller config");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_is_valid() -> Result<(), ValidationError> {
        SegwayConfig::default().validate()
    }

    #[test]
    fn test_default_tuning() {
        let config = SegwayConfig::default();
        assert_relative_eq!(config.timing.loop_period_s, 0.02);
        assert_eq!(config.filters.differentiator_window, 15);
        assert_relative_eq!(config.filters.rate_highpass_tau_s, 7.957_747, epsilon = 1e-5);
        assert_relative_eq!(config.battery.nominal_voltage, 8.0);
        assert_eq!(
            config.gains.as_array(),
            [1.0, 70.0, 2.0, 6.0, 16.0, 5.0]
        );
    }

    #[test]
    fn test_distance_per_degree() {
        let geometry = GeometryConfig::default();
        // Half a revolution of a 4.32 cm wheel is half its circumference
        assert_relative_eq!(
            geometry.distance_per_degree() * 180.0,
            PI * 4.32 / 2.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_rejects_zero_period() {
        let mut config = SegwayConfig::default();
        config.timing.loop_period_s = 0.0;
        assert_eq!(
            config.validate(),
            Err(ValidationError::not_positive("timing.loop_period_s", 0.0))
        );
    }

    #[test]
    fn test_rejects_non_finite_gain() {
        let mut config = SegwayConfig::default();
        config.gains.speed = f64::INFINITY;
        let err = config.validate().err();
        assert_eq!(err.as_ref().and_then(|e| e.field()), Some("gains.speed"));
    }

    #[test]
    fn test_rejects_nan_tau() {
        let mut config = SegwayConfig::default();
        config.filters.angle_highpass_tau_s = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ValidationError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_rejects_zero_window() {
        let mut config = SegwayConfig::default();
        config.filters.differentiator_window = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_oversized_window() -> Result<(), Box<dyn std::error::Error>> {
        let mut config = SegwayConfig::default();
        config.filters.differentiator_window = 1 << 62;
        let err = config.validate().err().ok_or("huge window accepted")?;
        assert!(matches!(err, ValidationError::OutOfRange { .. }));
        assert_eq!(err.field(), Some("filters.differentiator_window"));

        // Rejected before any filter history is allocated
        let result = crate::BalanceController::new(&config, crate::BatteryCompensation::unity(8.0));
        assert!(result.is_err());

        config.filters.differentiator_window = MAX_DIFFERENTIATOR_WINDOW;
        config.validate()?;
        Ok(())
    }

    #[test]
    fn test_rejects_negative_duty_limit() {
        let mut config = SegwayConfig::default();
        config.actuation.duty_limit = Some(-5.0);
        assert!(config.validate().is_err());

        config.actuation.duty_limit = None;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_foreign_schema() {
        let config = SegwayConfig {
            schema_version: "wheel.config/1".to_string(),
            ..SegwayConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::SchemaVersion { .. })
        ));
    }

    #[test]
    fn test_negative_gains_allowed() {
        let mut config = SegwayConfig::default();
        config.gains.angle = -70.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() -> Result<(), SegwayError> {
        let json = r#"{ "gains": { "angle": 55.0 } }"#;
        let config = SegwayConfig::from_str_with_format(json, ConfigFormat::Json)?;

        assert_relative_eq!(config.gains.angle, 55.0);
        assert_relative_eq!(config.gains.speed, 6.0);
        assert_eq!(config.schema_version, SCHEMA_VERSION);
        Ok(())
    }

    #[test]
    fn test_yaml_parse() -> Result<(), SegwayError> {
        let yaml = "timing:\n  loop_period_s: 0.01\nactuation:\n  duty_limit: null\n";
        let config = SegwayConfig::from_str_with_format(yaml, ConfigFormat::Yaml)?;

        assert_relative_eq!(config.timing.loop_period_s, 0.01);
        assert_eq!(config.actuation.duty_limit, None);
        Ok(())
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let result = SegwayConfig::from_str_with_format("{ not json", ConfigFormat::Json);
        assert!(matches!(result, Err(SegwayError::Config(_))));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.yaml")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.YML")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("config")), ConfigFormat::Json);
    }

    #[test]
    fn test_save_and_load_yaml_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("segway.yaml");
        let mut config = SegwayConfig::default();
        config.gains.distance_error = 12.5;

        config.save_to_path(&path)?;
        let loaded = SegwayConfig::load_from_path(&path)?;

        assert_eq!(loaded, config);
        Ok(())
    }

    #[test]
    fn test_explicit_format_overrides_extension() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("segway.cfg");
        let config = SegwayConfig::default();

        config.save_to_path_with_format(&path, ConfigFormat::Yaml)?;
        let content = std::fs::read_to_string(&path)?;

        assert!(!content.trim_start().starts_with('{'));
        let parsed = SegwayConfig::from_str_with_format(&content, ConfigFormat::Yaml)?;
        assert_eq!(parsed, config);
        Ok(())
    }

    #[test]
    fn test_load_rejects_invalid_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{ "geometry": { "wheel_diameter_cm": -1.0 } }"#)?;

        let result = SegwayConfig::load_from_path(&path);

        assert!(matches!(result, Err(SegwayError::Validation(_))));
        Ok(())
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = SegwayConfig::load_from_path("/nonexistent/segway.json");
        assert!(matches!(result, Err(SegwayError::Io(_))));
    }
}
