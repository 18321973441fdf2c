//! Configuration system.
//!
//! YAML configuration with precedence: CLI > ENV > file > defaults. The binary
//! loads the file (or defaults), applies environment overrides, then its own
//! flags, and finally converts the result into a [`RenderConfig`].

use crate::axis::LabelFormat;
use crate::bounds::BoundsPolicy;
use crate::error::{Error, Result};
use crate::geometry::{Sample, Surface};
use crate::overlay::{AxisStyle, HeatmapSettings, HeatmapStyle, RenderConfig};
use crate::plots::{BinnedConfig, SplatConfig};
use crate::session::FetchFailurePolicy;
use crate::source::Mode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Overrides the sample endpoint.
pub const ENV_ENDPOINT: &str = "HEATMAP_ENDPOINT";
/// Overrides the data-source mode.
pub const ENV_MODE: &str = "HEATMAP_MODE";

/// Where samples come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Endpoint URL, queried as `GET {endpoint}?mode=<mode>`.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Data-source selector.
    #[serde(default)]
    pub mode: Mode,
    /// Behaviour when the fetch fails.
    #[serde(default)]
    pub on_fetch_failure: FetchFailurePolicy,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_endpoint() -> String {
    "http://localhost:5000/api/heatmap".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            mode: Mode::default(),
            on_fetch_failure: FetchFailurePolicy::default(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl SourceConfig {
    /// Request timeout as a Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Axis ticks and look.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxesConfig {
    /// Tick intervals per axis.
    #[serde(default = "default_divisions")]
    pub divisions: usize,
    /// Tick label formatting.
    #[serde(default)]
    pub label_format: LabelFormat,
    /// Lines, fonts and titles.
    #[serde(default)]
    pub style: AxisStyle,
}

fn default_divisions() -> usize {
    5
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self {
            divisions: default_divisions(),
            label_format: LabelFormat::default(),
            style: AxisStyle::default(),
        }
    }
}

/// Heat layer selection and tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatmapConfig {
    /// Active layer.
    #[serde(default)]
    pub style: HeatmapStyle,
    /// Sample value rendered as full heat.
    #[serde(default = "default_max_intensity")]
    pub max_intensity: f64,
    /// Splat layer settings.
    #[serde(default)]
    pub splat: SplatConfig,
    /// Binned layer settings.
    #[serde(default)]
    pub binned: BinnedConfig,
}

fn default_max_intensity() -> f64 {
    10.0
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            style: HeatmapStyle::default(),
            max_intensity: default_max_intensity(),
            splat: SplatConfig::default(),
            binned: BinnedConfig::default(),
        }
    }
}

impl HeatmapConfig {
    /// Layer settings for [`crate::overlay::Overlay::render_frame`].
    #[must_use]
    pub const fn settings(&self) -> HeatmapSettings {
        HeatmapSettings {
            style: self.style,
            splat: self.splat,
            binned: self.binned,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Sample source.
    #[serde(default)]
    pub source: SourceConfig,
    /// Drawing surface.
    #[serde(default)]
    pub surface: Surface,
    /// Bounds policy.
    #[serde(default)]
    pub bounds: BoundsPolicy,
    /// Axes.
    #[serde(default)]
    pub axes: AxesConfig,
    /// Heat layer.
    #[serde(default)]
    pub heatmap: HeatmapConfig,
    /// Rendered when the source returns nothing.
    #[serde(default = "default_fallback")]
    pub fallback: Vec<Sample>,
}

fn default_fallback() -> Vec<Sample> {
    RenderConfig::default().fallback
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            surface: Surface::default(),
            bounds: BoundsPolicy::default(),
            axes: AxesConfig::default(),
            heatmap: HeatmapConfig::default(),
            fallback: default_fallback(),
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `<config dir>/heatmap-overlay/config.yaml`, if the platform has one.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("heatmap-overlay").join("config.yaml"))
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigParse`] with the failing line.
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| {
            let line = e.location().map(|l| l.line()).unwrap_or(0);
            Error::ConfigParse {
                line,
                message: e.to_string(),
            }
        })
    }

    /// Loads configuration with fallback to defaults.
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Apply `HEATMAP_ENDPOINT` / `HEATMAP_MODE` from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply environment overrides read through `lookup`. Empty values are
    /// ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |key: &str| lookup(key).filter(|v| !v.is_empty());
        if let Some(endpoint) = set(ENV_ENDPOINT) {
            self.source.endpoint = endpoint;
        }
        if let Some(mode) = set(ENV_MODE) {
            self.source.mode = Mode::new(mode);
        }
    }

    /// Render settings derived from this configuration.
    #[must_use]
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            surface: self.surface,
            bounds: self.bounds,
            divisions: self.axes.divisions,
            label_format: self.axes.label_format,
            axis_style: self.axes.style,
            max_intensity: self.heatmap.max_intensity,
            fallback: self.fallback.clone(),
        }
    }

    /// Check every section.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<()> {
        self.render_config().validate()?;
        self.heatmap.splat.validate()?;
        self.heatmap.binned.validate()?;
        if self.source.endpoint.is_empty() {
            return Err(Error::InvalidConfig("source endpoint is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = Config::new();

        assert_eq!(config.source.mode.as_str(), "ble");
        assert_eq!(config.source.on_fetch_failure, FetchFailurePolicy::Skip);
        assert_eq!(config.axes.divisions, 5);
        assert_eq!(config.heatmap.max_intensity, 10.0);
        assert_eq!(config.heatmap.splat.radius, 35);
        assert_eq!(config.fallback.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_renders_empty_fetch() {
        use crate::overlay::Overlay;

        let config = Config::new();
        let frame = Overlay::new()
            .render_frame(&[], &config.render_config(), &config.heatmap.settings())
            .unwrap();
        let report = frame.report();
        assert!(report.used_fallback);
        assert_eq!(report.bounds.range(crate::geometry::Axis::Y), (0.0, 4.0));
    }

    #[test]
    fn test_config_parse_minimal() {
        let config = Config::parse("surface: {width: 400, height: 300, padding: 30}").unwrap();

        assert_eq!(config.surface, Surface::new(400, 300, 30).unwrap());
        assert_eq!(config.source, SourceConfig::default());
    }

    #[test]
    fn test_config_parse_full() {
        let yaml = r#"
source:
  endpoint: http://10.0.0.2/api/heatmap
  mode: wifi
  on_fetch_failure: fallback
surface:
  width: 1000
  height: 700
  padding: 50
bounds:
  pin:
    min_x: 90
  min_span:
    y: [0, 4]
  enlarge: 1.1
axes:
  divisions: 4
  label_format: rounded
  style:
    line_width: 2
    titles: false
heatmap:
  style: binned
  max_intensity: 5
  binned:
    cols: 100
    sigma: 1.5
fallback:
  - {x: 0.1, y: 2, value: 1}
  - {x: 1, y: 2}
  - {x: 3, y: 7}
"#;

        let config = Config::parse(yaml).unwrap();

        assert_eq!(config.source.endpoint, "http://10.0.0.2/api/heatmap");
        assert_eq!(config.source.mode, Mode::from("wifi"));
        assert_eq!(config.source.on_fetch_failure, FetchFailurePolicy::Fallback);
        assert_eq!(config.bounds.pin.min_x, Some(90.0));
        assert_eq!(config.bounds.min_span.y, Some((0.0, 4.0)));
        assert_eq!(config.bounds.enlarge, 1.1);
        assert_eq!(config.axes.divisions, 4);
        assert!(!config.axes.style.titles);
        assert_eq!(config.axes.style.font_size, 16.0);
        assert_eq!(config.heatmap.style, HeatmapStyle::Binned);
        assert_eq!(config.heatmap.binned.cols, 100);
        assert_eq!(config.heatmap.binned.rows, 150);
        assert_eq!(config.fallback.len(), 3);
        assert!(config.validate().is_ok());

        let render = config.render_config();
        assert_eq!(render.max_intensity, 5.0);
        assert_eq!(render.surface.width, 1000);
    }

    #[test]
    fn test_config_parse_error_includes_line() {
        let yaml = r#"
source:
  mode: ble
surface:
  width: wide
"#;

        let err = Config::parse(yaml).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { line: 5, .. }), "{err}");
    }

    #[test]
    fn test_config_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "heatmap:\n  style: binned").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.heatmap.settings().style, HeatmapStyle::Binned);
    }

    #[test]
    fn test_config_load_or_default() {
        let config = Config::load_or_default("/nonexistent/path/config.yaml");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config::parse("source: {endpoint: http://file/api, mode: ble}").unwrap();
        let env: HashMap<&str, &str> =
            [(ENV_ENDPOINT, "http://env/api"), (ENV_MODE, "")].into_iter().collect();
        config.apply_env_from(|k| env.get(k).map(|v| (*v).to_string()));

        assert_eq!(config.source.endpoint, "http://env/api");
        assert_eq!(config.source.mode.as_str(), "ble");
    }

    #[test]
    fn test_validate_rejects_bad_sections() {
        let mut config = Config::new();
        config.axes.divisions = 0;
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.heatmap.splat.blur = 2.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_path_file_name() {
        if let Some(path) = Config::default_path() {
            assert!(path.ends_with("heatmap-overlay/config.yaml"));
        }
    }
}
