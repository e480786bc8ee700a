use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Annotation key read from uniform variables when nothing else is configured.
pub const DEFAULT_ANNOTATION: &str = "ui_bind";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Order in which matrix lanes are visited while rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LaneOrder {
    /// `row * columns + column`, rows outer and columns inner.
    #[default]
    RowMajor,
    /// Legacy `column * 4 + row` indexing kept for older presets.
    ColumnMajor,
}

/// Text used for boolean lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BoolStyle {
    /// `1` / `0`.
    #[default]
    Numeric,
    /// Legacy `true` / `false`.
    Words,
}

/// How recorded definitions are addressed at the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeMode {
    /// Definitions are scoped to the effect owning the uniform.
    #[default]
    Effect,
    /// Legacy global definitions keyed by binding name only.
    Global,
}

impl fmt::Display for LaneOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaneOrder::RowMajor => f.write_str("row-major"),
            LaneOrder::ColumnMajor => f.write_str("column-major"),
        }
    }
}

impl fmt::Display for BoolStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoolStyle::Numeric => f.write_str("numeric"),
            BoolStyle::Words => f.write_str("words"),
        }
    }
}

impl fmt::Display for ScopeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeMode::Effect => f.write_str("effect"),
            ScopeMode::Global => f.write_str("global"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BindConfig {
    pub version: u32,
    #[serde(default = "default_annotation")]
    pub annotation: String,
    #[serde(default)]
    pub format: FormatSection,
    #[serde(default)]
    pub flush: FlushSection,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FormatSection {
    #[serde(default, deserialize_with = "deserialize_lane_order_opt")]
    pub lane_order: Option<LaneOrder>,
    #[serde(default, deserialize_with = "deserialize_bool_style_opt")]
    pub bool_style: Option<BoolStyle>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FlushSection {
    #[serde(default, deserialize_with = "deserialize_scope_opt")]
    pub scope: Option<ScopeMode>,
    #[serde(default = "default_skip_without_effects")]
    pub skip_without_effects: bool,
}

impl Default for FlushSection {
    fn default() -> Self {
        Self {
            scope: None,
            skip_without_effects: default_skip_without_effects(),
        }
    }
}

/// Fully resolved settings handed to the binding pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindOptions {
    pub annotation: String,
    pub lane_order: LaneOrder,
    pub bool_style: BoolStyle,
    pub scope: ScopeMode,
    pub skip_without_effects: bool,
}

impl Default for BindOptions {
    fn default() -> Self {
        Self {
            annotation: default_annotation(),
            lane_order: LaneOrder::default(),
            bool_style: BoolStyle::default(),
            scope: ScopeMode::default(),
            skip_without_effects: default_skip_without_effects(),
        }
    }
}

impl BindOptions {
    /// Settings reproducing the first published behaviour: column-major lanes,
    /// `true`/`false` booleans, unscoped keys and no loaded-effects guard.
    pub fn legacy() -> Self {
        Self {
            annotation: default_annotation(),
            lane_order: LaneOrder::ColumnMajor,
            bool_style: BoolStyle::Words,
            scope: ScopeMode::Global,
            skip_without_effects: false,
        }
    }
}

fn default_annotation() -> String {
    DEFAULT_ANNOTATION.to_string()
}

fn default_skip_without_effects() -> bool {
    true
}

fn deserialize_lane_order_opt<'de, D>(deserializer: D) -> Result<Option<LaneOrder>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|value| parse_lane_order(&value).map_err(de::Error::custom))
        .transpose()
}

fn deserialize_bool_style_opt<'de, D>(deserializer: D) -> Result<Option<BoolStyle>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|value| parse_bool_style(&value).map_err(de::Error::custom))
        .transpose()
}

fn deserialize_scope_opt<'de, D>(deserializer: D) -> Result<Option<ScopeMode>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|value| parse_scope(&value).map_err(de::Error::custom))
        .transpose()
}

pub fn parse_lane_order(raw: &str) -> Result<LaneOrder, String> {
    let normalized = raw.trim().to_ascii_lowercase().replace('_', "-");
    match normalized.as_str() {
        "row-major" | "row" | "rows" => Ok(LaneOrder::RowMajor),
        "column-major" | "column" | "col" | "legacy" => Ok(LaneOrder::ColumnMajor),
        other => Err(format!(
            "invalid lane order '{other}'; expected row-major or column-major"
        )),
    }
}

pub fn parse_bool_style(raw: &str) -> Result<BoolStyle, String> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "numeric" | "number" | "int" | "1/0" => Ok(BoolStyle::Numeric),
        "words" | "word" | "true/false" | "legacy" => Ok(BoolStyle::Words),
        other => Err(format!(
            "invalid bool style '{other}'; expected numeric or words"
        )),
    }
}

pub fn parse_scope(raw: &str) -> Result<ScopeMode, String> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "effect" | "scoped" => Ok(ScopeMode::Effect),
        "global" | "unscoped" | "legacy" => Ok(ScopeMode::Global),
        other => Err(format!(
            "invalid scope '{other}'; expected effect or global"
        )),
    }
}

impl BindConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: BindConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        let annotation = self.annotation.trim();
        if annotation.is_empty() {
            return Err(ConfigError::Invalid("annotation may not be empty".into()));
        }

        if annotation.chars().any(char::is_whitespace) {
            return Err(ConfigError::Invalid(format!(
                "annotation '{annotation}' may not contain whitespace"
            )));
        }

        Ok(())
    }

    pub fn options(&self) -> BindOptions {
        BindOptions {
            annotation: self.annotation.trim().to_string(),
            lane_order: self.format.lane_order.unwrap_or_default(),
            bool_style: self.format.bool_style.unwrap_or_default(),
            scope: self.flush.scope.unwrap_or_default(),
            skip_without_effects: self.flush.skip_without_effects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
version = 1
annotation = "ui_bind"

[format]
lane_order = "column_major"
bool_style = "true/false"

[flush]
scope = "global"
skip_without_effects = false
"#;

    #[test]
    fn parses_sample_config() {
        let config = BindConfig::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!(config.version, 1);
        let options = config.options();
        assert_eq!(options.annotation, "ui_bind");
        assert_eq!(options.lane_order, LaneOrder::ColumnMajor);
        assert_eq!(options.bool_style, BoolStyle::Words);
        assert_eq!(options.scope, ScopeMode::Global);
        assert!(!options.skip_without_effects);
        assert_eq!(options, BindOptions::legacy());
    }

    #[test]
    fn missing_sections_resolve_to_defaults() {
        let config = BindConfig::from_toml_str("version = 1\n").unwrap();
        assert_eq!(config.options(), BindOptions::default());
        assert!(config.options().skip_without_effects);
    }

    #[test]
    fn rejects_unknown_version() {
        let err = BindConfig::from_toml_str("version = 2\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_blank_annotation() {
        let err = BindConfig::from_toml_str("version = 1\nannotation = \"  \"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = BindConfig::from_toml_str("version = 1\nannotation = \"ui bind\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_lane_order() {
        let config = r#"
version = 1

[format]
lane_order = "diagonal"
"#;
        let err = BindConfig::from_toml_str(config).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn parses_aliases() {
        assert_eq!(parse_lane_order(" Row ").unwrap(), LaneOrder::RowMajor);
        assert_eq!(parse_lane_order("legacy").unwrap(), LaneOrder::ColumnMajor);
        assert_eq!(parse_bool_style("1/0").unwrap(), BoolStyle::Numeric);
        assert_eq!(parse_scope("unscoped").unwrap(), ScopeMode::Global);
        assert!(parse_scope("").is_err());
    }
}
