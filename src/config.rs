//! Viewer configuration.
//!
//! [`SequenceConfig`] is the validated, typed form used by the component.
//! [`RawConfig`] is what a TOML file deserializes into: colors are plain
//! strings there and only become [`Color`]s once validated.
//!
//! ```toml
//! format = "pride"
//! selection_color = "yellow"
//! highlight_font_color = "#FFA010"
//!
//! [columns]
//! size = 50
//! spaced_each = 10
//!
//! [[highlights]]
//! start = 30
//! end = 42
//! foreground = "white"
//! background = "green"
//! ```

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use ratatui::style::Color;
use serde::Deserialize;

use crate::annotation::{Annotation, AnnotationRegion};
use crate::error::ConfigError;
use crate::model::{Palette, ResidueStyle, SeqRange};

/// Text layout used to draw the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequenceFormat {
    #[default]
    Fasta,
    Codata,
    Raw,
    Pride,
}

impl SequenceFormat {
    pub const ALL: [SequenceFormat; 4] = [
        SequenceFormat::Fasta,
        SequenceFormat::Codata,
        SequenceFormat::Raw,
        SequenceFormat::Pride,
    ];

    /// Parses a format name, falling back to PRIDE for anything unknown.
    pub fn parse_lenient(name: &str) -> Self {
        name.parse().unwrap_or(SequenceFormat::Pride)
    }
}

impl FromStr for SequenceFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FASTA" => Ok(SequenceFormat::Fasta),
            "CODATA" => Ok(SequenceFormat::Codata),
            "RAW" => Ok(SequenceFormat::Raw),
            "PRIDE" => Ok(SequenceFormat::Pride),
            _ => Err(ConfigError::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for SequenceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceFormat::Fasta => write!(f, "FASTA"),
            SequenceFormat::Codata => write!(f, "CODATA"),
            SequenceFormat::Raw => write!(f, "RAW"),
            SequenceFormat::Pride => write!(f, "PRIDE"),
        }
    }
}

/// Row geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Columns {
    /// Residues per row
    pub size: usize,
    /// Insert a blank after every `spaced_each` residues (0 disables)
    pub spaced_each: usize,
}

impl Columns {
    /// Largest accepted row width.
    pub const MAX_SIZE: usize = 10_000;

    /// Checks that the row width lies within `1..=MAX_SIZE`.
    pub fn validate(&self, option: &'static str) -> Result<(), ConfigError> {
        if self.size == 0 {
            return Err(ConfigError::ZeroColumns(option));
        }
        if self.size > Self::MAX_SIZE {
            return Err(ConfigError::TooManyColumns {
                option,
                value: self.size,
                max: Self::MAX_SIZE,
            });
        }
        Ok(())
    }
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            size: 35,
            spaced_each: 10,
        }
    }
}

/// A highlight requested at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSpec {
    pub start: usize,
    pub end: usize,
    pub foreground: Option<Color>,
    pub background: Option<Color>,
}

impl FromStr for HighlightSpec {
    type Err = ConfigError;

    /// Parses `START:END[:FG[:BG]]`, as given on the command line.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidHighlight(s.to_string());
        let mut parts = s.split(':');
        let start = parts
            .next()
            .and_then(|p| p.trim().parse().ok())
            .ok_or_else(invalid)?;
        let end = parts
            .next()
            .and_then(|p| p.trim().parse().ok())
            .ok_or_else(invalid)?;
        let foreground = parts
            .next()
            .map(|c| parse_color("highlight foreground", c))
            .transpose()?;
        let background = parts
            .next()
            .map(|c| parse_color("highlight background", c))
            .transpose()?;
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self {
            start,
            end,
            foreground,
            background,
        })
    }
}

/// Validated viewer options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceConfig {
    pub format: SequenceFormat,
    pub columns: Columns,
    /// Selection applied when the viewer is created
    pub selection: Option<SeqRange>,
    pub highlights: Vec<HighlightSpec>,
    pub annotations: Vec<Annotation>,
    pub selection_color: Color,
    pub selection_font_color: Color,
    pub highlight_font_color: Color,
    pub highlight_background_color: Color,
    pub font_color: Color,
    pub background_color: Color,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            format: SequenceFormat::Fasta,
            columns: Columns::default(),
            selection: None,
            highlights: Vec::new(),
            annotations: Vec::new(),
            selection_color: Color::Yellow,
            selection_font_color: Color::Black,
            highlight_font_color: Color::Red,
            highlight_background_color: Color::White,
            font_color: Color::Black,
            background_color: Color::White,
        }
    }
}

impl SequenceConfig {
    /// Loads and validates a TOML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;
        raw.try_into()
    }

    /// Checks the invariants that cannot be expressed in the types.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.columns.validate("columns.size")
    }

    pub fn palette(&self) -> Palette {
        Palette {
            base: self.base_style(),
            highlight: self.highlight_style(),
            selection: self.selection_style(),
        }
    }

    /// Style of a residue with no highlight and no selection.
    pub fn base_style(&self) -> ResidueStyle {
        ResidueStyle::new(self.font_color, self.background_color)
    }

    pub fn selection_style(&self) -> ResidueStyle {
        ResidueStyle::new(self.selection_font_color, self.selection_color)
    }

    /// Colors used by a highlight that does not name its own.
    pub fn highlight_style(&self) -> ResidueStyle {
        ResidueStyle::new(self.highlight_font_color, self.highlight_background_color)
    }
}

/// Parses a color name (`red`, `LightBlue`), hex code (`#FFA010`) or palette index.
pub fn parse_color(option: &'static str, value: &str) -> Result<Color, ConfigError> {
    Color::from_str(value.trim()).map_err(|_| ConfigError::InvalidColor {
        option,
        value: value.to_string(),
    })
}

/// Configuration as written in a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub format: Option<String>,
    pub columns: Columns,
    pub selection: Option<RawRange>,
    pub highlights: Vec<RawHighlight>,
    pub annotations: Vec<RawAnnotation>,
    pub selection_color: Option<String>,
    pub selection_font_color: Option<String>,
    pub highlight_font_color: Option<String>,
    pub highlight_background_color: Option<String>,
    pub font_color: Option<String>,
    pub background_color: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RawRange {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawHighlight {
    pub start: usize,
    pub end: usize,
    pub foreground: Option<String>,
    pub background: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawAnnotation {
    pub name: String,
    pub color: String,
    pub description: Option<String>,
    #[serde(default)]
    pub regions: Vec<RawRegion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRegion {
    pub start: usize,
    pub end: usize,
    pub color: Option<String>,
}

fn color_or(option: &'static str, value: Option<&str>, default: Color) -> Result<Color, ConfigError> {
    value.map_or(Ok(default), |v| parse_color(option, v))
}

impl TryFrom<RawConfig> for SequenceConfig {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let defaults = SequenceConfig::default();

        let format = raw
            .format
            .as_deref()
            .map(str::parse::<SequenceFormat>)
            .transpose()?
            .unwrap_or(defaults.format);

        let highlights = raw
            .highlights
            .iter()
            .map(|h| {
                Ok(HighlightSpec {
                    start: h.start,
                    end: h.end,
                    foreground: h
                        .foreground
                        .as_deref()
                        .map(|c| parse_color("highlights.foreground", c))
                        .transpose()?,
                    background: h
                        .background
                        .as_deref()
                        .map(|c| parse_color("highlights.background", c))
                        .transpose()?,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let annotations = raw
            .annotations
            .iter()
            .map(|a| {
                let regions = a
                    .regions
                    .iter()
                    .map(|r| {
                        Ok(AnnotationRegion {
                            range: SeqRange::new(r.start, r.end),
                            color: r
                                .color
                                .as_deref()
                                .map(|c| parse_color("annotations.regions.color", c))
                                .transpose()?,
                        })
                    })
                    .collect::<Result<Vec<_>, ConfigError>>()?;
                Ok(Annotation {
                    name: a.name.clone(),
                    color: parse_color("annotations.color", &a.color)?,
                    description: a.description.clone(),
                    regions,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let config = SequenceConfig {
            format,
            columns: raw.columns,
            selection: raw.selection.map(|r| SeqRange::new(r.start, r.end)),
            highlights,
            annotations,
            selection_color: color_or(
                "selection_color",
                raw.selection_color.as_deref(),
                defaults.selection_color,
            )?,
            selection_font_color: color_or(
                "selection_font_color",
                raw.selection_font_color.as_deref(),
                defaults.selection_font_color,
            )?,
            highlight_font_color: color_or(
                "highlight_font_color",
                raw.highlight_font_color.as_deref(),
                defaults.highlight_font_color,
            )?,
            highlight_background_color: color_or(
                "highlight_background_color",
                raw.highlight_background_color.as_deref(),
                defaults.highlight_background_color,
            )?,
            font_color: color_or("font_color", raw.font_color.as_deref(), defaults.font_color)?,
            background_color: color_or(
                "background_color",
                raw.background_color.as_deref(),
                defaults.background_color,
            )?,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = SequenceConfig::default();
        assert_eq!(config.format, SequenceFormat::Fasta);
        assert_eq!(config.columns, Columns { size: 35, spaced_each: 10 });
        assert_eq!(config.selection_style(), ResidueStyle::new(Color::Black, Color::Yellow));
        assert_eq!(config.highlight_style(), ResidueStyle::new(Color::Red, Color::White));
        assert_eq!(config.base_style(), ResidueStyle::new(Color::Black, Color::White));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("fasta".parse::<SequenceFormat>().unwrap(), SequenceFormat::Fasta);
        assert_eq!("CoData".parse::<SequenceFormat>().unwrap(), SequenceFormat::Codata);
        assert!("genbank".parse::<SequenceFormat>().is_err());
        assert_eq!(SequenceFormat::parse_lenient("genbank"), SequenceFormat::Pride);
        assert_eq!(SequenceFormat::parse_lenient("raw"), SequenceFormat::Raw);
    }

    #[test]
    fn test_highlight_spec_parsing() {
        let spec: HighlightSpec = "10:20:white:green".parse().unwrap();
        assert_eq!(spec.start, 10);
        assert_eq!(spec.end, 20);
        assert_eq!(spec.foreground, Some(Color::White));
        assert_eq!(spec.background, Some(Color::Green));

        let spec: HighlightSpec = "3:4".parse().unwrap();
        assert_eq!(spec.foreground, None);

        assert!("3".parse::<HighlightSpec>().is_err());
        assert!("a:4".parse::<HighlightSpec>().is_err());
        assert!("3:4:nocolor".parse::<HighlightSpec>().is_err());
        assert!("3:4:red:blue:green".parse::<HighlightSpec>().is_err());
    }

    #[test]
    fn test_from_toml() {
        let content = r##"
format = "pride"
selection_color = "#FFA010"

[columns]
size = 50

[selection]
start = 8
end = 3

[[highlights]]
start = 30
end = 42
foreground = "white"
background = "green"

[[annotations]]
name = "UNIPROT"
color = "green"
regions = [{ start = 540, end = 560 }, { start = 581, end = 590, color = "red" }]
"##;
        let config = SequenceConfig::from_toml_str(content).unwrap();
        assert_eq!(config.format, SequenceFormat::Pride);
        assert_eq!(config.columns.size, 50);
        assert_eq!(config.columns.spaced_each, 10);
        assert_eq!(config.selection, Some(SeqRange::new(3, 8)));
        assert_eq!(config.selection_color, Color::Rgb(0xFF, 0xA0, 0x10));
        assert_eq!(config.highlights.len(), 1);
        assert_eq!(config.annotations[0].regions[1].color, Some(Color::Red));
    }

    #[test]
    fn test_invalid_color_rejected() {
        let result = SequenceConfig::from_toml_str("font_color = \"not a color\"");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidColor { option: "font_color", .. })
        ));
    }

    #[test]
    fn test_zero_columns_rejected() {
        let result = SequenceConfig::from_toml_str("[columns]\nsize = 0\n");
        assert!(matches!(result, Err(ConfigError::ZeroColumns(_))));
    }

    #[test]
    fn test_too_many_columns_rejected() {
        let result = SequenceConfig::from_toml_str("[columns]\nsize = 10001\n");
        assert!(matches!(
            result,
            Err(ConfigError::TooManyColumns { value: 10_001, max: 10_000, .. })
        ));
        assert!(SequenceConfig::from_toml_str("[columns]\nsize = 10000\n").is_ok());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "format = \"raw\"").unwrap();
        let config = SequenceConfig::from_file(file.path()).unwrap();
        assert_eq!(config.format, SequenceFormat::Raw);
    }
}
