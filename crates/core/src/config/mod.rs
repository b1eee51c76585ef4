use std::{fmt, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    Converter, Dimensionality, ExchangeError, HarmonicConverter, Normalization, Numbering, Result,
};

/// Serializable description of a converter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    pub dimensionality: Dimensionality,
    pub order: usize,
    pub numbering: Numbering,
    pub normalization: Normalization,
    /// Applied after `numbering` and `normalization`, overriding both.
    pub preset: Option<Preset>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            dimensionality: Dimensionality::Spherical,
            order: 1,
            numbering: Numbering::Acn,
            normalization: Normalization::Semi,
            preset: None,
        }
    }
}

impl ConverterConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builds a converter in the described modes.
    pub fn build(&self) -> Result<Converter> {
        let mut converter = Converter::new(self.order, self.dimensionality)?;
        converter.set_numbering(self.numbering);
        converter.set_normalization(self.normalization);
        match self.preset {
            Some(Preset::FromBFormat) => converter.configure_from_b_format(),
            Some(Preset::ToBFormat) => converter.configure_to_b_format(),
            None => {}
        }
        Ok(converter)
    }
}

/// Matched numbering and normalization pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    FromBFormat,
    ToBFormat,
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FromBFormat => f.write_str("from-b-format"),
            Self::ToBFormat => f.write_str("to-b-format"),
        }
    }
}

impl FromStr for Preset {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "from-b-format" => Ok(Self::FromBFormat),
            "to-b-format" => Ok(Self::ToBFormat),
            _ => Err(ExchangeError::UnknownMode(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds_native_converter() {
        let converter = ConverterConfig::default().build().unwrap();
        assert_eq!(converter.dimensionality(), Dimensionality::Spherical);
        assert_eq!(converter.order(), 1);
        assert_eq!(converter.numbering(), Numbering::Acn);
        assert_eq!(converter.normalization(), Normalization::Semi);
    }

    #[test]
    fn parses_kebab_case_modes() {
        let config = ConverterConfig::from_json_str(
            r#"{ "dimensionality": "planar", "order": 3, "numbering": "from-sid",
                 "normalization": "to-full" }"#,
        )
        .unwrap();

        assert_eq!(config.dimensionality, Dimensionality::Planar);
        assert_eq!(config.order, 3);
        assert_eq!(config.numbering, Numbering::FromSid);
        assert_eq!(config.normalization, Normalization::ToFull);
        assert_eq!(config.preset, None);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = ConverterConfig::from_json_str(r#"{ "order": 2 }"#).unwrap();
        assert_eq!(
            config,
            ConverterConfig {
                order: 2,
                ..ConverterConfig::default()
            }
        );
    }

    #[test]
    fn preset_overrides_explicit_modes() {
        let config = ConverterConfig {
            numbering: Numbering::ToSid,
            normalization: Normalization::ToFull,
            preset: Some(Preset::FromBFormat),
            ..ConverterConfig::default()
        };

        let converter = config.build().unwrap();
        assert_eq!(converter.numbering(), Numbering::FromFurseMalham);
        assert_eq!(converter.normalization(), Normalization::FromMaxN);
    }

    #[test]
    fn survives_json_round_trip() {
        let config = ConverterConfig {
            dimensionality: Dimensionality::Planar,
            order: 2,
            preset: Some(Preset::ToBFormat),
            ..ConverterConfig::default()
        };
        let json = config.to_json_string().unwrap();
        assert!(json.contains("\"to-b-format\""));
        assert_eq!(ConverterConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn rejects_bad_documents() {
        assert!(matches!(
            ConverterConfig::from_json_str(r#"{ "numbering": "fuma" }"#),
            Err(ExchangeError::Json(_))
        ));

        let zero = ConverterConfig {
            order: 0,
            ..ConverterConfig::default()
        };
        assert!(matches!(
            zero.build(),
            Err(ExchangeError::InvalidOrder { order: 0, .. })
        ));
    }
}
