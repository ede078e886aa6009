//! Bundle document encoding.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bundle::{Bundle, BundleError, BundleResult};

/// Serialization of a bundle document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleFormat {
    #[default]
    Json,
    Yaml,
}

impl BundleFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            BundleFormat::Json => "json",
            BundleFormat::Yaml => "yaml",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            BundleFormat::Json => "application/json",
            BundleFormat::Yaml => "application/yaml",
        }
    }

    /// Guess the format of a document: JSON if it opens an object, YAML
    /// otherwise.
    pub fn detect(text: &str) -> Self {
        if text.trim_start().starts_with('{') {
            BundleFormat::Json
        } else {
            BundleFormat::Yaml
        }
    }
}

impl fmt::Display for BundleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BundleFormat {
    type Err = BundleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(BundleFormat::Json),
            "yaml" | "yml" => Ok(BundleFormat::Yaml),
            other => Err(BundleError::Invalid(format!("unknown bundle format `{other}`"))),
        }
    }
}

pub fn encode(bundle: &Bundle, format: BundleFormat) -> BundleResult<String> {
    Ok(match format {
        BundleFormat::Json => serde_json::to_string_pretty(bundle)?,
        BundleFormat::Yaml => serde_yaml::to_string(bundle)?,
    })
}

/// Decode a bundle, detecting the format when none is given.
pub fn decode(text: &str, format: Option<BundleFormat>) -> BundleResult<Bundle> {
    match format.unwrap_or_else(|| BundleFormat::detect(text)) {
        BundleFormat::Json => Ok(serde_json::from_str(text)?),
        BundleFormat::Yaml => Ok(serde_yaml::from_str(text)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        assert_eq!(BundleFormat::detect("  {\"routes\": []}"), BundleFormat::Json);
        assert_eq!(BundleFormat::detect("routes: []"), BundleFormat::Yaml);
    }

    #[test]
    fn test_parse_format_name() {
        assert_eq!("YAML".parse::<BundleFormat>().unwrap(), BundleFormat::Yaml);
        assert_eq!("yml".parse::<BundleFormat>().unwrap(), BundleFormat::Yaml);
        assert!("xml".parse::<BundleFormat>().is_err());
    }

    #[test]
    fn test_decode_yaml_with_numeric_ids() {
        let bundle = decode(
            r#"
routes:
  - id: 1
    name: orders
    uri: /orders
    upstream_id: 2
upstreams:
  - id: 2
    nodes:
      "10.0.0.1:80": 1
variables:
  - key: k
    value: v
"#,
            None,
        )
        .unwrap();

        assert_eq!(bundle.routes[0].base.id_str(), "1");
        assert_eq!(bundle.upstreams[0].def.nodes[0].port, 80);
        assert!(bundle.services.is_empty());
        assert_eq!(bundle.variables.len(), 1);
    }

    #[test]
    fn test_malformed_json_is_reported() {
        assert!(matches!(
            decode("{ not json", None),
            Err(BundleError::Json(_))
        ));
    }
}
