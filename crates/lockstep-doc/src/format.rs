//! Format detection, parsing, and rendering
//!
//! Storage collaborators round-trip documents through structured text. The
//! supported encodings all map onto the same in-memory value model; mapping
//! key order is preserved where the encoding allows it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    Json,
    Yaml,
    Toml,
}

impl Format {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    /// Detect format from content heuristics.
    ///
    /// Falls back to YAML, which accepts bare scalars and `key: value`
    /// documents alike.
    pub fn from_content(content: &str) -> Self {
        let trimmed = content.trim_start();

        // JSON starts with { or [
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            return Self::Json;
        }

        // TOML has [section] headers alongside key = value pairs
        if (trimmed.contains("\n[") || trimmed.starts_with('['))
            && trimmed.lines().any(|l| l.contains(" = "))
        {
            return Self::Toml;
        }

        Self::Yaml
    }

    /// Get default file extensions for this format
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Json => &["json"],
            Self::Yaml => &["yaml", "yml"],
            Self::Toml => &["toml"],
        }
    }

    /// Human-readable format name used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Yaml => "YAML",
            Self::Toml => "TOML",
        }
    }

    /// Parse source text into a document value.
    pub fn parse(&self, source: &str) -> Result<Value> {
        match self {
            Self::Json => Ok(serde_json::from_str(source)?),
            Self::Yaml => {
                let value: serde_yaml::Value = serde_yaml::from_str(source)
                    .map_err(|e| Error::parse(self.name(), e.to_string()))?;
                yaml_to_json(&value)
            }
            Self::Toml => {
                let value: toml::Value = toml::from_str(source)
                    .map_err(|e| Error::parse(self.name(), e.to_string()))?;
                Ok(toml_to_json(&value))
            }
        }
    }

    /// Render a document value back to text.
    ///
    /// TOML cannot represent `null` and requires a table at the top level;
    /// rendering such a document fails with `Render`.
    pub fn render(&self, value: &Value) -> Result<String> {
        match self {
            Self::Json => {
                let mut rendered = serde_json::to_string_pretty(value)?;
                rendered.push('\n');
                Ok(rendered)
            }
            Self::Yaml => {
                serde_yaml::to_string(value).map_err(|e| Error::render(self.name(), e.to_string()))
            }
            Self::Toml => {
                if !value.is_object() {
                    return Err(Error::render(self.name(), "top-level value must be a table"));
                }
                let toml_value = json_to_toml(value)?;
                toml::to_string_pretty(&toml_value)
                    .map_err(|e| Error::render(self.name(), e.to_string()))
            }
        }
    }
}

/// Convert a serde_yaml::Value to a serde_json::Value.
///
/// Mapping order is preserved. Non-string mapping keys are rejected rather
/// than silently stringified.
fn yaml_to_json(value: &serde_yaml::Value) -> Result<Value> {
    match value {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(i.into()))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(u.into()))
            } else if let Some(f) = n.as_f64() {
                Ok(serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .unwrap_or(Value::Null))
            } else {
                Ok(Value::Null)
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(arr) => {
            let items: Result<Vec<_>> = arr.iter().map(yaml_to_json).collect();
            Ok(Value::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (key, v) in map {
                let key = key
                    .as_str()
                    .ok_or_else(|| Error::parse("YAML", "mapping keys must be strings"))?;
                json_map.insert(key.to_string(), yaml_to_json(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}

/// Convert a toml::Value to a serde_json::Value.
///
/// Datetimes become their literal string form.
fn toml_to_json(value: &toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(i) => Value::Number((*i).into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(d) => Value::String(d.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in table {
                json_map.insert(k.clone(), toml_to_json(v));
            }
            Value::Object(json_map)
        }
    }
}

/// Convert a serde_json::Value to a toml::Value
fn json_to_toml(json: &Value) -> Result<toml::Value> {
    match json {
        Value::Null => Err(Error::render("TOML", "TOML does not support null values")),
        Value::Bool(b) => Ok(toml::Value::Boolean(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(toml::Value::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(toml::Value::Float(f))
            } else {
                Err(Error::render("TOML", "invalid number"))
            }
        }
        Value::String(s) => Ok(toml::Value::String(s.clone())),
        Value::Array(arr) => {
            let toml_arr: Result<Vec<toml::Value>> = arr.iter().map(json_to_toml).collect();
            Ok(toml::Value::Array(toml_arr?))
        }
        Value::Object(obj) => {
            let mut toml_map = toml::map::Map::new();
            for (k, v) in obj {
                toml_map.insert(k.clone(), json_to_toml(v)?);
            }
            Ok(toml::Value::Table(toml_map))
        }
    }
}
