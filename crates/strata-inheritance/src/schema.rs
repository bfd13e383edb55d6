//! Typed field specs for the known configuration keys. Unknown keys pass.

use std::collections::BTreeMap;

use serde_json::Value;
use strata_core::errors::{FieldViolation, StrataError, StrataResult};
use strata_core::models::{Context, EnergyLevel, Priority};

#[derive(Debug, Clone, PartialEq)]
pub enum FieldSpec {
    Bool,
    /// A string from a fixed set, compared exactly.
    OneOf(Vec<String>),
    Integer { min: Option<i64> },
    Number { min: f64, max: f64 },
    StringArray,
    Object(BTreeMap<String, FieldSpec>),
}

impl FieldSpec {
    fn one_of<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        Self::OneOf(values.into_iter().map(str::to_string).collect())
    }

    fn object<const N: usize>(fields: [(&str, FieldSpec); N]) -> Self {
        Self::Object(fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    fn check(&self, path: &str, value: &Value, out: &mut Vec<FieldViolation>) {
        match self {
            Self::Bool => {
                if !value.is_boolean() {
                    out.push(FieldViolation::new(path, "expected a boolean"));
                }
            }
            Self::OneOf(allowed) => match value.as_str() {
                Some(s) if allowed.iter().any(|a| a == s) => {}
                _ => out.push(FieldViolation::new(
                    path,
                    format!("expected one of {}", allowed.join(", ")),
                )),
            },
            Self::Integer { min } => match value.as_i64() {
                Some(n) => {
                    if let Some(min) = min {
                        if n < *min {
                            out.push(FieldViolation::new(path, format!("must be at least {min}")));
                        }
                    }
                }
                None => out.push(FieldViolation::new(path, "expected an integer")),
            },
            Self::Number { min, max } => match value.as_f64() {
                Some(n) if n >= *min && n <= *max => {}
                Some(_) => out.push(FieldViolation::new(
                    path,
                    format!("must be between {min} and {max}"),
                )),
                None => out.push(FieldViolation::new(path, "expected a number")),
            },
            Self::StringArray => match value.as_array() {
                Some(items) => {
                    for (i, item) in items.iter().enumerate() {
                        if !item.is_string() {
                            out.push(FieldViolation::new(format!("{path}[{i}]"), "expected a string"));
                        }
                    }
                }
                None => out.push(FieldViolation::new(path, "expected an array of strings")),
            },
            Self::Object(fields) => match value.as_object() {
                Some(map) => check_fields(fields, map, Some(path), out),
                None => out.push(FieldViolation::new(path, "expected an object")),
            },
        }
    }
}

fn check_fields(
    fields: &BTreeMap<String, FieldSpec>,
    map: &serde_json::Map<String, Value>,
    prefix: Option<&str>,
    out: &mut Vec<FieldViolation>,
) {
    for (key, value) in map {
        let Some(spec) = fields.get(key) else {
            continue;
        };
        let path = match prefix {
            Some(p) => format!("{p}.{key}"),
            None => key.clone(),
        };
        spec.check(&path, value, out);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSchema {
    fields: BTreeMap<String, FieldSpec>,
}

impl ConfigSchema {
    pub fn empty() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    /// The keys every stream configuration understands.
    pub fn standard() -> Self {
        Self::empty()
            .with_field("autoRoute", FieldSpec::Bool)
            .with_field(
                "defaultPriority",
                FieldSpec::one_of(Priority::ALL.iter().map(|p| p.as_str())),
            )
            .with_field(
                "defaultContext",
                FieldSpec::one_of(Context::ALL.iter().map(|c| c.as_str())),
            )
            .with_field(
                "energyLevel",
                FieldSpec::one_of(EnergyLevel::ALL.iter().map(|e| e.as_str())),
            )
            .with_field("reviewFrequencyDays", FieldSpec::Integer { min: Some(1) })
            .with_field("retentionDays", FieldSpec::Integer { min: Some(0) })
            .with_field("maxItems", FieldSpec::Integer { min: Some(1) })
            .with_field("tags", FieldSpec::StringArray)
            .with_field(
                "notifications",
                FieldSpec::object([
                    ("enabled", FieldSpec::Bool),
                    ("channels", FieldSpec::StringArray),
                ]),
            )
            .with_field(
                "routing",
                FieldSpec::object([(
                    "confidenceThreshold",
                    FieldSpec::Number { min: 0.0, max: 1.0 },
                )]),
            )
    }

    pub fn with_field(mut self, key: impl Into<String>, spec: FieldSpec) -> Self {
        self.fields.insert(key.into(), spec);
        self
    }

    /// Every violation in `config`, addressed by field path.
    pub fn validate(&self, config: &Value) -> Vec<FieldViolation> {
        let mut violations = Vec::new();
        match config.as_object() {
            Some(map) => check_fields(&self.fields, map, None, &mut violations),
            None => violations.push(FieldViolation::new("$", "configuration must be a JSON object")),
        }
        violations
    }

    pub fn check(&self, config: &Value) -> StrataResult<()> {
        let violations = self.validate(config);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(StrataError::ValidationError { violations })
        }
    }
}

impl Default for ConfigSchema {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paths(config: Value) -> Vec<String> {
        ConfigSchema::standard()
            .validate(&config)
            .into_iter()
            .map(|v| v.path)
            .collect()
    }

    #[test]
    fn valid_document_passes() {
        let config = json!({
            "autoRoute": false,
            "defaultPriority": "HIGH",
            "defaultContext": "PHONE",
            "energyLevel": "CREATIVE",
            "reviewFrequencyDays": 7,
            "retentionDays": 0,
            "maxItems": 50,
            "tags": ["ops", "finance"],
            "notifications": {"enabled": true, "channels": ["email"]},
            "routing": {"confidenceThreshold": 0.75},
            "somethingCustom": {"anything": [1, 2, 3]}
        });
        assert!(paths(config).is_empty());
    }

    #[test]
    fn nested_paths_are_reported() {
        let found = paths(json!({
            "notifications": {"enabled": "yes", "channels": ["email", 3]},
            "routing": {"confidenceThreshold": 1.5}
        }));
        assert_eq!(
            found,
            vec![
                "notifications.channels[1]",
                "notifications.enabled",
                "routing.confidenceThreshold"
            ]
        );
    }

    #[test]
    fn integers_enforce_bounds() {
        assert_eq!(paths(json!({"reviewFrequencyDays": 0})), vec!["reviewFrequencyDays"]);
        assert_eq!(paths(json!({"maxItems": 2.5})), vec!["maxItems"]);
        assert!(paths(json!({"retentionDays": 0})).is_empty());
    }

    #[test]
    fn enums_are_exact() {
        assert_eq!(paths(json!({"defaultPriority": "CRITICAL"})), vec!["defaultPriority"]);
        assert_eq!(paths(json!({"defaultContext": "phone"})), vec!["defaultContext"]);
    }

    #[test]
    fn non_object_root_is_rejected() {
        assert_eq!(paths(json!([1, 2])), vec!["$"]);
        assert!(ConfigSchema::standard().check(&json!("x")).is_err());
    }

    #[test]
    fn custom_fields_extend_the_schema() {
        let schema = ConfigSchema::empty().with_field("slaHours", FieldSpec::Integer { min: Some(1) });
        assert_eq!(schema.validate(&json!({"slaHours": 0})).len(), 1);
        assert!(schema.validate(&json!({"autoRoute": "x"})).is_empty());
    }
}
