//! `request-validation` plugin extraction.

use serde_json::{Map, Value};

use crate::entity::PluginMap;
use crate::error::{EngineError, EngineResult};

pub const REQUEST_VALIDATION: &str = "request-validation";

/// A header the validation plugin checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderParam {
    pub name: String,
    pub required: bool,
    /// Declared JSON-schema type, when the property declares one.
    pub schema_type: Option<String>,
}

/// What a `request-validation` configuration says about the request shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestValidation {
    pub header_params: Vec<HeaderParam>,
    /// `body_schema`, verbatim.
    pub body_schema: Option<Value>,
}

/// Remove `request-validation` from `plugins` and decode it.
///
/// Returns an empty extraction when the plugin is absent.
pub fn take_request_validation(plugins: &mut PluginMap) -> EngineResult<RequestValidation> {
    match plugins.remove(REQUEST_VALIDATION) {
        Some(config) => parse(&config),
        None => Ok(RequestValidation::default()),
    }
}

fn parse(config: &Value) -> EngineResult<RequestValidation> {
    let config = config
        .as_object()
        .ok_or_else(|| malformed("configuration is not an object"))?;

    let header_params = match config.get("header_schema") {
        Some(schema) => header_params(schema)?,
        None => Vec::new(),
    };

    Ok(RequestValidation {
        header_params,
        body_schema: config.get("body_schema").cloned(),
    })
}

fn header_params(schema: &Value) -> EngineResult<Vec<HeaderParam>> {
    let schema = schema
        .as_object()
        .ok_or_else(|| malformed("`header_schema` is not an object"))?;

    let required = required_names(schema)?;

    let properties = match schema.get("properties") {
        None => return Ok(Vec::new()),
        Some(Value::Object(properties)) => properties,
        Some(_) => return Err(malformed("`header_schema.properties` is not a mapping")),
    };

    properties
        .iter()
        .map(|(name, property)| -> EngineResult<HeaderParam> {
            let property = property
                .as_object()
                .ok_or_else(|| malformed(format!("header property `{name}` is not an object")))?;

            let schema_type = match property.get("type") {
                None => None,
                Some(Value::String(kind)) => Some(kind.clone()),
                Some(_) => {
                    return Err(malformed(format!(
                        "header property `{name}` has a non-string type"
                    )))
                }
            };

            Ok(HeaderParam {
                name: name.clone(),
                required: required.iter().any(|r| r == name),
                schema_type,
            })
        })
        .collect()
}

fn required_names(schema: &Map<String, Value>) -> EngineResult<Vec<String>> {
    match schema.get("required") {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| malformed("`header_schema.required` holds a non-string"))
            })
            .collect(),
        Some(_) => Err(malformed("`header_schema.required` is not a list")),
    }
}

fn malformed(reason: impl Into<String>) -> EngineError {
    let err = EngineError::malformed(REQUEST_VALIDATION, reason);
    tracing::warn!(error = %err, "Rejecting plugin configuration");
    err
}
