//! Serde mirror of the standard introspection result.

use crate::error::SchemaParseError;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawSchema {
    pub query_type: Option<RawNamed>,
    pub mutation_type: Option<RawNamed>,
    pub subscription_type: Option<RawNamed>,
    pub types: Vec<RawType>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawNamed {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum RawKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawType {
    pub kind: RawKind,
    pub name: String,
    pub description: Option<String>,
    pub fields: Option<Vec<RawField>>,
    pub input_fields: Option<Vec<RawInputValue>>,
    pub interfaces: Option<Vec<RawTypeRef>>,
    pub enum_values: Option<Vec<RawEnumValue>>,
    pub possible_types: Option<Vec<RawTypeRef>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawField {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub args: Vec<RawInputValue>,
    #[serde(rename = "type")]
    pub type_ref: RawTypeRef,
    #[serde(default)]
    pub is_deprecated: bool,
    pub deprecation_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawInputValue {
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub type_ref: RawTypeRef,
    pub default_value: Option<String>,
    #[serde(default)]
    pub is_deprecated: bool,
    pub deprecation_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawEnumValue {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_deprecated: bool,
    pub deprecation_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawTypeRef {
    pub kind: RawKind,
    pub name: Option<String>,
    pub of_type: Option<Box<RawTypeRef>>,
}

/// Locate `__schema` in either a full response (`{"data": {...}}`) or a bare result.
pub(crate) fn parse_payload(raw: &Value) -> Result<RawSchema, SchemaParseError> {
    let root = match raw.get("data") {
        Some(data) if !data.is_null() => data,
        _ => {
            if let Some(errors) = raw.get("errors") {
                return Err(SchemaParseError::QueryErrors(errors.to_string()));
            }
            raw
        }
    };

    let schema = root
        .get("__schema")
        .filter(|s| !s.is_null())
        .ok_or(SchemaParseError::MissingSchema)?;

    Ok(RawSchema::deserialize(schema)?)
}
