use super::raw::{
    RawEnumValue, RawField, RawInputValue, RawKind, RawType, RawTypeRef, parse_payload,
};
use super::relay;
use crate::error::{SchemaConsistencyError, SchemaError, SchemaParseError};
use crate::model::{
    Argument, BUILT_IN_SCALARS, Deprecation, DisplayOptions, EnumValue, Field, Schema, SchemaType,
    TypeKind, TypeRef, Wrapper,
};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Turn a raw introspection payload into a [`Schema`].
///
/// Pure: the same payload and flags always produce the same schema.
///
/// * `sort_by_alphabet` orders types, fields and enum values by name.
/// * `skip_relay` collapses connection/edge wrappers onto their node types.
/// * `skip_deprecated` excludes deprecated fields and enum values from traversal
///   while keeping them in the schema.
pub fn normalize(
    raw: &Value,
    sort_by_alphabet: bool,
    skip_relay: bool,
    skip_deprecated: bool,
) -> Result<Schema, SchemaError> {
    let raw_schema = parse_payload(raw)?;
    let mut types = convert_types(raw_schema.types)?;

    let query_type = raw_schema.query_type.map(|t| t.name);
    let mutation_type = raw_schema.mutation_type.map(|t| t.name);
    let subscription_type = raw_schema.subscription_type.map(|t| t.name);

    let declared: HashSet<&str> = types.iter().map(|t| t.name.as_str()).collect();
    for root in [&query_type, &mutation_type, &subscription_type]
        .into_iter()
        .flatten()
    {
        ensure_declared(&declared, root, "schema")?;
    }
    check_references(&types, &declared)?;

    if skip_deprecated {
        exclude_deprecated(&mut types);
    }
    if skip_relay {
        relay::collapse(&mut types, query_type.as_deref());
    }
    if sort_by_alphabet {
        sort_types(&mut types);
    }
    link_implementations(&mut types);

    Ok(Schema::new(
        types,
        query_type,
        mutation_type,
        subscription_type,
    ))
}

/// [`normalize`] driven by the schema-affecting [`DisplayOptions`].
pub fn normalize_with(raw: &Value, options: &DisplayOptions) -> Result<Schema, SchemaError> {
    normalize(
        raw,
        options.sort_by_alphabet,
        options.skip_relay,
        options.skip_deprecated,
    )
}

/// Parse a JSON document and normalize it.
pub fn normalize_str(json: &str, options: &DisplayOptions) -> Result<Schema, SchemaError> {
    let raw: Value = serde_json::from_str(json)?;
    normalize_with(&raw, options)
}

fn convert_types(raw_types: Vec<RawType>) -> Result<Vec<SchemaType>, SchemaParseError> {
    let mut seen = HashSet::new();
    let mut types = Vec::with_capacity(raw_types.len());

    for raw in raw_types {
        if !seen.insert(raw.name.clone()) {
            return Err(SchemaParseError::DuplicateType(raw.name));
        }
        types.push(convert_type(raw)?);
    }

    Ok(types)
}

fn convert_type(raw: RawType) -> Result<SchemaType, SchemaParseError> {
    let name = raw.name;
    let kind = match raw.kind {
        RawKind::Object => TypeKind::Object {
            fields: convert_fields(&name, raw.fields)?,
            interfaces: named_refs(&name, raw.interfaces)?,
        },
        RawKind::Interface => TypeKind::Interface {
            fields: convert_fields(&name, raw.fields)?,
            interfaces: named_refs(&name, raw.interfaces)?,
            implementations: Vec::new(),
        },
        RawKind::Union => TypeKind::Union {
            members: named_refs(&name, raw.possible_types)?,
        },
        RawKind::Enum => TypeKind::Enum {
            values: raw
                .enum_values
                .unwrap_or_default()
                .into_iter()
                .map(convert_enum_value)
                .collect(),
        },
        RawKind::Scalar => TypeKind::Scalar,
        RawKind::InputObject => TypeKind::InputObject {
            fields: raw
                .input_fields
                .unwrap_or_default()
                .into_iter()
                .map(|input| convert_input_field(&name, input))
                .collect::<Result<_, _>>()?,
        },
        RawKind::List | RawKind::NonNull => {
            return Err(SchemaParseError::MalformedTypeRef(name));
        }
    };

    let built_in = name.starts_with("__")
        || (matches!(kind, TypeKind::Scalar) && BUILT_IN_SCALARS.contains(&name.as_str()));

    Ok(SchemaType {
        name,
        description: raw.description,
        built_in,
        relay_wrapper: false,
        kind,
    })
}

fn convert_fields(
    owner: &str,
    fields: Option<Vec<RawField>>,
) -> Result<Vec<Field>, SchemaParseError> {
    fields
        .unwrap_or_default()
        .into_iter()
        .map(|f| -> Result<Field, SchemaParseError> {
            let context = format!("{}.{}", owner, f.name);
            Ok(Field {
                type_ref: unwrap_type_ref(&context, &f.type_ref)?,
                args: f
                    .args
                    .into_iter()
                    .map(|a| convert_argument(&context, a))
                    .collect::<Result<_, _>>()?,
                deprecation: deprecation(f.is_deprecated, f.deprecation_reason),
                name: f.name,
                description: f.description,
                excluded: false,
                relay_type: None,
                relay_args: Vec::new(),
            })
        })
        .collect()
}

fn convert_input_field(owner: &str, input: RawInputValue) -> Result<Field, SchemaParseError> {
    let context = format!("{}.{}", owner, input.name);
    Ok(Field {
        type_ref: unwrap_type_ref(&context, &input.type_ref)?,
        args: Vec::new(),
        deprecation: deprecation(input.is_deprecated, input.deprecation_reason),
        name: input.name,
        description: input.description,
        excluded: false,
        relay_type: None,
        relay_args: Vec::new(),
    })
}

fn convert_argument(owner: &str, arg: RawInputValue) -> Result<Argument, SchemaParseError> {
    let context = format!("{}({})", owner, arg.name);
    Ok(Argument {
        type_ref: unwrap_type_ref(&context, &arg.type_ref)?,
        name: arg.name,
        description: arg.description,
        default_value: arg.default_value,
    })
}

fn convert_enum_value(raw: RawEnumValue) -> EnumValue {
    EnumValue {
        name: raw.name,
        description: raw.description,
        deprecation: deprecation(raw.is_deprecated, raw.deprecation_reason),
        excluded: false,
    }
}

fn deprecation(is_deprecated: bool, reason: Option<String>) -> Option<Deprecation> {
    is_deprecated.then_some(Deprecation { reason })
}

fn named_refs(
    owner: &str,
    refs: Option<Vec<RawTypeRef>>,
) -> Result<Vec<String>, SchemaParseError> {
    refs.unwrap_or_default()
        .iter()
        .map(|r| unwrap_type_ref(owner, r).map(|t| t.name))
        .collect()
}

/// Peel LIST/NON_NULL layers off a reference, recording them outermost first.
fn unwrap_type_ref(context: &str, raw: &RawTypeRef) -> Result<TypeRef, SchemaParseError> {
    let mut wrappers = Vec::new();
    let mut current = raw;

    loop {
        match current.kind {
            RawKind::List | RawKind::NonNull => {
                wrappers.push(if current.kind == RawKind::List {
                    Wrapper::List
                } else {
                    Wrapper::NonNull
                });
                current = current
                    .of_type
                    .as_deref()
                    .ok_or_else(|| SchemaParseError::MalformedTypeRef(context.to_string()))?;
            }
            _ => {
                let name = current
                    .name
                    .clone()
                    .ok_or_else(|| SchemaParseError::MalformedTypeRef(context.to_string()))?;
                return Ok(TypeRef { name, wrappers });
            }
        }
    }
}

fn ensure_declared(
    declared: &HashSet<&str>,
    name: &str,
    referenced_from: &str,
) -> Result<(), SchemaConsistencyError> {
    if declared.contains(name) {
        Ok(())
    } else {
        Err(SchemaConsistencyError {
            missing: name.to_string(),
            referenced_from: referenced_from.to_string(),
        })
    }
}

fn check_references(
    types: &[SchemaType],
    declared: &HashSet<&str>,
) -> Result<(), SchemaConsistencyError> {
    for ty in types {
        for field in ty.fields() {
            let context = format!("{}.{}", ty.name, field.name);
            ensure_declared(declared, &field.type_ref.name, &context)?;
            for arg in &field.args {
                ensure_declared(declared, &arg.type_ref.name, &context)?;
            }
        }

        let named: &[String] = match &ty.kind {
            TypeKind::Object { interfaces, .. } | TypeKind::Interface { interfaces, .. } => {
                interfaces
            }
            TypeKind::Union { members } => members,
            TypeKind::Enum { .. } | TypeKind::Scalar | TypeKind::InputObject { .. } => &[],
        };
        for name in named {
            ensure_declared(declared, name, &ty.name)?;
        }
    }
    Ok(())
}

fn exclude_deprecated(types: &mut [SchemaType]) {
    for ty in types.iter_mut() {
        if let TypeKind::Enum { values } = &mut ty.kind {
            for value in values.iter_mut().filter(|v| v.deprecation.is_some()) {
                value.excluded = true;
            }
        }
        if let Some(fields) = ty.fields_mut() {
            for field in fields.iter_mut().filter(|f| f.is_deprecated()) {
                field.excluded = true;
            }
        }
    }
}

fn sort_types(types: &mut [SchemaType]) {
    types.sort_by(|a, b| a.name.cmp(&b.name));
    for ty in types.iter_mut() {
        if let TypeKind::Enum { values } = &mut ty.kind {
            values.sort_by(|a, b| a.name.cmp(&b.name));
        }
        if let Some(fields) = ty.fields_mut() {
            fields.sort_by(|a, b| a.name.cmp(&b.name));
        }
    }
}

/// Fill each interface's implementation list from the `interfaces` declarations.
fn link_implementations(types: &mut [SchemaType]) {
    let mut implementations: HashMap<String, Vec<String>> = HashMap::new();
    for ty in types.iter() {
        if let TypeKind::Object { interfaces, .. } | TypeKind::Interface { interfaces, .. } =
            &ty.kind
        {
            for interface in interfaces {
                implementations
                    .entry(interface.clone())
                    .or_default()
                    .push(ty.name.clone());
            }
        }
    }

    for ty in types.iter_mut() {
        if let TypeKind::Interface {
            implementations: list,
            ..
        } = &mut ty.kind
        {
            *list = implementations.remove(&ty.name).unwrap_or_default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspection::fixtures;
    use serde_json::json;

    #[test]
    fn test_resolves_wrappers_and_builtins() {
        let raw = fixtures::blog();
        let schema = normalize(&raw, false, true, false).unwrap();

        let user = schema.get("User").unwrap();
        let posts = user.field("posts").unwrap();
        assert_eq!(posts.type_ref.name, "Post");
        assert_eq!(posts.type_ref.to_string(), "[Post!]!");
        assert!(posts.is_deprecated());
        assert!(!posts.excluded);

        assert!(schema.get("String").unwrap().built_in);
        assert!(schema.get("__Schema").unwrap().built_in);
        assert!(!schema.get("User").unwrap().built_in);
        assert_eq!(schema.query_type.as_deref(), Some("Query"));
    }

    #[test]
    fn test_skip_deprecated_keeps_field_resolvable() {
        let schema = normalize(&fixtures::blog(), false, true, true).unwrap();

        let posts = schema.get("User").unwrap().field("posts").unwrap();
        assert!(posts.excluded);
        assert_eq!(posts.deprecation_reason(), Some("no longer supported"));
        assert!(schema.get("User").unwrap().visible_field("posts").is_none());
        assert!(schema.contains("Post"));
    }

    #[test]
    fn test_dangling_reference() {
        let raw = json!({"__schema": {
            "queryType": {"name": "Query"},
            "types": [fixtures::object(
                "Query",
                vec![fixtures::field("ghost", fixtures::named("OBJECT", "Ghost"))]
            )]
        }});

        match normalize(&raw, false, true, true) {
            Err(SchemaError::Consistency(err)) => {
                assert_eq!(err.missing, "Ghost");
                assert_eq!(err.referenced_from, "Query.ghost");
            }
            other => panic!("Expected consistency error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_query_root_type() {
        let raw = json!({"__schema": {"queryType": {"name": "Root"}, "types": []}});
        assert!(matches!(
            normalize(&raw, false, false, false),
            Err(SchemaError::Consistency(_))
        ));
    }

    #[test]
    fn test_duplicate_type() {
        let raw = json!({"__schema": {
            "queryType": {"name": "Query"},
            "types": [fixtures::object("Query", vec![]), fixtures::object("Query", vec![])]
        }});
        assert!(matches!(
            normalize(&raw, false, false, false),
            Err(SchemaError::Parse(SchemaParseError::DuplicateType(_)))
        ));
    }

    #[test]
    fn test_sorting_is_opt_in() {
        let raw = fixtures::blog();

        let declared = normalize(&raw, false, true, false).unwrap();
        let user = declared.get("User").unwrap();
        let names: Vec<_> = user.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["name", "id", "posts"]);

        let sorted = normalize(&raw, true, true, false).unwrap();
        let user = sorted.get("User").unwrap();
        let names: Vec<_> = user.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "posts"]);

        let type_names: Vec<_> = sorted.types().iter().map(|t| t.name.as_str()).collect();
        let mut expected = type_names.clone();
        expected.sort();
        assert_eq!(type_names, expected);
    }

    #[test]
    fn test_interface_implementations() {
        let schema = normalize(&fixtures::search(), false, false, false).unwrap();
        match &schema.get("Entity").unwrap().kind {
            TypeKind::Interface {
                implementations, ..
            } => assert_eq!(implementations, &vec!["User".to_string(), "Team".to_string()]),
            other => panic!("Expected interface, got {:?}", other),
        }
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let raw = fixtures::relay();
        let a = normalize(&raw, true, true, true).unwrap();
        let b = normalize(&raw, true, true, true).unwrap();
        assert_eq!(a, b);
    }
}
