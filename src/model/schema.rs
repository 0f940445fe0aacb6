use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Scalars every GraphQL server provides without declaring them.
pub const BUILT_IN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];

/// Normalized schema: every type reference inside resolves to an entry of `types`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    types: Vec<SchemaType>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    pub query_type: Option<String>,
    pub mutation_type: Option<String>,
    pub subscription_type: Option<String>,
}

impl Schema {
    pub(crate) fn new(
        types: Vec<SchemaType>,
        query_type: Option<String>,
        mutation_type: Option<String>,
        subscription_type: Option<String>,
    ) -> Self {
        let index = types
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.clone(), i))
            .collect();
        Self {
            types,
            index,
            query_type,
            mutation_type,
            subscription_type,
        }
    }

    /// Types in declaration order, or alphabetical when sorting was requested.
    pub fn types(&self) -> &[SchemaType] {
        &self.types
    }

    pub fn get(&self, name: &str) -> Option<&SchemaType> {
        self.index.get(name).map(|&i| &self.types[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaType {
    pub name: String,
    pub description: Option<String>,
    /// Introspection (`__*`) types and the standard scalars.
    pub built_in: bool,
    /// Connection, edge, `Node` and `PageInfo` types hidden by Relay collapsing.
    pub relay_wrapper: bool,
    pub kind: TypeKind,
}

impl SchemaType {
    pub fn is_leaf(&self) -> bool {
        self.kind.is_leaf()
    }

    /// Output and input fields; empty for unions, enums and scalars.
    pub fn fields(&self) -> &[Field] {
        match &self.kind {
            TypeKind::Object { fields, .. }
            | TypeKind::Interface { fields, .. }
            | TypeKind::InputObject { fields } => fields,
            TypeKind::Union { .. } | TypeKind::Enum { .. } | TypeKind::Scalar => &[],
        }
    }

    pub(crate) fn fields_mut(&mut self) -> Option<&mut Vec<Field>> {
        match &mut self.kind {
            TypeKind::Object { fields, .. }
            | TypeKind::Interface { fields, .. }
            | TypeKind::InputObject { fields } => Some(fields),
            TypeKind::Union { .. } | TypeKind::Enum { .. } | TypeKind::Scalar => None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields().iter().find(|f| f.name == name)
    }

    /// Field lookup restricted to fields still eligible for traversal.
    pub fn visible_field(&self, name: &str) -> Option<&Field> {
        self.fields().iter().find(|f| f.name == name && !f.excluded)
    }
}

/// Per-kind payload of a named type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeKind {
    Object {
        fields: Vec<Field>,
        interfaces: Vec<String>,
    },
    Interface {
        fields: Vec<Field>,
        interfaces: Vec<String>,
        /// Object and interface types declaring this interface, in schema order.
        implementations: Vec<String>,
    },
    Union {
        members: Vec<String>,
    },
    Enum {
        values: Vec<EnumValue>,
    },
    Scalar,
    InputObject {
        fields: Vec<Field>,
    },
}

impl TypeKind {
    pub fn tag(&self) -> KindTag {
        match self {
            TypeKind::Object { .. } => KindTag::Object,
            TypeKind::Interface { .. } => KindTag::Interface,
            TypeKind::Union { .. } => KindTag::Union,
            TypeKind::Enum { .. } => KindTag::Enum,
            TypeKind::Scalar => KindTag::Scalar,
            TypeKind::InputObject { .. } => KindTag::InputObject,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, TypeKind::Scalar | TypeKind::Enum { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KindTag {
    Object,
    Interface,
    Union,
    Enum,
    Scalar,
    InputObject,
}

impl fmt::Display for KindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            KindTag::Object => "object",
            KindTag::Interface => "interface",
            KindTag::Union => "union",
            KindTag::Enum => "enum",
            KindTag::Scalar => "scalar",
            KindTag::InputObject => "input",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Wrapper {
    List,
    NonNull,
}

/// A named type plus its list/non-null wrappers, outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeRef {
    pub name: String,
    pub wrappers: Vec<Wrapper>,
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            wrappers: Vec::new(),
        }
    }

    pub fn is_list(&self) -> bool {
        self.wrappers.contains(&Wrapper::List)
    }

    pub fn is_non_null(&self) -> bool {
        self.wrappers.first() == Some(&Wrapper::NonNull)
    }
}

impl fmt::Display for TypeRef {
    /// SDL notation, e.g. `[Post!]!`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = self.name.clone();
        for wrapper in self.wrappers.iter().rev() {
            out = match wrapper {
                Wrapper::List => format!("[{}]", out),
                Wrapper::NonNull => format!("{}!", out),
            };
        }
        write!(f, "{}", out)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deprecation {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    pub description: Option<String>,
    pub type_ref: TypeRef,
    pub args: Vec<Argument>,
    pub deprecation: Option<Deprecation>,
    /// Not eligible for traversal (deprecated while skipping, or a Relay root helper).
    pub excluded: bool,
    /// Connection or edge type this field pointed at before Relay collapsing.
    pub relay_type: Option<String>,
    /// Pagination arguments moved out of `args` by Relay collapsing.
    pub relay_args: Vec<Argument>,
}

impl Field {
    pub fn is_deprecated(&self) -> bool {
        self.deprecation.is_some()
    }

    pub fn deprecation_reason(&self) -> Option<&str> {
        self.deprecation.as_ref().and_then(|d| d.reason.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Argument {
    pub name: String,
    pub description: Option<String>,
    pub type_ref: TypeRef,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumValue {
    pub name: String,
    pub description: Option<String>,
    pub deprecation: Option<Deprecation>,
    pub excluded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ref_display() {
        let plain = TypeRef::named("User");
        assert_eq!(plain.to_string(), "User");

        let posts = TypeRef {
            name: "Post".to_string(),
            wrappers: vec![Wrapper::NonNull, Wrapper::List, Wrapper::NonNull],
        };
        assert_eq!(posts.to_string(), "[Post!]!");
        assert!(posts.is_list());
        assert!(posts.is_non_null());

        let nullable_list = TypeRef {
            name: "Int".to_string(),
            wrappers: vec![Wrapper::List],
        };
        assert_eq!(nullable_list.to_string(), "[Int]");
        assert!(!nullable_list.is_non_null());
    }

    #[test]
    fn test_schema_lookup() {
        let schema = Schema::new(
            vec![SchemaType {
                name: "Query".to_string(),
                description: None,
                built_in: false,
                relay_wrapper: false,
                kind: TypeKind::Object {
                    fields: Vec::new(),
                    interfaces: Vec::new(),
                },
            }],
            Some("Query".to_string()),
            None,
            None,
        );

        assert!(schema.contains("Query"));
        assert_eq!(schema.get("Query").map(|t| t.kind.tag()), Some(KindTag::Object));
        assert!(schema.get("Mutation").is_none());
        assert_eq!(schema.len(), 1);
    }
}
