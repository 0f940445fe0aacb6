use serde::{Deserialize, Serialize};

/// What the diagram shows. Changing any of these rebuilds the type graph from the
/// cached payload; the schema itself is never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DisplayOptions {
    pub root_type: Option<String>,
    pub skip_relay: bool,
    pub skip_deprecated: bool,
    pub show_leaf_fields: bool,
    pub sort_by_alphabet: bool,
    pub hide_root: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            root_type: None,
            skip_relay: true,
            skip_deprecated: true,
            show_leaf_fields: true,
            sort_by_alphabet: false,
            hide_root: false,
        }
    }
}

/// Partial update, as sent by a settings toggle. Unset fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayOptionsPatch {
    /// `Some(None)` clears an explicit root.
    #[serde(default, with = "double_option")]
    pub root_type: Option<Option<String>>,
    pub skip_relay: Option<bool>,
    pub skip_deprecated: Option<bool>,
    pub show_leaf_fields: Option<bool>,
    pub sort_by_alphabet: Option<bool>,
    pub hide_root: Option<bool>,
}

impl DisplayOptions {
    pub fn apply(&self, patch: &DisplayOptionsPatch) -> Self {
        Self {
            root_type: patch
                .root_type
                .clone()
                .unwrap_or_else(|| self.root_type.clone()),
            skip_relay: patch.skip_relay.unwrap_or(self.skip_relay),
            skip_deprecated: patch.skip_deprecated.unwrap_or(self.skip_deprecated),
            show_leaf_fields: patch.show_leaf_fields.unwrap_or(self.show_leaf_fields),
            sort_by_alphabet: patch.sort_by_alphabet.unwrap_or(self.sort_by_alphabet),
            hide_root: patch.hide_root.unwrap_or(self.hide_root),
        }
    }

    /// Whether switching from `self` to `other` requires normalizing the payload again.
    pub fn needs_renormalize(&self, other: &DisplayOptions) -> bool {
        self.skip_relay != other.skip_relay
            || self.skip_deprecated != other.skip_deprecated
            || self.sort_by_alphabet != other.sort_by_alphabet
    }
}

mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S, T>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}
