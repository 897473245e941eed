use crate::Value;

/// Mapping declared on an entity field.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Declared on the type but not mapped to any column.
    #[default]
    None,
    /// Mapped to a regular column.
    Column,
    /// Mapped to the store-generated primary key.
    Identity,
}

/// Declarative description of one field of an entity, as written on the type.
#[derive(Default, Debug)]
pub struct FieldDef {
    /// Field name in the Rust declaration.
    pub name: &'static str,
    /// Explicit column name (empty => use `name`).
    pub column_name: &'static str,
    /// Rust type as written, used in diagnostics.
    pub type_name: &'static str,
    /// Empty `Value` describing the semantic type of the field.
    pub value: Value,
    pub marker: Marker,
}

impl FieldDef {
    pub fn is_mapped(&self) -> bool {
        self.marker != Marker::None
    }
    pub fn is_identity(&self) -> bool {
        self.marker == Marker::Identity
    }
}

/// Metadata source for a type whose instances map to rows of one table.
///
/// Usually implemented by `#[derive(Entity)]`. `fields`, `field_values` and
/// `set_field` all use the same indexing: the declaration order of the fields.
pub trait Entity: Default + 'static {
    /// Name declared by the entity marker, `None` when the type has no marker.
    fn entity_name() -> Option<&'static str>;

    fn fields() -> &'static [FieldDef];

    /// Current values of every field, aligned with [`Entity::fields`].
    fn field_values(&self) -> Vec<Value>;

    /// Assigns the field at `index`, converting `value` to the field type.
    fn set_field(&mut self, index: usize, value: Value) -> anyhow::Result<()>;
}
