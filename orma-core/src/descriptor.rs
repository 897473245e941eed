use crate::{Entity, Error, Result, Value};
use std::{
    any::{self, TypeId},
    collections::HashMap,
    sync::Arc,
};

/// Mapped field of an entity, with its column name already resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Position of the field in [`Entity::fields`].
    pub index: usize,
    pub field: &'static str,
    /// Upper-cased column name.
    pub column: String,
    pub type_name: &'static str,
    pub value: Value,
    pub identity: bool,
}

/// Table level view of an entity: name and mapped fields in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDescriptor {
    pub name: &'static str,
    pub fields: Box<[FieldDescriptor]>,
    identity: Option<usize>,
}

impl EntityDescriptor {
    /// Derives the descriptor of `E` from its declared metadata.
    ///
    /// Fails with [`Error::MissingEntityMarker`] when `E` declares no entity
    /// name and with [`Error::DuplicateIdentityField`] when more than one field
    /// carries the identity marker. A missing identity field is not an error
    /// here, only the operations that need it fail (see
    /// [`EntityDescriptor::identity`]).
    pub fn read<E: Entity>() -> Result<Self> {
        let Some(name) = E::entity_name() else {
            return Err(Error::MissingEntityMarker {
                type_name: any::type_name::<E>(),
            });
        };
        let fields: Box<[FieldDescriptor]> = E::fields()
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_mapped())
            .map(|(index, f)| FieldDescriptor {
                index,
                field: f.name,
                column: if f.column_name.is_empty() {
                    f.name
                } else {
                    f.column_name
                }
                .to_uppercase(),
                type_name: f.type_name,
                value: f.value.clone(),
                identity: f.is_identity(),
            })
            .collect();
        let mut identities = fields.iter().enumerate().filter(|(_, f)| f.identity);
        let identity = identities.next().map(|(i, _)| i);
        if let (Some(first), Some((_, second))) = (identity, identities.next()) {
            return Err(Error::DuplicateIdentityField {
                entity: name,
                first: fields[first].field,
                second: second.field,
            });
        }
        if let Some(field) = identity.map(|i| &fields[i]) {
            if !matches!(field.value, Value::Int64(..)) {
                return Err(Error::UnsupportedType {
                    entity: name,
                    field: field.field,
                    type_name: field.type_name,
                });
            }
        }
        Ok(Self {
            name,
            fields,
            identity,
        })
    }

    /// The field carrying the identity marker.
    pub fn identity(&self) -> Result<&FieldDescriptor> {
        self.identity
            .map(|i| &self.fields[i])
            .ok_or(Error::MissingIdentityField { entity: self.name })
    }

    /// Column mapped fields, identity excluded.
    pub fn columns(&self) -> impl Iterator<Item = &FieldDescriptor> + Clone {
        self.fields.iter().filter(|f| !f.identity)
    }

    /// Mapped field whose column equals `label` once upper-cased.
    pub fn find_column(&self, label: &str) -> Option<&FieldDescriptor> {
        let label = label.to_uppercase();
        self.fields.iter().find(|f| f.column == label)
    }
}

/// Cache of entity descriptors keyed by type.
///
/// Each type is derived once, either explicitly through [`Registry::register`]
/// or on first lookup. Failed derivations are not cached.
#[derive(Debug, Default)]
pub struct Registry {
    descriptors: HashMap<TypeId, Arc<EntityDescriptor>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<E: Entity>(&mut self) -> Result<Arc<EntityDescriptor>> {
        if let Some(descriptor) = self.descriptors.get(&TypeId::of::<E>()) {
            return Ok(descriptor.clone());
        }
        let descriptor = Arc::new(EntityDescriptor::read::<E>()?);
        log::debug!(
            "Registered entity `{}` for type {}",
            descriptor.name,
            any::type_name::<E>()
        );
        self.descriptors.insert(TypeId::of::<E>(), descriptor.clone());
        Ok(descriptor)
    }

    /// Cached descriptor of `E`, if already registered.
    pub fn get<E: Entity>(&self) -> Option<Arc<EntityDescriptor>> {
        self.descriptors.get(&TypeId::of::<E>()).cloned()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
