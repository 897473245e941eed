#[cfg(test)]
mod tests {
    use orma::{Entity, EntityDescriptor, Error, Marker, Registry, Value};
    use std::sync::Mutex;

    #[derive(Default, Debug, PartialEq, Entity)]
    #[orma(entity = "Animal")]
    struct Animal {
        #[orma(id)]
        id: Option<i64>,
        #[orma(column = "Fullname")]
        name: String,
        #[orma(column)]
        age: i32,
    }

    #[derive(Default, Entity)]
    #[orma(entity)]
    struct Shelter {
        #[orma(id = "shelter_id")]
        id: i64,
        #[orma(column = "City")]
        city: Option<String>,
        #[orma(ignore)]
        visits: Mutex<Vec<String>>,
        note: String,
        #[orma(column)]
        capacity: Box<i32>,
    }

    #[derive(Default, Entity)]
    struct Unmarked {
        #[orma(id)]
        id: Option<i64>,
    }

    #[derive(Default, Entity)]
    #[orma(entity = "Wrong")]
    struct WrongIdentity {
        #[orma(id)]
        id: Option<i32>,
    }

    #[derive(Default, Entity)]
    #[orma(entity = "Twin")]
    struct Twin {
        #[orma(id)]
        id: Option<i64>,
        #[orma(id)]
        other: Option<i64>,
        #[orma(column)]
        name: String,
    }

    #[test]
    fn derive_fields() {
        assert_eq!(Animal::entity_name(), Some("Animal"));
        let fields = Animal::fields();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].name, "id");
        assert_eq!(fields[0].column_name, "");
        assert_eq!(fields[0].type_name, "Option<i64>");
        assert_eq!(fields[0].value, Value::Int64(None));
        assert_eq!(fields[0].marker, Marker::Identity);
        assert_eq!(fields[1].name, "name");
        assert_eq!(fields[1].column_name, "Fullname");
        assert_eq!(fields[1].value, Value::Varchar(None));
        assert_eq!(fields[1].marker, Marker::Column);
        assert_eq!(fields[2].column_name, "");
        assert_eq!(fields[2].type_name, "i32");
        assert_eq!(fields[2].value, Value::Int32(None));
        assert!(std::ptr::eq(Animal::fields(), fields));
    }

    #[test]
    fn derive_values() {
        let mut animal = Animal {
            id: None,
            name: "alex".into(),
            age: 23,
        };
        assert_eq!(
            animal.field_values(),
            [
                Value::Int64(None),
                Value::Varchar(Some("alex".into())),
                Value::Int32(Some(23)),
            ]
        );
        animal.set_field(0, Value::Int64(Some(1))).unwrap();
        animal.set_field(2, Value::Int64(Some(24))).unwrap();
        assert_eq!(
            animal,
            Animal {
                id: Some(1),
                name: "alex".into(),
                age: 24,
            }
        );
        assert!(animal.set_field(1, Value::Int32(Some(1))).is_err());
        assert!(animal.set_field(3, Value::Null).is_err());
        assert_eq!(animal.name, "alex");
    }

    #[test]
    fn derive_markers() {
        assert_eq!(Shelter::entity_name(), Some("Shelter"));
        assert_eq!(Unmarked::entity_name(), None);
        let fields = Shelter::fields();
        assert_eq!(
            fields.iter().map(|f| f.marker).collect::<Vec<_>>(),
            [
                Marker::Identity,
                Marker::Column,
                Marker::None,
                Marker::None,
                Marker::Column
            ]
        );
        assert_eq!(fields[1].value, Value::Varchar(None));
        assert_eq!(fields[4].value, Value::Int32(None));
        let mut shelter = Shelter::default();
        assert_eq!(shelter.field_values()[2], Value::Null);
        assert!(shelter.set_field(2, Value::Null).is_err());
        shelter.set_field(1, Value::Varchar(None)).unwrap();
        assert_eq!(shelter.city, None);
        shelter.set_field(4, Value::Int32(Some(12))).unwrap();
        assert_eq!(*shelter.capacity, 12);
    }

    #[test]
    fn read_descriptor() {
        let descriptor = EntityDescriptor::read::<Shelter>().unwrap();
        assert_eq!(descriptor.name, "Shelter");
        assert_eq!(descriptor.fields.len(), 3);
        let identity = descriptor.identity().unwrap();
        assert_eq!(identity.column, "SHELTER_ID");
        assert_eq!(identity.index, 0);
        assert_eq!(
            descriptor
                .columns()
                .map(|f| (f.index, f.column.as_str()))
                .collect::<Vec<_>>(),
            [(1, "CITY"), (4, "CAPACITY")]
        );
        assert_eq!(
            descriptor.find_column("capacity").map(|f| f.field),
            Some("capacity")
        );
        assert!(descriptor.find_column("note").is_none());
    }

    #[test]
    fn read_descriptor_errors() {
        assert!(matches!(
            EntityDescriptor::read::<Unmarked>(),
            Err(Error::MissingEntityMarker { .. })
        ));
        assert!(matches!(
            EntityDescriptor::read::<WrongIdentity>(),
            Err(Error::UnsupportedType {
                entity: "Wrong",
                field: "id",
                type_name: "Option<i32>",
            })
        ));
    }

    #[test]
    fn read_descriptor_two_identities() {
        assert_eq!(
            Twin::fields()
                .iter()
                .filter(|f| f.marker == Marker::Identity)
                .count(),
            2
        );
        assert!(matches!(
            EntityDescriptor::read::<Twin>(),
            Err(Error::DuplicateIdentityField {
                entity: "Twin",
                first: "id",
                second: "other",
            })
        ));
        let mut registry = Registry::new();
        assert!(registry.register::<Twin>().is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn registry() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());
        assert!(registry.get::<Animal>().is_none());
        let first = registry.register::<Animal>().unwrap();
        let second = registry.register::<Animal>().unwrap();
        assert!(std::sync::Arc::ptr_eq(&first, &second));
        assert!(registry.register::<Unmarked>().is_err());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get::<Animal>().unwrap().name, "Animal");
    }
}
