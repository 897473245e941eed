use crate::{
    Connection, Driver, Entity, EntityDescriptor, Error, Executor, Properties, Registry, Result,
    SqlWriter, Value, truncate_long,
};
use std::{mem, sync::Arc};

/// Runs the CRUD operations of entities against one connection.
///
/// The manager owns its connection for its whole lifetime and every operation
/// takes `&mut self`, statements never interleave. Once [`EntityManager::close`]
/// is called every operation touching the store fails with
/// [`Error::ConnectionError`], there is no way back to the open state.
///
/// ```ignore
/// let mut manager = EntityManager::<SqliteConnection>::open(&properties, "db")?;
/// manager.prepare_repository_for::<Animal>()?;
/// let mut animal = Animal::new("alex", 23);
/// manager.save(&mut animal)?;
/// assert!(animal.id.is_some());
/// ```
pub struct EntityManager<C: Connection> {
    connection: Option<C>,
    registry: Registry,
}

impl<C: Connection> EntityManager<C> {
    pub fn new(connection: C) -> Self {
        Self {
            connection: Some(connection),
            registry: Registry::new(),
        }
    }

    /// Opens the connection described by the `key` entries of `properties`.
    pub fn open(properties: &Properties, key: &str) -> Result<Self> {
        let connection = properties.connection_settings(key)?.connect::<C>()?;
        log::debug!("Opened a {} connection for `{}`", <C::Driver as Driver>::NAME, key);
        Ok(Self::new(connection))
    }

    pub fn is_open(&self) -> bool {
        self.connection.as_ref().is_some_and(|c| c.is_open())
    }

    pub fn close(&mut self) -> Result<()> {
        let Some(mut connection) = self.connection.take() else {
            return Ok(());
        };
        connection.close().map_err(|e| Error::ConnectionError {
            message: format!("{:#}", e),
        })
    }

    /// The underlying connection, for statements the manager does not generate.
    pub fn connection_mut(&mut self) -> Result<&mut C> {
        match self.connection.as_mut() {
            Some(connection) if connection.is_open() => Ok(connection),
            _ => Err(Self::closed()),
        }
    }

    /// Derives and caches the descriptor of `E`. Does not need an open connection.
    pub fn register<E: Entity>(&mut self) -> Result<Arc<EntityDescriptor>> {
        self.registry.register::<E>()
    }

    /// Descriptor of `E` if it was already derived.
    pub fn descriptor<E: Entity>(&self) -> Option<Arc<EntityDescriptor>> {
        self.registry.get::<E>()
    }

    /// Drops and recreates the table of `E`. Every row previously stored is lost.
    pub fn prepare_repository_for<E: Entity>(&mut self) -> Result<()> {
        let (connection, descriptor) = self.parts::<E>()?;
        let mut sql = String::with_capacity(256);
        connection
            .driver()
            .sql_writer()
            .write_prepare_repository(&mut sql, &descriptor)?;
        log::info!("Preparing the table of entity `{}`", descriptor.name);
        log::debug!("{}", truncate_long(&sql));
        connection
            .execute_batch(&sql)
            .map_err(|source| Error::SchemaError {
                entity: descriptor.name,
                sql,
                source,
            })
    }

    /// Inserts `entity` and writes the generated key into its identity field.
    ///
    /// Text values are spliced into the statement as they are, see
    /// [`EntityManager::save_bound`] for values that can contain quotes.
    pub fn save<E: Entity>(&mut self, entity: &mut E) -> Result<()> {
        self.insert(entity, false)
    }

    /// Same as [`EntityManager::save`], the values are bound as parameters.
    pub fn save_bound<E: Entity>(&mut self, entity: &mut E) -> Result<()> {
        self.insert(entity, true)
    }

    /// Overwrites every column of the row identified by `entity`, returns the
    /// number of rows changed (zero when no row has that identity).
    pub fn update<E: Entity>(&mut self, entity: &E) -> Result<u64> {
        self.overwrite(entity, false)
    }

    /// Same as [`EntityManager::update`], the values are bound as parameters.
    pub fn update_bound<E: Entity>(&mut self, entity: &E) -> Result<u64> {
        self.overwrite(entity, true)
    }

    /// Loads every row of the table of `E`.
    ///
    /// Any column that is missing or cannot be converted fails the whole call.
    pub fn get_all<E: Entity>(&mut self) -> Result<Vec<E>> {
        let (connection, descriptor) = self.parts::<E>()?;
        let mut sql = String::with_capacity(64);
        connection
            .driver()
            .sql_writer()
            .write_select_all(&mut sql, &descriptor);
        log::debug!("{}", sql);
        let rows = connection
            .fetch(&sql)
            .map_err(|source| Error::ExecutionError { sql, source })?;
        let Some(first) = rows.first() else {
            return Ok(Vec::new());
        };
        let positions = descriptor
            .fields
            .iter()
            .map(|field| {
                first
                    .labels
                    .iter()
                    .position(|label| label.to_uppercase() == field.column)
                    .ok_or_else(|| Error::RowMappingError {
                        entity: descriptor.name,
                        column: field.column.clone(),
                        source: anyhow::anyhow!("The result has no such column"),
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        rows.into_iter()
            .map(|row| {
                let mut values = row.values;
                let mut entity = E::default();
                for (field, &i) in descriptor.fields.iter().zip(&positions) {
                    entity
                        .set_field(field.index, mem::take(&mut values[i]))
                        .map_err(|source| Error::RowMappingError {
                            entity: descriptor.name,
                            column: field.column.clone(),
                            source,
                        })?;
                }
                Ok(entity)
            })
            .collect()
    }

    fn closed() -> Error {
        Error::ConnectionError {
            message: "The entity manager is closed".into(),
        }
    }

    fn parts<E: Entity>(&mut self) -> Result<(&mut C, Arc<EntityDescriptor>)> {
        let connection = match self.connection.as_mut() {
            Some(connection) if connection.is_open() => connection,
            _ => return Err(Self::closed()),
        };
        let descriptor = self.registry.register::<E>()?;
        Ok((connection, descriptor))
    }

    fn insert<E: Entity>(&mut self, entity: &mut E, bound: bool) -> Result<()> {
        let (connection, descriptor) = self.parts::<E>()?;
        let identity = descriptor.identity()?;
        let values = entity.field_values();
        let writer = connection.driver().sql_writer();
        let mut sql = String::with_capacity(128);
        let params: Vec<Value> = if bound {
            writer.write_insert_bound(&mut sql, &descriptor);
            descriptor
                .columns()
                .map(|f| values[f.index].clone())
                .collect()
        } else {
            writer.write_insert(&mut sql, &descriptor, &values);
            Vec::new()
        };
        log::debug!("{}", truncate_long(&sql));
        let key = connection
            .insert(&sql, &params)
            .map_err(|source| Error::ExecutionError {
                sql: sql.clone(),
                source,
            })?;
        let Some(key) = key else {
            return Err(Error::NoGeneratedKey {
                entity: descriptor.name,
                sql,
            });
        };
        entity
            .set_field(identity.index, Value::Int64(Some(key)))
            .map_err(|source| Error::RowMappingError {
                entity: descriptor.name,
                column: identity.column.clone(),
                source,
            })
    }

    fn overwrite<E: Entity>(&mut self, entity: &E, bound: bool) -> Result<u64> {
        let (connection, descriptor) = self.parts::<E>()?;
        let identity = descriptor.identity()?;
        let values = entity.field_values();
        let writer = connection.driver().sql_writer();
        let mut sql = String::with_capacity(128);
        let params: Vec<Value> = if bound {
            writer.write_update_bound(&mut sql, &descriptor)?;
            descriptor
                .columns()
                .chain([identity])
                .map(|f| values[f.index].clone())
                .collect()
        } else {
            writer.write_update(&mut sql, &descriptor, &values)?;
            Vec::new()
        };
        log::debug!("{}", truncate_long(&sql));
        let affected = connection
            .execute(&sql, &params)
            .map_err(|source| Error::ExecutionError { sql, source })?;
        if affected == 0 {
            log::warn!(
                "No row of `{}` has {} = {:?}, nothing was updated",
                descriptor.name,
                identity.column,
                values[identity.index],
            );
        }
        Ok(affected)
    }
}

impl<C: Connection> Drop for EntityManager<C> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::error!("{:#}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EntityManager;
    use crate::{
        AsValue, Connection, Driver, Entity, Error, Executor, FieldDef, GenericSqlWriter,
        Marker, RowLabeled, Value,
    };
    use std::sync::Arc;

    #[derive(Default)]
    struct RecordingDriver;

    impl Driver for RecordingDriver {
        type Connection = RecordingConnection;
        type SqlWriter = GenericSqlWriter;
        const NAME: &'static str = "recording";

        fn sql_writer(&self) -> GenericSqlWriter {
            GenericSqlWriter::new()
        }
    }

    #[derive(Default)]
    struct RecordingConnection {
        driver: RecordingDriver,
        statements: Vec<(String, Vec<Value>)>,
        generated_key: Option<i64>,
        affected: u64,
        rows: Vec<RowLabeled>,
        closed: bool,
    }

    impl Executor for RecordingConnection {
        type Driver = RecordingDriver;

        fn driver(&self) -> &RecordingDriver {
            &self.driver
        }
        fn execute_batch(&mut self, sql: &str) -> anyhow::Result<()> {
            self.statements.push((sql.into(), Vec::new()));
            Ok(())
        }
        fn execute(&mut self, sql: &str, params: &[Value]) -> anyhow::Result<u64> {
            self.statements.push((sql.into(), params.to_vec()));
            Ok(self.affected)
        }
        fn insert(&mut self, sql: &str, params: &[Value]) -> anyhow::Result<Option<i64>> {
            self.statements.push((sql.into(), params.to_vec()));
            Ok(self.generated_key)
        }
        fn fetch(&mut self, sql: &str) -> anyhow::Result<Vec<RowLabeled>> {
            self.statements.push((sql.into(), Vec::new()));
            Ok(self.rows.clone())
        }
    }

    impl Connection for RecordingConnection {
        fn connect(_url: &str) -> anyhow::Result<Self> {
            Ok(Self::default())
        }
        fn close(&mut self) -> anyhow::Result<()> {
            self.closed = true;
            Ok(())
        }
        fn is_open(&self) -> bool {
            !self.closed
        }
    }

    #[derive(Default, Debug, PartialEq)]
    struct Animal {
        id: Option<i64>,
        name: String,
        age: i32,
    }

    static ANIMAL_FIELDS: [FieldDef; 3] = [
        FieldDef {
            name: "id",
            column_name: "",
            type_name: "Option<i64>",
            value: Value::Int64(None),
            marker: Marker::Identity,
        },
        FieldDef {
            name: "name",
            column_name: "Fullname",
            type_name: "String",
            value: Value::Varchar(None),
            marker: Marker::Column,
        },
        FieldDef {
            name: "age",
            column_name: "",
            type_name: "i32",
            value: Value::Int32(None),
            marker: Marker::Column,
        },
    ];

    impl Entity for Animal {
        fn entity_name() -> Option<&'static str> {
            Some("Animal")
        }
        fn fields() -> &'static [FieldDef] {
            &ANIMAL_FIELDS
        }
        fn field_values(&self) -> Vec<Value> {
            vec![
                self.id.as_value(),
                self.name.clone().as_value(),
                self.age.as_value(),
            ]
        }
        fn set_field(&mut self, index: usize, value: Value) -> anyhow::Result<()> {
            match index {
                0 => self.id = AsValue::try_from_value(value)?,
                1 => self.name = AsValue::try_from_value(value)?,
                2 => self.age = AsValue::try_from_value(value)?,
                _ => anyhow::bail!("No field at index {}", index),
            }
            Ok(())
        }
    }

    /// Same layout as `Animal` without the entity marker.
    #[derive(Default)]
    struct Unmarked {
        inner: Animal,
    }

    impl Entity for Unmarked {
        fn entity_name() -> Option<&'static str> {
            None
        }
        fn fields() -> &'static [FieldDef] {
            &ANIMAL_FIELDS
        }
        fn field_values(&self) -> Vec<Value> {
            self.inner.field_values()
        }
        fn set_field(&mut self, index: usize, value: Value) -> anyhow::Result<()> {
            self.inner.set_field(index, value)
        }
    }

    #[derive(Default)]
    struct Measure {
        value: f64,
    }

    static MEASURE_FIELDS: [FieldDef; 2] = [
        FieldDef {
            name: "id",
            column_name: "",
            type_name: "i64",
            value: Value::Int64(None),
            marker: Marker::Identity,
        },
        FieldDef {
            name: "value",
            column_name: "",
            type_name: "f64",
            value: Value::Float64(None),
            marker: Marker::Column,
        },
    ];

    impl Entity for Measure {
        fn entity_name() -> Option<&'static str> {
            Some("Measure")
        }
        fn fields() -> &'static [FieldDef] {
            &MEASURE_FIELDS
        }
        fn field_values(&self) -> Vec<Value> {
            vec![Value::Int64(None), self.value.as_value()]
        }
        fn set_field(&mut self, index: usize, value: Value) -> anyhow::Result<()> {
            if index == 1 {
                self.value = AsValue::try_from_value(value)?;
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct Note {
        text: String,
    }

    static NOTE_FIELDS: [FieldDef; 1] = [FieldDef {
        name: "text",
        column_name: "",
        type_name: "String",
        value: Value::Varchar(None),
        marker: Marker::Column,
    }];

    impl Entity for Note {
        fn entity_name() -> Option<&'static str> {
            Some("Note")
        }
        fn fields() -> &'static [FieldDef] {
            &NOTE_FIELDS
        }
        fn field_values(&self) -> Vec<Value> {
            vec![self.text.clone().as_value()]
        }
        fn set_field(&mut self, _index: usize, value: Value) -> anyhow::Result<()> {
            self.text = AsValue::try_from_value(value)?;
            Ok(())
        }
    }

    fn manager(connection: RecordingConnection) -> EntityManager<RecordingConnection> {
        EntityManager::new(connection)
    }

    fn statements(manager: &mut EntityManager<RecordingConnection>) -> Vec<String> {
        manager
            .connection_mut()
            .unwrap()
            .statements
            .iter()
            .map(|(sql, _)| sql.clone())
            .collect()
    }

    #[test]
    fn prepare_repository_sends_one_batch() {
        let mut manager = manager(Default::default());
        manager.prepare_repository_for::<Animal>().unwrap();
        assert_eq!(
            statements(&mut manager),
            [
                "DROP TABLE IF EXISTS Animal;\nCREATE TABLE Animal (ID BIGINT PRIMARY KEY AUTO_INCREMENT,FULLNAME VARCHAR(50),AGE INTEGER);"
            ]
        );
    }

    #[test]
    fn save_assigns_generated_key() {
        let mut manager = manager(RecordingConnection {
            generated_key: Some(7),
            ..Default::default()
        });
        let mut animal = Animal {
            id: None,
            name: "alex".into(),
            age: 23,
        };
        manager.save(&mut animal).unwrap();
        assert_eq!(animal.id, Some(7));
        assert_eq!(
            statements(&mut manager),
            ["INSERT INTO Animal (FULLNAME,AGE) VALUES ('alex',23)"]
        );
    }

    #[test]
    fn save_bound_sends_parameters() {
        let mut manager = manager(RecordingConnection {
            generated_key: Some(1),
            ..Default::default()
        });
        let mut animal = Animal {
            id: None,
            name: "O'Brien".into(),
            age: 30,
        };
        manager.save_bound(&mut animal).unwrap();
        let (sql, params) = &manager.connection_mut().unwrap().statements[0];
        assert_eq!(sql, "INSERT INTO Animal (FULLNAME,AGE) VALUES (?,?)");
        assert_eq!(
            params,
            &[Value::Varchar(Some("O'Brien".into())), Value::Int32(Some(30))]
        );
    }

    #[test]
    fn save_without_generated_key() {
        let mut manager = manager(Default::default());
        let mut animal = Animal::default();
        let result = manager.save(&mut animal);
        assert!(
            matches!(result, Err(Error::NoGeneratedKey { entity: "Animal", .. })),
            "{:?}",
            result
        );
        assert_eq!(animal.id, None);
    }

    #[test]
    fn update_statements() {
        let mut manager = manager(RecordingConnection {
            affected: 1,
            ..Default::default()
        });
        let animal = Animal {
            id: Some(2),
            name: "vitya".into(),
            age: 23,
        };
        assert_eq!(manager.update(&animal).unwrap(), 1);
        assert_eq!(manager.update_bound(&animal).unwrap(), 1);
        let connection = manager.connection_mut().unwrap();
        assert_eq!(
            connection.statements[0].0,
            "UPDATE Animal SET FULLNAME='vitya',AGE=23 WHERE ID = 2"
        );
        assert_eq!(
            connection.statements[1].0,
            "UPDATE Animal SET FULLNAME=?,AGE=? WHERE ID = ?"
        );
        assert_eq!(
            connection.statements[1].1,
            [
                Value::Varchar(Some("vitya".into())),
                Value::Int32(Some(23)),
                Value::Int64(Some(2)),
            ]
        );
    }

    #[test]
    fn unmarked_type_sends_nothing() {
        let mut manager = manager(Default::default());
        assert!(matches!(
            manager.prepare_repository_for::<Unmarked>(),
            Err(Error::MissingEntityMarker { .. })
        ));
        assert!(matches!(
            manager.save(&mut Unmarked::default()),
            Err(Error::MissingEntityMarker { .. })
        ));
        assert!(matches!(
            manager.update(&Unmarked::default()),
            Err(Error::MissingEntityMarker { .. })
        ));
        assert!(matches!(
            manager.get_all::<Unmarked>(),
            Err(Error::MissingEntityMarker { .. })
        ));
        assert!(statements(&mut manager).is_empty());
        assert!(manager.descriptor::<Unmarked>().is_none());
    }

    #[test]
    fn missing_identity_sends_nothing() {
        let mut manager = manager(Default::default());
        assert!(matches!(
            manager.prepare_repository_for::<Note>(),
            Err(Error::MissingIdentityField { entity: "Note" })
        ));
        assert!(matches!(
            manager.save(&mut Note::default()),
            Err(Error::MissingIdentityField { .. })
        ));
        assert!(matches!(
            manager.update(&Note::default()),
            Err(Error::MissingIdentityField { .. })
        ));
        assert!(statements(&mut manager).is_empty());
    }

    #[test]
    fn unsupported_type_sends_nothing() {
        let mut manager = manager(Default::default());
        let result = manager.prepare_repository_for::<Measure>();
        assert!(
            matches!(
                result,
                Err(Error::UnsupportedType {
                    entity: "Measure",
                    field: "value",
                    type_name: "f64",
                })
            ),
            "{:?}",
            result
        );
        assert!(statements(&mut manager).is_empty());
    }

    #[test]
    fn get_all_maps_rows() {
        let labels: Arc<[String]> = ["id", "FullName", "AGE"].map(String::from).into();
        let mut manager = manager(RecordingConnection {
            rows: vec![
                RowLabeled::new(
                    labels.clone(),
                    [
                        Value::Int64(Some(1)),
                        Value::Varchar(Some("alex".into())),
                        Value::Int64(Some(23)),
                    ]
                    .into(),
                ),
                RowLabeled::new(
                    labels,
                    [
                        Value::Int64(Some(2)),
                        Value::Varchar(Some("alexey".into())),
                        Value::Int64(Some(26)),
                    ]
                    .into(),
                ),
            ],
            ..Default::default()
        });
        let animals = manager.get_all::<Animal>().unwrap();
        assert_eq!(
            animals,
            [
                Animal {
                    id: Some(1),
                    name: "alex".into(),
                    age: 23,
                },
                Animal {
                    id: Some(2),
                    name: "alexey".into(),
                    age: 26,
                },
            ]
        );
        assert_eq!(statements(&mut manager), ["SELECT * FROM Animal"]);
    }

    #[test]
    fn get_all_discards_partial_results() {
        let labels: Arc<[String]> = ["ID", "FULLNAME", "AGE"].map(String::from).into();
        let mut manager = manager(RecordingConnection {
            rows: vec![
                RowLabeled::new(
                    labels.clone(),
                    [
                        Value::Int64(Some(1)),
                        Value::Varchar(Some("alex".into())),
                        Value::Int64(Some(23)),
                    ]
                    .into(),
                ),
                RowLabeled::new(
                    labels,
                    [
                        Value::Int64(Some(2)),
                        Value::Varchar(Some("alexey".into())),
                        Value::Varchar(Some("old".into())),
                    ]
                    .into(),
                ),
            ],
            ..Default::default()
        });
        let result = manager.get_all::<Animal>();
        assert!(
            matches!(&result, Err(Error::RowMappingError { column, .. }) if column == "AGE"),
            "{:?}",
            result
        );
    }

    #[test]
    fn get_all_missing_column() {
        let mut manager = manager(RecordingConnection {
            rows: vec![RowLabeled::new(
                ["ID", "FULLNAME"].map(String::from).into(),
                [Value::Int64(Some(1)), Value::Varchar(Some("alex".into()))].into(),
            )],
            ..Default::default()
        });
        assert!(matches!(
            manager.get_all::<Animal>(),
            Err(Error::RowMappingError { column, .. }) if column == "AGE"
        ));
    }

    #[test]
    fn closed_manager() {
        let mut manager = manager(Default::default());
        assert!(manager.is_open());
        manager.register::<Animal>().unwrap();
        manager.close().unwrap();
        assert!(!manager.is_open());
        assert!(matches!(
            manager.prepare_repository_for::<Animal>(),
            Err(Error::ConnectionError { .. })
        ));
        assert!(matches!(
            manager.save(&mut Animal::default()),
            Err(Error::ConnectionError { .. })
        ));
        assert!(matches!(
            manager.get_all::<Animal>(),
            Err(Error::ConnectionError { .. })
        ));
        assert!(matches!(
            manager.connection_mut(),
            Err(Error::ConnectionError { .. })
        ));
        assert!(manager.descriptor::<Animal>().is_some());
        manager.close().unwrap();
    }
}
