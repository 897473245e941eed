use crate::{Animal, silent_logs};
use orma::{Connection, Entity, EntityManager, Error};

/// Same shape as `Animal` without the entity marker.
#[derive(Default, Debug, Entity)]
struct Unmarked {
    #[orma(id)]
    id: Option<i64>,
    #[orma(column = "Fullname")]
    name: String,
    #[orma(column)]
    age: i32,
}

#[derive(Default, Debug, Entity)]
#[orma(entity = "Note")]
struct Note {
    #[orma(column)]
    text: String,
}

#[derive(Default, Debug, Entity)]
#[orma(entity = "Measure")]
struct Measure {
    #[orma(id)]
    id: Option<i64>,
    #[orma(column)]
    label: String,
    #[orma(column)]
    value: f64,
}

#[derive(Default, Debug, Entity)]
#[orma(entity = "Twin")]
struct Twin {
    #[orma(id)]
    id: Option<i64>,
    #[orma(id)]
    other: Option<i64>,
    #[orma(column)]
    name: String,
}

pub fn unmarked<C: Connection>(manager: &mut EntityManager<C>) {
    manager
        .prepare_repository_for::<Animal>()
        .expect("Failed to prepare the Animal table");
    manager
        .save(&mut Animal::new("alex", 23))
        .expect("Failed to save alex");
    let before = manager.get_all::<Animal>().unwrap();

    assert!(matches!(
        manager.prepare_repository_for::<Unmarked>(),
        Err(Error::MissingEntityMarker { .. })
    ));
    let mut unmarked = Unmarked {
        id: before[0].id,
        name: "vitya".into(),
        age: 1,
    };
    assert!(matches!(
        manager.save(&mut unmarked),
        Err(Error::MissingEntityMarker { .. })
    ));
    assert!(matches!(
        manager.update(&unmarked),
        Err(Error::MissingEntityMarker { .. })
    ));
    assert!(matches!(
        manager.get_all::<Unmarked>(),
        Err(Error::MissingEntityMarker { .. })
    ));
    assert!(manager.descriptor::<Unmarked>().is_none());
    assert_eq!(manager.get_all::<Animal>().unwrap(), before);
}

pub fn missing_identity<C: Connection>(manager: &mut EntityManager<C>) {
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
    silent_logs! {
        // The table was never created
        assert!(matches!(
            manager.get_all::<Note>(),
            Err(Error::ExecutionError { .. })
        ));
    }
}

pub fn unsupported_type<C: Connection>(manager: &mut EntityManager<C>) {
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
    silent_logs! {
        assert!(matches!(
            manager.get_all::<Measure>(),
            Err(Error::ExecutionError { .. })
        ));
    }
}

pub fn two_identities<C: Connection>(manager: &mut EntityManager<C>) {
    assert!(matches!(
        manager.prepare_repository_for::<Twin>(),
        Err(Error::DuplicateIdentityField {
            entity: "Twin",
            first: "id",
            second: "other",
        })
    ));
    let mut twin = Twin {
        name: "alex".into(),
        ..Default::default()
    };
    assert!(matches!(
        manager.save(&mut twin),
        Err(Error::DuplicateIdentityField { .. })
    ));
    assert_eq!(twin.id, None);
    assert!(matches!(
        manager.get_all::<Twin>(),
        Err(Error::DuplicateIdentityField { .. })
    ));
    assert!(manager.descriptor::<Twin>().is_none());
}

pub fn closed<C: Connection>(mut manager: EntityManager<C>) {
    assert!(manager.is_open());
    manager.close().expect("Failed to close the connection");
    assert!(!manager.is_open());
    assert!(matches!(
        manager.prepare_repository_for::<Animal>(),
        Err(Error::ConnectionError { .. })
    ));
    assert!(matches!(
        manager.save(&mut Animal::new("alex", 23)),
        Err(Error::ConnectionError { .. })
    ));
    assert!(matches!(
        manager.update(&Animal::new("alex", 23)),
        Err(Error::ConnectionError { .. })
    ));
    assert!(matches!(
        manager.get_all::<Animal>(),
        Err(Error::ConnectionError { .. })
    ));
    assert!(manager.close().is_ok());
}
