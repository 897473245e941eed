use crate::{Animal, silent_logs};
use orma::{Connection, EntityManager, Error};

pub fn literals<C: Connection>(manager: &mut EntityManager<C>) {
    manager
        .prepare_repository_for::<Animal>()
        .expect("Failed to prepare the Animal table");

    // Quotes are spliced as they are and break the statement
    let mut irish = Animal::new("O'Brien", 30);
    let result;
    silent_logs! {
        result = manager.save(&mut irish);
    }
    match result {
        Err(Error::ExecutionError { sql, .. }) => {
            assert_eq!(sql, "INSERT INTO Animal (FULLNAME,AGE) VALUES ('O'Brien',30)")
        }
        other => panic!("Expected an execution error, got {:?}", other),
    }
    assert_eq!(irish.id, None);
    assert!(manager.get_all::<Animal>().unwrap().is_empty());

    // Bound values are stored intact
    manager
        .save_bound(&mut irish)
        .expect("Failed to save O'Brien with bound values");
    assert!(irish.id.is_some());
    let animals = manager.get_all::<Animal>().unwrap();
    assert_eq!(animals, [irish.clone()]);
    assert_eq!(animals[0].name, "O'Brien");

    irish.name = "O'Brien'; DROP TABLE Animal; --".into();
    assert_eq!(manager.update_bound(&irish).unwrap(), 1);
    let animals = manager.get_all::<Animal>().unwrap();
    assert_eq!(animals, [irish]);

    // Values that need no quoting round trip through both paths
    let mut empty = Animal::new("", -7);
    manager.save(&mut empty).expect("Failed to save an empty name");
    let found = manager
        .get_all::<Animal>()
        .unwrap()
        .into_iter()
        .find(|v| v.id == empty.id)
        .expect("Could not find the animal with an empty name");
    assert_eq!(found, empty);
}
