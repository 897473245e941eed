use orma::{Connection, Entity, EntityManager};
use std::collections::HashSet;

#[derive(Default, Debug, Clone, PartialEq, Entity)]
#[orma(entity = "Animal")]
pub struct Animal {
    #[orma(id)]
    pub id: Option<i64>,
    #[orma(column = "Fullname")]
    pub name: String,
    #[orma(column = "Age")]
    pub age: i32,
}

impl Animal {
    pub fn new(name: &str, age: i32) -> Self {
        Self {
            id: None,
            name: name.into(),
            age,
        }
    }
}

pub fn animals<C: Connection>(manager: &mut EntityManager<C>) {
    // Setup
    manager
        .prepare_repository_for::<Animal>()
        .expect("Failed to prepare the Animal table");
    let animals = manager
        .get_all::<Animal>()
        .expect("Failed to get the animals");
    assert!(animals.is_empty());

    // Save
    let mut alex = Animal::new("alex", 23);
    let mut alexey = Animal::new("alexey", 26);
    manager.save(&mut alex).expect("Failed to save alex");
    manager.save(&mut alexey).expect("Failed to save alexey");
    assert!(alex.id.is_some());
    assert!(alexey.id.is_some());
    assert_ne!(alex.id, alexey.id);
    let mut ids = HashSet::from([alex.id, alexey.id]);
    for i in 0..10 {
        let mut animal = Animal::new("bulk", i);
        manager.save(&mut animal).expect("Failed to save bulk");
        assert!(ids.insert(animal.id), "Identity {:?} was reused", animal.id);
    }

    // Round trip
    let animals = manager
        .get_all::<Animal>()
        .expect("Failed to get the animals");
    assert_eq!(animals.len(), 12);
    let found = animals
        .iter()
        .find(|v| v.id == alex.id)
        .expect("Could not find alex");
    assert_eq!(*found, alex);
    assert_eq!(found.name, "alex");
    assert_eq!(found.age, 23);

    // Update
    let mut vitya = alexey.clone();
    vitya.name = "vitya".into();
    vitya.age = 23;
    assert_eq!(manager.update(&vitya).expect("Failed to update alexey"), 1);
    let animals = manager
        .get_all::<Animal>()
        .expect("Failed to get the animals");
    let found = animals
        .iter()
        .find(|v| v.id == alexey.id)
        .expect("Could not find the updated animal");
    assert_eq!(*found, vitya);
    assert_eq!(animals.len(), 12);

    // Update bound
    vitya.age = 24;
    assert_eq!(manager.update_bound(&vitya).expect("Failed to update vitya"), 1);
    let animals = manager
        .get_all::<Animal>()
        .expect("Failed to get the animals");
    assert!(animals.contains(&vitya));

    // Update of a missing row
    let before = manager
        .get_all::<Animal>()
        .expect("Failed to get the animals");
    let ghost = Animal {
        id: Some(i64::MAX),
        name: "ghost".into(),
        age: 1,
    };
    assert_eq!(manager.update(&ghost).expect("Failed to update ghost"), 0);
    let never_saved = Animal::new("nobody", 5);
    assert_eq!(
        manager
            .update(&never_saved)
            .expect("Failed to update an unsaved animal"),
        0
    );
    let after = manager
        .get_all::<Animal>()
        .expect("Failed to get the animals");
    assert_eq!(before, after);
}

pub fn prepare_twice<C: Connection>(manager: &mut EntityManager<C>) {
    manager
        .prepare_repository_for::<Animal>()
        .expect("Failed to prepare the Animal table");
    manager
        .save(&mut Animal::new("alex", 23))
        .expect("Failed to save alex");
    assert_eq!(manager.get_all::<Animal>().unwrap().len(), 1);
    manager
        .prepare_repository_for::<Animal>()
        .expect("Failed to prepare the Animal table again");
    manager
        .prepare_repository_for::<Animal>()
        .expect("Failed to prepare the Animal table a third time");
    assert!(manager.get_all::<Animal>().unwrap().is_empty());
}
