use orma::{Entity, EntityManager, Properties};
use orma_sqlite::SqliteConnection;
use std::env;

#[derive(Default, Debug, Entity)]
#[orma(entity = "Animal")]
struct Animal {
    #[orma(id)]
    id: Option<i64>,
    #[orma(column = "Fullname")]
    name: String,
    #[orma(column = "Age")]
    age: i32,
}

impl Animal {
    fn new(name: &str, age: i32) -> Self {
        Self {
            id: None,
            name: name.into(),
            age,
        }
    }
}

/// Usage: `cargo run --example animals [file.toml] [key]`
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let mut args = env::args().skip(1);
    let properties = match args.next() {
        Some(path) => Properties::load(path)?,
        None => {
            let mut properties = Properties::new();
            properties.set("demo.url", "sqlite://:memory:");
            properties
        }
    };
    let key = args.next().unwrap_or("demo".into());
    let mut manager = EntityManager::<SqliteConnection>::open(&properties, &key)?;
    manager.prepare_repository_for::<Animal>()?;
    let mut alex = Animal::new("alex", 23);
    let mut alexey = Animal::new("alexey", 26);
    manager.save(&mut alex)?;
    manager.save(&mut alexey)?;
    let vitya = Animal {
        id: alexey.id,
        ..Animal::new("vitya", 23)
    };
    println!("{}", manager.update(&vitya)?);
    for animal in manager.get_all::<Animal>()? {
        println!("{} {} {}", animal.id.unwrap_or_default(), animal.name, animal.age);
    }
    manager.close()?;
    Ok(())
}
