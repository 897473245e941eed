mod animals;
mod failures;
mod literals;

use animals::{animals, prepare_twice};
use failures::{closed, missing_identity, two_identities, unmarked, unsupported_type};
use literals::literals;
use log::LevelFilter;
use orma::{Connection, EntityManager};
use std::env;

pub use animals::Animal;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Runs every scenario against `connection`, then closes it.
pub fn execute_tests<C: Connection>(connection: C) {
    let mut manager = EntityManager::new(connection);
    animals(&mut manager);
    prepare_twice(&mut manager);
    literals(&mut manager);
    unmarked(&mut manager);
    missing_identity(&mut manager);
    unsupported_type(&mut manager);
    two_identities(&mut manager);
    closed(manager);
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
