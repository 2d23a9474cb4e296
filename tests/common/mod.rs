use std::sync::Once;

use env_logger::Builder;
use log::LevelFilter;

static INIT: Once = Once::new();

pub fn initialize_logger() {
    INIT.call_once_force(|_| {
        let mut builder = Builder::new();

        builder
            .filter_level(LevelFilter::Info)
            .filter_module("ordered_hash_table", LevelFilter::Debug)
            .is_test(true)
            .parse_default_env();

        // another test binary may have set a logger up already
        let _ = builder.try_init();
    });
}
