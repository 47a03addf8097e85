use std::sync::Once;

use env_logger::Builder;
use log::LevelFilter;

static INIT: Once = Once::new();

/// Route `log` output from the table to the test harness. Honors `RUST_LOG`.
pub fn init_logger() {
    INIT.call_once_force(|_| {
        let mut builder = Builder::new();
        builder
            .filter_level(LevelFilter::Warn)
            .filter_module("chain_table", LevelFilter::Debug)
            .is_test(true)
            .parse_default_env();
        // Another test binary thread may have installed a logger already.
        let _ = builder.try_init();
    });
}
