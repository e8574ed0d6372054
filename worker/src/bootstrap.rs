//! Logging/panic-hook setup shared by the four worker binaries, matching
//! the teacher's `lgn-worker::main::setup_logging`.
use std::panic;

use backtrace::Backtrace;
use tracing::error;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

pub fn setup_logging(json: bool) {
    let env_filter = EnvFilter::builder().with_default_directive(LevelFilter::INFO.into()).from_env_lossy();
    if json {
        tracing_subscriber::fmt().json().with_target(true).with_env_filter(env_filter).init();
    } else {
        tracing_subscriber::fmt().compact().with_target(true).with_env_filter(env_filter).init();
    }
}

pub fn install_panic_hook(worker_name: &'static str) {
    panic::set_hook(Box::new(move |panic_info| {
        error!("{worker_name} panicked: {panic_info} {:?}", Backtrace::new());
    }));
}
