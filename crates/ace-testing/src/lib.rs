//! Testing utilities and harness for the Ace UI runtime.

mod invariants;
mod rule;

pub use invariants::{check_tree_invariants, TreeViolation};
pub use rule::{run_ui_test, EventLog, UiTestRule};

/// Routes `log` output through `env_logger` once per test binary. Safe to
/// call from every test.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub mod prelude {
    pub use crate::{check_tree_invariants, init_logging, run_ui_test, EventLog, UiTestRule};
    pub use ace_ui::prelude::*;
}
