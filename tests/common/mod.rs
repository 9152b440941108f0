#![allow(dead_code)]

pub use warmrun_test_utils::builders;
pub use warmrun_test_utils::fakes;
pub use warmrun_test_utils::project;
pub use warmrun_test_utils::{init_tracing, with_timeout};
