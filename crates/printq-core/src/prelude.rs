pub use crate::app::App;
pub use printq_types::prelude::*;

// vim: ts=4
