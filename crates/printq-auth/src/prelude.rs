pub use printq_core::prelude::*;

// vim: ts=4
