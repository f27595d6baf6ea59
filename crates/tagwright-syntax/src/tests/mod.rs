//! Crate-internal tests.
