//! Crate-level controller and BDD tests.

pub(crate) mod support;
