//! Test suites for the parley relay daemon.

pub(crate) mod support;
