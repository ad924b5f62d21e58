//! Integration tests for provisio
//!
//! These tests spawn the actual binary or drive a real local shell.
//! They are slower and should be run separately from unit tests.

mod cli_tests;
mod local_e2e;
