//! Unit tests for provisio
//!
//! These tests use mocked dependencies and run fast without external I/O.

mod flow_tests;
