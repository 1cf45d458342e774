//! Unit tests for gateway services.

mod controller_tests;
mod registry_tests;
mod support;
