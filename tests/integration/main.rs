//! Integration tests for Elidune circulation

mod api_tests;
mod scenarios;
