//! Session tests

mod fallback_tests;
mod persist_tests;
