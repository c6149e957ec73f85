//! Key and identity derivation tests

mod derivation_tests;
