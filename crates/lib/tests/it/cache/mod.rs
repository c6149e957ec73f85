//! Local cache tests

mod file_cache_tests;
