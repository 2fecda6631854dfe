//! Database module tests
