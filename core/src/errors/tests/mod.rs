//! Tests for domain error mapping

mod domain_error_tests;
