//! Integration tests for Sitemap-Warmer
//!
//! These tests run complete warm runs against wiremock servers.

mod warm_tests;
