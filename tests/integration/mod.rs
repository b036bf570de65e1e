//! Integration tests

mod api;
