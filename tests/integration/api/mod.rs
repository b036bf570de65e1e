//! API integration tests
//!
//! One module per resource, all going through the HTTP router.

mod auth_test;
mod profile_test;
mod project_test;
mod sprint_test;
