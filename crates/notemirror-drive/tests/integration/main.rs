//! Integration tests for notemirror-drive
//!
//! Uses wiremock to simulate the Google token endpoint and the Drive v3
//! API, and verifies the wire behavior of the authorizer and the remote
//! store.

mod common;

mod test_auth;
mod test_list;
mod test_upsert_delete;
