#![doc = "The `taskauth` library crate."]
#![doc = ""]
#![doc = "Credential issuance and verification for the task-tracking app: user"]
#![doc = "registration over a credential store, password login that mints signed"]
#![doc = "bearer tokens, and the token gate protected routes run behind."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;
