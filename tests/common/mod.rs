//! Shared infrastructure for end-to-end tests
//!
//! Every test spawns its own `TestServer` (temp database, temp media directory,
//! recording notifier and three seeded accounts) and talks to it through `TestClient`.

#![allow(dead_code)]

mod client;
mod constants;
mod fixtures;
mod server;

#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::{DocumentSeed, SeededUsers};
#[allow(unused_imports)]
pub use server::TestServer;
