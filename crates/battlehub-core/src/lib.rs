//! Core contracts for the BattleHub client: the persistent storage backend,
//! session types, the authenticator seam, match schedule helpers and prize splits.
//! Kept free of crypto and HTTP so every other crate can depend on it.

pub mod auth;
pub mod prize;
pub mod schedule;
pub mod session;
pub mod storage;
