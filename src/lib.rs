//! dolua drives the DigitalOcean API from Lua scripts.
//!
//! The layering goes bottom up: [`api`] speaks HTTP and owns the wire
//! types, [`cloud`] groups operations into per-resource clients behind the
//! [`cloud::Cloud`] trait, and [`script`] exposes those clients to an
//! embedded Lua runtime as the global `cloud` object.

pub mod api;
pub mod cloud;
pub mod config;
pub mod repl;
pub mod script;
