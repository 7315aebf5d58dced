//! Route tables for the proxied clinical backends
//!
//! One module per upstream. Each exposes a `routes()` constructor that
//! compiles the full table for that backend; any malformed template in
//! the table fails the whole build, so a misconfigured gateway never
//! starts serving.

pub mod demographic;
pub mod ehr;
pub mod provenance;
