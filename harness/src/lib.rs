//! Load-generation harness for a Keycloak-compatible identity admin API.
//!
//! The harness continuously creates groups, subgroups, and users against a
//! remote identity provider, keeping admin credentials fresh and accumulating
//! latency and error statistics that are reported once per cycle.
//!
//! Layout follows a ports-and-adapters split: `domain` owns the cycle
//! orchestration, credential lease management, and metrics accumulation
//! behind ports; `outbound` holds the reqwest-backed Keycloak adapter;
//! `runner` wires the outer loop together for the binary.

pub mod config;
pub mod domain;
pub mod outbound;
pub mod runner;

#[cfg(test)]
mod test_support;
