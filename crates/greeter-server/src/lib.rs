#![doc = include_str!("../README.md")]

pub mod config;
pub mod database;
pub mod error;
pub mod handler;
pub mod interceptor;
pub mod server;
pub mod service;
pub mod telemetry;

#[cfg(test)]
mod test_support;

pub use error::{Error, Result};
