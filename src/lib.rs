//! Freight: cargo booking, routing and delivery tracking.
//!
//! A cargo's [`model::Delivery`] is derived from its itinerary and handling
//! history on every change. The [`service`] layer wires the derivation into
//! booking, handling registration, inspection and tracking use cases over
//! the collaborator traits in [`repository`].

pub mod cli;
pub mod config;
pub mod error;
pub mod inmem;
pub mod logging;
pub mod model;
pub mod repository;
pub mod service;
pub mod storage;

pub use error::{Error, Result};
