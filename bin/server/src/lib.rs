//! spa-receptionist HTTP server.
//!
//! This crate provides the phone webhooks, the web chat endpoint and the
//! tool endpoint, all backed by the same dialogue loop and service catalog.

pub mod config;
pub mod db;
pub mod error;
pub mod prompt;
pub mod routes;
pub mod startup;
pub mod state;
pub mod twiml;
