//! Command line front end for the `relogin` interceptor.
//!
//! `relogin request` sends requests through a [`relogin::TokenSession`] built from a
//! JSON config file, and `relogin mock-server` runs a local API with token and
//! cookie endpoints to try sessions against.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod mock_server;
pub mod output;
