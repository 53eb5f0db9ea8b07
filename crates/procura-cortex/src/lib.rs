//! Snowflake Cortex REST clients.
//!
//! [`CortexClient`] talks to three endpoints: Analyst (question to SQL over
//! a semantic model), SQL statements (runs that SQL), and inference Complete.
//! It implements the router's backend traits, so a connected client can be
//! dropped straight into [`procura_chat::Backends`].

pub mod analyst;
pub mod backend;
pub mod client;
pub mod complete;
pub mod error;
pub mod statements;

pub use backend::{connect, CortexConnection, RawCompletion};
pub use client::CortexClient;
pub use error::CortexError;
