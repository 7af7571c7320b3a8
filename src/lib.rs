#![cfg_attr(not(test), deny(clippy::panic))]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_excessive_bools,
    clippy::too_many_lines
)]

//! # Werewolf Server
//!
//! Authoritative server for the Werewolf social-deduction game. Clients hold
//! a WebSocket channel to the server; the server owns all game state, drives
//! each room through its timed phase machine, and delivers role-specific
//! private information alongside redacted public broadcasts.

/// Role enumeration, capabilities table and game templates
pub mod catalog;

/// Server configuration (file-based with defaults)
pub mod config;

/// Inbound frame routing and per-recipient error replies
pub mod dispatch;

/// Game error types
pub mod error;

/// Game engine: state, rules, phase machine, room coordinator
pub mod game;

/// HTTP bootstrap surface and the WebSocket channel
pub mod http;

/// Structured logging configuration
pub mod logging;

/// Persistent player profiles (file-backed)
pub mod profiles;

/// WebSocket message protocol definitions
pub mod protocol;

/// Open-channel registry keyed by (room, player)
pub mod registry;

/// Server orchestration: the room registry
pub mod server;
