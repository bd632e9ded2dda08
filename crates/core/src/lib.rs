//! Core types and traits for quietfeed
//!
//! This crate contains domain types shared across all other crates: post
//! identity, moderation state, the feed adapter seam, and configuration.

mod config;
mod constants;
mod feed;
mod post;
mod state;

pub use config::*;
pub use constants::*;
pub use feed::*;
pub use post::*;
pub use state::*;
