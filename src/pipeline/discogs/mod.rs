//! Discogs API integration
//!
//! Resolves album names to master releases and their tracklists.
//! Requests are authenticated with a personal access token.
//!
//! API docs: https://www.discogs.com/developers

pub mod dto;
mod adapter;
mod client;

pub use adapter::{strip_disambiguation, to_hits, to_master};
pub use client::DiscogsClient;
