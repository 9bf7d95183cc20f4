//! Umbrella: rain forecast presentation and a terminal client for it.
//!
//! The heart of the crate is [`presentation`], which turns a forecast payload
//! and a display unit into a render-ready view. [`session`] owns the unit
//! preference and the last forecast; [`client`] and [`preferences`] are the
//! network and persistence collaborators; [`app`] and [`report`] render views.

pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod errors;
pub mod preferences;
pub mod presentation;
pub mod report;
pub mod session;
pub mod units;
pub mod weather;
