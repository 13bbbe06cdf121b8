//! Library exports for xsnip.
//!
//! The binary is a thin wrapper around these modules. Everything except
//! [`backend::xorg`] works without an X server, which is how the selection
//! state machine and capture pipeline are tested.

pub mod backend;
pub mod capture;
pub mod config;
pub mod geometry;
pub mod selection;

pub use config::Config;
