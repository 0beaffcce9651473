//! API route handlers

pub mod detection;
pub mod events;
