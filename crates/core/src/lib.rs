//! # SpeakMatch Core
//!
//! Domain types shared across the SpeakMatch workspace: the error taxonomy,
//! wire and domain models for rooms, participants, presence and speaking
//! requests, room-code generation, and the timezone-sensitive schedule
//! validation logic. This crate performs no I/O.

pub mod errors;
pub mod models;
pub mod room_code;
pub mod timeclock;
