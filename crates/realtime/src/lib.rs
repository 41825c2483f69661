//! # SpeakMatch Realtime
//!
//! The realtime subsystem: per-room change-feed subscriptions over Postgres
//! LISTEN/NOTIFY, an ephemeral in-process presence hub, the live-request
//! notification center, and the channel registry that tracks every open
//! subscription so re-subscribing or leaving a room never leaks listeners.
//!
//! Subscription callbacks fire asynchronously and independently of the CRUD
//! calls that caused them; a local mutation and the remote notification of
//! that same mutation are only eventually consistent.

pub mod events;
pub mod feed;
pub mod notify;
pub mod presence;
pub mod registry;

pub use notify::NotificationCenter;
pub use presence::PresenceHub;
pub use registry::ChannelRegistry;
