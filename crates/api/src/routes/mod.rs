pub mod health;
pub mod requests;
pub mod rooms;
pub mod schedule;
pub mod users;
