pub mod hub;

pub use hub::{NotificationHub, StatusMessage, StatusPayload};
