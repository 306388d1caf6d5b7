//! Value Object Module

pub mod auth_event;
pub mod email;
pub mod password;
