//! Data models and request/response types

pub mod book;
pub mod borrow;
pub mod user;
