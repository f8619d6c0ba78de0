//! Request middleware.

pub mod request_id;
