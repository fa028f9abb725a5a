//! Request and Response models for the tokeninfo proxy
//!
//! This module defines the inbound query model (and its validation) and the
//! JSON error body written for failed requests.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::TokenQuery;
pub use responses::ErrorResponse;
