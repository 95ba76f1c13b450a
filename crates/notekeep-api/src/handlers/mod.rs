//! HTTP handlers for notekeep-api.

pub mod labels;
pub mod notes;
pub mod system;
