//! HTTP API handlers for earmark-rv

pub mod annotations;
pub mod audio;
pub mod corpus;
pub mod health;
pub mod labels;
pub mod status;
