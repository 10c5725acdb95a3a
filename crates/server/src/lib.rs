//! HTTP front end for the travel cost predictor

pub mod api;
pub mod config;
