//! Resume builder backend: AI-assisted resume parsing, writing suggestions,
//! and a chat interview that produces structured resume data.

pub mod ai;
pub mod assist;
pub mod config;
pub mod errors;
pub mod interview;
pub mod models;
pub mod routes;
pub mod state;
