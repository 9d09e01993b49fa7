//! Command handlers for the authport CLI

pub mod login;
