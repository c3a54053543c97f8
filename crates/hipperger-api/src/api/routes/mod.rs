//! API route handlers

pub mod health;
pub mod login;
pub mod profile;
pub mod signup;
