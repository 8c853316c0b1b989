//! Route handlers

pub mod samples;
pub mod session;
pub mod status;
