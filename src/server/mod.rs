//! Connection acceptance and operator control.

pub mod context;
pub mod control;
pub mod listener;
