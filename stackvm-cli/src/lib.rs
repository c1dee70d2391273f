//! Library half of the `stackvm` binary: command implementations and log
//! setup, kept here so they can be unit tested.

pub mod commands;
pub mod logging;
