//! Simple to use command-line time tracker. Projects are started and stopped by name, every
//! start/stop pair becomes a session, and reports show how far along a project is towards its
//! hours goal.

pub mod cli;
pub mod console;
pub mod manager;
pub mod storage;
pub mod utils;
