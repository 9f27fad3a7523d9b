//! Herald - text-command assistant with timers and reminders

pub mod command;
pub mod core;
pub mod llm;
pub mod scheduler;
pub mod services;
pub mod session;
