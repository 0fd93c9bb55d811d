pub mod config;
pub mod countdown;
pub mod event;
pub mod reveal;
