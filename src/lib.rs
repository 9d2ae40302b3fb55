pub mod api;
pub mod config;
pub mod listener;
pub mod notes;
pub mod sync;
