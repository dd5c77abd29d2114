//! A replay buffer storing transitions field by field.
mod base;
mod config;
mod field;
pub use base::ReplayBuffer;
pub use config::ReplayBufferConfig;
pub use field::ReplayField;
