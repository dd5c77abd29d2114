//! Core functionalities.
mod batch;
mod env;
mod policy;
mod replay_buffer;
mod sampler;
mod space;
pub use batch::{fields, Column, SampleBatch, Transition};
pub use env::{Env, Step};
pub use policy::{Action, Policy};
pub use replay_buffer::{ExperienceBufferBase, ReplayBufferBase};
pub use sampler::{GlobalVars, Sampler};
pub use space::Space;
