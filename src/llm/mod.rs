pub mod client;
pub mod generator;
pub mod prompts;
pub mod types;

pub use client::*;
pub use generator::*;
pub use types::*;
