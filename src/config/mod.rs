// src/config/mod.rs
pub mod relay;

pub use relay::{bot_token_from_env, RelayConfig, WindowMode};
