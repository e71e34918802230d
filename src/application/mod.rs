// アプリケーション層 - エンジンの組み立てと進行制御

pub mod cascade;
pub mod config;
pub mod engine;
pub mod interaction;

pub use cascade::{CascadeOutcome, CascadeResolver, CascadeStep, FallMove};
pub use config::EngineConfig;
pub use engine::{Engine, Phase};
pub use interaction::{InputOutcome, Selection};
