//! Google Gemini provider implementation

pub mod client;
pub mod generator;
pub mod types;

pub use client::GeminiClient;
pub use generator::GeminiTaskGenerator;
