//! Search provider implementations.

pub mod gemini;
pub mod mock;

pub use gemini::GeminiClient;
pub use mock::MockClient;
