//! Wire adapters for external generative-language services.

pub mod gemini;
