//! Generative model provider implementations for MathMentor.
//!
//! All providers implement the `mathmentor_core::Provider` trait; the Gemini
//! provider additionally implements `Transcriber` for image/audio input.
//! The factory builds the configured provider at startup.

pub mod factory;
pub mod gemini;

pub use factory::build_from_config;
pub use gemini::GeminiProvider;
