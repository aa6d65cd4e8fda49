//! travel-guide-rs: day-by-day travel itineraries from an LLM, exported as PDF
//!
//! A [`CompletionRequester`] walks a prioritized list of chat models until one
//! returns usable markdown, and the [`render`] module turns that markdown into a
//! paginated Letter-size PDF.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use travel_guide_rs::{render, CompletionRequester, GuideConfig, TripRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GuideConfig::from_env()?;
//!     let requester = CompletionRequester::from_config(&config);
//!
//!     let trip = TripRequest::new("Paris, France", "5").with_special_interests("Museums, food");
//!     let itinerary = requester.generate(&trip).await?;
//!     println!("Model: {}\n{}", itinerary.model_used, itinerary.text);
//!
//!     let pdf = render::render(&itinerary.text, &trip.destination)?;
//!     std::fs::write(trip.suggested_filename(), pdf)?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod render;
pub(crate) mod services;
pub mod session;
pub mod types;

pub use config::{GuideConfig, FALLBACK_MODELS};
pub use core::{
    build_user_prompt, CompletionProvider, CompletionRequester, OpenAIProvider, SYSTEM_PROMPT,
};
pub use error::{GuideError, Result};
pub use render::{parse_markdown, PageElement, RenderedDocument};
pub use services::openai_client::{ChatCompletionRequest, OpenAIClient};
pub use session::{GenerationOutcome, GuideSession};
pub use types::{Itinerary, ModelAttempt, NormalizedCompletion, TokenUsage, TripRequest};

#[cfg(feature = "cli")]
pub mod cli;
