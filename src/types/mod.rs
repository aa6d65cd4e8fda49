pub mod attempt;
pub mod response;
pub mod result;
pub mod trip;

pub use attempt::ModelAttempt;
pub use response::{ChatCompletionResponse, MessageContent, NormalizedCompletion};
pub use result::{Itinerary, TokenUsage};
pub use trip::TripRequest;
