use tracing::{info, warn};

use crate::{
    core::requester::CompletionRequester,
    error::{GuideError, Result},
    render::{render_document, RenderedDocument},
    types::{result::Itinerary, trip::TripRequest, TokenUsage},
};

/// Everything one successful generation cycle produced.
///
/// The document is kept as a `Result`: a failed PDF build never discards the
/// itinerary text, which stays available to show or copy.
#[derive(Debug)]
pub struct GenerationOutcome {
    pub itinerary: Itinerary,
    pub document: Result<RenderedDocument>,
}

impl GenerationOutcome {
    pub fn document(&self) -> Option<&RenderedDocument> {
        self.document.as_ref().ok()
    }

    pub fn document_error(&self) -> Option<&GuideError> {
        self.document.as_ref().err()
    }
}

/// State owned by the front end between user actions.
///
/// The core stays stateless; this is the only place the current trip and the
/// last generated plan live.
#[derive(Debug, Default)]
pub struct GuideSession {
    trip: Option<TripRequest>,
    outcome: Option<GenerationOutcome>,
}

impl GuideSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trip(&self) -> Option<&TripRequest> {
        self.trip.as_ref()
    }

    pub fn outcome(&self) -> Option<&GenerationOutcome> {
        self.outcome.as_ref()
    }

    pub fn travel_plan(&self) -> Option<&str> {
        self.outcome.as_ref().map(|o| o.itinerary.text.as_str())
    }

    pub fn last_model_used(&self) -> Option<&str> {
        self.outcome.as_ref().map(|o| o.itinerary.model_used.as_str())
    }

    pub fn last_usage(&self) -> Option<&TokenUsage> {
        self.outcome.as_ref().and_then(|o| o.itinerary.usage.as_ref())
    }

    /// Run one generation cycle: validate, call the model list, render the PDF.
    ///
    /// A previous plan is cleared as soon as a new trip is submitted, so a
    /// failed cycle never leaves stale text behind.
    pub async fn generate(
        &mut self,
        requester: &CompletionRequester,
        trip: TripRequest,
    ) -> Result<&GenerationOutcome> {
        trip.validate()?;
        self.outcome = None;
        self.trip = Some(trip.clone());

        let itinerary = requester.generate(&trip).await?;
        info!(
            target: "travel_guide::session",
            destination = %trip.destination,
            model = %itinerary.model_used,
            "travel plan generated"
        );

        let document = render_document(&itinerary.text, &trip.destination);
        if let Err(err) = &document {
            warn!(
                target: "travel_guide::session",
                error = %err,
                "PDF generation failed; plan text is still available"
            );
        }

        Ok(self.outcome.insert(GenerationOutcome {
            itinerary,
            document,
        }))
    }

    /// Clear the form fields and any generated plan, model and usage.
    pub fn reset(&mut self) {
        self.trip = None;
        self.outcome = None;
    }
}
