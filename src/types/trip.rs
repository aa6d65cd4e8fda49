use serde::{Deserialize, Serialize};

use crate::error::{GuideError, Result};

/// Travel preferences collected for one generation cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRequest {
    /// Destination city and country (e.g., "Paris, France")
    pub destination: String,
    /// Trip length as typed by the user ("5", "7 days", "a long weekend")
    pub num_days: String,
    /// Free-form interests such as museums, food, nightlife
    #[serde(default)]
    pub special_interests: String,
    /// Constraints the itinerary must respect
    #[serde(default)]
    pub guardrails: String,
}

impl TripRequest {
    pub fn new(destination: impl Into<String>, num_days: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            num_days: num_days.into(),
            ..Self::default()
        }
    }

    pub fn with_special_interests(mut self, special_interests: impl Into<String>) -> Self {
        self.special_interests = special_interests.into();
        self
    }

    pub fn with_guardrails(mut self, guardrails: impl Into<String>) -> Self {
        self.guardrails = guardrails.into();
        self
    }

    /// Destination and number of days are the only required fields.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.destination.trim().is_empty() {
            missing.push("destination");
        }
        if self.num_days.trim().is_empty() {
            missing.push("number of days");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(GuideError::InvalidRequest(format!(
                "please provide at least {}",
                missing.join(" and ")
            )))
        }
    }

    /// Download name for the PDF, e.g. `travel_guide_Paris_France.pdf`
    pub fn suggested_filename(&self) -> String {
        suggested_filename(&self.destination)
    }
}

pub fn suggested_filename(destination: &str) -> String {
    let stem: String = destination
        .trim()
        .chars()
        .filter(|c| *c != ',')
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    format!("travel_guide_{}.pdf", stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_destination_and_days() {
        assert!(TripRequest::new("Paris", "5").validate().is_ok());

        let err = TripRequest::new("  ", "5").validate().unwrap_err();
        assert!(err.to_string().contains("destination"));

        let err = TripRequest::new("", "").validate().unwrap_err();
        assert!(err.to_string().contains("destination and number of days"));
    }

    #[test]
    fn test_free_form_days_are_accepted() {
        let request = TripRequest::new("Tokyo, Japan", "a long weekend");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_suggested_filename() {
        let request = TripRequest::new("Paris, France", "5");
        assert_eq!(request.suggested_filename(), "travel_guide_Paris_France.pdf");
        assert_eq!(suggested_filename(" New York "), "travel_guide_New_York.pdf");
    }
}
