use crate::types::trip::TripRequest;

/// Fixed instruction sent as the system message of every itinerary request
pub const SYSTEM_PROMPT: &str = "You are an experienced and enthusiastic TRAVEL GUIDE PLANNER.

Requirements:
- Create a detailed, day-by-day itinerary for the entire trip
- Include specific places, attractions, restaurants, and activities
- Consider the user's special interests and guardrails/constraints
- Provide practical tips like opening hours, estimated time needed, and travel logistics
- Be realistic about timing and distances
- Include local cuisine recommendations where appropriate
- Suggest morning, afternoon, and evening activities for each day

Output format in Markdown with these top-level H2 sections (##):
## Trip Overview
## Day-by-Day Itinerary
(with subsections: ### Day 1, ### Day 2, etc.)
## Travel Tips & Recommendations
## Estimated Budget Overview
## Important Notes & Reminders";

/// Prompt used by the diagnostics self-test
pub const SELF_TEST_PROMPT: &str = "Reply with the single word: READY";

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback
    } else {
        trimmed
    }
}

/// Assemble the per-request user message from the trip preferences
pub fn build_user_prompt(request: &TripRequest) -> String {
    let destination = or_default(&request.destination, "N/A");
    let num_days = or_default(&request.num_days, "N/A");
    let interests = or_default(&request.special_interests, "General sightseeing");
    let guardrails = or_default(&request.guardrails, "None specified");

    format!(
        "TRAVEL DETAILS
- Destination: {destination}
- Number of Days: {num_days}

INTERESTS & PREFERENCES
- Special Interests: {interests}

CONSTRAINTS / GUARDRAILS
{guardrails}

INSTRUCTIONS
- Create a complete itinerary covering all {num_days} days
- For each day, suggest 3-5 activities/places to visit
- Include specific names of attractions, restaurants, and locations
- Consider travel time between locations
- Incorporate the specified interests throughout the itinerary
- Respect all guardrails and constraints mentioned
- Provide practical details (opening hours, booking requirements, etc.)
- Keep the plan realistic and not overly packed
- Total length: approximately 800-1500 words"
    )
}
