// Shared prompt constants.
// Each service that needs model calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// Marks the boundary between instructions and untrusted user content.
/// Textual only: the output parser never looks for it.
pub const DELIMITER: &str = "####";

/// Closing instruction repeated after every delimited user section.
pub const RETURN_JSON_INSTRUCTION: &str =
    "Return STRICTLY as JSON output as in the example.";

/// System prompt for every scoring and summarizing call.
pub const COACH_SYSTEM: &str = "You are an expert interview coach.";

/// System prompt for question generation.
pub const INTERVIEWER_SYSTEM: &str = "You are a professional interviewer and question generator.";
