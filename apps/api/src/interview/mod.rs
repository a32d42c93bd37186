// Interview pipeline: prompt templates → model call → tolerant parsing.
// Question generation (optionally resume-grounded) and answer scoring live here;
// session bookkeeping lives in `sessions`.
// All model calls go through llm_client.

pub mod analysis;
pub mod answers;
pub mod handlers;
pub mod parser;
pub mod prompts;
pub mod questions;
