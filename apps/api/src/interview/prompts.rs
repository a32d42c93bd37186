//! Prompt templates for the interview pipeline.
//!
//! Every prompt has the same shape: persona → (retrieved context) → chain of
//! thought → (format) → few-shot example → delimited user input. Templates are
//! static; only the delimited section varies per call.

use crate::llm_client::prompts::{DELIMITER, RETURN_JSON_INSTRUCTION};
use crate::retrieval::PassageBlock;

/// Fixed template identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// Feedback on a single free-form transcript.
    Summary,
    /// Content/delivery analysis and 0–10 score for one answer.
    QuestionAnalysis,
    /// Overall assessment across all answers of an interview.
    InterviewSummary,
    /// Three interview questions for a role, optionally resume-grounded.
    QuestionGeneration,
}

/// Immutable prompt sections. Joined with the caller's payload in `build_prompt`.
#[derive(Debug)]
pub struct PromptTemplate {
    pub persona: &'static str,
    pub reasoning: &'static str,
    pub format: Option<&'static str>,
    pub examples: &'static [&'static str],
}

impl TemplateKind {
    pub fn template(self) -> &'static PromptTemplate {
        match self {
            TemplateKind::Summary => &SUMMARY_TEMPLATE,
            TemplateKind::QuestionAnalysis => &QUESTION_ANALYSIS_TEMPLATE,
            TemplateKind::InterviewSummary => &INTERVIEW_SUMMARY_TEMPLATE,
            TemplateKind::QuestionGeneration => &QUESTION_GENERATION_TEMPLATE,
        }
    }
}

/// Variable part of a prompt.
#[derive(Debug, Clone)]
pub enum PromptPayload<'a> {
    Transcript(&'a str),
    QuestionResponse {
        question: &'a str,
        response: &'a str,
    },
    /// (question, answer) pairs in interview order.
    Responses(Vec<(&'a str, &'a str)>),
    Role {
        role: &'a str,
        additional_note: &'a str,
    },
}

impl PromptPayload<'_> {
    /// The text placed between the delimiters. Also used as the retrieval query.
    pub fn render(&self) -> String {
        match self {
            PromptPayload::Transcript(transcript) => {
                format!("Candidate Transcript:\n{transcript}")
            }
            PromptPayload::QuestionResponse { question, response } => {
                format!("Question: {question}\nResponse: {response}")
            }
            PromptPayload::Responses(pairs) => {
                let mut body = String::from("Candidate Responses:\n");
                for (question, answer) in pairs {
                    body.push_str(&format!("Question: {question}\nAnswer: {answer}\n"));
                }
                body
            }
            PromptPayload::Role {
                role,
                additional_note,
            } => format!(
                "Generate 3 interview questions for a candidate applying as {role}. \
                The first two questions should be related to personal experience if possible. \
                The last question should be general technical question. \
                Additional notes: {additional_note}\n\
                Return a JSON list of objects: [{{\"question\": \"...\"}}, ...]"
            ),
        }
    }
}

/// Builds the full prompt text. Pure; never fails.
///
/// `context` is spliced between persona and reasoning. Pass it whenever a
/// resume index exists, even if empty, so prompts keep the same shape.
pub fn build_prompt(
    kind: TemplateKind,
    payload: &PromptPayload<'_>,
    context: Option<&PassageBlock>,
) -> String {
    let template = kind.template();

    let mut sections = vec![template.persona.to_string()];
    if let Some(block) = context {
        sections.push(block.render());
    }
    sections.push(template.reasoning.to_string());
    if let Some(format) = template.format {
        sections.push(format.to_string());
    }
    sections.extend(template.examples.iter().map(|e| e.to_string()));
    sections.push(format!(
        "{DELIMITER} {}\n{DELIMITER}\n{RETURN_JSON_INSTRUCTION}",
        payload.render()
    ));

    sections.join("\n")
}

// ────────────────────────────────────────────────────────────────────────────
// Templates
// ────────────────────────────────────────────────────────────────────────────

pub static SUMMARY_TEMPLATE: PromptTemplate = PromptTemplate {
    persona: r#"
# Persona
You are a professional interview coach.
Give clear, structured and actionable feedback on a candidate's spoken answer, covering clarity, confidence, pacing, structure and content.
The query is delimited by ####.
"#,
    reasoning: r#"
# Chain of Thought
Step 1: #### Read the candidate's transcript carefully.
Step 2: #### Identify strengths and weaknesses in content and delivery.
Step 3: #### Suggest concrete improvements.
Step 4: #### Return the result strictly as JSON with lists and an overall score.
"#,
    format: None,
    examples: &[r#"
# Few-Shot Example
Input Transcript:
"I have experience in software engineering and led multiple projects in AI."
Output:
{
  "strengths": ["Clear articulation of experience", "Relevant examples provided"],
  "weaknesses": ["Could provide more technical depth in AI projects", "Pacing slightly fast at times"],
  "tips": ["Elaborate on specific AI challenges you solved", "Maintain steady pace when speaking"],
  "overall_score": 8
}
"#],
};

pub static QUESTION_ANALYSIS_TEMPLATE: PromptTemplate = PromptTemplate {
    persona: r#"
# Persona
You are a professional interview coach.
Analyze one candidate answer for content, clarity, confidence and delivery, then score it.
Answer in JSON. The query is delimited by ####.
"#,
    reasoning: r#"
# Chain of Thought
Step 1: #### Understand the question and the candidate's response.
Step 2: #### Evaluate the strengths and weaknesses of the answer.
Step 3: #### Note actionable tips for improvement.
Step 4: #### Give the response a score from 0 to 10.
"#,
    format: None,
    examples: &[r#"
# Few-Shot Example
Question: "Tell me about yourself?"
Response: "I am a software engineer with 5 years of experience in AI."
Output:
{
  "analysis_content": "Clear overview with relevant experience.",
  "analysis_delivery": "Confident tone, moderate pace.",
  "score": 8
}
"#],
};

pub static INTERVIEW_SUMMARY_TEMPLATE: PromptTemplate = PromptTemplate {
    persona: r#"
# Persona
You are a professional interview coach.
Review a candidate's full set of answers and give an overall assessment with strengths, weaknesses, tips and an overall score.
Return strictly JSON. The query is delimited by ####.
"#,
    reasoning: r#"
# Chain of Thought
Step 1: #### Review every question and response.
Step 2: #### Identify recurring strengths and weaknesses.
Step 3: #### Give actionable feedback.
Step 4: #### Assign an overall score from 1 to 10.
"#,
    format: None,
    examples: &[r#"
# Few-Shot Example
Input:
Q: "Tell me about yourself?" A: "I have 5 years experience in software engineering."
Q: "What are your strengths?" A: "Analytical and detail-oriented."
Output:
{
  "strengths": ["Clear articulation", "Relevant experience"],
  "weaknesses": ["Could give more examples on team projects"],
  "tips": ["Provide more examples", "Maintain steady pace"],
  "overall_score": 8
}
"#],
};

pub static QUESTION_GENERATION_TEMPLATE: PromptTemplate = PromptTemplate {
    persona: r#"
# Persona
You are a professional interviewer who writes concise, relevant interview questions.
Focus on clarity, relevance and the requirements of the role. The query is delimited by ####.
"#,
    reasoning: r#"
# Chain of Thought
Step 1: #### Use the candidate's resume passages and additional notes as context.
Step 2: #### Write role-appropriate questions that are challenging but answerable.
Step 3: #### The first two draw on personal experience; the last is a general technical question.
"#,
    format: Some(
        r#"
# Format Template
Respond with a JSON array of exactly 3 objects, each with a single "question" key.
No follow-ups, no text outside the JSON. Keep each question under 25 words.
"#,
    ),
    examples: &[r#"
# Few-Shot Example
Candidate info: "Resume shows experience in backend development and team leadership."
Output: [
  {"question": "Describe a backend system you designed and the challenges faced."},
  {"question": "How did you handle team conflicts during a project?"},
  {"question": "Explain how you optimize database queries in high-traffic applications."}
]
"#],
};
