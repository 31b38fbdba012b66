//! Response generation — turns a controller [`Prompt`] into assistant text.
//!
//! A configured generation backend supplies conversational framing; every
//! prompt kind also has a complete deterministic fallback so a session can
//! finish with zero network dependency. Structural content (question text,
//! the record summary) is always rendered deterministically: a misbehaving
//! backend can reword the framing but never drop a question. Rejection
//! prompts are always templated so the specific field error reaches the
//! candidate verbatim.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::llm::{GenerationBackend, GenerationRequest, DEFAULT_TIMEOUT};
use crate::models::CandidateProfile;
use crate::screening::conversation::{ConversationSession, Field, Prompt, Role};

const SYSTEM_MESSAGE: &str = "You are TalentScout's hiring assistant, conducting an initial \
screening for technology positions. Be professional, friendly, and concise. Keep responses to \
1-2 sentences. Never invent questions or candidate details; only rephrase the instruction you \
are given.";

/// Backend replies outside these bounds are treated as garbage and replaced
/// by the fallback.
const MIN_REPLY_CHARS: usize = 2;
const MAX_REPLY_CHARS: usize = 1200;

pub struct ResponseGenerator {
    backend: Option<Arc<dyn GenerationBackend>>,
    timeout: Duration,
}

impl ResponseGenerator {
    pub fn new(backend: Option<Arc<dyn GenerationBackend>>) -> Self {
        Self::with_timeout(backend, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(backend: Option<Arc<dyn GenerationBackend>>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend
            .as_deref()
            .map(GenerationBackend::name)
            .unwrap_or("templates")
    }

    /// Produces the assistant's utterance for `prompt`. Never fails: backend
    /// trouble degrades to the deterministic per-stage template.
    pub async fn respond(&self, prompt: &Prompt, session: &ConversationSession) -> String {
        let Some(instruction) = framing_instruction(prompt, session) else {
            return fallback_text(prompt, session);
        };

        match self.try_backend(&instruction, session).await {
            Some(framing) => match structural_block(prompt, session) {
                Some(block) => format!("{framing}\n\n{block}"),
                None => framing,
            },
            None => fallback_text(prompt, session),
        }
    }

    async fn try_backend(&self, instruction: &str, session: &ConversationSession) -> Option<String> {
        let backend = self.backend.as_ref()?;
        let request = GenerationRequest {
            system: SYSTEM_MESSAGE.to_string(),
            prompt: build_context_prompt(instruction, session),
        };

        // The backend carries its own request timeout; this outer bound also
        // covers backends that stall without erroring.
        let result = tokio::time::timeout(self.timeout, backend.generate(&request)).await;
        match result {
            Ok(Ok(text)) => {
                let trimmed = text.trim();
                if (MIN_REPLY_CHARS..=MAX_REPLY_CHARS).contains(&trimmed.chars().count()) {
                    Some(trimmed.to_string())
                } else {
                    warn!(
                        session = %session.id,
                        chars = trimmed.chars().count(),
                        "backend reply out of bounds, using fallback"
                    );
                    None
                }
            }
            Ok(Err(e)) => {
                warn!(session = %session.id, error = %e, "generation unavailable, using fallback");
                None
            }
            Err(_) => {
                warn!(session = %session.id, "generation timed out, using fallback");
                None
            }
        }
    }
}

/// The instruction handed to the backend, or `None` for prompts that must be
/// rendered deterministically (rejections, the summary, terminal notices).
fn framing_instruction(prompt: &Prompt, session: &ConversationSession) -> Option<String> {
    let name = session.candidate_name().unwrap_or("the candidate");
    match prompt {
        Prompt::Greeting => Some(
            "Greet the candidate warmly, explain this is an initial screening for technology \
             positions taking about 10-15 minutes, and ask for their full name."
                .to_string(),
        ),
        Prompt::AskField { field, rejected: None } => Some(format!(
            "Thank {name} for the previous answer and ask for their {}.",
            field_label(*field)
        )),
        Prompt::AskTechStack { rejected: None } => Some(format!(
            "Ask {name} to list their tech stack: programming languages, frameworks, databases \
             and tools, for example \"Python, Django, PostgreSQL, React, AWS, Docker\"."
        )),
        Prompt::AskQuestion { number, first, .. } => Some(if *first {
            format!(
                "Acknowledge {name}'s tech stack ({}) and explain you will now ask a few short \
                 technical screening questions.",
                session.tech_stack().join(", ")
            )
        } else {
            format!("Briefly thank {name} for the answer and introduce question {number}.")
        }),
        Prompt::Farewell => Some(format!(
            "Say goodbye to {name}, mention they can restart the screening any time, and wish \
             them a great day."
        )),
        _ => None,
    }
}

/// Deterministic payload appended after backend framing.
fn structural_block(prompt: &Prompt, _session: &ConversationSession) -> Option<String> {
    match prompt {
        Prompt::AskQuestion {
            number,
            total,
            question,
            ..
        } => Some(format!("**Question {number} of {total}:**\n{}", question.text)),
        _ => None,
    }
}

fn build_context_prompt(instruction: &str, session: &ConversationSession) -> String {
    let mut prompt = format!("Current stage: {:?}\n", session.stage());
    if let Some(name) = session.candidate_name() {
        let _ = writeln!(prompt, "Candidate name: {name}");
    }
    if !session.tech_stack().is_empty() {
        let _ = writeln!(prompt, "Tech stack: {}", session.tech_stack().join(", "));
    }
    if let Some(last) = session
        .history()
        .filter(|u| u.role == Role::Candidate)
        .last()
    {
        let _ = writeln!(prompt, "Candidate's last message: {}", last.text);
    }
    let _ = write!(prompt, "\nInstruction: {instruction}");
    prompt
}

fn field_label(field: Field) -> &'static str {
    match field {
        Field::FullName => "full name",
        Field::Email => "email address",
        Field::Phone => "phone number",
        Field::YearsExperience => "years of professional experience",
        Field::DesiredPositions => "desired position(s)",
        Field::CurrentLocation => "current location",
    }
}

/// Complete per-stage template text. Always professional, always sufficient
/// on its own.
pub fn fallback_text(prompt: &Prompt, session: &ConversationSession) -> String {
    let name = session.candidate_name();
    match prompt {
        Prompt::Greeting => "Hello! Welcome to TalentScout, your hiring assistant for \
            technology positions.\n\nI'll guide you through our initial screening process — it \
            takes about 10-15 minutes and helps our team understand your background and skills.\n\n\
            To get started, could you please tell me your full name?"
            .to_string(),

        Prompt::AskField { field, rejected } => match rejected {
            Some(reason) => reason.clone(),
            None => match field {
                Field::FullName => "Could you please tell me your full name?".to_string(),
                Field::Email => match name {
                    Some(name) => format!(
                        "Nice to meet you, {name}! Now I'll need to collect some basic \
                         information. Let's start with your email address."
                    ),
                    None => "Thanks! Let's start with your email address.".to_string(),
                },
                Field::Phone => {
                    "Thank you! Now, could you please provide your phone number?".to_string()
                }
                Field::YearsExperience => {
                    "Great! How many years of professional experience do you have?".to_string()
                }
                Field::DesiredPositions => {
                    "What position(s) are you interested in applying for?".to_string()
                }
                Field::CurrentLocation => "Where are you currently located?".to_string(),
            },
        },

        Prompt::AskTechStack { rejected } => match rejected {
            Some(reason) => reason.clone(),
            None => "Perfect! Now let's talk about your technical skills. Please list your \
                tech stack — programming languages, frameworks, databases, and tools you're \
                proficient in.\n\nFor example: \"Python, Django, PostgreSQL, React, AWS, Docker\""
                .to_string(),
        },

        Prompt::AskQuestion {
            number,
            total,
            question,
            first,
        } => {
            let mut text = if *first {
                format!(
                    "Excellent! I can see you have experience with: {}\n\nNow I'll ask you a \
                     few technical questions to better understand your proficiency. Don't worry \
                     — these are just for initial screening purposes.",
                    session.tech_stack().join(", ")
                )
            } else {
                "Thank you for your response!".to_string()
            };
            let _ = write!(
                text,
                "\n\n**Question {number} of {total}:**\n{}",
                question.text
            );
            text
        }

        Prompt::Summary { record } => summary_text(record),

        Prompt::DuplicateEmail => "It looks like this email address is already registered \
            with us. Could you please provide a different email address?"
            .to_string(),

        Prompt::StoreRetry => "I wasn't able to save your application just now — nothing is \
            lost, your answers are still here. Please send any message and I'll try again."
            .to_string(),

        Prompt::Farewell => format!(
            "Thank you for your time, {}!\n\nIf you'd like to continue the screening process \
             later, feel free to start a new session. Have a great day!",
            name.unwrap_or("candidate")
        ),

        Prompt::Closed => "This screening session has ended. Thank you again for your time!"
            .to_string(),
    }
}

fn summary_text(record: &CandidateProfile) -> String {
    let mut text = format!(
        "Thank you for completing the initial screening, {}!\n\n\
         Here's a summary of what I've collected:\n\n\
         **Personal Information:**\n\
         - Name: {}\n\
         - Email: {}\n\
         - Phone: {}\n\
         - Experience: {} years\n\
         - Desired Position(s): {}\n\
         - Location: {}\n\n\
         **Technical Skills:**\n{}\n\n\
         **Technical Questions Answered:** {}\n\n",
        record.full_name,
        record.full_name,
        record.email,
        record.phone,
        record.years_experience,
        record.desired_positions.join(", "),
        record.current_location,
        record.tech_stack.join(", "),
        record.answers.len(),
    );
    text.push_str(
        "**Next Steps:**\n\
         1. Your profile will be reviewed by our recruitment team\n\
         2. We'll match you with suitable opportunities\n\
         3. You'll hear back from us within 2-3 business days\n\n\
         Thank you for your time today!",
    );
    text
}
