//! The conversation state machine — one screening session's stage, draft
//! record, and technical question progress.
//!
//! Transitions are pure: `step` maps (stage, draft, input) to (next stage,
//! updated draft, a prompt describing what the assistant should say next).
//! The controller never touches the network or storage; the single store call
//! happens in the service layer when `step` reports the record is ready.

use std::collections::VecDeque;

use serde::Serialize;
use uuid::Uuid;

use crate::models::{CandidateProfile, QuestionAnswer};
use crate::screening::question_bank::{QuestionBank, TechnicalQuestion, DEFAULT_QUESTION_COUNT};
use crate::screening::validation::{
    normalize_tech_stack, parse_positions, validate_email, validate_location, validate_name,
    validate_phone, validate_years_experience, ValidationError,
};

/// Exit keywords cancel the session from any non-terminal stage. Matched
/// against the whole trimmed message, case-insensitively, so "bye" inside a
/// technical answer does not end the interview.
const EXIT_KEYWORDS: &[&str] = &["exit", "quit", "goodbye", "bye"];

/// Rolling history bound; prompt context only, never authoritative state.
const HISTORY_LIMIT: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Welcome,
    CollectingBasicInfo,
    CollectingTechStack,
    AskingTechnical,
    Summary,
    Terminal,
}

/// The six basic-info fields, in collection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    FullName,
    Email,
    Phone,
    YearsExperience,
    DesiredPositions,
    CurrentLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Candidate,
    Assistant,
}

#[derive(Debug, Clone)]
pub struct Utterance {
    pub role: Role,
    pub text: String,
}

/// What the assistant should say next. Rendering (LLM or template) happens in
/// the responder; the controller only decides the kind and its payload.
#[derive(Debug, Clone)]
pub enum Prompt {
    Greeting,
    AskField {
        field: Field,
        /// Candidate-facing reason the previous answer was rejected.
        rejected: Option<String>,
    },
    AskTechStack {
        rejected: Option<String>,
    },
    AskQuestion {
        number: usize,
        total: usize,
        question: TechnicalQuestion,
        /// First question also announces the recognized stack.
        first: bool,
    },
    /// Screening complete and the record stored.
    Summary {
        record: CandidateProfile,
    },
    DuplicateEmail,
    StoreRetry,
    Farewell,
    Closed,
}

/// Result of feeding one candidate message to the controller.
#[derive(Debug, Clone)]
pub enum StepOutcome {
    Reply(Prompt),
    /// All questions answered; the caller must hand this record to the store
    /// and then either `commit_stored` or `email_rejected` the session.
    RecordReady(CandidateProfile),
    /// Candidate cancelled; nothing is persisted.
    Cancelled(Prompt),
}

#[derive(Debug, Default, Clone)]
struct CandidateDraft {
    full_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    years_experience: Option<f32>,
    desired_positions: Option<Vec<String>>,
    current_location: Option<String>,
    tech_stack: Option<Vec<String>>,
}

impl CandidateDraft {
    fn next_missing_field(&self) -> Option<Field> {
        if self.full_name.is_none() {
            Some(Field::FullName)
        } else if self.email.is_none() {
            Some(Field::Email)
        } else if self.phone.is_none() {
            Some(Field::Phone)
        } else if self.years_experience.is_none() {
            Some(Field::YearsExperience)
        } else if self.desired_positions.is_none() {
            Some(Field::DesiredPositions)
        } else if self.current_location.is_none() {
            Some(Field::CurrentLocation)
        } else {
            None
        }
    }

    fn finalize(&self, answers: Vec<QuestionAnswer>) -> Option<CandidateProfile> {
        Some(CandidateProfile {
            full_name: self.full_name.clone()?,
            email: self.email.clone()?,
            phone: self.phone.clone()?,
            years_experience: self.years_experience?,
            desired_positions: self.desired_positions.clone()?,
            current_location: self.current_location.clone()?,
            tech_stack: self.tech_stack.clone()?,
            answers,
        })
    }
}

/// One active screening session. Single-threaded and strictly sequential: the
/// caller feeds one message at a time and completes the full turn before the
/// next.
#[derive(Debug)]
pub struct ConversationSession {
    pub id: Uuid,
    stage: Stage,
    draft: CandidateDraft,
    questions: Vec<TechnicalQuestion>,
    answers: Vec<QuestionAnswer>,
    next_question: usize,
    question_count: usize,
    history: VecDeque<Utterance>,
}

impl ConversationSession {
    pub fn new() -> Self {
        Self::with_question_count(DEFAULT_QUESTION_COUNT)
    }

    pub fn with_question_count(question_count: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            stage: Stage::Welcome,
            draft: CandidateDraft::default(),
            questions: Vec::new(),
            answers: Vec::new(),
            next_question: 0,
            question_count,
            history: VecDeque::new(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn candidate_name(&self) -> Option<&str> {
        self.draft.full_name.as_deref()
    }

    pub fn tech_stack(&self) -> &[String] {
        self.draft.tech_stack.as_deref().unwrap_or(&[])
    }

    pub fn history(&self) -> impl Iterator<Item = &Utterance> {
        self.history.iter()
    }

    /// Appends an assistant reply to the rolling history.
    pub fn record_reply(&mut self, text: &str) {
        self.push_history(Role::Assistant, text);
    }

    fn push_history(&mut self, role: Role, text: &str) {
        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(Utterance {
            role,
            text: text.to_string(),
        });
    }

    /// Processes one candidate message. Pure with respect to collaborators:
    /// the question bank is read-only and no I/O happens here.
    pub fn step(&mut self, input: &str, bank: &QuestionBank) -> StepOutcome {
        let input = input.trim();

        if self.stage == Stage::Terminal {
            return StepOutcome::Reply(Prompt::Closed);
        }

        if EXIT_KEYWORDS
            .iter()
            .any(|kw| input.eq_ignore_ascii_case(kw))
        {
            self.stage = Stage::Terminal;
            return StepOutcome::Cancelled(Prompt::Farewell);
        }

        self.push_history(Role::Candidate, input);

        match self.stage {
            Stage::Welcome => self.step_welcome(input),
            Stage::CollectingBasicInfo => self.step_basic_info(input),
            Stage::CollectingTechStack => self.step_tech_stack(input, bank),
            Stage::AskingTechnical => self.step_technical(input),
            Stage::Summary => self.yield_record(),
            Stage::Terminal => StepOutcome::Reply(Prompt::Closed),
        }
    }

    fn step_welcome(&mut self, input: &str) -> StepOutcome {
        match validate_name(input) {
            Ok(name) => {
                self.draft.full_name = Some(name);
                self.stage = Stage::CollectingBasicInfo;
                self.advance(None)
            }
            Err(e) => StepOutcome::Reply(Prompt::AskField {
                field: Field::FullName,
                rejected: Some(e.to_string()),
            }),
        }
    }

    fn step_basic_info(&mut self, input: &str) -> StepOutcome {
        let Some(field) = self.draft.next_missing_field() else {
            // Every field already valid (e.g. returning from a duplicate-email
            // correction with the rest intact): move forward.
            return self.advance_past_basic_info();
        };

        let result: Result<(), ValidationError> = match field {
            Field::FullName => validate_name(input).map(|v| self.draft.full_name = Some(v)),
            Field::Email => validate_email(input).map(|v| self.draft.email = Some(v)),
            Field::Phone => validate_phone(input).map(|v| self.draft.phone = Some(v)),
            Field::YearsExperience => {
                validate_years_experience(input).map(|v| self.draft.years_experience = Some(v))
            }
            Field::DesiredPositions => {
                parse_positions(input).map(|v| self.draft.desired_positions = Some(v))
            }
            Field::CurrentLocation => {
                validate_location(input).map(|v| self.draft.current_location = Some(v))
            }
        };

        match result {
            Ok(()) => match self.draft.next_missing_field() {
                Some(_) => self.advance(None),
                None => self.advance_past_basic_info(),
            },
            // Validation failure never changes state: re-prompt in place with
            // the specific reason. Retries are unbounded.
            Err(e) => StepOutcome::Reply(Prompt::AskField {
                field,
                rejected: Some(e.to_string()),
            }),
        }
    }

    fn step_tech_stack(&mut self, input: &str, bank: &QuestionBank) -> StepOutcome {
        match normalize_tech_stack(input) {
            Ok(stack) => {
                if !stack.unrecognized.is_empty() {
                    tracing::info!(
                        session = %self.id,
                        unrecognized = ?stack.unrecognized,
                        "dropped unrecognized technologies"
                    );
                }
                self.questions = bank.select(&stack.canonical, self.question_count);
                self.draft.tech_stack = Some(stack.canonical);
                if self.questions.is_empty() {
                    // Recognized stack but no bank coverage; keep the stage
                    // and ask again rather than running an empty interview.
                    self.draft.tech_stack = None;
                    return StepOutcome::Reply(Prompt::AskTechStack {
                        rejected: Some(ValidationError::EmptyStack.to_string()),
                    });
                }
                self.next_question = 0;
                self.stage = Stage::AskingTechnical;
                self.present_question(true)
            }
            Err(e) => StepOutcome::Reply(Prompt::AskTechStack {
                rejected: Some(e.to_string()),
            }),
        }
    }

    fn step_technical(&mut self, input: &str) -> StepOutcome {
        if input.is_empty() {
            return self.present_question(false);
        }

        let question = &self.questions[self.next_question];
        self.answers.push(QuestionAnswer {
            question: question.text.clone(),
            answer: input.to_string(),
            technology: question.technology.clone(),
        });
        self.next_question += 1;

        if self.next_question < self.questions.len() {
            self.present_question(false)
        } else {
            self.stage = Stage::Summary;
            self.yield_record()
        }
    }

    /// Emits the next prompt for the current position after basic-info
    /// progress, including the fast-forward paths used when a corrected email
    /// rejoins an otherwise complete session.
    fn advance(&mut self, rejected: Option<String>) -> StepOutcome {
        match self.draft.next_missing_field() {
            Some(field) => StepOutcome::Reply(Prompt::AskField { field, rejected }),
            None => StepOutcome::Reply(Prompt::AskTechStack { rejected: None }),
        }
    }

    fn advance_past_basic_info(&mut self) -> StepOutcome {
        if self.draft.tech_stack.is_none() {
            self.stage = Stage::CollectingTechStack;
            StepOutcome::Reply(Prompt::AskTechStack { rejected: None })
        } else if self.next_question < self.questions.len() {
            self.stage = Stage::AskingTechnical;
            self.present_question(false)
        } else {
            self.stage = Stage::Summary;
            self.yield_record()
        }
    }

    fn present_question(&self, first: bool) -> StepOutcome {
        let question = self.questions[self.next_question].clone();
        StepOutcome::Reply(Prompt::AskQuestion {
            number: self.next_question + 1,
            total: self.questions.len(),
            question,
            first,
        })
    }

    fn yield_record(&mut self) -> StepOutcome {
        match self.draft.finalize(self.answers.clone()) {
            Some(record) => StepOutcome::RecordReady(record),
            None => {
                // Stage/field agreement is an invariant; if it ever breaks,
                // recover by collecting what is missing instead of wedging.
                self.stage = Stage::CollectingBasicInfo;
                self.advance(None)
            }
        }
    }

    /// Summary → Terminal after the record store accepted the record.
    pub fn commit_stored(&mut self) {
        debug_assert_eq!(self.stage, Stage::Summary);
        self.stage = Stage::Terminal;
    }

    /// The store rejected the email as a duplicate: return to basic-info
    /// collection with only the email cleared so the candidate can correct it.
    pub fn email_rejected(&mut self) {
        self.draft.email = None;
        self.stage = Stage::CollectingBasicInfo;
    }
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new()
    }
}
