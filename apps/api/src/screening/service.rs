//! Screening service — owns the live sessions and drives one full turn per
//! inbound message: controller step, the single store call when a record is
//! ready, then response rendering.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::screening::conversation::{ConversationSession, Prompt, Stage, StepOutcome};
use crate::screening::question_bank::QuestionBank;
use crate::screening::responder::ResponseGenerator;
use crate::store::{RecordStore, StoreError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found")]
    NotFound,
}

/// One turn's result: the assistant's reply and where the session stands.
#[derive(Debug, Clone)]
pub struct SessionReply {
    pub session_id: Uuid,
    pub reply: String,
    pub stage: Stage,
    pub done: bool,
}

pub struct ScreeningService {
    bank: QuestionBank,
    responder: ResponseGenerator,
    store: Arc<dyn RecordStore>,
    /// Per-session locks keep each conversation strictly sequential while
    /// sessions stay independent of each other.
    ///
    /// The registry only grows for the process lifetime: terminal sessions
    /// are kept so late messages get a closed-session reply instead of a
    /// 404. TODO: add a periodic sweep evicting terminal sessions after a
    /// grace period.
    sessions: Mutex<HashMap<Uuid, Arc<Mutex<ConversationSession>>>>,
}

impl ScreeningService {
    pub fn new(
        bank: QuestionBank,
        responder: ResponseGenerator,
        store: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            bank,
            responder,
            store,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a session and returns the opening greeting.
    pub async fn start_session(&self) -> SessionReply {
        let mut session = ConversationSession::new();
        let reply = self.responder.respond(&Prompt::Greeting, &session).await;
        session.record_reply(&reply);

        let id = session.id;
        let stage = session.stage();
        self.sessions
            .lock()
            .await
            .insert(id, Arc::new(Mutex::new(session)));
        info!(session = %id, "screening session started");

        SessionReply {
            session_id: id,
            reply,
            stage,
            done: false,
        }
    }

    /// Processes one candidate message for `id`. The session lock is held for
    /// the whole turn, including any store call, so messages within a session
    /// never interleave.
    pub async fn handle_message(&self, id: Uuid, message: &str) -> Result<SessionReply, SessionError> {
        let session = self
            .sessions
            .lock()
            .await
            .get(&id)
            .cloned()
            .ok_or(SessionError::NotFound)?;
        let mut session = session.lock().await;

        let prompt = match session.step(message, &self.bank) {
            StepOutcome::Reply(prompt) => prompt,
            StepOutcome::Cancelled(prompt) => {
                info!(session = %id, "session cancelled by candidate");
                prompt
            }
            StepOutcome::RecordReady(record) => match self.store.insert(&record).await {
                Ok(stored) => {
                    session.commit_stored();
                    info!(session = %id, record = %stored.id, "screening complete");
                    Prompt::Summary {
                        record: stored.profile,
                    }
                }
                Err(StoreError::Duplicate) => {
                    warn!(session = %id, "duplicate email, returning to email field");
                    session.email_rejected();
                    Prompt::DuplicateEmail
                }
                Err(StoreError::Unavailable(reason)) => {
                    // The session keeps the finished record; the candidate
                    // retries from Summary with any message.
                    warn!(session = %id, %reason, "record store unavailable");
                    Prompt::StoreRetry
                }
            },
        };

        let reply = self.responder.respond(&prompt, &session).await;
        session.record_reply(&reply);

        Ok(SessionReply {
            session_id: id,
            reply,
            stage: session.stage(),
            done: session.stage() == Stage::Terminal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CandidateProfile, CandidateRecord};
    use crate::store::MemoryRecordStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts inserts; optionally fails the first `fail_first` of them with
    /// `Unavailable`.
    struct CountingStore {
        inner: MemoryRecordStore,
        inserts: AtomicUsize,
        fail_first: usize,
    }

    impl CountingStore {
        fn new(fail_first: usize) -> Self {
            Self {
                inner: MemoryRecordStore::new(),
                inserts: AtomicUsize::new(0),
                fail_first,
            }
        }
    }

    #[async_trait]
    impl RecordStore for CountingStore {
        async fn insert(&self, profile: &CandidateProfile) -> Result<CandidateRecord, StoreError> {
            let n = self.inserts.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_first {
                return Err(StoreError::Unavailable("simulated outage".to_string()));
            }
            self.inner.insert(profile).await
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<CandidateRecord>, StoreError> {
            self.inner.find_by_email(email).await
        }
    }

    fn service_with(store: Arc<dyn RecordStore>) -> ScreeningService {
        ScreeningService::new(QuestionBank::new(), ResponseGenerator::new(None), store)
    }

    const SCRIPT: [&str; 7] = [
        "Alice Smith",
        "alice@example.com",
        "+1 555-123-4567",
        "3",
        "Backend Engineer",
        "Remote",
        "python, docker",
    ];

    async fn run_script(service: &ScreeningService, id: Uuid) -> SessionReply {
        let mut last = None;
        for input in SCRIPT {
            last = Some(service.handle_message(id, input).await.unwrap());
        }
        last.unwrap()
    }

    #[tokio::test]
    async fn test_full_screening_stores_exactly_once() {
        let store = Arc::new(CountingStore::new(0));
        let service = service_with(store.clone());

        let start = service.start_session().await;
        assert!(start.reply.contains("full name"));
        assert_eq!(start.stage, Stage::Welcome);

        let reply = run_script(&service, start.session_id).await;
        assert_eq!(reply.stage, Stage::AskingTechnical);

        let mut last = reply;
        for i in 0..5 {
            last = service
                .handle_message(start.session_id, &format!("answer {i}"))
                .await
                .unwrap();
        }

        assert!(last.done);
        assert_eq!(last.stage, Stage::Terminal);
        assert!(last.reply.contains("Alice Smith"));
        assert_eq!(store.inserts.load(Ordering::SeqCst), 1);
        assert!(store
            .find_by_email("alice@example.com")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_exit_keyword_never_touches_the_store() {
        let store = Arc::new(CountingStore::new(0));
        let service = service_with(store.clone());

        let start = service.start_session().await;
        service
            .handle_message(start.session_id, "Alice Smith")
            .await
            .unwrap();
        let reply = service
            .handle_message(start.session_id, "goodbye")
            .await
            .unwrap();

        assert!(reply.done);
        assert!(reply.reply.contains("Alice Smith"));
        assert_eq!(store.inserts.load(Ordering::SeqCst), 0);

        // Terminal sessions still answer politely.
        let after = service
            .handle_message(start.session_id, "hello?")
            .await
            .unwrap();
        assert!(after.done);
        assert!(after.reply.contains("ended"));
    }

    #[tokio::test]
    async fn test_duplicate_email_returns_to_email_field() {
        let store = Arc::new(MemoryRecordStore::new());
        store
            .insert(&CandidateProfile {
                full_name: "Earlier Candidate".to_string(),
                email: "alice@example.com".to_string(),
                phone: "+15550000000".to_string(),
                years_experience: 1.0,
                desired_positions: vec!["QA".to_string()],
                current_location: "Berlin".to_string(),
                tech_stack: vec!["python".to_string()],
                answers: vec![],
            })
            .await
            .unwrap();
        let service = service_with(store.clone());

        let start = service.start_session().await;
        run_script(&service, start.session_id).await;
        let mut last = None;
        for i in 0..5 {
            last = Some(
                service
                    .handle_message(start.session_id, &format!("answer {i}"))
                    .await
                    .unwrap(),
            );
        }

        let last = last.unwrap();
        assert!(!last.done);
        assert_eq!(last.stage, Stage::CollectingBasicInfo);
        assert!(last.reply.contains("already registered"));

        // A corrected email completes the screening immediately.
        let fixed = service
            .handle_message(start.session_id, "alice.smith@example.com")
            .await
            .unwrap();
        assert!(fixed.done);
        assert!(store
            .find_by_email("alice.smith@example.com")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_store_outage_retries_without_losing_the_interview() {
        let store = Arc::new(CountingStore::new(1));
        let service = service_with(store.clone());

        let start = service.start_session().await;
        run_script(&service, start.session_id).await;
        let mut last = None;
        for i in 0..5 {
            last = Some(
                service
                    .handle_message(start.session_id, &format!("answer {i}"))
                    .await
                    .unwrap(),
            );
        }

        let last = last.unwrap();
        assert!(!last.done);
        assert_eq!(last.stage, Stage::Summary);
        assert!(last.reply.contains("try again"));

        let retried = service
            .handle_message(start.session_id, "ok, retry")
            .await
            .unwrap();
        assert!(retried.done);
        assert_eq!(store.inserts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unknown_session_is_rejected() {
        let service = service_with(Arc::new(MemoryRecordStore::new()));
        let err = service.handle_message(Uuid::new_v4(), "hi").await.unwrap_err();
        assert!(matches!(err, SessionError::NotFound));
    }
}
