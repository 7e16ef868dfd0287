//! Note directory.
//!
//! A [`NoteDirectory`] publishes notes to one topic and answers lookups by
//! note id. On first use it pages through the topic's history, then opens a
//! live subscription resuming after the last sequence it saw. Both feeds land
//! in one bounded [`MessageLog`]; a lookup is a synchronous scan of that log.
//!
//! Initialization is serialized: concurrent callers share one backfill, and a
//! failed backfill leaves the directory uninitialized so the next call retries.

mod log;
mod types;

pub use types::{
    DirectoryConfig, DirectoryState, NoteResult, NoteSummary, PasswordPrompt,
    DEFAULT_MAX_MESSAGES,
};

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::codec::crypto::random_bytes;
use crate::codec::{serialize_for_transport, Codec, Note};
use crate::error::{NoteError, Result, TransportError};
use crate::transport::{MessageHandler, RawMessage, SubscriptionHandle, Topic, Transport};

use log::MessageLog;

/// Random bytes behind a generated password token (hex-encoded for sharing).
const PASSWORD_TOKEN_BYTES: usize = 32;

/// Publishes and looks up notes on a single topic.
pub struct NoteDirectory {
    transport: Arc<dyn Transport>,
    topic: Topic,
    codec: Codec,
    log: Arc<Mutex<MessageLog>>,
    subscription: tokio::sync::Mutex<Option<Box<dyn SubscriptionHandle>>>,
    state: watch::Sender<DirectoryState>,
    password_prompt: Option<Arc<dyn PasswordPrompt>>,
}

impl NoteDirectory {
    /// Create a directory over `transport`. No network activity happens until
    /// the first read or list.
    pub fn new(transport: Arc<dyn Transport>, topic: Topic) -> Self {
        let (state, _) = watch::channel(DirectoryState::Uninitialized);
        Self {
            transport,
            topic,
            codec: Codec::default(),
            log: Arc::new(Mutex::new(MessageLog::new(
                DirectoryConfig::default().max_messages,
            ))),
            subscription: tokio::sync::Mutex::new(None),
            state,
            password_prompt: None,
        }
    }

    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_config(mut self, config: DirectoryConfig) -> Self {
        self.log = Arc::new(Mutex::new(MessageLog::new(config.max_messages)));
        self
    }

    /// Ask `prompt` for a password when an encrypted note is read without one.
    pub fn with_password_prompt(mut self, prompt: Arc<dyn PasswordPrompt>) -> Self {
        self.password_prompt = Some(prompt);
        self
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn state(&self) -> DirectoryState {
        *self.state.borrow()
    }

    /// Receiver that observes every state transition.
    pub fn watch_state(&self) -> watch::Receiver<DirectoryState> {
        self.state.subscribe()
    }

    /// Number of notes currently retained.
    pub fn message_count(&self) -> usize {
        self.lock_log().map(|log| log.len()).unwrap_or(0)
    }

    /// Publish `content` as a new note.
    ///
    /// With `encrypt`, a random password token is generated and returned in
    /// the result; it is the only way to read the note back.
    ///
    /// # Errors
    ///
    /// - `NoteError::Closed` if the directory has been closed
    /// - `NoteError::Publish` if the transport rejects the message
    pub async fn create_note(&self, content: &str, encrypt: bool) -> Result<NoteResult> {
        let password =
            encrypt.then(|| hex::encode(random_bytes::<PASSWORD_TOKEN_BYTES>()));
        self.publish_new(content, password).await
    }

    /// Publish `content` encrypted under a caller-chosen password.
    ///
    /// The returned `password` is `None`; the caller already holds it.
    ///
    /// # Errors
    ///
    /// Returns `NoteError::InvalidInput` for an empty password, otherwise as
    /// [`NoteDirectory::create_note`].
    pub async fn create_note_with_password(
        &self,
        content: &str,
        password: &str,
    ) -> Result<NoteResult> {
        if password.is_empty() {
            return Err(NoteError::InvalidInput(
                "password cannot be empty".to_string(),
            ));
        }
        let mut result = self.publish_new(content, Some(password.to_string())).await?;
        result.password = None;
        Ok(result)
    }

    async fn publish_new(&self, content: &str, password: Option<String>) -> Result<NoteResult> {
        self.ensure_open()?;

        let note = self.encode(content, password.clone()).await?;
        let payload = serialize_for_transport(&note)
            .map_err(|e| NoteError::InvalidInput(format!("note cannot be encoded: {}", e)))?;
        let timestamp = Utc::now();
        self.transport
            .publish(&self.topic, payload.clone(), timestamp)
            .await
            .map_err(NoteError::Publish)?;

        // Local copy so the author can read the note before the live feed
        // echoes it back; the echo is dropped as a duplicate id.
        self.lock_log()?
            .append(RawMessage::new(payload).with_timestamp(timestamp));

        info!(
            note_id = %note.id,
            encrypted = note.is_encrypted(),
            topic = %self.topic,
            "published note"
        );
        Ok(NoteResult {
            id: note.id,
            password,
        })
    }

    async fn encode(&self, content: &str, password: Option<String>) -> Result<Note> {
        let codec = self.codec;
        let content = content.to_string();
        let password = password.map(Zeroizing::new);
        let (note, _key) = tokio::task::spawn_blocking(move || {
            codec.encode_note(&content, password.as_deref().map(String::as_str))
        })
        .await
        .map_err(|e| NoteError::Crypto(format!("encode task failed: {}", e)))??;
        Ok(note)
    }

    /// Look up a note and return its plaintext.
    ///
    /// Returns `Ok(None)` when no note with `id` is known. When the note is
    /// encrypted and `password` is `None`, the configured [`PasswordPrompt`]
    /// is asked.
    ///
    /// # Errors
    ///
    /// - `NoteError::Backfill` / `NoteError::Subscribe` if initialization fails
    /// - `NoteError::PasswordRequired` if no password is available
    /// - `NoteError::Decrypt` if the password does not recover the note
    pub async fn read_note(&self, id: &str, password: Option<&str>) -> Result<Option<String>> {
        self.ensure_initialized().await?;

        let Some(note) = self.lock_log()?.find(id) else {
            debug!(note_id = %id, "note not found");
            return Ok(None);
        };

        if !note.is_encrypted() {
            return Ok(Some(note.content));
        }

        let password = match password {
            Some(password) => Zeroizing::new(password.to_string()),
            None => self
                .password_prompt
                .as_ref()
                .and_then(|prompt| prompt.password_for(id))
                .map(Zeroizing::new)
                .ok_or_else(|| NoteError::PasswordRequired(id.to_string()))?,
        };

        let codec = self.codec;
        let content = tokio::task::spawn_blocking(move || codec.decode_note(&note, &password))
            .await
            .map_err(|e| NoteError::Crypto(format!("decode task failed: {}", e)))??;
        Ok(Some(content))
    }

    /// Summaries of every known note in scan order.
    ///
    /// # Errors
    ///
    /// Returns the initialization error if backfill or subscription fails.
    pub async fn list_notes(&self) -> Result<Vec<NoteSummary>> {
        self.ensure_initialized().await?;
        let log = self.lock_log()?;
        Ok(log
            .notes()
            .map(|(note, message)| NoteSummary {
                id: note.id.clone(),
                encrypted: note.is_encrypted(),
                timestamp: message.timestamp,
            })
            .collect())
    }

    /// Backfill and subscribe, once.
    ///
    /// Callers that arrive while another caller is initializing wait for it
    /// and then observe its outcome.
    pub async fn ensure_initialized(&self) -> Result<()> {
        let mut subscription = self.subscription.lock().await;
        if subscription.is_some() {
            return Ok(());
        }
        self.ensure_open()?;

        self.state.send_replace(DirectoryState::Initializing);
        match self.initialize().await {
            Ok(handle) => {
                *subscription = Some(handle);
                self.state.send_replace(DirectoryState::Subscribed);
                info!(topic = %self.topic, messages = self.message_count(), "directory ready");
                Ok(())
            }
            Err(err) => {
                warn!(topic = %self.topic, error = %err, "initialization failed");
                self.state.send_replace(DirectoryState::Uninitialized);
                Err(err)
            }
        }
    }

    async fn initialize(&self) -> Result<Box<dyn SubscriptionHandle>> {
        let mut history = Vec::new();
        let mut cursor = None;
        let mut pages = 0usize;
        loop {
            let page = self
                .transport
                .query_history(&self.topic, cursor)
                .await
                .map_err(NoteError::Backfill)?;
            pages += 1;
            history.extend(page.messages);

            match page.next_cursor {
                Some(next) if cursor == Some(next) => {
                    return Err(NoteError::Backfill(TransportError::Rejected(format!(
                        "history cursor did not advance past {}",
                        next
                    ))));
                }
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        let resume_after = {
            let mut log = self.lock_log()?;
            let received = history.len();
            let mut kept = 0usize;
            for message in history {
                if log.append(message) {
                    kept += 1;
                }
            }
            debug!(topic = %self.topic, pages, received, kept, "backfill complete");
            // An empty history has been seen up to position zero.
            log.max_sequence()
                .or_else(|| (received == 0).then_some(0))
        };

        let log = Arc::clone(&self.log);
        let handler: MessageHandler = Arc::new(move |message: RawMessage| match log.lock() {
            Ok(mut log) => {
                log.append(message);
            }
            Err(_) => warn!("message log poisoned; dropping live message"),
        });

        self.transport
            .subscribe(&self.topic, resume_after, handler)
            .await
            .map_err(NoteError::Subscribe)
    }

    /// Cancel the live subscription. Later operations fail with
    /// `NoteError::Closed`.
    pub async fn close(&self) {
        let mut subscription = self.subscription.lock().await;
        if let Some(handle) = subscription.take() {
            handle.unsubscribe();
        }
        self.state.send_replace(DirectoryState::Closed);
        debug!(topic = %self.topic, "directory closed");
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state() == DirectoryState::Closed {
            return Err(NoteError::Closed);
        }
        Ok(())
    }

    fn lock_log(&self) -> Result<MutexGuard<'_, MessageLog>> {
        self.log
            .lock()
            .map_err(|_| NoteError::Storage("message log poisoned".to_string()))
    }
}

impl Drop for NoteDirectory {
    fn drop(&mut self) {
        if let Some(handle) = self.subscription.get_mut().take() {
            handle.unsubscribe();
        }
    }
}
