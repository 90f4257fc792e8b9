use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{Card, CardId, Playlist, PlaylistId, UserId},
    protocol::{CreateCardRequest, DeleteCardRequest, UpdateCardRequest},
};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::warn;

pub mod projection;
pub mod store;

pub use projection::{project, Direction, SortKey, ViewQuery};
pub use store::{CollectionStore, Lifecycle, MutationKind, StoreError, TrackedCard};

/// Remote boundary for card mutations. Failure is any transport error or
/// non-success response; implementations do not distinguish further.
#[async_trait]
pub trait CardRemote: Send + Sync {
    async fn create_card(&self, request: CreateCardRequest) -> Result<Card>;
    async fn update_card(&self, request: UpdateCardRequest) -> Result<()>;
    async fn delete_card(&self, request: DeleteCardRequest) -> Result<()>;
}

pub struct MissingCardRemote;

#[async_trait]
impl CardRemote for MissingCardRemote {
    async fn create_card(&self, request: CreateCardRequest) -> Result<Card> {
        Err(anyhow!(
            "card backend unavailable for playlist {}",
            request.playlist_id
        ))
    }

    async fn update_card(&self, request: UpdateCardRequest) -> Result<()> {
        Err(anyhow!("card backend unavailable for card {}", request.id))
    }

    async fn delete_card(&self, request: DeleteCardRequest) -> Result<()> {
        Err(anyhow!("card backend unavailable for card {}", request.id))
    }
}

/// reqwest-backed implementation of the card API. All three operations share
/// one endpoint and differ only in method, matching the remote service.
pub struct HttpCardRemote {
    http: Client,
    server_url: String,
}

impl HttpCardRemote {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            server_url: server_url.into(),
        }
    }

    fn cards_endpoint(&self) -> String {
        format!("{}/api/cards", self.server_url)
    }
}

#[async_trait]
impl CardRemote for HttpCardRemote {
    async fn create_card(&self, request: CreateCardRequest) -> Result<Card> {
        let card = self
            .http
            .post(self.cards_endpoint())
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(card)
    }

    async fn update_card(&self, request: UpdateCardRequest) -> Result<()> {
        self.http
            .patch(self.cards_endpoint())
            .json(&request)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn delete_card(&self, request: DeleteCardRequest) -> Result<()> {
        self.http
            .delete(self.cards_endpoint())
            .json(&request)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Boundary for AI-assisted card generation. Nothing in the mutation core
/// calls it; clients run with [`MissingCardGenerator`] until a backend
/// exists.
#[async_trait]
pub trait CardGenerator: Send + Sync {
    async fn generate(&self, context: &str, count: u32) -> Result<Vec<(String, String)>>;
}

pub struct MissingCardGenerator;

#[async_trait]
impl CardGenerator for MissingCardGenerator {
    async fn generate(&self, _context: &str, count: u32) -> Result<Vec<(String, String)>> {
        Err(anyhow!(
            "card generation backend unavailable (requested {count} cards)"
        ))
    }
}

/// User-facing mutation outcome. The display messages below are the retained
/// error text; underlying causes are logged, never shown verbatim.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CollectionError {
    #[error("Question cannot be empty")]
    EmptyQuestion,
    #[error("Answer cannot be empty")]
    EmptyAnswer,
    #[error("Failed to create card, maybe check your internet ?")]
    CreateFailed,
    #[error("Failed to update card")]
    EditFailed,
    #[error("Failed to delete card")]
    DeleteFailed,
    #[error("no playlist loaded")]
    NoPlaylist,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// The store contents changed; any derived view should be recomputed.
    CollectionChanged,
    Error(String),
}

#[derive(Default)]
struct ClientState {
    playlist_id: Option<PlaylistId>,
    owner_id: Option<UserId>,
    store: CollectionStore,
    last_error: Option<String>,
}

/// Sequences each user-initiated mutation through optimistic-apply →
/// remote-call → reconcile.
///
/// The inner lock is held only across synchronous store transitions, never
/// across a remote await, so mutations on distinct cards may be in flight
/// simultaneously; the per-card idle guard serializes mutations on one card.
/// A pending mutation runs to completion: there is no cancellation and no
/// timeout, so a hung remote call leaves its card pending indefinitely.
pub struct CardCollectionClient {
    remote: Arc<dyn CardRemote>,
    inner: Mutex<ClientState>,
    events: broadcast::Sender<ClientEvent>,
}

impl CardCollectionClient {
    pub fn new(remote: Arc<dyn CardRemote>) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            remote,
            inner: Mutex::new(ClientState::default()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    /// Replaces the tracked collection with the given playlist's cards.
    /// Called whenever the source playlist reference changes.
    pub async fn load_playlist(&self, playlist: Playlist) {
        {
            let mut guard = self.inner.lock().await;
            guard.playlist_id = Some(playlist.id.clone());
            guard.owner_id = Some(playlist.owner_id.clone());
            guard.store.initialize(playlist.cards);
            guard.last_error = None;
        }
        let _ = self.events.send(ClientEvent::CollectionChanged);
    }

    /// Whether the acting user owns the loaded playlist. Display gating
    /// only; the mutation core does not enforce ownership.
    pub async fn is_owner(&self, user_id: &UserId) -> bool {
        self.inner.lock().await.owner_id.as_ref() == Some(user_id)
    }

    pub async fn snapshot(&self) -> Vec<TrackedCard> {
        self.inner.lock().await.store.snapshot()
    }

    pub async fn card(&self, id: &CardId) -> Option<TrackedCard> {
        self.inner.lock().await.store.get(id).cloned()
    }

    /// The most recent user-visible error message, if any. Replaced on
    /// failure, cleared by the next successful mutation.
    pub async fn last_error(&self) -> Option<String> {
        self.inner.lock().await.last_error.clone()
    }

    /// Projects the current store contents through the given view query.
    pub async fn view(&self, query: &ViewQuery) -> Vec<TrackedCard> {
        projection::project(&self.snapshot().await, query)
    }

    pub async fn toggle_revealed(&self, id: &CardId) -> Result<(), CollectionError> {
        {
            let mut guard = self.inner.lock().await;
            guard.store.toggle_revealed(id)?;
        }
        let _ = self.events.send(ClientEvent::CollectionChanged);
        Ok(())
    }

    /// Creates a card. Both fields are trimmed and must be non-empty;
    /// validation failures never reach the remote service. No optimistic row
    /// is added since the id is unknown until the server responds, so every
    /// failure path leaves the store untouched and the inputs retryable.
    pub async fn create(&self, question: &str, answer: &str) -> Result<Card, CollectionError> {
        let question = question.trim();
        let answer = answer.trim();
        if question.is_empty() {
            return Err(self.record_failure(CollectionError::EmptyQuestion).await);
        }
        if answer.is_empty() {
            return Err(self.record_failure(CollectionError::EmptyAnswer).await);
        }

        let playlist_id = self.require_playlist().await?;
        let request = CreateCardRequest {
            playlist_id,
            question: question.to_string(),
            answer: answer.to_string(),
        };

        match self.remote.create_card(request).await {
            Ok(card) => {
                {
                    let mut guard = self.inner.lock().await;
                    guard.store.commit_create(card.clone());
                    guard.last_error = None;
                }
                let _ = self.events.send(ClientEvent::CollectionChanged);
                Ok(card)
            }
            Err(err) => {
                warn!("card create failed: {err:#}");
                Err(self.record_failure(CollectionError::CreateFailed).await)
            }
        }
    }

    /// Edits a card's fields. The card is marked pending before any network
    /// activity; on success the submitted values are committed (the server
    /// response carries no payload beyond the success signal), on failure
    /// the card returns to idle with its fields unchanged.
    pub async fn edit(
        &self,
        id: &CardId,
        new_question: &str,
        new_answer: &str,
    ) -> Result<(), CollectionError> {
        let request = {
            let mut guard = self.inner.lock().await;
            let playlist_id = guard
                .playlist_id
                .clone()
                .ok_or(CollectionError::NoPlaylist)?;
            guard.store.begin_mutation(id, MutationKind::Edit)?;
            UpdateCardRequest {
                playlist_id,
                id: id.clone(),
                new_question: new_question.to_string(),
                new_answer: new_answer.to_string(),
            }
        };
        let _ = self.events.send(ClientEvent::CollectionChanged);

        match self.remote.update_card(request).await {
            Ok(()) => {
                {
                    let mut guard = self.inner.lock().await;
                    guard
                        .store
                        .commit_edit(id, new_question.to_string(), new_answer.to_string())?;
                    guard.last_error = None;
                }
                let _ = self.events.send(ClientEvent::CollectionChanged);
                Ok(())
            }
            Err(err) => {
                warn!(card_id = %id, "card edit failed: {err:#}");
                self.rollback(id).await;
                Err(self.record_failure(CollectionError::EditFailed).await)
            }
        }
    }

    /// Deletes a card. Marked pending optimistically; removed from the store
    /// on success, restored to idle on failure.
    pub async fn delete(&self, id: &CardId) -> Result<(), CollectionError> {
        let request = {
            let mut guard = self.inner.lock().await;
            let playlist_id = guard
                .playlist_id
                .clone()
                .ok_or(CollectionError::NoPlaylist)?;
            guard.store.begin_mutation(id, MutationKind::Delete)?;
            DeleteCardRequest {
                playlist_id,
                id: id.clone(),
            }
        };
        let _ = self.events.send(ClientEvent::CollectionChanged);

        match self.remote.delete_card(request).await {
            Ok(()) => {
                {
                    let mut guard = self.inner.lock().await;
                    guard.store.commit_delete(id)?;
                    guard.last_error = None;
                }
                let _ = self.events.send(ClientEvent::CollectionChanged);
                Ok(())
            }
            Err(err) => {
                warn!(card_id = %id, "card delete failed: {err:#}");
                self.rollback(id).await;
                Err(self.record_failure(CollectionError::DeleteFailed).await)
            }
        }
    }

    async fn require_playlist(&self) -> Result<PlaylistId, CollectionError> {
        self.inner
            .lock()
            .await
            .playlist_id
            .clone()
            .ok_or(CollectionError::NoPlaylist)
    }

    async fn rollback(&self, id: &CardId) {
        {
            let mut guard = self.inner.lock().await;
            // The card cannot have been removed while its own mutation was
            // in flight; a missing id here must not mask the remote failure
            // being reported.
            let _ = guard.store.abort_mutation(id);
        }
        let _ = self.events.send(ClientEvent::CollectionChanged);
    }

    async fn record_failure(&self, error: CollectionError) -> CollectionError {
        let message = error.to_string();
        {
            let mut guard = self.inner.lock().await;
            guard.last_error = Some(message.clone());
        }
        let _ = self.events.send(ClientEvent::Error(message));
        error
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
