use std::collections::HashMap;

use shared::domain::{Card, CardId};
use thiserror::Error;

/// Where a card stands with respect to its current remote mutation.
///
/// `Idle` is both the initial state and the only state from which a new
/// mutation may start. A pending card returns to `Idle` when its mutation
/// resolves (commit or abort), or disappears entirely on a committed delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Idle,
    PendingEdit,
    PendingDelete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Edit,
    Delete,
}

impl MutationKind {
    fn pending_lifecycle(self) -> Lifecycle {
        match self {
            MutationKind::Edit => Lifecycle::PendingEdit,
            MutationKind::Delete => Lifecycle::PendingDelete,
        }
    }
}

/// A card plus its client-side tracking state. `revealed` is a pure UI
/// toggle and is independent of the mutation lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedCard {
    pub card: Card,
    pub lifecycle: Lifecycle,
    pub revealed: bool,
}

impl TrackedCard {
    fn idle(card: Card) -> Self {
        Self {
            card,
            lifecycle: Lifecycle::Idle,
            revealed: false,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("unknown card id {0}")]
    UnknownCard(CardId),
    #[error("card {0} already has a mutation in flight")]
    MutationInFlight(CardId),
}

/// In-memory collection state, keyed by card id. The transition operations
/// below are the only mutation entry points; all of them are synchronous and
/// none performs I/O. Iteration order is not meaningful; display order is
/// always produced by the projection layer.
#[derive(Debug, Default)]
pub struct CollectionStore {
    cards: HashMap<CardId, TrackedCard>,
}

impl CollectionStore {
    /// Replaces the entire store contents. Used only when the source
    /// playlist changes.
    pub fn initialize(&mut self, cards: impl IntoIterator<Item = Card>) {
        self.cards = cards
            .into_iter()
            .map(|card| (card.id.clone(), TrackedCard::idle(card)))
            .collect();
    }

    pub fn get(&self, id: &CardId) -> Option<&TrackedCard> {
        self.cards.get(id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Clones the current contents for projection or inspection.
    pub fn snapshot(&self) -> Vec<TrackedCard> {
        self.cards.values().cloned().collect()
    }

    /// Marks a card as having a mutation in flight. Fails without touching
    /// the store if the card is unknown or not currently idle.
    pub fn begin_mutation(&mut self, id: &CardId, kind: MutationKind) -> Result<(), StoreError> {
        let tracked = self
            .cards
            .get_mut(id)
            .ok_or_else(|| StoreError::UnknownCard(id.clone()))?;
        if tracked.lifecycle != Lifecycle::Idle {
            return Err(StoreError::MutationInFlight(id.clone()));
        }
        tracked.lifecycle = kind.pending_lifecycle();
        Ok(())
    }

    /// Appends a card the remote service has confirmed. The server-assigned
    /// id and timestamp are authoritative.
    pub fn commit_create(&mut self, card: Card) {
        self.cards.insert(card.id.clone(), TrackedCard::idle(card));
    }

    pub fn commit_edit(
        &mut self,
        id: &CardId,
        question: String,
        answer: String,
    ) -> Result<(), StoreError> {
        let tracked = self
            .cards
            .get_mut(id)
            .ok_or_else(|| StoreError::UnknownCard(id.clone()))?;
        tracked.card.question = question;
        tracked.card.answer = answer;
        tracked.lifecycle = Lifecycle::Idle;
        Ok(())
    }

    pub fn commit_delete(&mut self, id: &CardId) -> Result<(), StoreError> {
        self.cards
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::UnknownCard(id.clone()))
    }

    /// Resets a card to idle without touching its fields. Used when a remote
    /// mutation fails.
    pub fn abort_mutation(&mut self, id: &CardId) -> Result<(), StoreError> {
        let tracked = self
            .cards
            .get_mut(id)
            .ok_or_else(|| StoreError::UnknownCard(id.clone()))?;
        tracked.lifecycle = Lifecycle::Idle;
        Ok(())
    }

    /// Flips the answer-face toggle. Allowed regardless of lifecycle.
    pub fn toggle_revealed(&mut self, id: &CardId) -> Result<(), StoreError> {
        let tracked = self
            .cards
            .get_mut(id)
            .ok_or_else(|| StoreError::UnknownCard(id.clone()))?;
        tracked.revealed = !tracked.revealed;
        Ok(())
    }
}
