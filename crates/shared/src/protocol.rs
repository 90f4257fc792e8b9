use serde::{Deserialize, Serialize};

use crate::domain::{CardId, PlaylistId};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardRequest {
    pub playlist_id: PlaylistId,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCardRequest {
    pub playlist_id: PlaylistId,
    pub id: CardId,
    pub new_question: String,
    pub new_answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCardRequest {
    pub playlist_id: PlaylistId,
    pub id: CardId,
}
