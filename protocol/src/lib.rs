//! Wire types shared with the PixelDeck backend.
//!
//! The console only consumes a small slice of the REST API: the games catalog,
//! save slots and score submission. Everything here is plain serde data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Backend identifier of a catalog game (not the console's game kind).
pub type GameId = u64;

/// Backend identifier of a save slot.
pub type SaveId = u64;

/// One entry of `GET /api/games`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEntry {
    pub id: GameId,
    /// Stable identifier the console dispatches on, e.g. `"caro5"`.
    pub internal_id: String,
    #[serde(default)]
    pub name: String,
    /// Free-form per-game configuration, decoded by the console.
    #[serde(default)]
    pub config: Value,
    #[serde(default)]
    pub saved_game: Vec<SavedGame>,
}

/// A persisted save slot as returned inside a catalog entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedGame {
    pub id: SaveId,
    /// Opaque output of the game's save routine.
    #[serde(default)]
    pub data: Value,
    /// Snapshot used for thumbnails, kept raw so a bad payload never breaks the catalog.
    #[serde(default)]
    pub preview: Value,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SavedGame {
    pub fn new(id: SaveId, data: Value) -> Self {
        Self {
            id,
            data,
            preview: Value::Null,
            updated_at: None,
        }
    }

    /// Decodes the preview payload, `None` when it is absent or malformed.
    pub fn preview(&self) -> Option<Preview> {
        if self.preview.is_null() {
            return None;
        }
        serde_json::from_value(self.preview.clone()).ok()
    }
}

/// The thumbnail shapes the backend is known to store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Preview {
    /// Full frame as rows of `#rrggbb` strings.
    Grid(Vec<Vec<String>>),
    Snake {
        snake: Vec<(u8, u8)>,
        #[serde(default)]
        apple: Option<(u8, u8)>,
    },
    TicTacToe {
        board: Vec<Vec<Option<String>>>,
        #[serde(default)]
        winner: Option<String>,
    },
}

/// Body of `POST /api/games/{id}/save`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveRequest {
    pub data: Value,
    /// Thumbnail in one of the [`Preview`] shapes, omitted when the game has none.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub preview: Value,
}

/// Body of `POST /api/games/{id}/score`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub score: u32,
}

pub mod routes {
    use super::GameId;

    pub fn games() -> String {
        "/api/games".to_string()
    }

    pub fn save(id: GameId) -> String {
        format!("/api/games/{id}/save")
    }

    pub fn score(id: GameId) -> String {
        format!("/api/games/{id}/score")
    }

    pub fn comments(id: GameId) -> String {
        format!("/api/comments/{id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn catalog_entry_decodes_with_missing_optional_fields() {
        let entry: GameEntry = serde_json::from_value(json!({
            "id": 7,
            "internal_id": "snake",
        }))
        .unwrap();

        assert_eq!(entry.id, 7);
        assert_eq!(entry.internal_id, "snake");
        assert!(entry.saved_game.is_empty());
        assert!(entry.config.is_null());
    }

    #[test]
    fn snake_preview_is_recognized() {
        let save = SavedGame {
            id: 1,
            data: Value::Null,
            preview: json!({ "snake": [[5, 5], [5, 4]], "apple": [2, 2] }),
            updated_at: None,
        };

        assert_eq!(
            save.preview(),
            Some(Preview::Snake {
                snake: vec![(5, 5), (5, 4)],
                apple: Some((2, 2)),
            })
        );
    }

    #[test]
    fn tictactoe_preview_is_recognized() {
        let save = SavedGame {
            id: 1,
            data: Value::Null,
            preview: json!({
                "board": [["X", null, null], [null, "O", null], [null, null, null]],
                "winner": null,
            }),
            updated_at: None,
        };

        let Some(Preview::TicTacToe { board, winner }) = save.preview() else {
            panic!("expected tictactoe preview");
        };
        assert_eq!(board[0][0].as_deref(), Some("X"));
        assert_eq!(winner, None);
    }

    #[test]
    fn malformed_preview_degrades_to_none() {
        let save = SavedGame {
            id: 1,
            data: Value::Null,
            preview: json!({ "garbage": true }),
            updated_at: None,
        };

        assert_eq!(save.preview(), None);
    }

    #[test]
    fn save_slot_with_timestamp_decodes() {
        let save: SavedGame = serde_json::from_value(json!({
            "id": 3,
            "data": { "score": 4 },
            "updated_at": "2026-10-12T08:30:00Z",
        }))
        .unwrap();

        assert_eq!(save.data["score"], 4);
        assert!(save.updated_at.is_some());
    }

    #[test]
    fn save_request_omits_missing_preview() {
        let body = SaveRequest {
            data: json!({ "turn": "Red" }),
            preview: Value::Null,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "data": { "turn": "Red" } })
        );
    }

    #[test]
    fn routes_embed_game_id() {
        assert_eq!(routes::save(12), "/api/games/12/save");
        assert_eq!(routes::score(12), "/api/games/12/score");
    }
}
