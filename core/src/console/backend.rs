use pixeldeck_protocol::GameId;
use serde_json::Value;

/// Outbound calls to the game backend.
///
/// Both calls are fire-and-forget: implementations log failures and never
/// retry, the console keeps running whatever happens to the request.
pub trait Backend {
    fn submit_score(&self, game_id: GameId, score: u32);

    /// Stores a new save slot; `preview` is `Null` for games without a thumbnail.
    fn save_game(&self, game_id: GameId, data: Value, preview: Value);
}

/// Backend for running without a server, everything goes to the log.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullBackend;

impl Backend for NullBackend {
    fn submit_score(&self, game_id: GameId, score: u32) {
        log::info!("dropping score {} for game {}", score, game_id);
    }

    fn save_game(&self, game_id: GameId, _data: Value, _preview: Value) {
        log::info!("dropping save for game {}", game_id);
    }
}

#[cfg(test)]
pub use recording::RecordingBackend;
