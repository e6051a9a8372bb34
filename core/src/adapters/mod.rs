//! Console-side wrappers around the rule engines.
//!
//! An adapter owns one engine state, translates buttons and dot clicks into
//! engine transitions and pushes frames, status text and scores to the host
//! through an [`AdapterSink`].

use alloc::rc::Rc;
use alloc::string::String;
use core::cell::{Cell, RefCell};

use pixeldeck_protocol::{GameId, Preview, SavedGame};
use rand::rngs::SmallRng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::*;

pub use caro::*;
pub use line::*;
pub use memory::*;
pub use paint::*;
pub use snake::*;
pub use tictactoe::*;

mod caro;
mod line;
mod memory;
mod paint;
mod snake;
mod tictactoe;

/// Input and time handling shared by every console app.
pub trait ConsoleApp {
    fn on_input(&mut self, button: Button, tick: Tick);
    fn on_pointer(&mut self, row: Coord, col: Coord, tick: Tick);
    fn on_tick(&mut self, tick: Tick);
}

pub trait Persistable {
    /// Minimum state needed to resume later, stored opaquely by the backend.
    fn save_data(&self) -> Value;

    /// Thumbnail stored next to the save data.
    fn preview_data(&self) -> Value {
        Value::Null
    }
}

/// Thumbnail rendering for the scenario screen, without a live adapter.
pub trait Previewable {
    fn preview(save: Option<&SavedGame>, tick: Tick) -> Frame;
}

pub trait GameAdapter: ConsoleApp + Persistable {}

impl<T: ConsoleApp + Persistable> GameAdapter for T {}

struct SinkState {
    frame: RefCell<Frame>,
    status: RefCell<String>,
    exit: Cell<bool>,
    backend: Rc<dyn Backend>,
    game_id: Option<GameId>,
}

/// Write side of the host: frames, status line, scores and the exit request.
#[derive(Clone)]
pub struct AdapterSink {
    inner: Rc<SinkState>,
}

impl AdapterSink {
    pub fn new(backend: Rc<dyn Backend>, game_id: Option<GameId>) -> Self {
        Self {
            inner: Rc::new(SinkState {
                frame: RefCell::new(create_empty_grid()),
                status: RefCell::new(String::new()),
                exit: Cell::new(false),
                backend,
                game_id,
            }),
        }
    }

    pub fn show(&self, frame: Frame) {
        *self.inner.frame.borrow_mut() = frame;
    }

    pub fn set_status(&self, status: impl Into<String>) {
        *self.inner.status.borrow_mut() = status.into();
    }

    pub fn submit_score(&self, score: u32) {
        match self.inner.game_id {
            Some(game_id) => self.inner.backend.submit_score(game_id, score),
            None => log::debug!("score {} not submitted, no game id", score),
        }
    }

    pub fn request_exit(&self) {
        self.inner.exit.set(true);
    }

    pub fn frame(&self) -> Frame {
        self.inner.frame.borrow().clone()
    }

    pub fn status(&self) -> String {
        self.inner.status.borrow().clone()
    }

    /// Returns and clears a pending exit request.
    pub fn take_exit(&self) -> bool {
        self.inner.exit.replace(false)
    }
}

/// Submits the final score of a round exactly once.
///
/// Observing a non-terminal state re-arms the guard, so a reset round can
/// report again.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ScoreReporter {
    submitted: bool,
}

impl ScoreReporter {
    /// A guard that stays quiet while `already_over` rounds stay over.
    pub fn new(already_over: bool) -> Self {
        Self {
            submitted: already_over,
        }
    }

    pub fn observe(&mut self, sink: &AdapterSink, score: Option<u32>) {
        match score {
            Some(score) if !self.submitted => {
                log::info!("round finished with score {}", score);
                sink.submit_score(score);
                self.submitted = true;
            }
            Some(_) => {}
            None => self.submitted = false,
        }
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }
}

/// Longest round a catalog `time_limit` may ask for, in seconds.
pub const MAX_TIME_LIMIT_SECS: u64 = 3600;

/// Per-game options from the catalog `config` object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub difficulty: Difficulty,
    pub speed: u8,
    pub time_limit: u64,
    pub hints: Option<u8>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            speed: SNAKE_DEFAULT_SPEED,
            time_limit: 60,
            hints: None,
        }
    }
}

impl GameSettings {
    /// Decodes catalog config, falling back to defaults when it is malformed.
    pub fn from_config(config: &Value) -> Self {
        if config.is_null() {
            return Self::default();
        }
        let mut settings: Self = serde_json::from_value(config.clone()).unwrap_or_else(|err| {
            log::warn!("ignoring malformed game config {}: {}", config, err);
            Self::default()
        });
        let time_limit = settings.time_limit.clamp(1, MAX_TIME_LIMIT_SECS);
        if time_limit != settings.time_limit {
            log::warn!("time limit {}s out of range, using {}s", settings.time_limit, time_limit);
            settings.time_limit = time_limit;
        }
        settings
    }

    /// Applies the player's own preferences on top of the catalog values.
    pub fn with_overrides(mut self, difficulty: Option<Difficulty>, speed: Option<u8>) -> Self {
        if let Some(difficulty) = difficulty {
            self.difficulty = difficulty;
        }
        if let Some(speed) = speed {
            self.speed = speed;
        }
        self
    }
}

/// Everything an adapter is built from.
pub struct AdapterContext {
    pub sink: AdapterSink,
    pub saved: Option<SavedGame>,
    pub settings: GameSettings,
    pub rng: SmallRng,
    pub clock: Rc<dyn Clock>,
}

impl AdapterContext {
    /// Decodes the selected save, `None` for a new game or a malformed payload.
    pub fn saved_data<T: DeserializeOwned>(&self) -> Option<T> {
        decode_save(self.saved.as_ref())
    }
}

/// Decodes a save payload into the game's snapshot type.
pub fn decode_data<T: DeserializeOwned>(data: &Value) -> Result<T> {
    Ok(serde_json::from_value(data.clone())?)
}

pub(crate) fn decode_save<T: DeserializeOwned>(save: Option<&SavedGame>) -> Option<T> {
    let save = save?;
    match decode_data(&save.data) {
        Ok(data) => Some(data),
        Err(err) => {
            log::warn!("ignoring malformed save {}: {}", save.id, err);
            None
        }
    }
}

pub(crate) fn to_value<T: Serialize>(data: &T) -> Value {
    serde_json::to_value(data).unwrap_or_else(|err| {
        log::error!("failed to encode save data: {}", err);
        Value::Null
    })
}

/// Thumbnail stored as a full frame.
pub(crate) fn grid_preview(frame: &Frame) -> Value {
    let rows = frame
        .to_rows()
        .into_iter()
        .map(|row| row.into_iter().map(Color::to_css).collect())
        .collect();
    to_value(&Preview::Grid(rows))
}

/// A stored full-frame thumbnail, if the save carries one.
pub(crate) fn stored_grid(save: Option<&SavedGame>) -> Option<Frame> {
    match save?.preview()? {
        Preview::Grid(rows) => Frame::from_css_rows(&rows),
        _ => None,
    }
}

/// Generic logo render: an 8×8 icon above the game title.
pub fn title_frame(kind: GameKind, tick: Tick) -> Frame {
    let mut frame = create_empty_grid();
    let (icon, accent) = kind.icons();
    frame.draw_sprite(Some(icon.as_slice()), 2, 6, kind.color());
    if let Some(accent) = accent {
        frame.draw_sprite(Some(accent.as_slice()), 2, 6, palette::BLUE);
    }
    let title = if blink(tick, 10) {
        palette::WHITE
    } else {
        palette::GREY
    };
    frame.draw_text_centered(kind.label(), 13, title);
    frame
}

#[cfg(test)]
pub(crate) mod test_support {
    use rand::SeedableRng;

    use super::*;

    pub fn context(
        saved: Option<SavedGame>,
        settings: GameSettings,
    ) -> (AdapterContext, Rc<RecordingBackend>) {
        let backend = Rc::new(RecordingBackend::default());
        let ctx = AdapterContext {
            sink: AdapterSink::new(backend.clone(), Some(1)),
            saved,
            settings,
            rng: SmallRng::seed_from_u64(21),
            clock: Rc::new(ManualClock::new(0)),
        };
        (ctx, backend)
    }

    pub fn save_with(data: Value) -> SavedGame {
        SavedGame::new(9, data)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use serde_json::json;

    use super::test_support::*;
    use super::*;

    #[test]
    fn score_reporter_submits_once_and_rearms() {
        let (ctx, backend) = context(None, GameSettings::default());
        let mut reporter = ScoreReporter::default();

        reporter.observe(&ctx.sink, None);
        reporter.observe(&ctx.sink, Some(10));
        reporter.observe(&ctx.sink, Some(10));
        assert_eq!(backend.scores(), vec![(1, 10)]);

        reporter.observe(&ctx.sink, None);
        reporter.observe(&ctx.sink, Some(5));
        assert_eq!(backend.scores(), vec![(1, 10), (1, 5)]);
    }

    #[test]
    fn resumed_finished_round_is_not_resubmitted() {
        let (ctx, backend) = context(None, GameSettings::default());
        let mut reporter = ScoreReporter::new(true);
        reporter.observe(&ctx.sink, Some(10));
        assert!(backend.scores().is_empty());
    }

    #[test]
    fn malformed_save_data_is_an_error() {
        let err = decode_data::<SnakeSnapshot>(&json!({ "snake": "long" })).unwrap_err();
        assert!(matches!(err, ConsoleError::InvalidSaveData(_)), "{err:?}");

        let save = save_with(json!({ "snake": "long" }));
        assert_eq!(decode_save::<SnakeSnapshot>(Some(&save)), None);
    }

    #[test]
    fn settings_decode_leniently() {
        let settings = GameSettings::from_config(&json!({ "difficulty": "hard" }));
        assert_eq!(settings.difficulty, Difficulty::Hard);
        assert_eq!(settings.speed, SNAKE_DEFAULT_SPEED);

        let broken = GameSettings::from_config(&json!({ "speed": "fast" }));
        assert_eq!(broken, GameSettings::default());

        let overridden = settings.with_overrides(None, Some(5));
        assert_eq!(overridden.difficulty, Difficulty::Hard);
        assert_eq!(overridden.speed, 5);
    }

    #[test]
    fn time_limit_is_clamped() {
        let huge = GameSettings::from_config(&json!({ "time_limit": u64::MAX }));
        assert_eq!(huge.time_limit, MAX_TIME_LIMIT_SECS);
        let zero = GameSettings::from_config(&json!({ "time_limit": 0 }));
        assert_eq!(zero.time_limit, 1);
        let plain = GameSettings::from_config(&json!({ "time_limit": 90 }));
        assert_eq!(plain.time_limit, 90);
    }

    #[test]
    fn sink_exit_request_is_taken_once() {
        let (ctx, _) = context(None, GameSettings::default());
        ctx.sink.request_exit();
        assert!(ctx.sink.take_exit());
        assert!(!ctx.sink.take_exit());
    }

    #[test]
    fn malformed_save_decodes_to_none() {
        let (ctx, _) = context(Some(save_with(json!("nonsense"))), GameSettings::default());
        assert_eq!(ctx.saved_data::<SnakeSnapshot>(), None);
    }

    #[test]
    fn grid_preview_round_trips() {
        let mut frame = create_empty_grid();
        frame.set(4, 4, palette::CYAN);
        let mut save = save_with(Value::Null);
        save.preview = grid_preview(&frame);
        assert_eq!(stored_grid(Some(&save)), Some(frame));
    }

    #[test]
    fn title_frame_draws_icon_and_label() {
        let frame = title_frame(GameKind::Snake, 0);
        assert_ne!(frame, create_empty_grid());
        assert_eq!(frame.dot(14, 0), palette::WHITE);
    }
}
