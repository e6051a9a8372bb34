//! The console shell: catalog menu, scenario picker, transition and the
//! running game session.

use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::mem;

use pixeldeck_protocol::{GameEntry, GameId};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;

pub use backend::*;
pub use registry::*;
pub use scenario::*;

mod backend;
mod registry;
mod scenario;

/// Ticks between confirming a scenario and the game taking over the matrix.
pub const TRANSITION_TICKS: Tick = 10;

/// Start-up options of a console.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Seed of the console RNG, derived from the clock when absent.
    pub seed: Option<u64>,
    /// Player override of every game's Caro difficulty.
    pub difficulty: Option<Difficulty>,
    /// Player override of the catalog snake speed.
    pub snake_speed: Option<u8>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Screen {
    Loading,
    Menu,
    ScenarioSelect,
    Transition,
    Playing,
    Paused,
}

struct MenuEntry {
    kind: GameKind,
    entry: GameEntry,
}

impl MenuEntry {
    fn title(&self) -> &str {
        if self.entry.name.is_empty() {
            self.kind.label()
        } else {
            &self.entry.name
        }
    }
}

struct Session {
    kind: GameKind,
    game_id: GameId,
    adapter: Box<dyn GameAdapter>,
    sink: AdapterSink,
}

enum Mode {
    Loading,
    Menu,
    ScenarioSelect {
        items: Vec<ScenarioItem>,
        selected: usize,
    },
    Transition {
        item: ScenarioItem,
        remaining: Tick,
    },
    Playing(Session),
    Paused(Session),
}

pub struct Console {
    config: ConsoleConfig,
    registry: Registry,
    backend: Rc<dyn Backend>,
    clock: Rc<dyn Clock>,
    rng: SmallRng,
    games: Vec<MenuEntry>,
    menu_index: usize,
    mode: Mode,
    tick: Tick,
    frame: Frame,
    status: String,
}

impl Console {
    /// Console running the standard game registry.
    pub fn new(config: ConsoleConfig, backend: Rc<dyn Backend>, clock: Rc<dyn Clock>) -> Self {
        let registry = Registry::standard();
        if let Err(err) = registry.validate() {
            log::error!("standard registry is incomplete: {}", err);
        }
        Self::build(config, registry, backend, clock)
    }

    /// Console running a custom registry, which must cover every [`GameKind`].
    pub fn with_registry(
        config: ConsoleConfig,
        registry: Registry,
        backend: Rc<dyn Backend>,
        clock: Rc<dyn Clock>,
    ) -> Result<Self> {
        registry.validate()?;
        Ok(Self::build(config, registry, backend, clock))
    }

    fn build(
        config: ConsoleConfig,
        registry: Registry,
        backend: Rc<dyn Backend>,
        clock: Rc<dyn Clock>,
    ) -> Self {
        let seed = config.seed.unwrap_or_else(|| clock.now_millis());
        log::info!("console starting, seed {}", seed);
        let mut console = Self {
            config,
            registry,
            backend,
            clock,
            rng: SmallRng::seed_from_u64(seed),
            games: Vec::new(),
            menu_index: 0,
            mode: Mode::Loading,
            tick: 0,
            frame: create_empty_grid(),
            status: String::new(),
        };
        console.render();
        console
    }

    /// Fills the menu from the backend catalog.
    ///
    /// Unknown game ids are skipped; a failed fetch leaves an empty menu.
    pub fn load_catalog<E: fmt::Display>(&mut self, catalog: core::result::Result<Vec<GameEntry>, E>) {
        let entries = catalog.unwrap_or_else(|err| {
            log::error!("failed to load the games catalog: {}", err);
            Vec::new()
        });
        self.games = entries
            .into_iter()
            .filter_map(|entry| match entry.internal_id.parse::<GameKind>() {
                Ok(kind) => Some(MenuEntry { kind, entry }),
                Err(err) => {
                    log::warn!("skipping catalog entry {}: {}", entry.id, err);
                    None
                }
            })
            .collect();
        log::info!("catalog loaded with {} games", self.games.len());
        self.menu_index = 0;
        self.mode = Mode::Menu;
        self.render();
    }

    /// Player preferences that override catalog config for the next session.
    pub fn set_preferences(&mut self, difficulty: Option<Difficulty>, snake_speed: Option<u8>) {
        self.config.difficulty = difficulty;
        self.config.snake_speed = snake_speed;
    }

    pub fn press(&mut self, button: Button) {
        log::trace!("{:?} pressed on {:?}", button, self.screen());
        self.mode = match mem::replace(&mut self.mode, Mode::Loading) {
            Mode::Menu => self.press_menu(button),
            Mode::ScenarioSelect { items, selected } => match button {
                Button::Left => Mode::ScenarioSelect {
                    selected: selected.saturating_sub(1),
                    items,
                },
                Button::Right => Mode::ScenarioSelect {
                    selected: (selected + 1).min(items.len().saturating_sub(1)),
                    items,
                },
                Button::Enter => match items.into_iter().nth(selected) {
                    Some(item) => Mode::Transition {
                        item,
                        remaining: TRANSITION_TICKS,
                    },
                    None => Mode::Menu,
                },
                Button::Back => Mode::Menu,
                _ => Mode::ScenarioSelect { items, selected },
            },
            Mode::Playing(mut session) => {
                session.adapter.on_input(button, self.tick);
                Self::check_exit(session)
            }
            Mode::Paused(session) => match button {
                Button::Back => Mode::Menu,
                Button::Enter => Mode::Playing(session),
                _ => Mode::Paused(session),
            },
            mode @ (Mode::Loading | Mode::Transition { .. }) => mode,
        };
        self.render();
    }

    fn press_menu(&mut self, button: Button) -> Mode {
        let last = self.games.len().saturating_sub(1);
        match button {
            Button::Left => self.menu_index = self.menu_index.saturating_sub(1),
            Button::Right => self.menu_index = (self.menu_index + 1).min(last),
            Button::Enter => {
                if let Some(game) = self.games.get(self.menu_index) {
                    log::debug!("browsing scenarios of {}", game.kind);
                    return Mode::ScenarioSelect {
                        items: ScenarioItem::list_for(&game.entry),
                        selected: 0,
                    };
                }
            }
            _ => {}
        }
        Mode::Menu
    }

    /// Pointer click on a matrix dot, only meaningful while playing.
    pub fn click(&mut self, row: Coord, col: Coord) {
        if row >= MATRIX_SIZE || col >= MATRIX_SIZE {
            return;
        }
        self.mode = match mem::replace(&mut self.mode, Mode::Loading) {
            Mode::Playing(mut session) => {
                session.adapter.on_pointer(row, col, self.tick);
                Self::check_exit(session)
            }
            mode => mode,
        };
        self.render();
    }

    /// Advances the clock by one 100ms tick.
    pub fn tick(&mut self) {
        self.tick += 1;
        self.mode = match mem::replace(&mut self.mode, Mode::Loading) {
            Mode::Transition { item, remaining } if remaining <= 1 => self.start_session(item),
            Mode::Transition { item, remaining } => Mode::Transition {
                item,
                remaining: remaining - 1,
            },
            Mode::Playing(mut session) => {
                session.adapter.on_tick(self.tick);
                Self::check_exit(session)
            }
            mode => mode,
        };
        self.render();
    }

    pub fn toggle_pause(&mut self) {
        self.mode = match mem::replace(&mut self.mode, Mode::Loading) {
            Mode::Playing(session) => {
                log::debug!("{} paused", session.kind);
                Mode::Paused(session)
            }
            Mode::Paused(session) => {
                log::debug!("{} resumed", session.kind);
                Mode::Playing(session)
            }
            mode => mode,
        };
        self.render();
    }

    /// Sends the running game to the backend as a new save slot.
    ///
    /// Returns `false` when no game is running.
    pub fn save(&self) -> bool {
        let (Mode::Playing(session) | Mode::Paused(session)) = &self.mode else {
            return false;
        };
        log::info!("saving {} for game {}", session.kind, session.game_id);
        self.backend.save_game(
            session.game_id,
            session.adapter.save_data(),
            session.adapter.preview_data(),
        );
        true
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn tick_count(&self) -> Tick {
        self.tick
    }

    pub fn screen(&self) -> Screen {
        match self.mode {
            Mode::Loading => Screen::Loading,
            Mode::Menu => Screen::Menu,
            Mode::ScenarioSelect { .. } => Screen::ScenarioSelect,
            Mode::Transition { .. } => Screen::Transition,
            Mode::Playing(_) => Screen::Playing,
            Mode::Paused(_) => Screen::Paused,
        }
    }

    /// Game under the menu cursor.
    pub fn selected_game(&self) -> Option<GameKind> {
        self.games.get(self.menu_index).map(|game| game.kind)
    }

    fn check_exit(session: Session) -> Mode {
        if session.sink.take_exit() {
            log::debug!("{} exited to the menu", session.kind);
            Mode::Menu
        } else {
            Mode::Playing(session)
        }
    }

    fn start_session(&mut self, item: ScenarioItem) -> Mode {
        let Some(game) = self.games.get(self.menu_index) else {
            return Mode::Menu;
        };
        let factory = match self.registry.factory(game.kind) {
            Ok(factory) => *factory,
            Err(err) => {
                log::error!("cannot start {}: {}", game.kind, err);
                return Mode::Menu;
            }
        };
        let (kind, game_id) = (game.kind, game.entry.id);
        let settings = GameSettings::from_config(&game.entry.config)
            .with_overrides(self.config.difficulty, self.config.snake_speed);
        log::info!("starting {} ({})", kind, item.describe());

        let sink = AdapterSink::new(self.backend.clone(), Some(game_id));
        let ctx = AdapterContext {
            sink: sink.clone(),
            saved: item.into_save(),
            settings,
            rng: SmallRng::from_rng(&mut self.rng),
            clock: self.clock.clone(),
        };
        Mode::Playing(Session {
            kind,
            game_id,
            adapter: (factory.create)(ctx),
            sink,
        })
    }

    fn render(&mut self) {
        let tick = self.tick;
        let (frame, status) = match &self.mode {
            Mode::Loading => (loading_frame(tick), "CONNECTING...".to_string()),
            Mode::Menu => self.render_menu(tick),
            Mode::ScenarioSelect { items, selected } => {
                self.render_scenarios(items, *selected, tick)
            }
            Mode::Transition { remaining, .. } => self.render_transition(*remaining),
            Mode::Playing(session) => (session.sink.frame(), session.sink.status()),
            Mode::Paused(session) => (
                pause_frame(&session.sink.frame()),
                "PAUSED - ENTER TO RESUME, BACK FOR MENU".to_string(),
            ),
        };
        self.frame = frame;
        self.status = status;
    }

    fn render_menu(&self, tick: Tick) -> (Frame, String) {
        let Some(game) = self.games.get(self.menu_index) else {
            let mut frame = create_empty_grid();
            frame.draw_text_centered("NONE", 7, palette::GREY);
            return (frame, "NO GAMES AVAILABLE".to_string());
        };
        let mut frame = title_frame(game.kind, tick);
        draw_arrows(&mut frame, self.menu_index, self.games.len());
        let status = format!(
            "{} - {}/{} - ENTER TO PLAY",
            game.title(),
            self.menu_index + 1,
            self.games.len()
        );
        (frame, status)
    }

    fn render_scenarios(&self, items: &[ScenarioItem], selected: usize, tick: Tick) -> (Frame, String) {
        let (Some(game), Some(item)) = (self.games.get(self.menu_index), items.get(selected)) else {
            return (create_empty_grid(), String::new());
        };
        let mut frame = match (item.save(), self.registry.factory(game.kind)) {
            (Some(save), Ok(factory)) => (factory.preview)(Some(save), tick),
            (Some(_), Err(_)) => title_frame(game.kind, tick),
            (None, _) => new_game_frame(game.kind),
        };
        draw_arrows(&mut frame, selected, items.len());
        let status = format!("{} - {}/{}", item.describe(), selected + 1, items.len());
        (frame, status)
    }

    fn render_transition(&self, remaining: Tick) -> (Frame, String) {
        let mut frame = create_empty_grid();
        let Some(game) = self.games.get(self.menu_index) else {
            return (frame, String::new());
        };
        // curtain closes two rows per tick
        let rows = (TRANSITION_TICKS - remaining + 1) as i32 * 2;
        frame.fill_rect(0, 0, rows, MATRIX_SIZE as i32, game.kind.color().dim());
        (frame, format!("STARTING {}...", game.title()))
    }
}

fn loading_frame(tick: Tick) -> Frame {
    let mut frame = create_empty_grid();
    let lit = (tick % 4) as i32;
    for i in 0..4 {
        let color = if i == lit { palette::WHITE } else { palette::GREY };
        frame.set(10, 7 + i * 2, color);
    }
    frame
}

fn new_game_frame(kind: GameKind) -> Frame {
    let mut frame = create_empty_grid();
    frame.draw_border(kind.color().dim());
    frame.draw_text_centered("NEW", 5, kind.color());
    frame.draw_text_centered(kind.label(), 11, palette::WHITE);
    frame
}

fn pause_frame(frame: &Frame) -> Frame {
    let rows: Vec<Vec<Color>> = frame
        .to_rows()
        .into_iter()
        .map(|row| row.into_iter().map(Color::dim).collect())
        .collect();
    let mut frame = Frame::from_rows(&rows).unwrap_or_default();
    frame.draw_sprite(Some(icons::PAUSE.as_slice()), 6, 6, palette::WHITE);
    frame
}

/// Side chevrons telling whether LEFT/RIGHT lead anywhere.
fn draw_arrows(frame: &mut Frame, index: usize, count: usize) {
    let last = MATRIX_SIZE as i32 - 1;
    if index > 0 {
        frame.set(8, 1, palette::WHITE);
        frame.set(9, 0, palette::WHITE);
        frame.set(10, 1, palette::WHITE);
    }
    if index + 1 < count {
        frame.set(8, last - 1, palette::WHITE);
        frame.set(9, last, palette::WHITE);
        frame.set(10, last - 1, palette::WHITE);
    }
}
