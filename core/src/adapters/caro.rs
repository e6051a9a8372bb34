use alloc::format;
use alloc::rc::Rc;
use alloc::string::{String, ToString};

use pixeldeck_protocol::SavedGame;
use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Human,
    Computer,
}

/// Save payload: the board plus which colour the computer plays.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct CaroSave {
    #[serde(flatten)]
    board: CaroSnapshot,
    #[serde(default)]
    computer: Option<Player>,
}

pub struct CaroAdapter {
    state: CaroState,
    computer: Player,
    difficulty: Difficulty,
    /// Wall-clock time at which the computer may move, set when its turn begins.
    deadline: Option<u64>,
    sink: AdapterSink,
    rng: SmallRng,
    clock: Rc<dyn Clock>,
    reporter: ScoreReporter,
}

impl CaroAdapter {
    pub fn new(ctx: AdapterContext, win_length: u8) -> Self {
        let mut rng = ctx.rng.clone();
        let saved = ctx
            .saved_data::<CaroSave>()
            .and_then(|save| Some((CaroState::from_snapshot(save.board)?, save.computer)));
        let (state, computer) = match saved {
            Some((state, computer)) => (state, computer),
            None => (CaroState::new(win_length), None),
        };
        // roles are fixed for the session, a coin toss decides who is red
        let computer = computer.unwrap_or_else(|| {
            if rng.random_bool(0.5) {
                Player::Red
            } else {
                Player::Blue
            }
        });
        log::debug!(
            "caro session, {}-in-a-row, computer plays {:?} on {:?}",
            state.win_length(),
            computer,
            ctx.settings.difficulty
        );

        let mut adapter = Self {
            reporter: ScoreReporter::new(state.is_over()),
            state,
            computer,
            difficulty: ctx.settings.difficulty,
            deadline: None,
            sink: ctx.sink,
            rng,
            clock: ctx.clock,
        };
        adapter.refresh(0);
        adapter
    }

    pub fn state(&self) -> &CaroState {
        &self.state
    }

    pub fn role(&self, player: Player) -> Role {
        if player == self.computer {
            Role::Computer
        } else {
            Role::Human
        }
    }

    fn is_computer_turn(&self) -> bool {
        !self.state.is_over() && self.role(self.state.turn()) == Role::Computer
    }

    /// Human view of the final result: 10 for a win, 5 for a draw.
    fn score(&self) -> Option<u32> {
        match self.state.winner()? {
            Outcome::Won(player) if self.role(player) == Role::Human => Some(10),
            Outcome::Won(_) => Some(0),
            Outcome::Draw => Some(5),
        }
    }

    fn status(&self) -> String {
        let human = self.computer.opponent();
        match self.state.winner() {
            Some(Outcome::Won(player)) if player == human => {
                format!("YOU WIN AS {}! ENTER FOR A NEW ROUND", player.label())
            }
            Some(Outcome::Won(player)) => {
                format!("{} (COMPUTER) WINS - ENTER TO RETRY", player.label())
            }
            Some(Outcome::Draw) => "DRAW - ENTER FOR A NEW ROUND".to_string(),
            None if self.is_computer_turn() => {
                format!("COMPUTER ({}) IS THINKING...", self.computer.label())
            }
            None => format!("YOUR TURN ({})", human.label()),
        }
    }

    fn refresh(&mut self, tick: Tick) {
        self.sink.show(self.state.render(tick));
        self.sink.set_status(self.status());
        self.reporter.observe(&self.sink, self.score());
    }

    fn play(&mut self, next: CaroState) {
        if next.is_over() != self.state.is_over() || next.turn() != self.state.turn() {
            self.deadline = None;
        }
        self.state = next;
    }

    fn think(&mut self) {
        if !self.is_computer_turn() {
            self.deadline = None;
            return;
        }
        let now = self.clock.now_millis();
        let Some(deadline) = self.deadline else {
            self.deadline = Some(now + think_delay(&mut self.rng));
            return;
        };
        if now < deadline {
            return;
        }
        self.deadline = None;
        if let Some(coords) = choose_move(&self.state, self.difficulty, &mut self.rng) {
            log::debug!("computer plays {:?}", coords);
            self.state = self.state.play_at(coords);
        }
    }
}

impl ConsoleApp for CaroAdapter {
    fn on_input(&mut self, button: Button, tick: Tick) {
        if button == Button::Back {
            self.sink.request_exit();
            return;
        }
        if button == Button::Enter && self.is_computer_turn() {
            return;
        }
        let next = self.state.update(button);
        self.play(next);
        self.refresh(tick);
    }

    fn on_pointer(&mut self, row: Coord, col: Coord, tick: Tick) {
        if self.is_computer_turn() {
            return;
        }
        let next = self.state.play_at((row, col));
        self.play(next);
        self.refresh(tick);
    }

    fn on_tick(&mut self, tick: Tick) {
        self.think();
        self.refresh(tick);
    }
}

impl Persistable for CaroAdapter {
    fn save_data(&self) -> Value {
        to_value(&CaroSave {
            board: self.state.snapshot(),
            computer: Some(self.computer),
        })
    }

    fn preview_data(&self) -> Value {
        grid_preview(&self.state.render(3))
    }
}

fn caro_preview(kind: GameKind, save: Option<&SavedGame>, tick: Tick) -> Frame {
    stored_grid(save)
        .or_else(|| {
            let save = decode_save::<CaroSave>(save)?;
            Some(CaroState::from_snapshot(save.board)?.render(3))
        })
        .unwrap_or_else(|| title_frame(kind, tick))
}

/// Thumbnails for the four-in-a-row variant.
pub struct Caro4Preview;

/// Thumbnails for the five-in-a-row variant.
pub struct Caro5Preview;

impl Previewable for Caro4Preview {
    fn preview(save: Option<&SavedGame>, tick: Tick) -> Frame {
        caro_preview(GameKind::Caro4, save, tick)
    }
}

impl Previewable for Caro5Preview {
    fn preview(save: Option<&SavedGame>, tick: Tick) -> Frame {
        caro_preview(GameKind::Caro5, save, tick)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use serde_json::json;

    use super::super::test_support::*;
    use super::*;

    fn hard() -> GameSettings {
        GameSettings {
            difficulty: Difficulty::Hard,
            ..GameSettings::default()
        }
    }

    /// Adapter where the computer plays `computer`, driven by a manual clock.
    fn adapter(computer: Player) -> (CaroAdapter, Rc<ManualClock>, Rc<RecordingBackend>) {
        let save = save_with(to_value(&CaroSave {
            board: CaroState::new(5).snapshot(),
            computer: Some(computer),
        }));
        let (mut ctx, backend) = context(Some(save), hard());
        let clock = Rc::new(ManualClock::new(1_000));
        ctx.clock = clock.clone();
        (CaroAdapter::new(ctx, 5), clock, backend)
    }

    #[test]
    fn computer_waits_for_its_deadline() {
        let (mut adapter, clock, _) = adapter(Player::Red);
        assert_eq!(adapter.role(Player::Red), Role::Computer);

        adapter.on_tick(1);
        assert!(adapter.state().is_board_empty());

        clock.advance(THINK_MIN_MILLIS - 1);
        adapter.on_tick(2);
        assert!(adapter.state().is_board_empty());

        clock.advance(THINK_MAX_MILLIS);
        adapter.on_tick(3);
        assert!(!adapter.state().is_board_empty());
        assert_eq!(adapter.state().turn(), Player::Blue);
    }

    #[test]
    fn enter_is_ignored_while_the_computer_thinks() {
        let (mut adapter, _, _) = adapter(Player::Red);
        adapter.on_input(Button::Enter, 1);
        adapter.on_pointer(3, 3, 1);
        assert!(adapter.state().is_board_empty());

        // the cursor still moves
        adapter.on_input(Button::Left, 2);
        assert_eq!(adapter.state().cursor(), (10, 9));
    }

    #[test]
    fn human_click_places_and_hands_over() {
        let (mut adapter, clock, _) = adapter(Player::Blue);
        adapter.on_pointer(4, 7, 1);
        assert_eq!(adapter.state().cell((4, 7)), Some(Player::Red));
        assert_eq!(adapter.status(), "COMPUTER (BLUE) IS THINKING...");

        adapter.on_tick(2);
        clock.advance(THINK_MAX_MILLIS);
        adapter.on_tick(3);
        assert_eq!(adapter.state().turn(), Player::Red);
    }

    #[test]
    fn human_win_scores_ten_once() {
        let (mut adapter, clock, backend) = adapter(Player::Blue);
        // blue answers far away, so red's row stays open
        for col in 0..5 {
            adapter.on_pointer(0, col, 0);
            if adapter.state().is_over() {
                break;
            }
            let mut state = adapter.state().clone();
            state = state.play_at((19, col * 2));
            adapter.state = state;
        }
        adapter.on_tick(1);
        clock.advance(THINK_MAX_MILLIS);
        adapter.on_tick(2);

        assert_eq!(adapter.state().winner(), Some(Outcome::Won(Player::Red)));
        assert_eq!(backend.scores(), vec![(1, 10)]);

        adapter.on_input(Button::Enter, 3);
        assert!(adapter.state().is_board_empty());
        assert!(!adapter.reporter.is_submitted());
    }

    #[test]
    fn save_keeps_roles_and_win_length() {
        let (adapter, _, _) = adapter(Player::Red);
        let data = adapter.save_data();
        assert_eq!(data["computer"], json!("Red"));
        assert_eq!(data["win_length"], json!(5));

        let save = save_with(data);
        let (ctx, _) = context(Some(save), GameSettings::default());
        let resumed = CaroAdapter::new(ctx, 4);
        assert_eq!(resumed.role(Player::Red), Role::Computer);
        assert_eq!(resumed.state().win_length(), 5);
    }

    #[test]
    fn preview_renders_saved_board() {
        let state = CaroState::new(4).play_at((2, 2));
        let save = save_with(to_value(&CaroSave {
            board: state.snapshot(),
            computer: None,
        }));
        let frame = Caro4Preview::preview(Some(&save), 0);
        assert_eq!(frame.dot(2, 2), palette::RED);
        assert_eq!(Caro5Preview::preview(None, 0), title_frame(GameKind::Caro5, 0));
    }
}
