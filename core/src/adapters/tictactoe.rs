use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use pixeldeck_protocol::{Preview, SavedGame};
use rand::rngs::SmallRng;
use serde_json::Value;

use super::*;

pub struct TicTacToeAdapter {
    state: TicTacToeState,
    sink: AdapterSink,
    rng: SmallRng,
    reporter: ScoreReporter,
}

impl TicTacToeAdapter {
    pub fn new(ctx: AdapterContext) -> Self {
        let state = ctx
            .saved_data::<TicTacToeSnapshot>()
            .and_then(TicTacToeState::from_snapshot)
            .unwrap_or_default();
        let mut adapter = Self {
            reporter: ScoreReporter::new(state.is_over()),
            state,
            sink: ctx.sink,
            rng: ctx.rng,
        };
        adapter.refresh(0);
        adapter
    }

    pub fn state(&self) -> &TicTacToeState {
        &self.state
    }

    fn status(&self) -> String {
        match self.state.winner() {
            Some(Outcome::Won(Mark::X)) => "YOU WIN! ENTER FOR A NEW ROUND".to_string(),
            Some(Outcome::Won(Mark::O)) => "COMPUTER WINS - ENTER TO RETRY".to_string(),
            Some(Outcome::Draw) => "DRAW - ENTER FOR A NEW ROUND".to_string(),
            None => format!("YOUR TURN (X) - HINTS {}", self.state.hints_left()),
        }
    }

    fn refresh(&mut self, tick: Tick) {
        self.sink.show(self.state.render(tick));
        self.sink.set_status(self.status());
        self.reporter.observe(&self.sink, self.state.score());
    }
}

impl ConsoleApp for TicTacToeAdapter {
    fn on_input(&mut self, button: Button, tick: Tick) {
        if button == Button::Back {
            self.sink.request_exit();
            return;
        }
        self.state = self.state.update(button, &mut self.rng);
        self.refresh(tick);
    }

    fn on_pointer(&mut self, row: Coord, col: Coord, tick: Tick) {
        let Some(coords) = tictactoe_cell_at(row, col) else {
            return;
        };
        self.state = self.state.play_at(coords, &mut self.rng);
        self.refresh(tick);
    }

    fn on_tick(&mut self, tick: Tick) {
        self.state = self.state.tick();
        self.refresh(tick);
    }
}

impl Persistable for TicTacToeAdapter {
    fn save_data(&self) -> Value {
        to_value(&self.state.snapshot())
    }

    fn preview_data(&self) -> Value {
        let snapshot = self.state.snapshot();
        let board = snapshot
            .board
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.map(|mark| mark.label().to_string()))
                    .collect()
            })
            .collect();
        let winner = snapshot.winner.map(|outcome| match outcome {
            Outcome::Won(mark) => mark.label().to_string(),
            Outcome::Draw => "DRAW".to_string(),
        });
        to_value(&Preview::TicTacToe { board, winner })
    }
}

/// Rebuilds a board from the `"X"`/`"O"` labels of a stored preview.
fn board_from_labels(board: &[Vec<Option<String>>]) -> Option<TicTacToeState> {
    let rows: Vec<Vec<Option<Mark>>> = board
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| cell.as_deref().and_then(Mark::from_label))
                .collect()
        })
        .collect();
    TicTacToeState::from_snapshot(TicTacToeSnapshot {
        board: rows,
        cursor: None,
        winner: None,
        hints_left: 0,
    })
}

impl Previewable for TicTacToeAdapter {
    fn preview(save: Option<&SavedGame>, tick: Tick) -> Frame {
        if let Some(Preview::TicTacToe { board, .. }) = save.and_then(SavedGame::preview) {
            if let Some(state) = board_from_labels(&board) {
                return state.render(3);
            }
        }
        decode_save::<TicTacToeSnapshot>(save)
            .and_then(TicTacToeState::from_snapshot)
            .map(|state| state.render(3))
            .unwrap_or_else(|| title_frame(GameKind::TicTacToe, tick))
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use serde_json::json;

    use super::super::test_support::*;
    use super::*;

    fn adapter_with(data: Value) -> (TicTacToeAdapter, Rc<RecordingBackend>) {
        let (ctx, backend) = context(Some(save_with(data)), GameSettings::default());
        (TicTacToeAdapter::new(ctx), backend)
    }

    #[test]
    fn click_plays_the_cell_under_the_pointer() {
        let (ctx, _) = context(None, GameSettings::default());
        let mut adapter = TicTacToeAdapter::new(ctx);

        adapter.on_pointer(2, 14, 1);
        assert_eq!(adapter.state().cell((0, 2)), Some(Mark::X));
        assert_eq!(adapter.state().mark_count(), 2);

        // grid lines are ignored
        let before = adapter.state().clone();
        adapter.on_pointer(6, 6, 2);
        assert_eq!(adapter.state(), &before);
    }

    #[test]
    fn win_is_scored_once() {
        let (mut adapter, backend) = adapter_with(json!({
            "board": [["X", "X", null], ["O", "O", null], [null, null, null]],
        }));
        adapter.on_pointer(1, 13, 1);
        adapter.on_tick(2);
        adapter.on_tick(3);
        assert_eq!(backend.scores(), vec![(1, 10)]);
    }

    #[test]
    fn save_and_preview_agree() {
        let (adapter, _) = adapter_with(json!({
            "board": [["X", null, null], [null, "O", null], [null, null, null]],
            "hints_left": 1,
        }));
        assert_eq!(adapter.state().hints_left(), 1);

        let mut save = save_with(adapter.save_data());
        save.preview = adapter.preview_data();
        assert_eq!(save.preview["board"][1][1], "O");

        let frame = TicTacToeAdapter::preview(Some(&save), 0);
        assert_eq!(frame, adapter.state().render(3));
    }

    #[test]
    fn bad_board_falls_back_to_a_fresh_game() {
        let (adapter, _) = adapter_with(json!({ "board": [["X"]] }));
        assert_eq!(adapter.state(), &TicTacToeState::new());
    }
}
