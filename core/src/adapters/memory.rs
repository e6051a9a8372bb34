use alloc::format;
use alloc::string::{String, ToString};

use pixeldeck_protocol::SavedGame;
use rand::rngs::SmallRng;
use serde_json::Value;

use super::*;

pub struct MemoryAdapter {
    state: MemoryState,
    sink: AdapterSink,
    rng: SmallRng,
    reporter: ScoreReporter,
}

impl MemoryAdapter {
    pub fn new(ctx: AdapterContext) -> Self {
        let config = MemoryConfig::new(
            ctx.settings.time_limit,
            ctx.settings.hints.unwrap_or(MEMORY_HINTS),
        );
        let mut rng = ctx.rng.clone();
        let state = ctx
            .saved_data::<MemorySnapshot>()
            .and_then(|snapshot| MemoryState::from_snapshot(snapshot, config))
            .unwrap_or_else(|| MemoryState::new(config, &mut rng));
        let mut adapter = Self {
            reporter: ScoreReporter::new(state.is_over()),
            state,
            sink: ctx.sink,
            rng,
        };
        adapter.refresh(0);
        adapter
    }

    pub fn state(&self) -> &MemoryState {
        &self.state
    }

    fn status(&self) -> String {
        let state = &self.state;
        match state.score() {
            Some(_) if state.is_timed_out() => "TIME UP - ENTER TO RETRY".to_string(),
            Some(score) => format!("CLEARED IN {} MOVES - SCORE {}", state.moves(), score),
            None => format!(
                "PAIRS {}/{} - HINTS {} - {}s",
                state.matched().len() / 2,
                MEMORY_CARDS / 2,
                state.hints_left(),
                state.remaining_secs()
            ),
        }
    }

    fn refresh(&mut self, tick: Tick) {
        self.sink.show(self.state.render(tick));
        self.sink.set_status(self.status());
        self.reporter.observe(&self.sink, self.state.score());
    }
}

impl ConsoleApp for MemoryAdapter {
    fn on_input(&mut self, button: Button, tick: Tick) {
        if button == Button::Back {
            self.sink.request_exit();
            return;
        }
        self.state = self.state.update(button, &mut self.rng);
        self.refresh(tick);
    }

    fn on_pointer(&mut self, row: Coord, col: Coord, tick: Tick) {
        if let Some(index) = memory_card_at(row, col) {
            self.state = self.state.select(index);
            self.refresh(tick);
        }
    }

    fn on_tick(&mut self, tick: Tick) {
        self.state = self.state.tick();
        self.refresh(tick);
    }
}

impl Persistable for MemoryAdapter {
    fn save_data(&self) -> Value {
        to_value(&self.state.snapshot())
    }

    fn preview_data(&self) -> Value {
        grid_preview(&self.state.render(3))
    }
}

impl Previewable for MemoryAdapter {
    fn preview(save: Option<&SavedGame>, tick: Tick) -> Frame {
        if let Some(frame) = stored_grid(save) {
            return frame;
        }
        match decode_save::<MemorySnapshot>(save) {
            Some(snapshot) if snapshot.cards.len() == MEMORY_CARDS => {
                render_cards(&snapshot.cards, |index| snapshot.matched.contains(&index))
            }
            _ => title_frame(GameKind::Memory, tick),
        }
    }
}
