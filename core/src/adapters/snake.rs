use alloc::format;
use alloc::string::{String, ToString};

use pixeldeck_protocol::{Preview, SavedGame};
use rand::rngs::SmallRng;
use serde_json::Value;

use super::*;

pub struct SnakeAdapter {
    state: SnakeState,
    sink: AdapterSink,
    rng: SmallRng,
    reporter: ScoreReporter,
}

impl SnakeAdapter {
    pub fn new(ctx: AdapterContext) -> Self {
        let config = SnakeConfig::new(ctx.settings.speed, ctx.settings.time_limit);
        let mut rng = ctx.rng.clone();
        let state = ctx
            .saved_data::<SnakeSnapshot>()
            .and_then(|snapshot| SnakeState::from_snapshot(snapshot, config, &mut rng))
            .unwrap_or_else(|| SnakeState::new(config, &mut rng));
        let mut adapter = Self {
            reporter: ScoreReporter::new(state.is_over()),
            state,
            sink: ctx.sink,
            rng,
        };
        adapter.refresh(0);
        adapter
    }

    pub fn state(&self) -> &SnakeState {
        &self.state
    }

    fn status(&self) -> String {
        let state = &self.state;
        if let Some(score) = state.score() {
            format!("GAME OVER - {} APPLES - SCORE {}", state.apples(), score)
        } else if state.is_paused() {
            "PAUSED - ENTER TO CONTINUE".to_string()
        } else {
            format!("APPLES {} - TIME {}s", state.apples(), state.remaining_secs())
        }
    }

    fn refresh(&mut self, tick: Tick) {
        self.sink.show(self.state.render(tick));
        self.sink.set_status(self.status());
        self.reporter.observe(&self.sink, self.state.score());
    }
}

impl ConsoleApp for SnakeAdapter {
    fn on_input(&mut self, button: Button, tick: Tick) {
        if button == Button::Back {
            self.sink.request_exit();
            return;
        }
        self.state = self.state.update(button, &mut self.rng);
        self.refresh(tick);
    }

    fn on_pointer(&mut self, _row: Coord, _col: Coord, _tick: Tick) {}

    fn on_tick(&mut self, tick: Tick) {
        self.state = self.state.tick(&mut self.rng);
        self.refresh(tick);
    }
}

impl Persistable for SnakeAdapter {
    fn save_data(&self) -> Value {
        to_value(&self.state.snapshot())
    }

    fn preview_data(&self) -> Value {
        to_value(&Preview::Snake {
            snake: self.state.body().collect(),
            apple: self.state.apple(),
        })
    }
}

impl Previewable for SnakeAdapter {
    fn preview(save: Option<&SavedGame>, tick: Tick) -> Frame {
        if let Some(Preview::Snake { snake, apple }) = save.and_then(SavedGame::preview) {
            return render_snake(&snake, apple, palette::GREEN);
        }
        if let Some(snapshot) = decode_save::<SnakeSnapshot>(save) {
            return render_snake(&snapshot.snake, snapshot.apple, palette::GREEN);
        }
        stored_grid(save).unwrap_or_else(|| title_frame(GameKind::Snake, tick))
    }
}
