use alloc::format;
use alloc::string::{String, ToString};

use pixeldeck_protocol::SavedGame;
use serde_json::Value;

use super::*;

/// Tile sandbox: there is no goal, so nothing is ever scored.
pub struct LineAdapter {
    state: LineState,
    sink: AdapterSink,
}

impl LineAdapter {
    pub fn new(ctx: AdapterContext) -> Self {
        let mut rng = ctx.rng.clone();
        let state = ctx
            .saved_data::<LineSnapshot>()
            .and_then(LineState::from_snapshot)
            .unwrap_or_else(|| LineState::new(&mut rng));
        let mut adapter = Self {
            state,
            sink: ctx.sink,
        };
        adapter.refresh(0);
        adapter
    }

    pub fn state(&self) -> &LineState {
        &self.state
    }

    fn status(&self) -> String {
        match self.state.selected() {
            Some((row, col)) => format!("SELECTED {},{}", row + 1, col + 1),
            None => "ENTER TO SELECT A TILE".to_string(),
        }
    }

    fn refresh(&mut self, tick: Tick) {
        self.sink.show(self.state.render(tick));
        self.sink.set_status(self.status());
    }
}

impl ConsoleApp for LineAdapter {
    fn on_input(&mut self, button: Button, tick: Tick) {
        if button == Button::Back {
            self.sink.request_exit();
            return;
        }
        self.state = self.state.update(button);
        self.refresh(tick);
    }

    fn on_pointer(&mut self, row: Coord, col: Coord, tick: Tick) {
        if let Some(coords) = line_tile_at(row, col) {
            self.state = self.state.select_at(coords);
            self.refresh(tick);
        }
    }

    fn on_tick(&mut self, tick: Tick) {
        self.refresh(tick);
    }
}

impl Persistable for LineAdapter {
    fn save_data(&self) -> Value {
        to_value(&self.state.snapshot())
    }

    fn preview_data(&self) -> Value {
        grid_preview(&self.state.render(0))
    }
}

impl Previewable for LineAdapter {
    fn preview(save: Option<&SavedGame>, tick: Tick) -> Frame {
        stored_grid(save)
            .or_else(|| {
                let snapshot = decode_save::<LineSnapshot>(save)?;
                Some(LineState::from_snapshot(snapshot)?.render(0))
            })
            .unwrap_or_else(|| title_frame(GameKind::Line, tick))
    }
}
