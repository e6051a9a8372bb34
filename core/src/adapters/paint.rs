use alloc::format;

use pixeldeck_protocol::SavedGame;
use serde_json::Value;

use super::*;

pub struct PaintAdapter {
    state: PaintState,
    sink: AdapterSink,
}

impl PaintAdapter {
    pub fn new(ctx: AdapterContext) -> Self {
        let state = ctx
            .saved_data::<PaintSnapshot>()
            .and_then(PaintState::from_snapshot)
            .unwrap_or_default();
        let mut adapter = Self {
            state,
            sink: ctx.sink,
        };
        adapter.refresh(0);
        adapter
    }

    pub fn state(&self) -> &PaintState {
        &self.state
    }

    fn refresh(&mut self, tick: Tick) {
        self.sink.show(self.state.render(tick));
        self.sink.set_status(format!(
            "COLOR {} - HELP CYCLES, ENTER PAINTS",
            self.state.selected_color()
        ));
    }
}

impl ConsoleApp for PaintAdapter {
    fn on_input(&mut self, button: Button, tick: Tick) {
        if button == Button::Back {
            self.sink.request_exit();
            return;
        }
        self.state = self.state.update(button);
        self.refresh(tick);
    }

    fn on_pointer(&mut self, row: Coord, col: Coord, tick: Tick) {
        self.state = self.state.click(row, col);
        self.refresh(tick);
    }

    fn on_tick(&mut self, tick: Tick) {
        self.refresh(tick);
    }
}

impl Persistable for PaintAdapter {
    fn save_data(&self) -> Value {
        to_value(&self.state.snapshot())
    }

    fn preview_data(&self) -> Value {
        grid_preview(&self.state.render(3))
    }
}

impl Previewable for PaintAdapter {
    fn preview(save: Option<&SavedGame>, tick: Tick) -> Frame {
        stored_grid(save)
            .or_else(|| {
                let snapshot = decode_save::<PaintSnapshot>(save)?;
                Some(PaintState::from_snapshot(snapshot)?.render(3))
            })
            .unwrap_or_else(|| title_frame(GameKind::Paint, tick))
    }
}
