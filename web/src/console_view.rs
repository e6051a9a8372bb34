use std::rc::Rc;

use bitflags::bitflags;
use gloo::events::EventListener;
use gloo::timers::callback::Interval;
use gloo::utils::document;
use pixeldeck_core::{
    Button, Console, ConsoleConfig, Coord, MATRIX_SIZE, Screen, SystemClock, TICK_MILLIS,
};
use pixeldeck_protocol::GameEntry;
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsCast;
use web_sys::KeyboardEvent;
use yew::prelude::*;

use crate::api::{HttpBackend, fetch_catalog};
use crate::settings::{Settings, SettingsView};
use crate::utils::*;

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct MouseButtons: u16 {
        const LEFT    = 1;
        const RIGHT   = 1 << 1;
        const MIDDLE  = 1 << 2;
        const BACK    = 1 << 3;
        const FORWARD = 1 << 4;
    }
}

/// What a keyboard key does to the console.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum KeyAction {
    Press(Button),
    TogglePause,
}

/// Maps a `KeyboardEvent.key` value to a console action.
pub(crate) fn key_action(key: &str) -> Option<KeyAction> {
    use KeyAction::*;
    let action = match key {
        "ArrowLeft" | "a" | "A" => Press(Button::Left),
        "ArrowRight" | "d" | "D" => Press(Button::Right),
        "ArrowUp" | "w" | "W" => Press(Button::Up),
        "ArrowDown" | "s" | "S" => Press(Button::Down),
        "Enter" | " " => Press(Button::Enter),
        "Escape" | "Backspace" => Press(Button::Back),
        "h" | "H" => Press(Button::Help),
        "p" | "P" => TogglePause,
        _ => return None,
    };
    Some(action)
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct DotState {
    pos: (Coord, Coord),
    buttons: MouseButtons,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) enum DotMsg {
    Update(DotState),
    Leave,
}

pub(crate) enum Msg {
    Tick,
    Key(KeyAction),
    Dot(DotMsg),
    TogglePause,
    Save,
    CatalogLoaded(Result<Vec<GameEntry>, String>),
    ToggleSettings,
    UpdateSettings(Settings),
    ApplySettings,
}

#[derive(Properties, Clone, PartialEq)]
struct DotProps {
    row: Coord,
    col: Coord,
    color: String,
    callback: Callback<DotMsg>,
}

#[function_component(Dot)]
fn dot_component(props: &DotProps) -> Html {
    let DotProps {
        row,
        col,
        color,
        callback,
    } = props.clone();

    let update = |callback: Callback<DotMsg>| {
        Callback::from(move |e: MouseEvent| {
            let buttons = MouseButtons::from_bits_truncate(e.buttons());
            callback.emit(DotMsg::Update(DotState {
                pos: (row, col),
                buttons,
            }));
        })
    };
    let onmousedown = update(callback.clone());
    let onmouseup = update(callback.clone());
    let onmouseleave = callback.reform(|_: MouseEvent| DotMsg::Leave);

    html! {
        <td class="dot" style={format!("background-color: {color}")} {onmousedown} {onmouseup} {onmouseleave}/>
    }
}

#[derive(Properties, Clone, PartialEq)]
pub(crate) struct ConsoleProps {
    /// Fixed console seed, random when absent.
    #[prop_or_default]
    pub seed: Option<u64>,
    /// Base URL of the REST API, empty for same origin.
    #[prop_or_default]
    pub api: String,
}

pub(crate) struct ConsoleView {
    console: Console,
    settings: Settings,
    draft: Settings,
    settings_open: bool,
    pressed: Option<DotState>,
    _timer_interval: Interval,
    _key_listener: EventListener,
}

impl ConsoleView {
    fn create_timer(ctx: &Context<Self>) -> Interval {
        let link = ctx.link().clone();
        Interval::new(TICK_MILLIS as u32, move || link.send_message(Msg::Tick))
    }

    fn create_key_listener(ctx: &Context<Self>) -> EventListener {
        let link = ctx.link().clone();
        EventListener::new(&document(), "keydown", move |event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            if let Some(action) = key_action(&event.key()) {
                event.prevent_default();
                link.send_message(Msg::Key(action));
            }
        })
    }

    fn load_catalog(ctx: &Context<Self>) {
        let base = ctx.props().api.clone();
        ctx.link().send_future(async move {
            Msg::CatalogLoaded(fetch_catalog(&base).await.map_err(|err| format!("{err:#}")))
        });
    }

    fn on_dot(&mut self, msg: DotMsg) -> bool {
        match msg {
            DotMsg::Leave => {
                self.pressed.take();
                false
            }
            DotMsg::Update(state) if state.buttons.is_empty() => {
                // a click is a left press and release on the same dot
                match self.pressed.take() {
                    Some(DotState {
                        pos,
                        buttons: MouseButtons::LEFT,
                    }) if pos == state.pos => {
                        log::debug!("click at {:?}", pos);
                        self.console.click(pos.0, pos.1);
                        true
                    }
                    _ => false,
                }
            }
            DotMsg::Update(state) => {
                self.pressed = Some(state);
                false
            }
        }
    }
}

impl Component for ConsoleView {
    type Message = Msg;
    type Properties = ConsoleProps;

    fn create(ctx: &Context<Self>) -> Self {
        let settings: Settings = LocalOrDefault::local_or_default();
        let config = ConsoleConfig {
            seed: Some(ctx.props().seed.unwrap_or_else(js_random_seed)),
            difficulty: settings.caro_difficulty,
            snake_speed: settings.snake_speed,
        };
        let backend = Rc::new(HttpBackend::new(ctx.props().api.clone()));
        let console = Console::new(config, backend, Rc::new(SystemClock));
        Self::load_catalog(ctx);
        Self {
            console,
            settings,
            draft: settings,
            settings_open: false,
            pressed: None,
            _timer_interval: Self::create_timer(ctx),
            _key_listener: Self::create_key_listener(ctx),
        }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;

        match msg {
            Tick => {
                self.console.tick();
                true
            }
            Key(_) if self.settings_open => false,
            Key(KeyAction::Press(button)) => {
                self.console.press(button);
                true
            }
            Key(KeyAction::TogglePause) | TogglePause => {
                self.console.toggle_pause();
                true
            }
            Dot(msg) => self.on_dot(msg),
            Save => {
                if !self.console.save() {
                    log::debug!("nothing to save on {:?}", self.console.screen());
                }
                false
            }
            CatalogLoaded(catalog) => {
                self.console.load_catalog(catalog);
                true
            }
            ToggleSettings => {
                self.settings_open = !self.settings_open;
                self.draft = self.settings;
                true
            }
            UpdateSettings(settings) => {
                let changed = self.draft != settings;
                self.draft = settings;
                changed
            }
            ApplySettings => {
                self.settings = self.draft;
                self.settings.local_save();
                self.console
                    .set_preferences(self.settings.caro_difficulty, self.settings.snake_speed);
                log::info!("settings applied: {:?}", self.settings);
                self.settings_open = false;
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        use Msg::*;

        let screen = self.console.screen();
        let in_game = matches!(screen, Screen::Playing | Screen::Paused);
        let frame = self.console.frame();
        let link = ctx.link();

        html! {
            <div class={classes!("pixeldeck", format!("{screen:?}").to_lowercase())}
                 oncontextmenu={Callback::from(move |e: MouseEvent| e.prevent_default())}>
                <small onclick={link.callback(|_| ToggleSettings)}>{"···"}</small>
                <table class="matrix">
                    {
                        for (0..MATRIX_SIZE).map(|row| html! {
                            <tr>
                                {
                                    for (0..MATRIX_SIZE).map(|col| {
                                        let color = frame.dot(row, col).to_css();
                                        let callback = link.callback(Msg::Dot);
                                        html! {
                                            <self::Dot {row} {col} {color} {callback}/>
                                        }
                                    })
                                }
                            </tr>
                        })
                    }
                </table>
                <output class="status">{self.console.status()}</output>
                <nav class="buttons">
                    {
                        for Button::ALL.into_iter().map(|button| html! {
                            <button onclick={link.callback(move |_| Key(KeyAction::Press(button)))}>
                                {button.label()}
                            </button>
                        })
                    }
                </nav>
                <nav class="session">
                    <button disabled={!in_game} onclick={link.callback(|_| TogglePause)}>
                        {if screen == Screen::Paused { "Resume" } else { "Pause" }}
                    </button>
                    <button disabled={!in_game} onclick={link.callback(|_| Save)}>{"Save"}</button>
                </nav>
                <SettingsView
                    open={self.settings_open}
                    settings={self.draft}
                    on_change={link.callback(UpdateSettings)}
                    on_apply={link.callback(|_| ApplySettings)}
                    on_cancel={link.callback(|_| ToggleSettings)}
                />
            </div>
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_and_wasd_steer() {
        for (keys, button) in [
            (["ArrowLeft", "a"], Button::Left),
            (["ArrowRight", "d"], Button::Right),
            (["ArrowUp", "w"], Button::Up),
            (["ArrowDown", "S"], Button::Down),
        ] {
            for key in keys {
                assert_eq!(key_action(key), Some(KeyAction::Press(button)), "{key}");
            }
        }
    }

    #[test]
    fn console_keys() {
        assert_eq!(key_action(" "), Some(KeyAction::Press(Button::Enter)));
        assert_eq!(key_action("Enter"), Some(KeyAction::Press(Button::Enter)));
        assert_eq!(key_action("Escape"), Some(KeyAction::Press(Button::Back)));
        assert_eq!(key_action("Backspace"), Some(KeyAction::Press(Button::Back)));
        assert_eq!(key_action("h"), Some(KeyAction::Press(Button::Help)));
        assert_eq!(key_action("P"), Some(KeyAction::TogglePause));
        assert_eq!(key_action("Tab"), None);
        assert_eq!(key_action("x"), None);
    }
}
