use pixeldeck_core::{Difficulty, SNAKE_MAX_SPEED, SNAKE_MIN_SPEED};
use serde::{Deserialize, Serialize};
use web_sys::HtmlSelectElement;
use yew::prelude::*;

use crate::utils::*;

/// Player preferences; `None` keeps whatever the catalog configures.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub caro_difficulty: Option<Difficulty>,
    pub snake_speed: Option<u8>,
}

impl StorageKey for Settings {
    const KEY: &'static str = "pixeldeck:settings:v1";
}

const CATALOG: &str = "catalog";

fn difficulty_value(difficulty: Option<Difficulty>) -> String {
    difficulty.map_or(CATALOG.to_string(), |d| d.label().to_lowercase())
}

fn parse_difficulty(value: &str) -> Option<Difficulty> {
    [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
        .into_iter()
        .find(|d| d.label().eq_ignore_ascii_case(value))
}

#[derive(Properties, PartialEq)]
pub(crate) struct SettingsProps {
    #[prop_or_default]
    pub open: bool,
    pub settings: Settings,
    pub on_change: Callback<Settings>,
    pub on_apply: Callback<()>,
    pub on_cancel: Callback<()>,
}

#[function_component]
pub(crate) fn SettingsView(props: &SettingsProps) -> Html {
    let settings = props.settings;

    let on_difficulty = {
        let on_change = props.on_change.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            on_change.emit(Settings {
                caro_difficulty: parse_difficulty(&select.value()),
                ..settings
            });
        })
    };
    let on_speed = {
        let on_change = props.on_change.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            on_change.emit(Settings {
                snake_speed: select.value().parse().ok(),
                ..settings
            });
        })
    };
    let on_apply = props.on_apply.reform(|_: MouseEvent| ());
    let on_cancel = props.on_cancel.reform(|_: MouseEvent| ());

    let difficulty = difficulty_value(settings.caro_difficulty);
    let speed = settings
        .snake_speed
        .map_or(CATALOG.to_string(), |speed| speed.to_string());

    html! {
        <dialog id="settings" open={props.open}>
            <article>
                <h2>{"Settings"}</h2>
                <label>
                    {"Caro difficulty"}
                    <select onchange={on_difficulty}>
                        <option value={CATALOG} selected={difficulty == CATALOG}>{"As configured"}</option>
                        {
                            for [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard].into_iter().map(|d| {
                                let value = difficulty_value(Some(d));
                                let selected = difficulty == value;
                                html! {
                                    <option {selected} {value}>{d.label()}</option>
                                }
                            })
                        }
                    </select>
                </label>
                <label>
                    {"Snake speed"}
                    <select onchange={on_speed}>
                        <option value={CATALOG} selected={speed == CATALOG}>{"As configured"}</option>
                        {
                            for (SNAKE_MIN_SPEED..=SNAKE_MAX_SPEED).map(|s| {
                                let value = s.to_string();
                                html! {
                                    <option selected={speed == value} value={value.clone()}>{value}</option>
                                }
                            })
                        }
                    </select>
                </label>
                <footer>
                    <button type="reset" onclick={on_cancel}>{"Cancel"}</button>
                    <button onclick={on_apply}>{"Apply"}</button>
                </footer>
            </article>
        </dialog>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_values_round_trip() {
        for d in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            assert_eq!(parse_difficulty(&difficulty_value(Some(d))), Some(d));
        }
        assert_eq!(parse_difficulty(&difficulty_value(None)), None);
    }

    #[test]
    fn settings_decode_with_missing_fields() {
        let settings: Settings = serde_json::from_str(r#"{ "snake_speed": 4 }"#).unwrap();
        assert_eq!(settings.snake_speed, Some(4));
        assert_eq!(settings.caro_difficulty, None);
        assert_eq!(<Settings as StorageKey>::KEY, "pixeldeck:settings:v1");
    }
}
