use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use pixeldeck_protocol::{GameEntry, SavedGame};

/// One entry of the scenario screen: a fresh round or a stored save slot.
#[derive(Clone, Debug, PartialEq)]
pub enum ScenarioItem {
    New,
    Save(SavedGame),
}

impl ScenarioItem {
    /// "NEW GAME" followed by the entry's save slots, newest first.
    pub fn list_for(entry: &GameEntry) -> Vec<ScenarioItem> {
        let mut saves = entry.saved_game.clone();
        saves.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        core::iter::once(ScenarioItem::New)
            .chain(saves.into_iter().map(ScenarioItem::Save))
            .collect()
    }

    pub fn save(&self) -> Option<&SavedGame> {
        match self {
            ScenarioItem::New => None,
            ScenarioItem::Save(save) => Some(save),
        }
    }

    pub fn into_save(self) -> Option<SavedGame> {
        match self {
            ScenarioItem::New => None,
            ScenarioItem::Save(save) => Some(save),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ScenarioItem::New => "NEW GAME".to_string(),
            ScenarioItem::Save(save) => match save.updated_at {
                Some(at) => format!("SAVE #{} ({})", save.id, at.format("%Y-%m-%d %H:%M")),
                None => format!("SAVE #{}", save.id),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use serde_json::json;

    use super::*;

    #[test]
    fn new_game_comes_first_then_newest_saves() {
        let entry: GameEntry = serde_json::from_value(json!({
            "id": 3,
            "internal_id": "memory",
            "saved_game": [
                { "id": 10, "updated_at": "2024-01-01T10:00:00Z" },
                { "id": 11, "updated_at": "2024-03-01T10:00:00Z" },
            ],
        }))
        .unwrap();

        let items = ScenarioItem::list_for(&entry);
        assert_eq!(items.len(), 3);
        assert_eq!(items[0], ScenarioItem::New);
        assert_eq!(items[1].save().map(|s| s.id), Some(11));
        assert_eq!(items[2].describe(), "SAVE #10 (2024-01-01 10:00)");
    }

    #[test]
    fn entry_without_saves_offers_only_new_game() {
        let entry: GameEntry =
            serde_json::from_value(json!({ "id": 1, "internal_id": "snake" })).unwrap();
        assert_eq!(ScenarioItem::list_for(&entry), vec![ScenarioItem::New]);
        assert_eq!(ScenarioItem::New.into_save(), None);
    }
}
