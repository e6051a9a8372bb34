use alloc::vec::Vec;

use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

pub const MEMORY_COLUMNS: Coord = 4;
pub const MEMORY_CARDS: usize = (MEMORY_COLUMNS * MEMORY_COLUMNS) as usize;
pub const MEMORY_OFFSET: Coord = 1;
pub const MEMORY_CARD_SIZE: Coord = 4;
pub const MEMORY_GAP: Coord = 1;

pub const MATCH_POINTS: u32 = 10;
pub const HIDE_DELAY_TICKS: u8 = 8;
pub const MEMORY_HINTS: u8 = 2;
pub const MEMORY_HINT_TICKS: Tick = 15;
pub const HINT_PENALTY: u32 = 5;
pub const MEMORY_DEFAULT_TIME_LIMIT: u64 = 60;

const CARD_COLORS: [Color; MEMORY_CARDS / 2] = [
    palette::RED,
    palette::BLUE,
    palette::GREEN,
    palette::YELLOW,
    palette::ORANGE,
    palette::PURPLE,
    palette::CYAN,
    palette::PINK,
];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryConfig {
    pub time_limit_secs: u64,
    pub hints: u8,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: MEMORY_DEFAULT_TIME_LIMIT,
            hints: MEMORY_HINTS,
        }
    }
}

impl MemoryConfig {
    pub fn new(time_limit_secs: u64, hints: u8) -> Self {
        Self {
            time_limit_secs: time_limit_secs.max(1),
            hints,
        }
    }

    const fn time_limit_ticks(&self) -> Tick {
        self.time_limit_secs.saturating_mul(TICKS_PER_SECOND)
    }
}

/// Save payload. A pair still being compared is not kept, it resumes face down.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    pub cards: Vec<Color>,
    #[serde(default)]
    pub matched: Vec<usize>,
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub moves: u32,
    #[serde(default)]
    pub remaining_ticks: Option<Tick>,
    #[serde(default)]
    pub hints_left: Option<u8>,
    #[serde(default)]
    pub hint_penalty: u32,
    #[serde(default)]
    pub timed_out: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MemoryState {
    cards: Vec<Color>,
    cursor: Coord2,
    flipped: Vec<usize>,
    first_card: Option<usize>,
    second_card: Option<usize>,
    matched: Vec<usize>,
    can_flip: bool,
    hide_timer: u8,
    score: u32,
    moves: u32,
    remaining_ticks: Tick,
    hints_left: u8,
    hint: Option<(usize, usize)>,
    hint_ticks: Tick,
    hint_penalty: u32,
    game_over: bool,
    timed_out: bool,
    config: MemoryConfig,
}

/// Top-left matrix position of a card.
pub fn memory_card_origin(index: usize) -> (i32, i32) {
    let pitch = (MEMORY_CARD_SIZE + MEMORY_GAP) as i32;
    let columns = MEMORY_COLUMNS as usize;
    let offset = MEMORY_OFFSET as i32;
    (
        offset + (index / columns) as i32 * pitch,
        offset + (index % columns) as i32 * pitch,
    )
}

/// Card under a matrix dot, `None` in gaps and on the timer row.
pub fn memory_card_at(row: Coord, col: Coord) -> Option<usize> {
    let at = |pixel| {
        cell_from_pixel(pixel, MEMORY_OFFSET, MEMORY_CARD_SIZE, MEMORY_GAP, MEMORY_COLUMNS)
    };
    Some(usize::from(at(row)?) * MEMORY_COLUMNS as usize + usize::from(at(col)?))
}

fn cursor_index((row, col): Coord2) -> usize {
    usize::from(row) * MEMORY_COLUMNS as usize + usize::from(col)
}

impl MemoryState {
    pub fn new<R: Rng + ?Sized>(config: MemoryConfig, rng: &mut R) -> Self {
        let mut cards: Vec<Color> = CARD_COLORS.iter().chain(&CARD_COLORS).copied().collect();
        cards.shuffle(rng);
        Self::with_cards(cards, config)
    }

    fn with_cards(cards: Vec<Color>, config: MemoryConfig) -> Self {
        Self {
            cards,
            cursor: (0, 0),
            flipped: Vec::new(),
            first_card: None,
            second_card: None,
            matched: Vec::new(),
            can_flip: true,
            hide_timer: 0,
            score: 0,
            moves: 0,
            remaining_ticks: config.time_limit_ticks(),
            hints_left: config.hints,
            hint: None,
            hint_ticks: 0,
            hint_penalty: 0,
            game_over: false,
            timed_out: false,
            config,
        }
    }

    /// Resumes a saved board; `None` unless there are exactly 16 cards.
    pub fn from_snapshot(snapshot: MemorySnapshot, config: MemoryConfig) -> Option<Self> {
        if snapshot.cards.len() != MEMORY_CARDS {
            return None;
        }
        let mut state = Self::with_cards(snapshot.cards, config);
        let mut matched = snapshot.matched;
        matched.retain(|&index| index < MEMORY_CARDS);
        matched.sort_unstable();
        matched.dedup();
        state.matched = matched;
        state.score = snapshot.score;
        state.moves = snapshot.moves;
        if let Some(remaining) = snapshot.remaining_ticks {
            state.remaining_ticks = remaining;
        }
        if let Some(hints) = snapshot.hints_left {
            state.hints_left = hints.min(config.hints);
        }
        state.hint_penalty = snapshot.hint_penalty;
        state.timed_out = snapshot.timed_out;
        state.game_over = state.timed_out || state.matched.len() == MEMORY_CARDS;
        Some(state)
    }

    pub fn snapshot(&self) -> MemorySnapshot {
        MemorySnapshot {
            cards: self.cards.clone(),
            matched: self.matched.clone(),
            score: self.score,
            moves: self.moves,
            remaining_ticks: Some(self.remaining_ticks),
            hints_left: Some(self.hints_left),
            hint_penalty: self.hint_penalty,
            timed_out: self.timed_out,
        }
    }

    pub fn cards(&self) -> &[Color] {
        &self.cards
    }

    pub fn cursor(&self) -> Coord2 {
        self.cursor
    }

    pub fn flipped(&self) -> &[usize] {
        &self.flipped
    }

    pub fn first_card(&self) -> Option<usize> {
        self.first_card
    }

    pub fn second_card(&self) -> Option<usize> {
        self.second_card
    }

    pub fn matched(&self) -> &[usize] {
        &self.matched
    }

    pub fn can_flip(&self) -> bool {
        self.can_flip
    }

    pub fn hide_timer(&self) -> u8 {
        self.hide_timer
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn hints_left(&self) -> u8 {
        self.hints_left
    }

    pub fn hint(&self) -> Option<(usize, usize)> {
        self.hint
    }

    pub fn is_over(&self) -> bool {
        self.game_over
    }

    pub fn is_timed_out(&self) -> bool {
        self.timed_out
    }

    pub fn running_score(&self) -> u32 {
        self.score
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_ticks.div_ceil(TICKS_PER_SECOND)
    }

    /// Final score; a timeout always scores zero.
    pub fn score(&self) -> Option<u32> {
        if !self.game_over {
            return None;
        }
        if self.timed_out {
            return Some(0);
        }
        let total = i64::from(self.score) + self.remaining_secs() as i64
            - i64::from(self.hint_penalty);
        Some(total.max(0) as u32)
    }

    fn is_face_up(&self, index: usize) -> bool {
        self.matched.contains(&index) || self.flipped.contains(&index)
    }

    pub fn update<R: Rng + ?Sized>(&self, button: Button, rng: &mut R) -> Self {
        if let Some(dir) = button.direction() {
            let mut next = self.clone();
            if !self.game_over {
                next.cursor = dir.step_clamped(self.cursor, MEMORY_COLUMNS);
            }
            return next;
        }
        match button {
            Button::Enter if self.game_over => {
                log::debug!("memory reset");
                Self::new(self.config, rng)
            }
            Button::Enter => self.flip(cursor_index(self.cursor)),
            Button::Help => self.use_hint(),
            _ => self.clone(),
        }
    }

    /// Moves the cursor onto card `index` and flips it.
    pub fn select(&self, index: usize) -> Self {
        if index >= MEMORY_CARDS || self.game_over {
            return self.clone();
        }
        let mut next = self.clone();
        let columns = MEMORY_COLUMNS as usize;
        next.cursor = ((index / columns) as Coord, (index % columns) as Coord);
        next.flip(index)
    }

    pub fn flip(&self, index: usize) -> Self {
        if self.game_over || !self.can_flip || index >= MEMORY_CARDS || self.is_face_up(index) {
            return self.clone();
        }
        let mut next = self.clone();
        next.flipped.push(index);
        let Some(first) = next.first_card else {
            next.first_card = Some(index);
            return next;
        };

        next.second_card = Some(index);
        next.moves += 1;
        if next.cards[first] == next.cards[index] {
            next.matched.extend([first, index]);
            next.matched.sort_unstable();
            next.score += MATCH_POINTS;
            next.clear_pending();
            if next.hint.is_some_and(|(a, b)| next.matched.contains(&a) && next.matched.contains(&b)) {
                next.hint = None;
            }
            if next.matched.len() == MEMORY_CARDS {
                log::debug!("memory cleared in {} moves", next.moves);
                next.game_over = true;
            }
        } else {
            next.can_flip = false;
            next.hide_timer = HIDE_DELAY_TICKS;
        }
        next
    }

    fn clear_pending(&mut self) {
        self.flipped.clear();
        self.first_card = None;
        self.second_card = None;
    }

    /// Counts down a mismatched pair and turns it back over when the delay runs out.
    pub fn auto_hide_cards(&self) -> Self {
        if self.hide_timer == 0 {
            return self.clone();
        }
        let mut next = self.clone();
        next.hide_timer -= 1;
        if next.hide_timer == 0 {
            next.clear_pending();
            next.can_flip = true;
        }
        next
    }

    fn use_hint(&self) -> Self {
        if self.game_over || self.hints_left == 0 || self.hint.is_some() {
            return self.clone();
        }
        let unmatched: Vec<usize> = (0..MEMORY_CARDS)
            .filter(|index| !self.matched.contains(index))
            .collect();
        let pair = unmatched.iter().find_map(|&a| {
            unmatched
                .iter()
                .find(|&&b| b > a && self.cards[a] == self.cards[b])
                .map(|&b| (a, b))
        });
        let Some(pair) = pair else {
            return self.clone();
        };
        let mut next = self.clone();
        next.hint = Some(pair);
        next.hint_ticks = MEMORY_HINT_TICKS;
        next.hints_left -= 1;
        next.hint_penalty += HINT_PENALTY;
        next
    }

    /// Countdown, auto-hide and hint timers, one tick's worth.
    pub fn tick(&self) -> Self {
        if self.game_over {
            return self.clone();
        }
        let mut next = self.auto_hide_cards();
        next.remaining_ticks = next.remaining_ticks.saturating_sub(1);
        if next.remaining_ticks == 0 {
            log::debug!("memory timed out with {} pairs", next.matched.len() / 2);
            next.timed_out = true;
            next.game_over = true;
        }
        if next.hint.is_some() {
            next.hint_ticks = next.hint_ticks.saturating_sub(1);
            if next.hint_ticks == 0 {
                next.hint = None;
            }
        }
        next
    }
}

/// Draws a card grid; `face_up` decides which cards show their colour.
pub fn render_cards(cards: &[Color], face_up: impl Fn(usize) -> bool) -> Frame {
    let mut frame = create_empty_grid();
    let size = MEMORY_CARD_SIZE as i32;
    for (index, &color) in cards.iter().enumerate().take(MEMORY_CARDS) {
        let (top, left) = memory_card_origin(index);
        let color = if face_up(index) { color } else { palette::GREY };
        frame.fill_rect(top, left, size, size, color);
    }
    frame
}

impl Render for MemoryState {
    fn render(&self, tick: Tick) -> Frame {
        let hinted = |index| {
            self.hint
                .is_some_and(|(a, b)| (index == a || index == b) && blink(tick, 2))
        };
        let mut frame = render_cards(&self.cards, |index| {
            self.flipped.contains(&index) || hinted(index)
        });
        let size = MEMORY_CARD_SIZE as i32;
        for &index in &self.matched {
            let (top, left) = memory_card_origin(index);
            frame.fill_rect(top, left, size, size, self.cards[index].dim());
        }

        frame.draw_progress(
            0,
            self.remaining_ticks,
            self.config.time_limit_ticks(),
            palette::YELLOW,
        );

        if !self.game_over && blink(tick, 3) {
            let (top, left) = memory_card_origin(cursor_index(self.cursor));
            for i in 0..size {
                frame.set(top, left + i, palette::WHITE);
                frame.set(top + size - 1, left + i, palette::WHITE);
            }
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(11)
    }

    /// Pairs sit next to each other: 0/1, 2/3, ...
    fn ordered() -> MemoryState {
        let cards = CARD_COLORS.iter().flat_map(|&c| [c, c]).collect();
        MemoryState::with_cards(cards, MemoryConfig::default())
    }

    #[test]
    fn new_board_holds_eight_pairs() {
        let state = MemoryState::new(MemoryConfig::default(), &mut rng());
        assert_eq!(state.cards().len(), MEMORY_CARDS);
        for color in CARD_COLORS {
            assert_eq!(state.cards().iter().filter(|&&c| c == color).count(), 2);
        }
    }

    #[test]
    fn matching_pair_is_committed() {
        let state = ordered().flip(0);
        assert_eq!(state.first_card(), Some(0));

        let state = state.flip(1);
        assert_eq!(state.matched(), &[0, 1]);
        assert_eq!(state.running_score(), MATCH_POINTS);
        assert!(state.flipped().is_empty());
        assert_eq!(state.first_card(), None);
        assert_eq!(state.second_card(), None);
        assert!(state.can_flip());
    }

    #[test]
    fn mismatch_hides_after_delay() {
        let state = ordered().flip(0).flip(2);
        assert!(!state.can_flip());
        assert_eq!(state.hide_timer(), HIDE_DELAY_TICKS);
        assert_eq!(state.flip(3), state);

        let mut state = state;
        for _ in 0..HIDE_DELAY_TICKS {
            assert!(!state.flipped().is_empty());
            state = state.auto_hide_cards();
        }
        assert!(state.flipped().is_empty());
        assert!(state.can_flip());
        assert_eq!(state.matched(), &[] as &[usize]);
    }

    #[test]
    fn matched_cards_cannot_be_flipped_again() {
        let state = ordered().flip(0).flip(1);
        assert_eq!(state.flip(0), state);
    }

    #[test]
    fn clearing_the_board_scores_time_bonus() {
        let mut state = ordered();
        for index in 0..MEMORY_CARDS {
            state = state.select(index);
        }
        assert!(state.is_over());
        assert!(!state.is_timed_out());
        assert_eq!(state.score(), Some(8 * MATCH_POINTS + 60));
    }

    #[test]
    fn timeout_scores_zero() {
        let config = MemoryConfig {
            time_limit_secs: 1,
            hints: 0,
        };
        let mut state = MemoryState::with_cards(ordered().cards().to_vec(), config).select(0).select(1);
        for _ in 0..TICKS_PER_SECOND {
            state = state.tick();
        }
        assert!(state.is_timed_out());
        assert_eq!(state.score(), Some(0));
        assert_eq!(state.select(2), state);
    }

    #[test]
    fn zero_time_limit_still_gives_a_second() {
        let config = MemoryConfig::new(0, 0);
        let state = MemoryState::with_cards(ordered().cards().to_vec(), config).tick();
        assert!(!state.is_timed_out());
        assert_eq!(state.remaining_secs(), 1);
        assert_eq!(MemoryConfig::new(u64::MAX, 0).time_limit_ticks(), Tick::MAX);
    }

    #[test]
    fn hint_reveals_a_pair_at_a_cost() {
        let state = ordered().select(0).select(1).update(Button::Help, &mut rng());
        assert_eq!(state.hint(), Some((2, 3)));
        assert_eq!(state.hints_left(), MEMORY_HINTS - 1);

        let mut state = state;
        for _ in 0..MEMORY_HINT_TICKS {
            state = state.tick();
        }
        assert_eq!(state.hint(), None);

        let mut state = state;
        for index in 2..MEMORY_CARDS {
            state = state.select(index);
        }
        let remaining = state.remaining_secs() as u32;
        assert_eq!(state.score(), Some(8 * MATCH_POINTS + remaining - HINT_PENALTY));
    }

    #[test]
    fn cursor_and_enter_flip_cards() {
        let state = ordered()
            .update(Button::Right, &mut rng())
            .update(Button::Enter, &mut rng());
        assert_eq!(state.first_card(), Some(1));

        let state = state
            .update(Button::Left, &mut rng())
            .update(Button::Enter, &mut rng());
        assert_eq!(state.matched(), &[0, 1]);
    }

    #[test]
    fn click_geometry_maps_cards() {
        assert_eq!(memory_card_at(0, 1), None);
        assert_eq!(memory_card_at(1, 1), Some(0));
        assert_eq!(memory_card_at(4, 4), Some(0));
        assert_eq!(memory_card_at(5, 4), None);
        assert_eq!(memory_card_at(6, 19), Some(7));
        assert_eq!(memory_card_at(19, 16), Some(15));
    }

    #[test]
    fn snapshot_resumes_matched_cards() {
        let state = ordered().select(0).select(1).select(4);
        let restored = MemoryState::from_snapshot(state.snapshot(), MemoryConfig::default()).unwrap();
        assert_eq!(restored.matched(), &[0, 1]);
        assert!(restored.flipped().is_empty());
        assert_eq!(restored.running_score(), MATCH_POINTS);

        let mut short = state.snapshot();
        short.cards.pop();
        assert!(MemoryState::from_snapshot(short, MemoryConfig::default()).is_none());
    }

    #[test]
    fn render_shows_face_down_and_matched_cards() {
        let state = ordered().select(0).select(1);
        let frame = state.render(3);
        assert_eq!(frame.dot(1, 1), palette::RED.dim());
        assert_eq!(frame.dot(1, 11), palette::GREY);
        assert_eq!(frame.dot(0, 0), palette::YELLOW);
    }
}
