use alloc::collections::VecDeque;
use alloc::vec::Vec;

use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

/// First and last playable row/column, inside the border.
pub const SNAKE_MIN: Coord = 1;
pub const SNAKE_MAX: Coord = MATRIX_SIZE - 2;

pub const SNAKE_MIN_SPEED: u8 = 1;
pub const SNAKE_MAX_SPEED: u8 = 5;
pub const SNAKE_DEFAULT_SPEED: u8 = 3;
pub const SNAKE_DEFAULT_TIME_LIMIT: u64 = 60;
pub const APPLE_POINTS: u32 = 10;

const START_BODY: [Coord2; 3] = [(10, 10), (10, 9), (10, 8)];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnakeConfig {
    speed: u8,
    time_limit_secs: u64,
}

impl Default for SnakeConfig {
    fn default() -> Self {
        Self::new(SNAKE_DEFAULT_SPEED, SNAKE_DEFAULT_TIME_LIMIT)
    }
}

impl SnakeConfig {
    pub fn new(speed: u8, time_limit_secs: u64) -> Self {
        Self {
            speed: speed.clamp(SNAKE_MIN_SPEED, SNAKE_MAX_SPEED),
            time_limit_secs: time_limit_secs.max(1),
        }
    }

    pub const fn speed(&self) -> u8 {
        self.speed
    }

    pub const fn ticks_per_move(&self) -> Tick {
        (SNAKE_MAX_SPEED + 1 - self.speed) as Tick
    }

    pub const fn time_limit_ticks(&self) -> Tick {
        self.time_limit_secs.saturating_mul(TICKS_PER_SECOND)
    }
}

/// Save payload; `snake` lists the body head first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnakeSnapshot {
    pub snake: Vec<Coord2>,
    #[serde(default)]
    pub apple: Option<Coord2>,
    #[serde(default)]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub apples: u32,
    #[serde(default)]
    pub remaining_ticks: Option<Tick>,
    #[serde(default)]
    pub game_over: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SnakeState {
    body: VecDeque<Coord2>,
    /// Direction of the last executed move.
    direction: Direction,
    /// Direction the next move will take.
    heading: Direction,
    apple: Option<Coord2>,
    apples: u32,
    remaining_ticks: Tick,
    since_move: Tick,
    paused: bool,
    game_over: bool,
    config: SnakeConfig,
}

fn in_playfield((row, col): Coord2) -> bool {
    (SNAKE_MIN..=SNAKE_MAX).contains(&row) && (SNAKE_MIN..=SNAKE_MAX).contains(&col)
}

impl SnakeState {
    pub fn new<R: Rng + ?Sized>(config: SnakeConfig, rng: &mut R) -> Self {
        let mut state = Self {
            body: START_BODY.into_iter().collect(),
            direction: Direction::Right,
            heading: Direction::Right,
            apple: None,
            apples: 0,
            remaining_ticks: config.time_limit_ticks(),
            since_move: 0,
            paused: false,
            game_over: false,
            config,
        };
        state.apple = state.spawn_apple(rng);
        state
    }

    /// Resumes a saved run; `None` if the body is empty or leaves the playfield.
    pub fn from_snapshot<R: Rng + ?Sized>(
        snapshot: SnakeSnapshot,
        config: SnakeConfig,
        rng: &mut R,
    ) -> Option<Self> {
        if snapshot.snake.is_empty() || !snapshot.snake.iter().copied().all(in_playfield) {
            return None;
        }
        let direction = snapshot.direction.unwrap_or(Direction::Right);
        let mut state = Self {
            body: snapshot.snake.into_iter().collect(),
            direction,
            heading: direction,
            apple: snapshot.apple.filter(|&apple| in_playfield(apple)),
            apples: snapshot.apples,
            remaining_ticks: snapshot
                .remaining_ticks
                .unwrap_or_else(|| config.time_limit_ticks()),
            since_move: 0,
            paused: false,
            game_over: snapshot.game_over,
            config,
        };
        if state.apple.is_none() && !state.game_over {
            state.apple = state.spawn_apple(rng);
        }
        Some(state)
    }

    pub fn snapshot(&self) -> SnakeSnapshot {
        SnakeSnapshot {
            snake: self.body.iter().copied().collect(),
            apple: self.apple,
            direction: Some(self.direction),
            apples: self.apples,
            remaining_ticks: Some(self.remaining_ticks),
            game_over: self.game_over,
        }
    }

    pub fn head(&self) -> Coord2 {
        self.body[0]
    }

    pub fn body(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.body.iter().copied()
    }

    pub fn length(&self) -> usize {
        self.body.len()
    }

    pub fn apple(&self) -> Option<Coord2> {
        self.apple
    }

    pub fn apples(&self) -> u32 {
        self.apples
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_over(&self) -> bool {
        self.game_over
    }

    pub fn config(&self) -> SnakeConfig {
        self.config
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_ticks.div_ceil(TICKS_PER_SECOND)
    }

    /// `apples * 10 - remaining_secs / 10`, floored at zero, once the run is over.
    pub fn score(&self) -> Option<u32> {
        if !self.game_over {
            return None;
        }
        let earned = i64::from(self.apples) * i64::from(APPLE_POINTS);
        let penalty = (self.remaining_secs() / 10) as i64;
        Some((earned - penalty).max(0) as u32)
    }

    fn spawn_apple<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Coord2> {
        let free: Vec<Coord2> = (SNAKE_MIN..=SNAKE_MAX)
            .flat_map(|row| (SNAKE_MIN..=SNAKE_MAX).map(move |col| (row, col)))
            .filter(|coords| !self.body.contains(coords))
            .collect();
        free.choose(rng).copied()
    }

    pub fn update<R: Rng + ?Sized>(&self, button: Button, rng: &mut R) -> Self {
        if let Some(dir) = button.direction() {
            let mut next = self.clone();
            if !self.game_over && !self.paused && dir != self.direction.opposite() {
                next.heading = dir;
            }
            return next;
        }

        match button {
            Button::Enter if self.game_over => {
                log::debug!("snake restart");
                Self::new(self.config, rng)
            }
            Button::Enter => {
                let mut next = self.clone();
                next.paused = !self.paused;
                next
            }
            _ => self.clone(),
        }
    }

    /// Advances the countdown and, every `ticks_per_move` ticks, the snake.
    pub fn tick<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        if self.game_over || self.paused {
            return self.clone();
        }
        let mut next = self.clone();
        next.remaining_ticks = next.remaining_ticks.saturating_sub(1);
        if next.remaining_ticks == 0 {
            log::debug!("snake out of time with {} apples", next.apples);
            next.game_over = true;
            return next;
        }
        next.since_move += 1;
        if next.since_move >= next.config.ticks_per_move() {
            next.since_move = 0;
            next.advance(rng);
        }
        next
    }

    fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let head = self
            .heading
            .step(self.head(), MATRIX_SIZE)
            .filter(|&coords| in_playfield(coords));
        let Some(head) = head else {
            log::debug!("snake hit the wall");
            self.game_over = true;
            return;
        };

        let eats = self.apple == Some(head);
        // the tail moves away in the same step, so its cell is free
        let tail = if eats { None } else { self.body.pop_back() };
        if self.body.contains(&head) {
            log::debug!("snake bit itself at {:?}", head);
            self.body.extend(tail);
            self.game_over = true;
            return;
        }

        self.body.push_front(head);
        self.direction = self.heading;
        if eats {
            self.apples += 1;
            self.apple = self.spawn_apple(rng);
            log::trace!("snake ate apple {}, next at {:?}", self.apples, self.apple);
        }
    }
}

/// Draws a snake body and apple onto a bordered playfield.
pub fn render_snake(body: &[Coord2], apple: Option<Coord2>, body_color: Color) -> Frame {
    let mut frame = create_empty_grid();
    frame.draw_border(palette::GREY);
    if let Some(apple) = apple {
        frame.set_coord(apple, palette::RED);
    }
    for (i, &segment) in body.iter().enumerate().rev() {
        let color = if i == 0 { palette::LIME } else { body_color };
        frame.set_coord(segment, color);
    }
    frame
}

impl Render for SnakeState {
    fn render(&self, tick: Tick) -> Frame {
        let body: Vec<Coord2> = self.body().collect();
        let body_color = if self.game_over && blink(tick, 5) {
            palette::RED
        } else if self.paused {
            palette::GREEN.dim()
        } else {
            palette::GREEN
        };
        let mut frame = render_snake(&body, self.apple, body_color);
        frame.draw_progress(
            0,
            self.remaining_ticks,
            self.config.time_limit_ticks(),
            palette::YELLOW.dim(),
        );
        frame
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use super::*;
    use rand::rngs::SmallRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(3)
    }

    fn resume(snake: &[Coord2], apple: Option<Coord2>, direction: Direction) -> SnakeState {
        let snapshot = SnakeSnapshot {
            snake: snake.to_vec(),
            apple,
            direction: Some(direction),
            apples: 0,
            remaining_ticks: None,
            game_over: false,
        };
        SnakeState::from_snapshot(snapshot, SnakeConfig::default(), &mut rng()).unwrap()
    }

    fn run_ticks(state: SnakeState, ticks: Tick) -> SnakeState {
        let mut rng = rng();
        (0..ticks).fold(state, |state, _| state.tick(&mut rng))
    }

    #[test]
    fn moves_once_per_ticks_per_move() {
        let state = resume(&START_BODY, Some((1, 1)), Direction::Right);
        assert_eq!(state.config().ticks_per_move(), 3);

        let state = run_ticks(state, 2);
        assert_eq!(state.head(), (10, 10));
        let state = run_ticks(state, 1);
        assert_eq!(state.head(), (10, 11));
        assert_eq!(state.length(), 3);
    }

    #[test]
    fn speed_is_clamped() {
        assert_eq!(SnakeConfig::new(0, 60).ticks_per_move(), 5);
        assert_eq!(SnakeConfig::new(9, 60).ticks_per_move(), 1);
    }

    #[test]
    fn reversal_is_rejected() {
        let state = resume(&START_BODY, Some((1, 1)), Direction::Right);
        let state = state.update(Button::Left, &mut rng());
        let state = run_ticks(state, 3);
        assert_eq!(state.head(), (10, 11));

        // a turn followed by the reverse of the last executed move is still rejected
        let state = state.update(Button::Up, &mut rng()).update(Button::Left, &mut rng());
        let state = run_ticks(state, 3);
        assert_eq!(state.head(), (9, 11));
    }

    #[test]
    fn wall_collision_ends_the_game() {
        let state = resume(&[(1, 5), (2, 5), (3, 5)], Some((10, 10)), Direction::Up);
        let state = run_ticks(state, 3);
        assert!(state.is_over());
        assert_eq!(state.head(), (1, 5));

        let later = run_ticks(state.clone(), 10);
        assert_eq!(later, state);
    }

    #[test]
    fn self_collision_ends_the_game() {
        let body = [(5, 5), (5, 6), (6, 6), (6, 5), (6, 4)];
        let state = resume(&body, Some((10, 10)), Direction::Left);
        let state = state.update(Button::Down, &mut rng());
        let state = run_ticks(state, 3);

        assert!(state.is_over());
        assert_eq!(state.body().collect::<Vec<_>>(), body);
    }

    #[test]
    fn moving_into_the_tail_cell_is_allowed() {
        let body = [(5, 5), (5, 6), (6, 6), (6, 5)];
        let state = resume(&body, Some((10, 10)), Direction::Left);
        let state = run_ticks(state.update(Button::Down, &mut rng()), 3);
        assert!(!state.is_over());
        assert_eq!(state.head(), (6, 5));
    }

    #[test]
    fn apple_grows_the_body() {
        let state = resume(&START_BODY, Some((10, 11)), Direction::Right);
        let state = run_ticks(state, 3);

        assert_eq!(state.length(), 4);
        assert_eq!(state.apples(), 1);
        let apple = state.apple().unwrap();
        assert!(in_playfield(apple));
        assert!(state.body().all(|segment| segment != apple));
    }

    #[test]
    fn countdown_ends_the_game() {
        let snapshot = SnakeSnapshot {
            snake: START_BODY.to_vec(),
            apple: Some((1, 1)),
            direction: None,
            apples: 0,
            remaining_ticks: None,
            game_over: false,
        };
        let config = SnakeConfig::new(1, 1);
        let mut state = SnakeState::from_snapshot(snapshot, config, &mut rng()).unwrap();
        state = run_ticks(state, TICKS_PER_SECOND - 1);
        assert!(!state.is_over());
        state = run_ticks(state, 1);
        assert!(state.is_over());
        assert_eq!(state.remaining_secs(), 0);
        assert_eq!(state.score(), Some(0));
    }

    #[test]
    fn pause_freezes_movement_and_timer() {
        let state = SnakeState::new(SnakeConfig::default(), &mut rng());
        let paused = state.update(Button::Enter, &mut rng());
        assert!(paused.is_paused());
        assert_eq!(run_ticks(paused.clone(), 30), paused);

        let resumed = paused.update(Button::Enter, &mut rng());
        assert!(!resumed.is_paused());
        assert_ne!(run_ticks(resumed.clone(), 3).head(), resumed.head());
    }

    #[test]
    fn score_penalizes_remaining_time() {
        let snapshot = SnakeSnapshot {
            snake: START_BODY.to_vec(),
            apple: None,
            direction: None,
            apples: 3,
            remaining_ticks: Some(250),
            game_over: true,
        };
        let state = SnakeState::from_snapshot(snapshot, SnakeConfig::default(), &mut rng()).unwrap();
        assert_eq!(state.remaining_secs(), 25);
        assert_eq!(state.score(), Some(28));
    }

    #[test]
    fn enter_after_game_over_restarts() {
        let state = resume(&[(1, 5), (2, 5)], Some((10, 10)), Direction::Up);
        let state = run_ticks(state, 3);
        assert!(state.is_over());
        assert_eq!(state.score(), Some(0));

        let restarted = state.update(Button::Enter, &mut rng());
        assert!(!restarted.is_over());
        assert_eq!(restarted.head(), START_BODY[0]);
        assert_eq!(restarted.length(), 3);
    }

    #[test]
    fn snapshot_rejects_bodies_on_the_border() {
        let snapshot = SnakeSnapshot {
            snake: vec![(0, 5)],
            apple: None,
            direction: None,
            apples: 0,
            remaining_ticks: None,
            game_over: false,
        };
        assert!(SnakeState::from_snapshot(snapshot, SnakeConfig::default(), &mut rng()).is_none());
    }

    #[test]
    fn render_draws_border_head_and_apple() {
        let state = resume(&START_BODY, Some((3, 3)), Direction::Right);
        let frame = state.render(0);
        assert_eq!(frame.dot(19, 0), palette::GREY);
        assert_eq!(frame.dot(10, 10), palette::LIME);
        assert_eq!(frame.dot(10, 9), palette::GREEN);
        assert_eq!(frame.dot(3, 3), palette::RED);
    }
}
