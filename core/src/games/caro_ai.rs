//! Computer opponents for Caro.
//!
//! Three tiers: a random mover, a rule-based "medium" player and a shallow
//! alpha-beta "hard" player. All of them pick a move for `state.turn()`.

use alloc::vec::Vec;

use ndarray::Array2;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use super::caro::{Board, LINE_DIRECTIONS, neighbor, run_at};
use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        }
    }
}

pub const THINK_MIN_MILLIS: u64 = 1000;
pub const THINK_MAX_MILLIS: u64 = 3000;

const MEDIUM_RADIUS: i8 = 2;
const MEDIUM_TOP: usize = 3;
const HARD_RADIUS: i8 = 3;
const ROOT_WIDTH: usize = 10;
const REPLY_WIDTH: usize = 8;
const THREAT_BONUS: f32 = 8000.0;
const THREAT_PENALTY: f32 = 10000.0;
const OPPONENT_WEIGHT: f32 = 1.2;
const LOSS: f32 = -1.0e9;

/// Random "thinking" latency before the computer acts.
pub fn think_delay<R: Rng + ?Sized>(rng: &mut R) -> u64 {
    rng.random_range(THINK_MIN_MILLIS..=THINK_MAX_MILLIS)
}

/// Picks a move for the player whose turn it is, `None` when the game is over or the board is full.
pub fn choose_move<R: Rng + ?Sized>(
    state: &CaroState,
    difficulty: Difficulty,
    rng: &mut R,
) -> Option<Coord2> {
    if state.is_over() {
        return None;
    }
    let chosen = match difficulty {
        Difficulty::Easy => random_move(state, rng),
        Difficulty::Medium => medium_move(state, rng),
        Difficulty::Hard => hard_move(state, rng),
    };
    log::debug!("caro ai ({:?}) picks {:?}", difficulty, chosen);
    chosen
}

fn random_move<R: Rng + ?Sized>(state: &CaroState, rng: &mut R) -> Option<Coord2> {
    let cells: Vec<Coord2> = state.empty_cells().collect();
    cells.choose(rng).copied()
}

fn winning_move(state: &CaroState, player: Player) -> Option<Coord2> {
    state
        .empty_cells()
        .find(|&coords| state.is_winning_move(coords, player))
}

fn threat_threshold(win_length: u8) -> u8 {
    win_length.saturating_sub(2).max(2)
}

/// Longest open-ended run `player` would get by taking `coords`, if it counts as a threat.
fn open_threat(board: &Board, coords: Coord2, player: Player, win_length: u8) -> Option<u8> {
    let threshold = threat_threshold(win_length);
    LINE_DIRECTIONS
        .iter()
        .map(|&dir| run_at(board, coords, player, dir))
        .filter(|run| run.len >= threshold && run.is_open_both_ends())
        .map(|run| run.len)
        .max()
}

fn has_open_threat(board: &Board, cells: &[Coord2], player: Player, win_length: u8) -> bool {
    cells
        .iter()
        .any(|&coords| open_threat(board, coords, player, win_length).is_some())
}

fn is_winning(board: &Board, coords: Coord2, player: Player, win_length: u8) -> bool {
    LINE_DIRECTIONS
        .iter()
        .any(|&dir| run_at(board, coords, player, dir).len >= win_length)
}

/// Empty cells within `radius` (Chebyshev) of any occupied cell, in row-major order.
fn candidates(board: &Board, radius: i8) -> Vec<Coord2> {
    let mut near: Array2<bool> = Array2::default(board.dim());
    for ((row, col), cell) in board.indexed_iter() {
        if cell.is_none() {
            continue;
        }
        let center = (row as Coord, col as Coord);
        for d_row in -radius..=radius {
            for d_col in -radius..=radius {
                if let Some(pos) = neighbor(center, (d_row, d_col)) {
                    near[pos.to_nd_index()] = true;
                }
            }
        }
    }
    board
        .indexed_iter()
        .filter(|&((row, col), cell)| cell.is_none() && near[[row, col]])
        .map(|((row, col), _)| (row as Coord, col as Coord))
        .collect()
}

/// Run potential of a cell for both sides; higher means more contested.
fn position_score(board: &Board, coords: Coord2, player: Player) -> u32 {
    LINE_DIRECTIONS
        .iter()
        .map(|&dir| {
            let own = run_at(board, coords, player, dir).len as u32;
            let theirs = run_at(board, coords, player.opponent(), dir).len as u32;
            own + theirs
        })
        .sum()
}

fn ranked_candidates(board: &Board, radius: i8, player: Player) -> Vec<(u32, Coord2)> {
    let mut scored: Vec<(u32, Coord2)> = candidates(board, radius)
        .into_iter()
        .map(|coords| (position_score(board, coords, player), coords))
        .collect();
    // stable, ties keep row-major order
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored
}

fn medium_move<R: Rng + ?Sized>(state: &CaroState, rng: &mut R) -> Option<Coord2> {
    let me = state.turn();
    let opponent = me.opponent();
    let board = state.board();
    let win_length = state.win_length();

    if let Some(coords) = winning_move(state, me) {
        return Some(coords);
    }

    if state.is_board_empty() {
        return random_move(state, rng);
    }

    let open_block = state
        .empty_cells()
        .filter_map(|coords| Some((open_threat(board, coords, opponent, win_length)?, coords)))
        .fold(None, |best: Option<(u8, Coord2)>, (len, coords)| match best {
            Some((best_len, _)) if best_len >= len => best,
            _ => Some((len, coords)),
        });
    if let Some((_, coords)) = open_block {
        return Some(coords);
    }

    if let Some(coords) = winning_move(state, opponent) {
        return Some(coords);
    }

    let mut ranked = ranked_candidates(board, MEDIUM_RADIUS, me);
    ranked.truncate(MEDIUM_TOP);
    ranked
        .choose(rng)
        .map(|&(_, coords)| coords)
        .or_else(|| random_move(state, rng))
}

/// Sum of squared run lengths for `player`, each run counted once from its start.
fn run_score(board: &Board, player: Player) -> f32 {
    let mut total = 0.0;
    for ((row, col), cell) in board.indexed_iter() {
        if *cell != Some(player) {
            continue;
        }
        let start = (row as Coord, col as Coord);
        for &dir in &LINE_DIRECTIONS {
            let before = neighbor(start, (-dir.0, -dir.1));
            if before.is_some_and(|pos| board[pos.to_nd_index()] == Some(player)) {
                continue;
            }
            let mut len = 1;
            let mut pos = start;
            while let Some(next) = neighbor(pos, dir) {
                if board[next.to_nd_index()] != Some(player) {
                    break;
                }
                len += 1;
                pos = next;
            }
            total += (len * len) as f32;
        }
    }
    total
}

fn evaluate(board: &Board, me: Player, win_length: u8) -> f32 {
    let opponent = me.opponent();
    let near = candidates(board, MEDIUM_RADIUS);
    let mut score = run_score(board, me) - OPPONENT_WEIGHT * run_score(board, opponent);
    if has_open_threat(board, &near, me, win_length) {
        score += THREAT_BONUS;
    }
    if has_open_threat(board, &near, opponent, win_length) {
        score -= THREAT_PENALTY;
    }
    score
}

/// Opponent's best answer to a root move, scored from `me`'s point of view.
fn min_reply(board: &Board, me: Player, win_length: u8, alpha: f32) -> f32 {
    let opponent = me.opponent();
    let ranked = ranked_candidates(board, HARD_RADIUS, opponent);
    if ranked.is_empty() {
        return evaluate(board, me, win_length);
    }
    if ranked
        .iter()
        .any(|&(_, coords)| is_winning(board, coords, opponent, win_length))
    {
        return LOSS;
    }

    let mut beta = f32::INFINITY;
    for &(_, coords) in ranked.iter().take(REPLY_WIDTH) {
        let mut next = board.clone();
        next[coords.to_nd_index()] = Some(opponent);
        beta = beta.min(evaluate(&next, me, win_length));
        if beta <= alpha {
            break;
        }
    }
    beta
}

fn hard_move<R: Rng + ?Sized>(state: &CaroState, rng: &mut R) -> Option<Coord2> {
    let me = state.turn();
    let board = state.board();
    let win_length = state.win_length();

    if let Some(coords) = winning_move(state, me) {
        return Some(coords);
    }

    let ranked = ranked_candidates(board, HARD_RADIUS, me);
    if ranked.is_empty() {
        return medium_move(state, rng);
    }

    let mut alpha = f32::NEG_INFINITY;
    let mut best = None;
    for &(_, coords) in ranked.iter().take(ROOT_WIDTH) {
        let mut next = board.clone();
        next[coords.to_nd_index()] = Some(me);
        let score = min_reply(&next, me, win_length, alpha);
        log::trace!("caro hard candidate {:?} scores {}", coords, score);
        if best.is_none() || score > alpha {
            alpha = score;
            best = Some(coords);
        }
    }
    best
}
