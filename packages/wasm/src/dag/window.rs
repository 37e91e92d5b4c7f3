//! Round windowing and ordering.
//!
//! A layout pass only ever sees the trailing `window_rounds` rounds, sorted
//! ascending by round. Vertices in the same round keep their input order, so
//! downstream stages (lanes, forks, edges) are deterministic.

use super::vertex::Vertex;

/// Whether `round` falls inside a window of `window_rounds` ending at
/// `max_round`. A window of 0 is unbounded.
#[inline]
pub fn in_window(round: u64, max_round: u64, window_rounds: u64) -> bool {
    window_rounds == 0 || round >= window_start(max_round, window_rounds)
}

/// Lowest round still inside the window, or 0 when unbounded.
#[inline]
pub fn window_start(max_round: u64, window_rounds: u64) -> u64 {
    if window_rounds == 0 {
        0
    } else {
        max_round.saturating_sub(window_rounds - 1)
    }
}

/// Filter to the trailing `window_rounds` rounds and sort by round.
///
/// The sort is stable, so equal rounds keep their input order. Applying the
/// same window to an already-selected sequence yields the same sequence.
pub fn select<'a, I>(vertices: I, window_rounds: u64) -> Vec<&'a Vertex>
where
    I: IntoIterator<Item = &'a Vertex>,
{
    let mut selected: Vec<&Vertex> = vertices.into_iter().collect();
    let Some(max_round) = selected.iter().map(|v| v.round).max() else {
        return selected;
    };

    selected.retain(|v| in_window(v.round, max_round, window_rounds));
    selected.sort_by_key(|v| v.round);
    selected
}
