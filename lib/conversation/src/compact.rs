//! History compaction.
//!
//! Stored history is bounded by a number of exchanges. The window is sliced
//! from the tail and then advanced to the first plain user utterance, so a
//! compacted history never opens on a tool-result carrier or an assistant
//! turn and every tool result keeps its tool request.

use spa_receptionist_ai::Turn;
use std::collections::HashSet;

/// Bounds `history` to roughly `max_exchanges` exchanges.
///
/// Histories of at most `2 * max_exchanges` turns are kept whole; longer ones
/// keep their last `4 * max_exchanges` turns. Either way the result starts at
/// the first user utterance in the window, or is empty if there is none.
#[must_use]
pub fn compact(history: &[Turn], max_exchanges: usize) -> Vec<Turn> {
    let keep = if history.len() <= max_exchanges.saturating_mul(2) {
        history.len()
    } else {
        max_exchanges.saturating_mul(4).min(history.len())
    };
    let window = &history[history.len() - keep..];

    match window.iter().position(Turn::is_user_utterance) {
        Some(start) => window[start..].to_vec(),
        None => Vec::new(),
    }
}

/// Returns true if every tool-result turn immediately follows an assistant
/// turn that requested each of its result ids.
#[must_use]
pub fn is_well_paired(history: &[Turn]) -> bool {
    history.iter().enumerate().all(|(index, turn)| {
        if !turn.has_tool_results() {
            return true;
        }
        let Some(previous) = index.checked_sub(1).map(|i| &history[i]) else {
            return false;
        };
        let requested: HashSet<&str> = previous.tool_use_ids().collect();
        turn.tool_result_ids().all(|id| requested.contains(id))
    })
}
