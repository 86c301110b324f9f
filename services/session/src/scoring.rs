//! Endgame and live scoring
//!
//! A complete set realizes `set_value`, strictly more than the sum of its
//! components' scrap values; leftovers scrap individually. Live standings
//! deliberately value only cash plus current scrap, so a participant
//! quietly assembling sets looks worse than they are until the end.

use std::collections::BTreeMap;

use matching_engine::Ledger;
use types::config::GameConfig;
use types::events::{FinalScoreView, LeaderboardRow, LeaderboardView};
use types::ids::ParticipantId;
use types::participant::Participant;
use types::product::Product;

/// Full endgame accounting for one participant
pub fn final_score(participant: &Participant, config: &GameConfig) -> FinalScoreView {
    let complete_sets = participant.complete_sets(&config.set_recipe);
    let sets_value = complete_sets * config.set_value;

    let leftover_inventory: BTreeMap<Product, u64> = config
        .products
        .iter()
        .map(|product| {
            let held = participant.inventory_count(product);
            let used = complete_sets * config.set_recipe.get(product).copied().unwrap_or(0);
            (product.clone(), held - used)
        })
        .collect();
    let scrap_value = Participant::scrap_value_of(&leftover_inventory, &config.scrap_values);

    let total_score = participant.cash + sets_value + scrap_value;
    let baseline = participant.initial_cash + participant.initial_scrap_value(&config.scrap_values);
    let pnl = total_score as i64 - baseline as i64;

    FinalScoreView {
        participant_id: participant.participant_id,
        name: participant.name.clone(),
        cash: participant.cash,
        complete_sets,
        sets_value,
        leftover_inventory,
        scrap_value,
        total_score,
        pnl,
    }
}

/// Endgame leaderboard plus the per-participant accounting behind it
///
/// Rows are sorted by total score descending; the sort is stable over
/// admission order, which is the tie-break.
pub fn final_leaderboard(
    admission_order: &[ParticipantId],
    ledger: &Ledger,
    config: &GameConfig,
) -> (LeaderboardView, Vec<FinalScoreView>) {
    let scores: Vec<FinalScoreView> = admission_order
        .iter()
        .filter_map(|pid| ledger.get(pid))
        .map(|participant| final_score(participant, config))
        .collect();

    let mut rows: Vec<LeaderboardRow> = scores
        .iter()
        .map(|score| LeaderboardRow {
            rank: 0,
            participant_id: score.participant_id,
            name: score.name.clone(),
            score: score.total_score,
            complete_sets: score.complete_sets,
            pnl: Some(score.pnl),
        })
        .collect();
    rows.sort_by(|a, b| b.score.cmp(&a.score));
    for (index, row) in rows.iter_mut().enumerate() {
        row.rank = index as u32 + 1;
    }

    (
        LeaderboardView {
            rows,
            is_final: true,
        },
        scores,
    )
}

/// Live standings while the session runs
///
/// Estimated value is cash plus current scrap value; sets are not realized
/// until the end.
pub fn live_leaderboard(
    admission_order: &[ParticipantId],
    ledger: &Ledger,
    config: &GameConfig,
) -> LeaderboardView {
    let mut rows: Vec<LeaderboardRow> = admission_order
        .iter()
        .filter_map(|pid| ledger.get(pid))
        .map(|participant| LeaderboardRow {
            rank: 0,
            participant_id: participant.participant_id,
            name: participant.name.clone(),
            score: participant.cash + participant.current_scrap_value(&config.scrap_values),
            complete_sets: participant.complete_sets(&config.set_recipe),
            pnl: None,
        })
        .collect();
    rows.sort_by(|a, b| b.score.cmp(&a.score));
    for (index, row) in rows.iter_mut().enumerate() {
        row.rank = index as u32 + 1;
    }

    LeaderboardView {
        rows,
        is_final: false,
    }
}
