//! Blind schedule construction and runtime advancement.

use holdem_shared::GameSettings;

use super::engine::GameEngine;

/// Standard tournament chip denominations, used by `snap` to round a raw
/// blind value to the nearest "clean" chip amount.
fn snap_table() -> Vec<u32> {
    const BASE: [u32; 7] = [1, 2, 3, 4, 5, 6, 8];
    let mut table = Vec::with_capacity(BASE.len() * 5 + 1);
    for exp in 0..=4u32 {
        let mult = 10u32.pow(exp);
        table.extend(BASE.iter().map(|b| b * mult));
    }
    table.push(100_000);
    table
}

fn snap(value: u32) -> u32 {
    snap_table()
        .into_iter()
        .min_by_key(|&t| (t as i64 - value as i64).abs())
        .unwrap_or(value.max(1))
}

fn sb_for(bb: u32) -> u32 {
    (bb / 2).max(1)
}

/// Build the initial blind schedule from the target-game-time algorithm:
/// a linear phase ramping to `bb_initial`-sized steps, a geometric phase
/// aiming to finish around `starting_chips` as the final big blind, then an
/// overtime phase of 1.5x steps until the big blind reaches 3x the starting
/// stack.
pub fn build_schedule(settings: &GameSettings) -> Vec<(u32, u32)> {
    if settings.blind_level_duration_minutes == 0 {
        return vec![(settings.small_blind_initial, settings.big_blind_initial)];
    }

    let bb_initial = snap((settings.starting_chips / 100).max(1));
    // Target total levels derived from a nominal 4-hour session; this is a
    // starting point only, extended at runtime as the game actually runs.
    let target_minutes = 240u32;
    let total_levels =
        (target_minutes / settings.blind_level_duration_minutes).max(2) as usize;

    let mut schedule = Vec::with_capacity(total_levels);
    let linear_levels = total_levels.div_ceil(2).min(total_levels);
    for i in 0..linear_levels {
        let bb = snap(bb_initial * (i as u32 + 1));
        schedule.push((sb_for(bb), bb));
    }

    let remaining = total_levels.saturating_sub(schedule.len());
    if remaining > 0 {
        let last_bb = schedule.last().map(|&(_, bb)| bb).unwrap_or(bb_initial).max(1);
        let target_final = settings.starting_chips.max(last_bb + 1);
        let ratio = if remaining > 1 {
            (target_final as f64 / last_bb as f64).powf(1.0 / (remaining as f64 - 1.0))
        } else {
            1.0
        };
        let mut cur = last_bb as f64;
        for _ in 0..remaining {
            cur *= ratio;
            let bb = snap(cur.round().max(1.0) as u32);
            schedule.push((sb_for(bb), bb));
        }
    }

    // Overtime phase: keep extending at 1.5x until bb reaches 3x starting chips.
    let cap = settings.starting_chips.saturating_mul(3).max(1);
    while schedule.last().map(|&(_, bb)| bb).unwrap_or(0) < cap {
        let last_bb = schedule.last().map(|&(_, bb)| bb).unwrap_or(bb_initial);
        let next_bb = snap(((last_bb as f64) * 1.5).round().max(1.0) as u32);
        if next_bb <= last_bb {
            break;
        }
        schedule.push((sb_for(next_bb), next_bb));
    }

    schedule
}

/// Recompute `blind_level`, extending `blind_schedule` with 1.5x-sized
/// levels if real elapsed time has run past the end of the table.
pub fn advance(engine: &mut GameEngine, now: i64) {
    let dur = engine.settings.blind_level_duration_minutes;
    if dur == 0 {
        engine.blind_level = 0;
        return;
    }
    let level_duration_secs = dur as i64 * 60;
    let elapsed = engine.effective_elapsed(now);
    let mut idx = (elapsed / level_duration_secs) as usize;

    while idx >= engine.blind_schedule.len() {
        let last_bb = engine
            .blind_schedule
            .last()
            .map(|&(_, bb)| bb)
            .unwrap_or(engine.settings.big_blind_initial);
        let next_bb = snap(((last_bb as f64) * 1.5).round().max(1.0) as u32);
        engine.blind_schedule.push((sb_for(next_bb), next_bb));
    }
    idx = idx.min(engine.blind_schedule.len() - 1);

    if idx != engine.blind_level {
        engine.blind_level = idx;
        let (sb, bb) = engine
            .blind_schedule
            .get(idx)
            .copied()
            .unwrap_or((engine.settings.small_blind_initial, engine.settings.big_blind_initial));
        engine.log(holdem_shared::ActionEvent::game(
            holdem_shared::GameAction::BlindLevelAdvanced { level: idx, sb, bb },
        ));
    }
}

pub fn current_blinds(engine: &GameEngine) -> (u32, u32) {
    engine
        .blind_schedule
        .get(engine.blind_level)
        .copied()
        .unwrap_or((engine.settings.small_blind_initial, engine.settings.big_blind_initial))
}

pub fn next_blind_change_at(engine: &GameEngine) -> Option<i64> {
    if engine.game_over || engine.settings.blind_level_duration_minutes == 0 {
        return None;
    }
    let level_duration_secs = engine.settings.blind_level_duration_minutes as i64 * 60;
    let next_level = (engine.blind_level + 1) as i64;
    Some(engine.game_started_at + engine.total_paused_seconds + next_level * level_duration_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use holdem_shared::GameSettings;

    fn settings() -> GameSettings {
        GameSettings {
            starting_chips: 5000,
            blind_level_duration_minutes: 20,
            ..Default::default()
        }
    }

    #[test]
    fn schedule_extends_past_original_length() {
        let settings = settings();
        let mut engine = GameEngine::new(
            "CODE01".into(),
            settings,
            holdem_shared::PlayerId(0),
            "A".into(),
            "h".into(),
            0,
        );
        let original_len = engine.blind_schedule.len();
        // Jump well past the built schedule's total duration.
        let far_future = (original_len as i64 + 3) * 20 * 60;
        advance(&mut engine, far_future);
        assert!(engine.blind_schedule.len() > original_len);
        assert_eq!(engine.blind_level, engine.blind_schedule.len() - 1);
    }

    #[test]
    fn fixed_blinds_when_duration_zero() {
        let mut settings = settings();
        settings.blind_level_duration_minutes = 0;
        let schedule = build_schedule(&settings);
        assert_eq!(schedule.len(), 1);
    }
}
