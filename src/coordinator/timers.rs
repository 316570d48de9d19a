//! Turn-timeout and auto-deal background driver. Wakes on a fixed interval
//! and, for every known game, submits an auto-action on behalf of a player
//! who let their clock run out, or auto-deals the next hand once a table's
//! auto-deal grace period has elapsed.

use std::time::Duration;

use super::state::CoordinatorState;

const TICK_INTERVAL: Duration = Duration::from_secs(1);

pub async fn run(state: CoordinatorState) {
    let mut ticker = tokio::time::interval(TICK_INTERVAL);
    loop {
        ticker.tick().await;
        let now = wall_clock_now();

        let codes = match state.known_game_codes().await {
            Ok(codes) => codes,
            Err(e) => {
                tracing::warn!(error = %e, "timer driver: failed to list games");
                continue;
            }
        };

        for code in codes {
            if let Err(e) = state.tick_timers(&code, now).await {
                tracing::warn!(game = %code, error = %e, "timer driver tick failed");
            }
        }
    }
}

fn wall_clock_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
