//! Stale-game sweeper: periodically deletes games that have gone quiet for
//! longer than their retention window.

use std::time::Duration;

use super::state::CoordinatorState;

const SWEEP_INTERVAL: Duration = Duration::from_secs(30 * 60);

pub async fn run(state: CoordinatorState, idle_retention_seconds: u64, ended_retention_seconds: u64) {
    let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
    loop {
        ticker.tick().await;
        let now = wall_clock_now();

        if let Err(e) = state.prune_metrics(now).await {
            tracing::warn!(error = %e, "sweeper: failed to prune metrics");
        }

        let codes = match state.known_game_codes().await {
            Ok(codes) => codes,
            Err(e) => {
                tracing::warn!(error = %e, "sweeper: failed to list games");
                continue;
            }
        };

        for code in codes {
            let stale = state
                .is_stale(
                    &code,
                    now,
                    idle_retention_seconds as i64,
                    ended_retention_seconds as i64,
                )
                .await;
            match stale {
                Ok(true) => match state.remove_game(&code).await {
                    Ok(()) => tracing::info!(game = %code, "swept stale game"),
                    Err(e) => tracing::warn!(game = %code, error = %e, "failed to sweep game"),
                },
                Ok(false) => {}
                Err(e) => tracing::warn!(game = %code, error = %e, "sweeper: failed to check staleness"),
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
