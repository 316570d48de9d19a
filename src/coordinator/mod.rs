//! Session coordinator: owns the per-game mutex map, the load/mutate/
//! persist/broadcast protocol, and the background timer driver and sweeper
//! that keep games progressing without a client in the loop.

mod auth;
mod state;
mod sweeper;
mod timers;

pub use state::CoordinatorState;
pub use sweeper::run as run_sweeper;
pub use timers::run as run_timers;
