//! The poker engine: a deterministic state machine covering a single game's
//! lifecycle from creation through elimination and final standings.

mod betting;
mod blinds;
mod dealing;
mod elimination;
mod engine;
mod flow;
mod rebuy;
mod showdown;
mod view;

pub use elimination::final_standings;
pub use engine::{GameEngine, Pot, Seat};
pub use rebuy::{can_rebuy, cancel_rebuy, queue_rebuy};
pub use view::{to_view, valid_actions_for};

pub use blinds::{build_schedule, current_blinds, next_blind_change_at};
