//! Card primitives and hand evaluation. Pure, synchronous, no I/O.

pub mod cards;
pub mod evaluation;

pub use cards::Deck;
