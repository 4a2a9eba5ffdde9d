//! Motion pipeline.
//!
//! [`segment`] chops a single commanded move into equal-length sub-moves;
//! [`coordinator`] submits them to the external motion executor with a
//! per-segment scaled feedrate, paced by the executor's lookahead timing.

pub mod coordinator;
pub mod segment;
