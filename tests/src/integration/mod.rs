//! # Integration Scenarios
//!
//! The fake framework starts every operation synchronously and reports its
//! outcome with `fire` (queued), so a scenario controls when results land by
//! pumping the bus with `update()`, one "frame" at a time.

pub mod fakes;

mod scenarios;
