//! # Game Tasks Test Suite
//!
//! Cross-crate scenarios driving [`game_tasks::TaskBridge`] against a fake
//! framework over the in-memory event bus.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/
//! │   ├── fakes.rs      # Fake host services reporting through the bus
//! │   └── scenarios.rs  # End-to-end flows per domain
//! └── benches/
//!     └── registry_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p game-tasks-tests
//! cargo bench -p game-tasks-tests
//! ```

pub mod integration;
