//! UatBot Scenario Execution Engine
//!
//! Takes natural-language test scenarios and drives a headless browser to
//! perform them, capturing per-step outcomes, screenshots, and a final
//! verdict with diagnostic evidence.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Scenario Execution Engine                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  BatchRunner                                                 │
//! │    ├── acquire BrowserSession (one per batch)               │
//! │    ├── ScenarioRunner::run(scenario) per scenario, in order │
//! │    └── BatchReport + rendered text report                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ScenarioRunner (per scenario)                              │
//! │    ├── parse each free-text step into an Action             │
//! │    ├── execute the Action against the live page             │
//! │    │     └── resolve targets via an ordered strategy chain  │
//! │    ├── screenshot after every step (and on error)           │
//! │    └── stop on first failure; verify expected results last  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Step texts are classified by a fixed heuristic grammar ([`step`]),
//! target labels are resolved through a fallback chain of lookup
//! strategies ([`resolver`]), and every browser interaction is bounded by
//! a timeout ([`executor`]). Failures below the scenario level never
//! escape the scenario; failures below the batch level never abort the
//! batch.

pub mod batch;
pub mod error;
pub mod executor;
pub mod report;
pub mod resolver;
pub mod runner;
pub mod session;
pub mod step;
pub mod visual;

pub use batch::{BatchConfig, BatchRunner};
pub use error::{EngineError, EngineResult};
pub use runner::ScenarioRunner;
pub use session::{BrowserSession, SessionConfig};
pub use step::{parse_step, Action};
