#![forbid(unsafe_code)]

//! Calculator engine
//!
//! Interprets an ordered stream of calculator key events into display
//! updates, replicating a two-register pocket calculator.
//!
//! # Key Components
//!
//! - [`OperandEditor`] - folds keys into the decimal string being typed
//! - [`ExpressionSequencer`] - registers, pending operator, and step machine
//! - [`Engine`] - the single ordered dispatcher feeding both layers
//! - [`DisplayModel`] - pure projection of a snapshot for rendering
//! - [`SessionSimulator`] - deterministic virtual-clock driver
//!
//! Both layers own an inactivity timer; five seconds without a key resets
//! the entry and the whole expression.

pub mod display;
pub mod editor;
pub mod engine;
pub mod sequencer;
pub mod simulator;

pub use display::DisplayModel;
pub use editor::{ClearLabel, EditOutcome, EditTransform, InputMode, OperandEditState, OperandEditor};
pub use engine::{Engine, EngineConfig, EngineOutput};
pub use sequencer::{CalculatorSnapshot, ExpressionSequencer, SequencerTransform, Step};
pub use simulator::{SessionSimulator, UnknownKey};
