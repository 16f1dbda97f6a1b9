//! This crate provides the core logic for a deterministic multi-tape Turing machine simulator.
//! It includes modules for parsing tabular machine descriptions, expanding wildcard transition
//! rules, running machines under the control-tape halting policy, and formatting run traces.

pub mod analyzer;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod report;
pub mod table;
pub mod tape;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `analyze` function and `AnalysisError` enum from the analyzer module.
pub use analyzer::{analyze, AnalysisError};
/// Re-exports the `DescriptionLoader` struct from the loader module.
pub use loader::DescriptionLoader;
/// Re-exports the `Machine` struct from the machine module.
pub use machine::Machine;
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports the `TransitionTable` struct from the table module.
pub use table::TransitionTable;
/// Re-exports the `Tape` struct from the tape module.
pub use tape::Tape;
/// Re-exports the machine description, execution and error types from the types module.
pub use types::{
    Configuration, Direction, KTapeError, MachineDescription, Mode, RawTransition, Step,
    TapeSnapshot, Transition, Verdict, BLANK_SYMBOL, MAX_TAPES, WILDCARD_SYMBOL,
};
