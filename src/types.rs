//! This module defines the core data structures and types used throughout the k-tape
//! simulator, including machine descriptions, transition rules, execution outcomes, and error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Rule;

/// The blank symbol. Always part of the tape alphabet.
pub const BLANK_SYMBOL: char = '_';
/// The largest number of tapes a machine may have.
pub const MAX_TAPES: usize = 1024;
/// Meta-symbol used in transition specifications to stand for any tape symbol.
/// It never materializes on a tape.
pub const WILDCARD_SYMBOL: char = '*';

/// A static description of a k-tape machine, as produced by the parser.
///
/// Transitions are kept in declaration order, since registration order decides
/// which rule survives when two of them share a key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MachineDescription {
    /// The name of the machine.
    pub name: String,
    /// Number of tapes (k).
    pub tapes: usize,
    /// Initial content of the control tape (tape 0).
    pub input: String,
    /// The declared state set.
    pub states: Vec<String>,
    /// The start state.
    pub start: String,
    /// The accepting states. Every other state rejects.
    pub accept: Vec<String>,
    /// How repeated registrations of the same key are handled.
    #[serde(default)]
    pub mode: Mode,
    /// Raw transition rules, possibly containing wildcards.
    pub transitions: Vec<RawTransition>,
}

/// Controls how the transition table handles a key that is registered twice.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Mode {
    /// The later registration replaces the earlier one.
    #[default]
    Overwrite,
    /// Registering a different rule for an existing key is an error.
    Strict,
}

/// A transition rule as written in a machine description.
///
/// `read` and `write` may contain [`WILDCARD_SYMBOL`]; the transition table expands
/// them into concrete rules when the raw rule is registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransition {
    pub state: String,
    pub read: Vec<char>,
    pub next_state: String,
    pub write: Vec<char>,
    pub directions: Vec<Direction>,
}

impl RawTransition {
    /// Returns `true` if any read or write position holds the wildcard.
    pub fn has_wildcard(&self) -> bool {
        self.read
            .iter()
            .chain(self.write.iter())
            .any(|&c| c == WILDCARD_SYMBOL)
    }

    /// Replaces every wildcard occurrence, in both halves, with the same `symbol`.
    pub fn substitute(&self, symbol: char) -> RawTransition {
        let replace = |symbols: &[char]| {
            symbols
                .iter()
                .map(|&c| if c == WILDCARD_SYMBOL { symbol } else { c })
                .collect()
        };

        RawTransition {
            state: self.state.clone(),
            read: replace(&self.read),
            next_state: self.next_state.clone(),
            write: replace(&self.write),
            directions: self.directions.clone(),
        }
    }
}

/// The right-hand side of a concrete rule: what happens once `(state, read)` matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// The state the machine moves to.
    pub next_state: String,
    /// One symbol to write per tape.
    pub write: Vec<char>,
    /// One head movement per tape.
    pub directions: Vec<Direction>,
}

/// Represents the possible directions a tape head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    Stay,
}

impl Direction {
    /// The head offset for this movement.
    pub fn offset(self) -> isize {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
            Direction::Stay => 0,
        }
    }

    /// Parses a movement code (`L`, `R` or `S`).
    pub fn from_code(code: &str) -> Option<Direction> {
        match code {
            "L" => Some(Direction::Left),
            "R" => Some(Direction::Right),
            "S" => Some(Direction::Stay),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            Direction::Left => 'L',
            Direction::Right => 'R',
            Direction::Stay => 'S',
        }
    }
}

/// A single step the machine has taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    /// 1-based index of the step.
    pub index: usize,
    /// The state the step was taken from.
    pub state: String,
    /// The symbols that were under the heads.
    pub read: Vec<char>,
    /// The state the machine is in after the step.
    pub next_state: String,
}

/// The final classification of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// The run halted in an accepting state.
    Accept,
    /// The run halted in a state outside the accept set.
    Reject,
    /// The run stopped early because no rule matched the configuration.
    RejectedByMissingTransition { state: String, symbols: Vec<char> },
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accept)
    }
}

/// A copy of one tape's contents and head position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapeSnapshot {
    pub cells: Vec<char>,
    pub head: usize,
}

/// The current state plus every tape: the unit that evolves one step at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub state: String,
    pub tapes: Vec<TapeSnapshot>,
}

/// Represents various errors that can occur while loading or running a machine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KTapeError {
    /// No rule is defined for the current state and symbols.
    #[error("Transition ({0}, {1:?}) does not exist")]
    NoTransition(String, Vec<char>),
    /// A rule's read, write or direction tuple does not have one entry per tape.
    #[error("Malformed rule for state {state}: {field} has {found} entries, expected {expected}")]
    MalformedRule {
        state: String,
        field: &'static str,
        expected: usize,
        found: usize,
    },
    /// A different rule was already registered for this key (strict mode only).
    #[error("Conflicting rule for state {0} and symbols {1:?}")]
    ConflictingTransition(String, Vec<char>),
    /// A machine needs between one and `MAX_TAPES` tapes.
    #[error("Invalid tape count: {0}")]
    InvalidTapeCount(usize),
    /// The configured step budget ran out before the machine halted.
    #[error("Step limit of {0} exceeded")]
    StepLimitExceeded(usize),
    /// Indicates an error during the parsing of a machine description.
    #[error("Description parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// Indicates an error during the validation of a machine description.
    #[error("Description validation error: {0}")]
    ValidationError(String),
    /// Indicates an error related to file system operations.
    #[error("File error: {0}")]
    FileError(String),
}
