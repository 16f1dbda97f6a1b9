//! This module defines the `Machine` struct, which simulates a deterministic k-tape Turing
//! machine. It owns the tapes, the control state and the transition table, and exposes
//! single steps as well as complete runs under the control-tape halting policy.

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::table::TransitionTable;
use crate::tape::Tape;
use crate::types::{
    Configuration, KTapeError, MachineDescription, Mode, RawTransition, Step, Verdict,
    BLANK_SYMBOL, MAX_TAPES,
};

/// Represents a deterministic k-tape Turing machine.
///
/// Tape 0 is the control tape: it is seeded with the input and its blank cell marks the
/// end of the input for [`Machine::run`]. Every other tape starts as a single blank cell.
#[derive(Debug)]
pub struct Machine {
    name: String,
    input: String,
    states: HashSet<String>,
    start: String,
    accept: HashSet<String>,
    state: String,
    tapes: Vec<Tape>,
    table: TransitionTable,
    step_count: usize,
    max_steps: Option<usize>,
}

impl Machine {
    /// Creates a new machine with an empty transition table.
    ///
    /// The wildcard expansion alphabet is the set of input symbols plus the blank symbol.
    ///
    /// # Returns
    ///
    /// * `Err(KTapeError::InvalidTapeCount)` if `tapes` is zero or above [`MAX_TAPES`].
    pub fn new<S: Into<String>>(
        name: &str,
        tapes: usize,
        input: &str,
        states: impl IntoIterator<Item = S>,
        start: &str,
        accept: impl IntoIterator<Item = S>,
    ) -> Result<Self, KTapeError> {
        if tapes == 0 || tapes > MAX_TAPES {
            return Err(KTapeError::InvalidTapeCount(tapes));
        }

        Ok(Self {
            name: name.to_string(),
            input: input.to_string(),
            states: states.into_iter().map(Into::into).collect(),
            start: start.to_string(),
            accept: accept.into_iter().map(Into::into).collect(),
            state: start.to_string(),
            tapes: initial_tapes(tapes, input),
            table: TransitionTable::new(tapes, input.chars()),
            step_count: 0,
            max_steps: None,
        })
    }

    /// Builds a machine from a parsed description, registering its transitions in order.
    pub fn from_description(description: &MachineDescription) -> Result<Self, KTapeError> {
        let mut machine = Self::new(
            &description.name,
            description.tapes,
            &description.input,
            description.states.iter().map(String::as_str),
            &description.start,
            description.accept.iter().map(String::as_str),
        )?
        .with_mode(description.mode);

        for raw in &description.transitions {
            machine.register(raw)?;
        }

        Ok(machine)
    }

    /// Sets how repeated registrations of the same key are handled.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.table.set_mode(mode);
        self
    }

    /// Limits the number of steps a run may take. `None` means unbounded.
    pub fn with_max_steps(mut self, max_steps: Option<usize>) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Adds symbols to the wildcard expansion alphabet for rules registered afterwards.
    pub fn extend_alphabet(&mut self, symbols: impl IntoIterator<Item = char>) {
        self.table.extend_alphabet(symbols);
    }

    /// Registers a raw transition, expanding wildcards. Returns the number of concrete rules.
    pub fn register(&mut self, raw: &RawTransition) -> Result<usize, KTapeError> {
        self.table.register(raw)
    }

    /// Executes a single step: read every head, look up the rule, then write, move and
    /// switch state.
    ///
    /// # Returns
    ///
    /// * `Ok(Step)` describing the step that was taken.
    /// * `Err(KTapeError::NoTransition)` if no rule matches; the configuration is unchanged.
    pub fn step(&mut self) -> Result<Step, KTapeError> {
        let read = self.symbols();
        let transition = self
            .table
            .lookup(&self.state, &read)
            .cloned()
            .ok_or_else(|| KTapeError::NoTransition(self.state.clone(), read.clone()))?;

        for ((tape, &symbol), &direction) in self
            .tapes
            .iter_mut()
            .zip(&transition.write)
            .zip(&transition.directions)
        {
            tape.write(symbol);
            tape.shift(direction);
        }

        let state = std::mem::replace(&mut self.state, transition.next_state);
        self.step_count += 1;

        trace!(
            step = self.step_count,
            from = %state,
            to = %self.state,
            read = ?read,
            "step"
        );

        Ok(Step {
            index: self.step_count,
            state,
            read,
            next_state: self.state.clone(),
        })
    }

    /// Runs the machine to completion and classifies the final state.
    pub fn run(&mut self) -> Result<Verdict, KTapeError> {
        self.run_with(|_, _| {})
    }

    /// Runs the machine to completion, handing every step and the resulting machine to
    /// `observer`.
    ///
    /// Steps are taken while the control tape's head reads a non-blank symbol, followed by
    /// exactly one more step, which lets the rule inspecting the end-of-input blank fire.
    ///
    /// # Returns
    ///
    /// * `Ok(Verdict::Accept)` or `Ok(Verdict::Reject)` depending on the final state.
    /// * `Ok(Verdict::RejectedByMissingTransition)` if a step found no matching rule.
    /// * `Err(KTapeError::StepLimitExceeded)` if the step budget ran out.
    pub fn run_with<F>(&mut self, mut observer: F) -> Result<Verdict, KTapeError>
    where
        F: FnMut(&Step, &Machine),
    {
        debug!(machine = %self.name, input = %self.input, "run started");

        let verdict = match self.drive(&mut observer) {
            Ok(()) => self.verdict(),
            Err(KTapeError::NoTransition(state, symbols)) => {
                Verdict::RejectedByMissingTransition { state, symbols }
            }
            Err(e) => return Err(e),
        };

        debug!(steps = self.step_count, verdict = ?verdict, "run finished");

        Ok(verdict)
    }

    fn drive<F>(&mut self, observer: &mut F) -> Result<(), KTapeError>
    where
        F: FnMut(&Step, &Machine),
    {
        while self.tapes[0].read() != BLANK_SYMBOL {
            self.advance(observer)?;
        }

        self.advance(observer)
    }

    fn advance<F>(&mut self, observer: &mut F) -> Result<(), KTapeError>
    where
        F: FnMut(&Step, &Machine),
    {
        if let Some(max) = self.max_steps {
            if self.step_count >= max {
                return Err(KTapeError::StepLimitExceeded(max));
            }
        }

        let step = self.step()?;
        observer(&step, self);

        Ok(())
    }

    /// Classifies the current state: accept if it belongs to the accept set.
    pub fn verdict(&self) -> Verdict {
        if self.accept.contains(&self.state) {
            Verdict::Accept
        } else {
            Verdict::Reject
        }
    }

    /// Restores the initial configuration. Registered transitions are kept.
    pub fn reset(&mut self) {
        self.state = self.start.clone();
        self.tapes = initial_tapes(self.tapes.len(), &self.input);
        self.step_count = 0;
    }

    /// Returns the symbols currently under each head.
    pub fn symbols(&self) -> Vec<char> {
        self.tapes.iter().map(Tape::read).collect()
    }

    /// Returns a copy of the current configuration.
    pub fn configuration(&self) -> Configuration {
        Configuration {
            state: self.state.clone(),
            tapes: self.tapes.iter().map(Tape::snapshot).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    /// Returns `true` if `state` was declared in the state set.
    pub fn is_declared(&self, state: &str) -> bool {
        self.states.contains(state)
    }

    pub fn is_accepting(&self, state: &str) -> bool {
        self.accept.contains(state)
    }

    pub fn tapes(&self) -> &[Tape] {
        &self.tapes
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// Returns the total number of steps executed so far.
    pub fn step_count(&self) -> usize {
        self.step_count
    }
}

fn initial_tapes(count: usize, input: &str) -> Vec<Tape> {
    std::iter::once(Tape::new(input))
        .chain(std::iter::repeat_with(Tape::blank).take(count - 1))
        .collect()
}
