//! This module defines the `TransitionTable`, which maps `(state, symbols read)` to the
//! concrete rule to apply. Raw rules containing wildcards are expanded against the tape
//! alphabet when they are registered, so lookups are always exact matches.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::types::{KTapeError, Mode, RawTransition, Transition, BLANK_SYMBOL, WILDCARD_SYMBOL};

/// Concrete transition rules for a k-tape machine.
#[derive(Debug, Clone)]
pub struct TransitionTable {
    tapes: usize,
    mode: Mode,
    alphabet: BTreeSet<char>,
    rules: HashMap<String, HashMap<Vec<char>, Transition>>,
}

impl TransitionTable {
    /// Creates an empty table for `tapes` tapes whose wildcard expansion alphabet is
    /// `symbols` plus the blank symbol.
    pub fn new(tapes: usize, symbols: impl IntoIterator<Item = char>) -> Self {
        let mut table = Self {
            tapes,
            mode: Mode::default(),
            alphabet: BTreeSet::from([BLANK_SYMBOL]),
            rules: HashMap::new(),
        };
        table.extend_alphabet(symbols);
        table
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Adds symbols to the expansion alphabet. Only rules registered afterwards see them.
    pub fn extend_alphabet(&mut self, symbols: impl IntoIterator<Item = char>) {
        self.alphabet
            .extend(symbols.into_iter().filter(|&c| c != WILDCARD_SYMBOL));
    }

    /// The symbols a wildcard expands to, in ascending order.
    pub fn alphabet(&self) -> &BTreeSet<char> {
        &self.alphabet
    }

    /// Registers a raw rule, expanding wildcards into one concrete rule per alphabet symbol.
    ///
    /// Every wildcard in the rule, in both the read and write halves, receives the same
    /// symbol within one expansion. Expansions are registered in ascending symbol order.
    ///
    /// # Returns
    ///
    /// * `Ok(n)` with the number of concrete rules registered.
    /// * `Err(KTapeError::MalformedRule)` if a tuple does not have one entry per tape.
    /// * `Err(KTapeError::ConflictingTransition)` in strict mode, if a key is already bound
    ///   to a different rule. Nothing is registered in that case.
    pub fn register(&mut self, raw: &RawTransition) -> Result<usize, KTapeError> {
        self.check_arity(raw)?;

        let expanded = self.expand(raw);
        if self.mode == Mode::Strict {
            self.check_conflicts(&expanded)?;
        }

        for rule in &expanded {
            self.insert(rule);
        }

        debug!(
            state = %raw.state,
            read = ?raw.read,
            concrete = expanded.len(),
            "registered transition"
        );

        Ok(expanded.len())
    }

    /// Exact-match lookup of the rule for `state` reading `symbols`.
    pub fn lookup(&self, state: &str, symbols: &[char]) -> Option<&Transition> {
        self.rules.get(state)?.get(symbols)
    }

    /// Total number of concrete rules.
    pub fn len(&self) -> usize {
        self.rules.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_arity(&self, raw: &RawTransition) -> Result<(), KTapeError> {
        let fields = [
            ("read", raw.read.len()),
            ("write", raw.write.len()),
            ("directions", raw.directions.len()),
        ];

        match fields.iter().find(|(_, found)| *found != self.tapes) {
            Some(&(field, found)) => Err(KTapeError::MalformedRule {
                state: raw.state.clone(),
                field,
                expected: self.tapes,
                found,
            }),
            None => Ok(()),
        }
    }

    fn expand(&self, raw: &RawTransition) -> Vec<RawTransition> {
        if !raw.has_wildcard() {
            return vec![raw.clone()];
        }

        // A single substitution removes every wildcard, so one pass reaches the fixed point.
        self.alphabet.iter().map(|&c| raw.substitute(c)).collect()
    }

    fn check_conflicts(&self, rules: &[RawTransition]) -> Result<(), KTapeError> {
        let mut staged: HashMap<&[char], Transition> = HashMap::new();

        for rule in rules {
            let transition = to_transition(rule);
            let existing = staged
                .get(rule.read.as_slice())
                .or_else(|| self.lookup(&rule.state, &rule.read));

            if existing.is_some_and(|t| *t != transition) {
                return Err(KTapeError::ConflictingTransition(
                    rule.state.clone(),
                    rule.read.clone(),
                ));
            }

            staged.insert(rule.read.as_slice(), transition);
        }

        Ok(())
    }

    fn insert(&mut self, rule: &RawTransition) {
        let transition = to_transition(rule);
        let previous = self
            .rules
            .entry(rule.state.clone())
            .or_default()
            .insert(rule.read.clone(), transition.clone());

        if previous.is_some_and(|previous| previous != transition) {
            warn!(
                state = %rule.state,
                read = ?rule.read,
                "transition overwritten by a later registration"
            );
        }
    }
}

fn to_transition(rule: &RawTransition) -> Transition {
    Transition {
        next_state: rule.next_state.clone(),
        write: rule.write.clone(),
        directions: rule.directions.clone(),
    }
}
