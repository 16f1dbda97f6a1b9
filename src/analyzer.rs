//! This module provides functions for analyzing machine descriptions to detect common errors
//! and inconsistencies before execution. The engine itself is permissive; these checks are
//! opt-in for callers that want a declared, self-consistent machine.

use crate::types::{KTapeError, MachineDescription, BLANK_SYMBOL, WILDCARD_SYMBOL};
use std::collections::HashSet;

/// Represents the problems that can be found during the analysis of a machine description.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// The start state is not part of the declared state set.
    UndeclaredStartState(String),
    /// Accept states that are not part of the declared state set.
    UndeclaredAcceptStates(Vec<String>),
    /// States used by transitions that are not part of the declared state set.
    UndeclaredStates(Vec<String>),
    /// The start state has no outgoing transitions.
    NoStartTransitions(String),
    /// A transition has the wrong number of symbols or directions for the tape count.
    InconsistentArity(String),
    /// Symbols written by transitions that a wildcard will never match.
    UnmatchedSymbols(Vec<char>),
}

impl From<AnalysisError> for KTapeError {
    /// Converts an `AnalysisError` into a `KTapeError::ValidationError`.
    fn from(error: AnalysisError) -> Self {
        let message = match error {
            AnalysisError::UndeclaredStartState(state) => {
                format!("Start state is not declared: {}", state)
            }
            AnalysisError::UndeclaredAcceptStates(states) => {
                format!("Accept states are not declared: {:?}", states)
            }
            AnalysisError::UndeclaredStates(states) => {
                format!("Transitions reference undeclared states: {:?}", states)
            }
            AnalysisError::NoStartTransitions(state) => {
                format!("Start state {} has no transitions", state)
            }
            AnalysisError::InconsistentArity(state) => {
                format!("Transition in state '{}' has inconsistent tape counts", state)
            }
            AnalysisError::UnmatchedSymbols(symbols) => format!(
                "Symbols written by transitions are outside the wildcard alphabet: {:?}",
                symbols
            ),
        };

        KTapeError::ValidationError(message)
    }
}

/// Analyzes a machine description, returning the first problem found.
///
/// # Returns
///
/// * `Ok(())` if no problems are found.
/// * `Err(KTapeError::ValidationError)` describing the first problem otherwise.
pub fn analyze(description: &MachineDescription) -> Result<(), KTapeError> {
    match findings(description).into_iter().next() {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}

/// Runs every check and collects all problems, in check order.
pub fn findings(description: &MachineDescription) -> Vec<AnalysisError> {
    [
        check_arity,
        check_start_state,
        check_accept_states,
        check_transition_states,
        check_start_transitions,
        check_written_symbols,
    ]
    .iter()
    .filter_map(|f| f(description).err())
    .collect()
}

fn declared(description: &MachineDescription) -> HashSet<&str> {
    description.states.iter().map(String::as_str).collect()
}

/// Checks that every transition has one read symbol, write symbol and direction per tape.
fn check_arity(description: &MachineDescription) -> Result<(), AnalysisError> {
    let k = description.tapes;

    description
        .transitions
        .iter()
        .find(|t| t.read.len() != k || t.write.len() != k || t.directions.len() != k)
        .map_or(Ok(()), |t| {
            Err(AnalysisError::InconsistentArity(t.state.clone()))
        })
}

fn check_start_state(description: &MachineDescription) -> Result<(), AnalysisError> {
    if !declared(description).contains(description.start.as_str()) {
        return Err(AnalysisError::UndeclaredStartState(
            description.start.clone(),
        ));
    }

    Ok(())
}

fn check_accept_states(description: &MachineDescription) -> Result<(), AnalysisError> {
    let states = declared(description);
    let undeclared: Vec<String> = description
        .accept
        .iter()
        .filter(|s| !states.contains(s.as_str()))
        .cloned()
        .collect();

    if !undeclared.is_empty() {
        return Err(AnalysisError::UndeclaredAcceptStates(undeclared));
    }

    Ok(())
}

/// Checks that transitions only move between declared states.
fn check_transition_states(description: &MachineDescription) -> Result<(), AnalysisError> {
    let states = declared(description);
    let mut undeclared: Vec<String> = description
        .transitions
        .iter()
        .flat_map(|t| [t.state.as_str(), t.next_state.as_str()])
        .filter(|s| !states.contains(s))
        .map(String::from)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    if !undeclared.is_empty() {
        undeclared.sort();
        return Err(AnalysisError::UndeclaredStates(undeclared));
    }

    Ok(())
}

fn check_start_transitions(description: &MachineDescription) -> Result<(), AnalysisError> {
    if !description
        .transitions
        .iter()
        .any(|t| t.state == description.start)
    {
        return Err(AnalysisError::NoStartTransitions(description.start.clone()));
    }

    Ok(())
}

/// Checks whether transitions write symbols that wildcard rules will never match.
///
/// Wildcards only expand over the input symbols and the blank, so a symbol that appears
/// solely through writes is invisible to them. Only relevant when wildcards are used.
fn check_written_symbols(description: &MachineDescription) -> Result<(), AnalysisError> {
    if !description.transitions.iter().any(|t| t.has_wildcard()) {
        return Ok(());
    }

    let alphabet: HashSet<char> = description
        .input
        .chars()
        .chain([BLANK_SYMBOL, WILDCARD_SYMBOL])
        .collect();

    let mut unmatched: Vec<char> = description
        .transitions
        .iter()
        .flat_map(|t| t.write.iter().copied())
        .filter(|c| !alphabet.contains(c))
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    if !unmatched.is_empty() {
        unmatched.sort_unstable();
        return Err(AnalysisError::UnmatchedSymbols(unmatched));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn description(text: &str) -> MachineDescription {
        parse(text).unwrap()
    }

    #[test]
    fn test_valid_description() {
        let d = description("m,1\nab\nq0,q1\nq0\nq1\nq0,a,q0,a,R\nq0,b,q0,b,R\nq0,_,q1,_,S");
        assert!(analyze(&d).is_ok());
        assert!(findings(&d).is_empty());
    }

    #[test]
    fn test_undeclared_start_state() {
        let d = description("m,1\na\nq1\nq0\nq1\nq0,a,q1,a,R");
        assert_eq!(
            findings(&d)[0],
            AnalysisError::UndeclaredStartState("q0".into())
        );

        let error = analyze(&d).unwrap_err();
        assert!(matches!(error, KTapeError::ValidationError(_)));
        assert!(error.to_string().contains("Start state is not declared: q0"));
    }

    #[test]
    fn test_undeclared_accept_states() {
        let d = description("m,1\na\nq0\nq0\nyes,no\nq0,a,q0,a,R");
        assert!(findings(&d).contains(&AnalysisError::UndeclaredAcceptStates(vec![
            "yes".into(),
            "no".into()
        ])));
    }

    #[test]
    fn test_undeclared_transition_states() {
        let d = description("m,1\na\nq0\nq0\nq0\nq0,a,q2,a,R\nq1,a,q0,a,R");
        assert!(findings(&d).contains(&AnalysisError::UndeclaredStates(vec![
            "q1".into(),
            "q2".into()
        ])));
    }

    #[test]
    fn test_no_start_transitions() {
        let d = description("m,1\na\nq0,q1\nq0\nq1\nq1,a,q1,a,R");
        assert_eq!(
            findings(&d),
            vec![AnalysisError::NoStartTransitions("q0".into())]
        );
    }

    #[test]
    fn test_inconsistent_arity() {
        let mut d = description("m,1\na\nq0\nq0\nq0\nq0,a,q0,a,R");
        d.transitions[0].write.push('b');
        assert_eq!(
            findings(&d),
            vec![AnalysisError::InconsistentArity("q0".into())]
        );
    }

    #[test]
    fn test_written_symbols_outside_wildcard_alphabet() {
        let d = description("m,2\nab\nq\nq\nq\nq,*,_,q,*,x,R,R");
        assert_eq!(
            findings(&d),
            vec![AnalysisError::UnmatchedSymbols(vec!['x'])]
        );

        // Without wildcards the check does not apply.
        let d = description("m,2\nab\nq\nq\nq\nq,a,_,q,a,x,R,R");
        assert!(findings(&d).is_empty());
    }
}
