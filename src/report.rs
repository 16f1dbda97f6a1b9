//! Human-readable trace text for machine runs. Everything here returns strings; printing is
//! left to the caller.

use crate::machine::Machine;
use crate::tape::Tape;
use crate::types::{Step, Verdict};

const SEPARATOR: &str = "------------------";

/// The banner printed before a run.
pub fn header(machine: &Machine) -> String {
    format!(
        "Machine Name: {}\nInput String: {}\nStart State : {}",
        machine.name(),
        machine.input(),
        machine.start()
    )
}

/// One traced step: its index, the state it led to, and every tape with a caret under the head.
pub fn step(step: &Step, machine: &Machine) -> String {
    let mut lines = vec![
        SEPARATOR.to_string(),
        format!("Step {}", step.index),
        format!("Next State: {}", step.next_state),
    ];

    for (i, tape) in machine.tapes().iter().enumerate() {
        lines.push(format!("Tape {}: {}", i, cells(tape)));
        lines.push(format!("        {}", pointer(tape)));
    }

    lines.join("\n")
}

/// The closing lines of a run.
pub fn verdict(verdict: &Verdict, input: &str) -> String {
    match verdict {
        Verdict::Accept => format!("{SEPARATOR}\n{input} is Accepted."),
        Verdict::Reject => format!("{SEPARATOR}\n{input} is NOT Accepted."),
        Verdict::RejectedByMissingTransition { state, symbols } => format!(
            "{SEPARATOR}\nTransition ({}, ({})) does not exist.\n{input} is NOT Accepted.",
            state,
            join(symbols.iter().copied())
        ),
    }
}

fn cells(tape: &Tape) -> String {
    join(tape.cells().iter().copied())
}

fn pointer(tape: &Tape) -> String {
    join((0..tape.len()).map(|i| if i == tape.head() { '^' } else { ' ' }))
}

fn join(symbols: impl Iterator<Item = char>) -> String {
    symbols
        .map(String::from)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, RawTransition};

    fn machine() -> Machine {
        let mut machine = Machine::new("Two", 2, "ab", ["q0", "q1"], "q0", ["q1"]).unwrap();
        machine
            .register(&RawTransition {
                state: "q0".into(),
                read: vec!['a', '_'],
                next_state: "q1".into(),
                write: vec!['x', 'y'],
                directions: vec![Direction::Right, Direction::Left],
            })
            .unwrap();
        machine
    }

    #[test]
    fn test_header() {
        assert_eq!(
            header(&machine()),
            "Machine Name: Two\nInput String: ab\nStart State : q0"
        );
    }

    #[test]
    fn test_step_shows_every_tape() {
        let mut machine = machine();
        let taken = machine.step().unwrap();

        assert_eq!(
            step(&taken, &machine),
            [
                "------------------",
                "Step 1",
                "Next State: q1",
                "Tape 0: x b",
                "          ^",
                "Tape 1: _ y",
                "        ^  ",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_verdicts() {
        assert_eq!(
            verdict(&Verdict::Accept, "ab"),
            "------------------\nab is Accepted."
        );
        assert_eq!(
            verdict(&Verdict::Reject, "ab"),
            "------------------\nab is NOT Accepted."
        );
        assert_eq!(
            verdict(
                &Verdict::RejectedByMissingTransition {
                    state: "q1".into(),
                    symbols: vec!['_', 'a'],
                },
                "ab"
            ),
            "------------------\nTransition (q1, (_ a)) does not exist.\nab is NOT Accepted."
        );
    }
}
