//! This module defines the `Tape` struct: one bidirectionally infinite tape backed by a
//! vector that grows by a single blank cell whenever the head steps past either end.

use crate::types::{Direction, TapeSnapshot, BLANK_SYMBOL};

/// A single tape with its read/write head.
///
/// The head index always points at a valid cell, so reads and writes never fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: Vec<char>,
    head: usize,
}

impl Tape {
    /// Creates a tape holding `input`, with the head on the first cell.
    /// An empty input yields a single blank cell.
    pub fn new(input: &str) -> Self {
        let mut cells: Vec<char> = input.chars().collect();
        if cells.is_empty() {
            cells.push(BLANK_SYMBOL);
        }

        Self { cells, head: 0 }
    }

    /// Creates a tape holding a single blank cell.
    pub fn blank() -> Self {
        Self {
            cells: vec![BLANK_SYMBOL],
            head: 0,
        }
    }

    /// Returns the symbol under the head.
    pub fn read(&self) -> char {
        self.cells[self.head]
    }

    /// Overwrites the symbol under the head.
    pub fn write(&mut self, symbol: char) {
        self.cells[self.head] = symbol;
    }

    /// Moves the head one cell, growing the tape when it steps off either end.
    pub fn shift(&mut self, direction: Direction) {
        match self.head.checked_add_signed(direction.offset()) {
            // Stepped off the front; the new cell becomes index 0
            None => self.cells.insert(0, BLANK_SYMBOL),
            Some(head) => {
                self.head = head;
                if self.head >= self.cells.len() {
                    self.cells.push(BLANK_SYMBOL);
                }
            }
        }
    }

    pub fn head(&self) -> usize {
        self.head
    }

    pub fn cells(&self) -> &[char] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always `false`: a tape has at least one cell.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn snapshot(&self) -> TapeSnapshot {
        TapeSnapshot {
            cells: self.cells.clone(),
            head: self.head,
        }
    }
}

impl std::fmt::Display for Tape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let contents: String = self.cells.iter().collect();
        write!(f, "{contents}")
    }
}
