//! This module provides the parser for k-tape machine descriptions, utilizing the `pest` crate.
//! A description is a comma separated table: five header records followed by one record per
//! transition rule.
//!
//! ```text
//! name, k
//! input
//! q0, q1, ..., qn
//! start
//! accept1, accept2, ...
//! state, read_1..read_k, next_state, write_1..write_k, move_1..move_k
//! ```

use crate::types::{Direction, KTapeError, MachineDescription, Mode, RawTransition, MAX_TAPES};
use pest::{
    error::{Error, ErrorVariant},
    iterators::Pair,
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;

/// Derives a `PestParser` for the description grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct DescriptionParser;

/// A single field of a record, with its position in the source for error reporting.
struct Field<'i> {
    text: String,
    span: Span<'i>,
}

/// A line of the description.
struct Record<'i> {
    fields: Vec<Field<'i>>,
    span: Span<'i>,
}

impl Record<'_> {
    /// A blank line parses as a single empty field.
    fn is_empty(&self) -> bool {
        self.fields.iter().all(|f| f.text.is_empty())
    }

    /// The non-empty fields, used for the state and accept lists.
    fn names(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| !f.text.is_empty())
            .map(|f| f.text.clone())
            .collect()
    }

    fn first(&self) -> &str {
        self.fields.first().map_or("", |f| f.text.as_str())
    }
}

/// Parses the given input string into a `MachineDescription`.
///
/// This is the main entry point for parsing machine descriptions. Transitions are returned
/// in file order, with wildcards left unexpanded.
///
/// # Returns
///
/// * `Ok(MachineDescription)` if the input is a well-formed description.
/// * `Err(KTapeError::ParseError)` if there are syntax errors or invalid fields.
/// * `Err(KTapeError::ValidationError)` if a header record is missing.
/// * `Err(KTapeError::MalformedRule)` if a transition has the wrong number of fields.
pub fn parse(input: &str) -> Result<MachineDescription, KTapeError> {
    let root = DescriptionParser::parse(Rule::description, input)
        .map_err(|e| KTapeError::ParseError(Box::new(e)))?
        .next()
        .ok_or_else(|| KTapeError::ValidationError("Empty description".to_string()))?;

    let mut records = root
        .into_inner()
        .filter(|p| p.as_rule() == Rule::record)
        .map(parse_record);

    let header = check_required_record(records.next(), "name")?;
    let (name, tapes) = parse_header(&header)?;
    let input = check_required_record(records.next(), "input")?
        .first()
        .to_string();
    let states = check_required_record(records.next(), "states")?.names();
    let start_record = check_required_record(records.next(), "start")?;
    let start = start_record.first().to_string();
    if start.is_empty() {
        return Err(parse_error("Missing start state", start_record.span));
    }
    let accept = check_required_record(records.next(), "accept")?.names();

    let transitions = records
        .filter(|record| !record.is_empty())
        .map(|record| parse_transition(&record, tapes))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MachineDescription {
        name,
        tapes,
        input,
        states,
        start,
        accept,
        mode: Mode::default(),
        transitions,
    })
}

fn parse_record(pair: Pair<Rule>) -> Record {
    let span = pair.as_span();
    let fields = pair
        .into_inner()
        .filter(|p| p.as_rule() == Rule::field)
        .map(parse_field)
        .collect();

    Record { fields, span }
}

/// Unquoted fields are trimmed; quoted fields are kept verbatim apart from `""` escapes.
fn parse_field(pair: Pair<Rule>) -> Field {
    let span = pair.as_span();
    let text = match pair.into_inner().next() {
        Some(inner) if inner.as_rule() == Rule::quoted => inner
            .into_inner()
            .next()
            .map_or(String::new(), |p| p.as_str().replace("\"\"", "\"")),
        Some(inner) => inner.as_str().trim().to_string(),
        None => String::new(),
    };

    Field { text, span }
}

/// Parses the `name, k` record.
fn parse_header(record: &Record) -> Result<(String, usize), KTapeError> {
    let name = record.first().to_string();
    let count = record
        .fields
        .get(1)
        .ok_or_else(|| parse_error("Missing tape count", record.span))?;

    let tapes = count
        .text
        .parse::<usize>()
        .map_err(|_| parse_error(&format!("Invalid tape count: {}", count.text), count.span))?;

    if tapes == 0 {
        return Err(parse_error("Tape count must be at least 1", count.span));
    }

    if tapes > MAX_TAPES {
        return Err(parse_error(
            &format!("Tape count must be at most {MAX_TAPES}"),
            count.span,
        ));
    }

    Ok((name, tapes))
}

/// Parses a transition record with `3k + 2` fields.
fn parse_transition(record: &Record, tapes: usize) -> Result<RawTransition, KTapeError> {
    let fields = &record.fields;
    let expected = tapes
        .checked_mul(3)
        .and_then(|n| n.checked_add(2))
        .ok_or_else(|| parse_error("Tape count is too large", record.span))?;

    if fields.len() != expected {
        return Err(KTapeError::MalformedRule {
            state: record.first().to_string(),
            field: "record",
            expected,
            found: fields.len(),
        });
    }

    let read = fields[1..=tapes]
        .iter()
        .map(parse_symbol)
        .collect::<Result<Vec<_>, _>>()?;
    let write = fields[tapes + 2..2 * tapes + 2]
        .iter()
        .map(parse_symbol)
        .collect::<Result<Vec<_>, _>>()?;
    let directions = fields[2 * tapes + 2..]
        .iter()
        .map(parse_direction)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RawTransition {
        state: fields[0].text.clone(),
        read,
        next_state: fields[tapes + 1].text.clone(),
        write,
        directions,
    })
}

/// Parses a tape symbol, which must be exactly one character.
fn parse_symbol(field: &Field) -> Result<char, KTapeError> {
    let mut chars = field.text.chars();
    match (chars.next(), chars.next()) {
        (Some(symbol), None) => Ok(symbol),
        _ => Err(parse_error(
            &format!("Symbol must be a single character: '{}'", field.text),
            field.span,
        )),
    }
}

/// Parses a movement code: `L`, `R` or `S`.
fn parse_direction(field: &Field) -> Result<Direction, KTapeError> {
    Direction::from_code(&field.text).ok_or_else(|| {
        parse_error(
            &format!("Unsupported direction: {}", field.text),
            field.span,
        )
    })
}

/// Creates a `KTapeError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> KTapeError {
    KTapeError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

/// Checks if a required header record is present, returning an `Err` if it's missing.
fn check_required_record<T>(value: Option<T>, name: &str) -> Result<T, KTapeError> {
    value.ok_or_else(|| KTapeError::ValidationError(format!("Missing '{name}' record")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BLANK_SYMBOL;

    const AB_MACHINE: &str = include_str!("../demos/ends-with-b.csv");

    #[test]
    fn test_parse_simple_description() {
        let description = parse("ab,1\nab\nq0,q1,qaccept\nq0\nqaccept\nq0,a,q0,a,R\n").unwrap();

        assert_eq!(description.name, "ab");
        assert_eq!(description.tapes, 1);
        assert_eq!(description.input, "ab");
        assert_eq!(description.states, vec!["q0", "q1", "qaccept"]);
        assert_eq!(description.start, "q0");
        assert_eq!(description.accept, vec!["qaccept"]);
        assert_eq!(
            description.transitions,
            vec![RawTransition {
                state: "q0".into(),
                read: vec!['a'],
                next_state: "q0".into(),
                write: vec!['a'],
                directions: vec![Direction::Right],
            }]
        );
    }

    #[test]
    fn test_parse_demo_file() {
        let description = parse(AB_MACHINE).unwrap();
        assert_eq!(description.name, "Ends with b");
        assert_eq!(description.input, "aab");
        assert_eq!(description.transitions.len(), 5);
        assert_eq!(description.transitions[4].read, vec![BLANK_SYMBOL]);
    }

    #[test]
    fn test_parse_multi_tape_transition() {
        let input = "copy,2\nab\ncopy,done\ncopy\ndone\ncopy,*,_,copy,*,*,R,R\ncopy,_,_,done,_,_,S,L";
        let description = parse(input).unwrap();

        let transition = &description.transitions[0];
        assert_eq!(transition.read, vec!['*', '_']);
        assert_eq!(transition.write, vec!['*', '*']);
        assert_eq!(
            transition.directions,
            vec![Direction::Right, Direction::Right]
        );
        assert_eq!(description.transitions[1].next_state, "done");
    }

    #[test]
    fn test_parse_keeps_file_order() {
        let input = "m,1\na\nq\nq\nq\nq,*,q,*,R\nq,a,q,b,S\n";
        let description = parse(input).unwrap();
        assert_eq!(description.transitions[0].read, vec!['*']);
        assert_eq!(description.transitions[1].read, vec!['a']);
    }

    #[test]
    fn test_parse_trims_and_unquotes_fields() {
        let input = "\"Quoted, name\", 1\n  ab  \n q0 , q1 \nq0\nq1\nq0, \",\", q1, \"\"\"\", S\r\n";
        let description = parse(input).unwrap();

        assert_eq!(description.name, "Quoted, name");
        assert_eq!(description.input, "ab");
        assert_eq!(description.states, vec!["q0", "q1"]);
        assert_eq!(description.transitions[0].read, vec![',']);
        assert_eq!(description.transitions[0].write, vec!['"']);
    }

    #[test]
    fn test_parse_empty_input_and_accept() {
        let description = parse("m,1\n\nq\nq\n\nq,_,q,_,S").unwrap();
        assert_eq!(description.input, "");
        assert!(description.accept.is_empty());
        assert_eq!(description.transitions.len(), 1);
    }

    #[test]
    fn test_parse_skips_blank_transition_lines() {
        let description = parse("m,1\na\nq\nq\nq\n\nq,a,q,a,R\n\n").unwrap();
        assert_eq!(description.transitions.len(), 1);
    }

    #[test]
    fn test_parse_missing_header_record() {
        let error = parse("m,1\na\nq").unwrap_err();
        assert!(matches!(error, KTapeError::ValidationError(_)));
        assert_eq!(
            error.to_string(),
            "Description validation error: Missing 'start' record"
        );
    }

    #[test]
    fn test_parse_invalid_tape_count() {
        let error = parse("m,two\na\nq\nq\nq").unwrap_err();
        assert!(matches!(error, KTapeError::ParseError(_)));
        assert!(error.to_string().contains("Invalid tape count: two"));

        let error = parse("m,0\na\nq\nq\nq").unwrap_err();
        assert!(error.to_string().contains("Tape count must be at least 1"));

        let error = parse("m\na\nq\nq\nq").unwrap_err();
        assert!(error.to_string().contains("Missing tape count"));
    }

    #[test]
    fn test_parse_tape_count_above_limit() {
        let error = parse("m,18446744073709551615\na\nq\nq\nq\nq,a,q,a,R").unwrap_err();
        assert!(matches!(error, KTapeError::ParseError(_)));
        assert!(error.to_string().contains("Tape count must be at most"));

        let error = parse(&format!("m,{}\na\nq\nq\nq\n", MAX_TAPES + 1)).unwrap_err();
        assert!(error.to_string().contains("Tape count must be at most"));

        assert!(parse(&format!("m,{}\na\nq\nq\nq\n", MAX_TAPES)).is_ok());
    }

    #[test]
    fn test_transition_field_count_does_not_overflow() {
        let record = Record {
            fields: Vec::new(),
            span: Span::new("q", 0, 1).unwrap(),
        };

        let error = parse_transition(&record, usize::MAX).unwrap_err();
        assert!(error.to_string().contains("Tape count is too large"));
    }

    #[test]
    fn test_parse_wrong_field_count() {
        let error = parse("m,2\na\nq\nq\nq\nq,a,_,q,a,R,R").unwrap_err();
        assert_eq!(
            error,
            KTapeError::MalformedRule {
                state: "q".into(),
                field: "record",
                expected: 8,
                found: 7,
            }
        );
    }

    #[test]
    fn test_parse_unsupported_direction() {
        let error = parse("m,1\na\nq\nq\nq\nq,a,q,a,X").unwrap_err();
        assert!(matches!(error, KTapeError::ParseError(_)));
        assert!(error.to_string().contains("Unsupported direction: X"));
    }

    #[test]
    fn test_parse_multi_character_symbol() {
        let error = parse("m,1\na\nq\nq\nq\nq,ab,q,a,R").unwrap_err();
        assert!(error
            .to_string()
            .contains("Symbol must be a single character: 'ab'"));
    }

    #[test]
    fn test_parse_unterminated_quote() {
        let error = parse("\"m,1\na\nq\nq\nq").unwrap_err();
        assert!(matches!(error, KTapeError::ParseError(_)));
    }

    #[test]
    fn test_parse_missing_start_state() {
        let error = parse("m,1\na\nq\n\nq").unwrap_err();
        assert!(error.to_string().contains("Missing start state"));
    }
}
