//! Built-in operation libraries.
//!
//! Every operation here is pure: its output depends only on its arguments
//! and the input. Operations that take "a value" use their first argument,
//! or the input when the node has no children.

// Index and count conversions are bounded by string lengths
#![allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]

use crate::error::OperationError;
use crate::gp::{Operation, OperationLibrary};
use std::cmp::Ordering;

/// The first argument, or the input if there are none.
fn pick<'a>(args: &'a [String], input: &'a str) -> &'a str {
    args.first().map_or(input, String::as_str)
}

fn arg(args: &[String], index: usize) -> Result<&str, OperationError> {
    args.get(index).map(String::as_str).ok_or(OperationError::MissingArgument {
        expected: index + 1,
        got: args.len(),
    })
}

fn number(s: &str) -> Result<f64, OperationError> {
    s.trim().parse::<f64>().map_err(|_| OperationError::Parse(s.to_owned()))
}

fn integer(s: &str) -> Result<i64, OperationError> {
    s.trim().parse::<i64>().map_err(|_| OperationError::Parse(s.to_owned()))
}

/// Resolve a possibly negative index against a length.
fn char_index(index: i64, len: usize) -> Result<usize, OperationError> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or(OperationError::IndexOutOfRange { index, len })
}

fn binary(name: &'static str, f: fn(f64, f64) -> Result<f64, OperationError>) -> Operation {
    Operation::new(name, move |args, input| {
        let lhs = number(arg(args, 0)?)?;
        let rhs = number(input)?;
        f(lhs, rhs).map(|v| v.to_string())
    })
}

fn unary(name: &'static str, f: fn(f64) -> f64) -> Operation {
    Operation::new(name, move |args, input| Ok(f(number(pick(args, input))?).to_string()))
}

fn predicate(name: &'static str, f: fn(&str, &str) -> bool) -> Operation {
    Operation::infallible(name, move |args, input| f(input, pick(args, input)).to_string())
}

fn shift_chars(input: &str, delta: i32) -> Result<String, OperationError> {
    input
        .chars()
        .map(|c| {
            (c as u32)
                .checked_add_signed(delta)
                .and_then(char::from_u32)
                .ok_or_else(|| OperationError::Other(format!("cannot shift {c:?} by {delta}")))
        })
        .collect()
}

/// The three-operation library `[identity, upper, reverse]`.
#[must_use]
pub fn scenario_library() -> OperationLibrary {
    let ops = vec![
        Operation::infallible("identity", |_, input| input.to_owned()),
        Operation::infallible("upper", |args, input| pick(args, input).to_uppercase()),
        Operation::infallible("reverse", |args, input| pick(args, input).chars().rev().collect()),
    ];
    OperationLibrary::from_nonempty(ops)
}

/// The full built-in library of string and numeric operations.
#[must_use]
pub fn library() -> OperationLibrary {
    let ops = vec![
        Operation::infallible("concat", |args, input| {
            if args.is_empty() { input.to_owned() } else { args.concat() }
        }),
        Operation::infallible("join", |args, input| args.join(input)),
        Operation::infallible("compare", |args, input| match input.cmp(pick(args, input)) {
            Ordering::Less => "-1".to_owned(),
            Ordering::Equal => "0".to_owned(),
            Ordering::Greater => "1".to_owned(),
        }),
        predicate("equals", |input, value| input == value),
        predicate("contains", |input, value| input.contains(value)),
        predicate("contained-in", |input, value| value.contains(input)),
        predicate("starts-with", |input, value| input.starts_with(value)),
        predicate("ends-with", |input, value| input.ends_with(value)),
        Operation::infallible("index-of", |args, input| {
            let needle = pick(args, input);
            input
                .find(needle)
                .map_or(-1, |byte| input[..byte].chars().count() as i64)
                .to_string()
        }),
        Operation::new("replace", |args, input| {
            Ok(input.replace(arg(args, 0)?, arg(args, 1)?))
        }),
        Operation::infallible("input", |_, input| input.to_owned()),
        Operation::infallible("first", |args, input| pick(args, input).to_owned()),
        Operation::infallible("length", |args, input| pick(args, input).chars().count().to_string()),
        Operation::infallible("arg-count", |args, _| args.len().to_string()),
        Operation::new("shift-up", |args, input| shift_chars(pick(args, input), 1)),
        Operation::new("shift-down", |args, input| shift_chars(pick(args, input), -1)),
        Operation::infallible("reverse", |args, input| pick(args, input).chars().rev().collect()),
        Operation::new("rotate", |args, input| {
            let chars: Vec<char> = input.chars().collect();
            if chars.is_empty() {
                return Ok(String::new());
            }
            let by = integer(arg(args, 0)?)?.rem_euclid(chars.len() as i64) as usize;
            Ok(chars[by..].iter().chain(&chars[..by]).collect())
        }),
        Operation::new("initials", |args, _| {
            args.iter()
                .map(|a| a.chars().next().ok_or(OperationError::IndexOutOfRange { index: 0, len: 0 }))
                .collect()
        }),
        Operation::new("char-at", |args, input| {
            let len = input.chars().count();
            let i = char_index(integer(arg(args, 0)?)?, len)?;
            Ok(input.chars().nth(i).map(String::from).unwrap_or_default())
        }),
        Operation::new("remove-at", |args, input| {
            let len = input.chars().count();
            let i = char_index(integer(arg(args, 0)?)?, len)?;
            Ok(input.chars().enumerate().filter(|&(j, _)| j != i).map(|(_, c)| c).collect())
        }),
        Operation::new("repeat-first", |args, input| {
            let c = input.chars().next().ok_or(OperationError::IndexOutOfRange { index: 0, len: 0 })?;
            Ok(std::iter::repeat_n(c, args.len()).collect())
        }),
        Operation::infallible("split-first", |args, input| {
            let separators: Vec<char> = pick(args, input).chars().collect();
            input.split(separators.as_slice()).next().unwrap_or_default().to_owned()
        }),
        Operation::infallible("upper", |args, input| pick(args, input).to_uppercase()),
        Operation::infallible("lower", |args, input| pick(args, input).to_lowercase()),
        Operation::infallible("trim", |args, input| pick(args, input).trim().to_owned()),
        binary("add", |a, b| Ok(a + b)),
        binary("sub", |a, b| Ok(a - b)),
        binary("mul", |a, b| Ok(a * b)),
        binary("div", |a, b| if b == 0.0 { Err(OperationError::DivisionByZero) } else { Ok(a / b) }),
        binary("pow", |a, b| Ok(a.powf(b))),
        unary("cos", f64::cos),
        unary("exp", f64::exp),
        Operation::infallible("e", |_, _| std::f64::consts::E.to_string()),
        Operation::infallible("tau", |_, _| std::f64::consts::TAU.to_string()),
    ];
    OperationLibrary::from_nonempty(ops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gp::{OpRef, ProgramTree};

    fn call(name: &str, args: &[&str], input: &str) -> Result<String, OperationError> {
        let library = library();
        let index = library.position(name).unwrap();
        let args: Vec<String> = args.iter().map(|&a| a.to_owned()).collect();
        library.invoke(OpRef::Library(index), &args, input)
    }

    #[test]
    fn test_library_names_are_unique() {
        let library = library();
        let mut names: Vec<&str> = library.iter().map(Operation::name).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_scenario_library_order() {
        let library = scenario_library();
        assert_eq!(library.len(), 3);
        assert_eq!(library.position("identity"), Some(0));
        assert_eq!(library.position("upper"), Some(1));
        assert_eq!(library.position("reverse"), Some(2));
    }

    #[test]
    fn test_scenario_solution_runs() {
        let tree = ProgramTree::new(OpRef::Library(1), vec![ProgramTree::leaf(OpRef::Library(2))]);
        assert_eq!(tree.run("ab", &scenario_library()).unwrap(), "BA");
    }

    #[test]
    fn test_string_operations() {
        assert_eq!(call("concat", &[], "x").unwrap(), "x");
        assert_eq!(call("concat", &["a", "b"], "x").unwrap(), "ab");
        assert_eq!(call("join", &["a", "b"], "-").unwrap(), "a-b");
        assert_eq!(call("index-of", &["é"], "héé").unwrap(), "1");
        assert_eq!(call("index-of", &["z"], "abc").unwrap(), "-1");
        assert_eq!(call("rotate", &["1"], "abc").unwrap(), "bca");
        assert_eq!(call("rotate", &["-1"], "abc").unwrap(), "cab");
        assert_eq!(call("initials", &["ab", "cd"], "").unwrap(), "ac");
        assert_eq!(call("remove-at", &["1"], "abc").unwrap(), "ac");
        assert_eq!(call("repeat-first", &["", ""], "xyz").unwrap(), "xx");
        assert_eq!(call("split-first", &[","], "a,b").unwrap(), "a");
        assert_eq!(call("shift-up", &[], "ab").unwrap(), "bc");
        assert_eq!(call("compare", &["b"], "a").unwrap(), "-1");
        assert_eq!(call("contains", &["b"], "abc").unwrap(), "true");
    }

    #[test]
    fn test_declared_failures() {
        assert_eq!(call("div", &["1"], "0"), Err(OperationError::DivisionByZero));
        assert_eq!(call("add", &["x"], "1"), Err(OperationError::Parse("x".to_owned())));
        assert_eq!(
            call("char-at", &["5"], "abc"),
            Err(OperationError::IndexOutOfRange { index: 5, len: 3 })
        );
        assert_eq!(
            call("replace", &["a"], "abc"),
            Err(OperationError::MissingArgument { expected: 2, got: 1 })
        );
        assert!(call("shift-down", &[], "\0").is_err());
        assert!(call("initials", &[""], "x").is_err());
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(call("add", &["2"], "3").unwrap(), "5");
        assert_eq!(call("sub", &["2"], "3").unwrap(), "-1");
        assert_eq!(call("mul", &["2"], " 3 ").unwrap(), "6");
        assert_eq!(call("div", &["3"], "2").unwrap(), "1.5");
    }
}
