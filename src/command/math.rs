//! Spoken arithmetic: "what is 12 times (3 plus 4)"

use nom::branch::alt;
use nom::character::complete::{char, digit1, multispace0, one_of};
use nom::combinator::{all_consuming, map_res, opt, recognize};
use nom::multi::many0;
use nom::sequence::{delimited, pair, preceded};
use nom::{IResult, Parser};

use crate::core::error::{HeraldError, Result};

const LEADING_PHRASES: [&str; 7] = [
    "what is",
    "what's",
    "whats",
    "how much is",
    "calculate",
    "compute",
    "evaluate",
];

/// Deepest parenthesis and unary minus nesting the parser will descend into
const MAX_NESTING: usize = 64;

/// Word operators in match order; longer phrases first
const WORD_OPERATORS: [(&str, &str); 7] = [
    ("multiplied by", "*"),
    ("divided by", "/"),
    ("plus", "+"),
    ("minus", "-"),
    ("times", "*"),
    ("over", "/"),
    ("x", "*"),
];

/// Digits plus at least one operator symbol or operator word
pub fn looks_like_math(text: &str) -> bool {
    let lower = text.to_lowercase();
    if !lower.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }
    if lower.chars().any(|c| matches!(c, '+' | '*' | '/')) || lower.contains(" - ") {
        return true;
    }
    lower.split_whitespace().any(|word| {
        matches!(
            word,
            "plus" | "minus" | "times" | "multiplied" | "divided" | "over" | "x"
        )
    })
}

/// Strip the question wording and turn operator words into symbols
fn prepare(text: &str) -> String {
    let mut cleaned = text
        .trim()
        .trim_end_matches(|c: char| matches!(c, '?' | '.' | '!'))
        .to_lowercase();
    for phrase in LEADING_PHRASES {
        if let Some(rest) = cleaned.strip_prefix(phrase) {
            cleaned = rest.to_string();
            break;
        }
    }
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    let mut out: Vec<&str> = Vec::with_capacity(words.len());
    let mut i = 0;
    while i < words.len() {
        let two = words.get(i + 1).map(|next| format!("{} {}", words[i], next));
        if let Some(op) = two
            .as_deref()
            .and_then(|phrase| WORD_OPERATORS.iter().find(|(w, _)| *w == phrase))
        {
            out.push(op.1);
            i += 2;
            continue;
        }
        match WORD_OPERATORS.iter().find(|(w, _)| *w == words[i]) {
            Some((_, op)) => out.push(*op),
            None => out.push(words[i]),
        }
        i += 1;
    }
    out.join(" ")
}

fn number(input: &str) -> IResult<&str, f64> {
    map_res(recognize(pair(digit1, opt(pair(char('.'), digit1)))), str::parse::<f64>).parse(input)
}

fn factor(input: &str) -> IResult<&str, f64> {
    delimited(
        multispace0,
        alt((
            number,
            delimited(char('('), expr, char(')')),
            preceded(char('-'), factor).map(|v| -v),
        )),
        multispace0,
    )
    .parse(input)
}

fn term(input: &str) -> IResult<&str, f64> {
    let (input, first) = factor(input)?;
    let (input, rest) = many0(pair(one_of("*/"), factor)).parse(input)?;
    let value = rest.into_iter().fold(first, |acc, (op, v)| match op {
        '*' => acc * v,
        _ => acc / v,
    });
    Ok((input, value))
}

fn expr(input: &str) -> IResult<&str, f64> {
    let (input, first) = term(input)?;
    let (input, rest) = many0(pair(one_of("+-"), term)).parse(input)?;
    let value = rest.into_iter().fold(first, |acc, (op, v)| match op {
        '+' => acc + v,
        _ => acc - v,
    });
    Ok((input, value))
}

/// Deepest combined nesting of open parentheses and pending unary minus signs
fn nesting_depth(expr: &str) -> usize {
    // unary minus count per open parenthesis level
    let mut pending: Vec<usize> = vec![0];
    let mut previous: Option<char> = None;
    let mut deepest = 0;

    for c in expr.chars().filter(|c| !c.is_whitespace()) {
        match c {
            '(' => pending.push(0),
            ')' => {
                if pending.len() > 1 {
                    pending.pop();
                }
                if let Some(level) = pending.last_mut() {
                    *level = 0;
                }
            }
            '-' if matches!(previous, None | Some('(' | '+' | '-' | '*' | '/')) => {
                if let Some(level) = pending.last_mut() {
                    *level += 1;
                }
            }
            c if c.is_ascii_digit() => {
                if let Some(level) = pending.last_mut() {
                    *level = 0;
                }
            }
            _ => {}
        }
        let depth = pending.len() - 1 + pending.iter().sum::<usize>();
        deepest = deepest.max(depth);
        previous = Some(c);
    }
    deepest
}

/// Evaluate spoken arithmetic, returning the cleaned expression and its value
pub fn evaluate(text: &str) -> Result<(String, f64)> {
    let prepared = prepare(text);
    if nesting_depth(&prepared) > MAX_NESTING {
        return Err(HeraldError::Parse(
            "That expression is nested too deeply for me to evaluate.".into(),
        ));
    }
    let (_, value) = all_consuming(expr).parse(prepared.as_str()).map_err(|_| {
        HeraldError::Parse(format!(
            "I couldn't evaluate '{}'. Try something like 'what is 12 times 4'.",
            prepared
        ))
    })?;
    if !value.is_finite() {
        return Err(HeraldError::Parse("Cannot divide by zero.".into()));
    }
    Ok((prepared, value))
}

/// Whole numbers without a decimal point, others to at most 4 places
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    let text = format!("{:.4}", value);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}
