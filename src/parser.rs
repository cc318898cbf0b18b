//! Query text lexer using nom.
//!
//! A sentence is an ordered sequence of whitespace-delimited tokens. Every
//! clause generator works on *windows* of that sequence: the tokens from a
//! trigger word up to (not including) the first exit word.
//!
//! ```text
//! choose loan_amnt from loan where person_age greater 25
//! ─┬──── ─────────  ┬─       ─┬─── ─────────────────────
//!  │                │         │              │
//!  │                │         └── filter window opens
//!  │                └── exit for the selection window
//!  └── selection window opens
//! ```

use nom::{
    bytes::complete::take_till1,
    character::complete::{char, digit1, multispace0},
    combinator::{all_consuming, opt, recognize},
    multi::many0,
    sequence::{pair, preceded, tuple},
    IResult,
};

use crate::ast::Value;

/// One whitespace-delimited token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Position in the token sequence.
    pub index: usize,
    /// Text with trailing punctuation removed; matched against schema names.
    pub text: String,
    /// Lowercased text; matched against keyword vocabularies.
    pub lower: String,
    /// Parsed literal when the whole token is a number.
    pub number: Option<Value>,
}

impl Token {
    fn new(raw: &str) -> Self {
        let text = raw
            .trim_matches(|c: char| c == '"' || c == '\'' || c == '`')
            .trim_end_matches(|c: char| matches!(c, ',' | ';' | ':' | '!' | '?' | '.'))
            .to_string();
        let lower = text.to_lowercase();
        let number = parse_number(&text);
        Self {
            index: 0,
            text,
            lower,
            number,
        }
    }

    /// True when every character is alphabetic.
    pub fn is_alphabetic(&self) -> bool {
        !self.text.is_empty() && self.text.chars().all(|c| c.is_alphabetic())
    }
}

/// A tokenized sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryText {
    raw: String,
    tokens: Vec<Token>,
}

impl QueryText {
    pub fn parse(input: &str) -> Self {
        let raw = input.trim().to_string();
        let words = match split_words(&raw) {
            Ok((_, words)) => words,
            Err(_) => raw.split_whitespace().collect(),
        };
        let tokens = words
            .into_iter()
            .map(Token::new)
            .filter(|t| !t.text.is_empty())
            .enumerate()
            .map(|(i, mut t)| {
                t.index = i;
                t
            })
            .collect();
        Self { raw, tokens }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Index of the first token satisfying `pred`.
    pub fn position(&self, pred: impl Fn(&Token) -> bool) -> Option<usize> {
        self.tokens.iter().position(pred)
    }

    pub fn any(&self, pred: impl Fn(&Token) -> bool) -> bool {
        self.tokens.iter().any(pred)
    }

    /// Tokens from `start` up to, not including, the first later token that
    /// satisfies `is_exit`. The token at `start` itself is never an exit.
    pub fn window(&self, start: usize, is_exit: impl Fn(&Token) -> bool) -> &[Token] {
        if start >= self.tokens.len() {
            return &[];
        }
        let end = self.tokens[start + 1..]
            .iter()
            .position(is_exit)
            .map(|offset| start + 1 + offset)
            .unwrap_or(self.tokens.len());
        &self.tokens[start..end]
    }
}

/// Split input into whitespace-delimited words.
fn split_words(input: &str) -> IResult<&str, Vec<&str>> {
    let (input, words) = many0(preceded(multispace0, take_till1(|c: char| c.is_whitespace())))(input)?;
    let (input, _) = multispace0(input)?;
    Ok((input, words))
}

/// Parse a whole token as a number (integer or float).
fn parse_number(text: &str) -> Option<Value> {
    let number: IResult<&str, &str> = all_consuming(recognize(tuple((
        opt(char('-')),
        digit1,
        opt(pair(char('.'), digit1)),
    ))))(text);

    let (_, num_str) = number.ok()?;
    if num_str.contains('.') {
        num_str.parse().ok().map(Value::Float)
    } else {
        num_str.parse().ok().map(Value::Int)
    }
}
