//! Query-string syntax check.
//!
//! Recursive-descent recognizer for the classic Lucene query-string
//! grammar: terms, phrases, field prefixes, groups, ranges, boosts, fuzzy
//! and proximity suffixes, prefix modifiers, boolean operators, regular
//! expressions and backslash escapes. It only answers whether the index
//! would accept the string; no query tree is built.

use thiserror::Error;

/// Why a query string is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("query is empty")]
    Empty,

    #[error("unexpected end of query")]
    UnexpectedEnd,

    #[error("unexpected '{token}' at position {position}")]
    Unexpected { token: String, position: usize },

    #[error("unterminated {what} starting at position {position}")]
    Unterminated { what: &'static str, position: usize },

    #[error("boost at position {position} is not followed by a number")]
    InvalidBoost { position: usize },

    #[error("query ends with an escape character")]
    TrailingEscape,

    #[error("empty group at position {position}")]
    EmptyGroup { position: usize },

    #[error("operator at position {position} has no operand")]
    DanglingOperator { position: usize },
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Term(String),
    Phrase,
    Regex,
    LParen,
    RParen,
    RangeOpen,
    RangeClose,
    Colon,
    Boost,
    Fuzzy,
    Plus,
    Minus,
    Not,
    And,
    Or,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Term(t) => t.clone(),
            Token::Phrase => "\"".to_string(),
            Token::Regex => "/".to_string(),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
            Token::RangeOpen => "[".to_string(),
            Token::RangeClose => "]".to_string(),
            Token::Colon => ":".to_string(),
            Token::Boost => "^".to_string(),
            Token::Fuzzy => "~".to_string(),
            Token::Plus => "+".to_string(),
            Token::Minus => "-".to_string(),
            Token::Not => "NOT".to_string(),
            Token::And => "AND".to_string(),
            Token::Or => "OR".to_string(),
        }
    }
}

/// Characters that cannot start a term.
fn is_special(c: char) -> bool {
    matches!(
        c,
        '+' | '-' | '!' | '(' | ')' | ':' | '^' | '[' | ']' | '"' | '{' | '}' | '~' | '/'
    )
}

/// Characters that end a term (`+` and `-` may appear inside one).
fn ends_term(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            '!' | '(' | ')' | ':' | '^' | '[' | ']' | '"' | '{' | '}' | '~' | '/'
        )
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, SyntaxError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let start = i;

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let token = match c {
            '(' => {
                i += 1;
                Token::LParen
            }
            ')' => {
                i += 1;
                Token::RParen
            }
            '[' | '{' => {
                i += 1;
                Token::RangeOpen
            }
            ']' | '}' => {
                i += 1;
                Token::RangeClose
            }
            ':' => {
                i += 1;
                Token::Colon
            }
            '+' => {
                i += 1;
                Token::Plus
            }
            '-' => {
                i += 1;
                Token::Minus
            }
            '!' => {
                i += 1;
                Token::Not
            }
            '&' if chars.get(i + 1) == Some(&'&') => {
                i += 2;
                Token::And
            }
            '|' if chars.get(i + 1) == Some(&'|') => {
                i += 2;
                Token::Or
            }
            '^' => {
                i += 1;
                let digits = number_len(&chars[i..]);
                if digits == 0 {
                    return Err(SyntaxError::InvalidBoost { position: start });
                }
                i += digits;
                Token::Boost
            }
            '~' => {
                i += 1;
                i += number_len(&chars[i..]);
                Token::Fuzzy
            }
            '"' => {
                i = delimited(&chars, i, '"').ok_or(SyntaxError::Unterminated {
                    what: "phrase",
                    position: start,
                })?;
                Token::Phrase
            }
            '/' => {
                i = delimited(&chars, i, '/').ok_or(SyntaxError::Unterminated {
                    what: "regular expression",
                    position: start,
                })?;
                Token::Regex
            }
            _ => {
                let mut term = String::new();
                while i < chars.len() {
                    let ch = chars[i];
                    if ch == '\\' {
                        let escaped = chars.get(i + 1).ok_or(SyntaxError::TrailingEscape)?;
                        term.push(*escaped);
                        i += 2;
                        continue;
                    }
                    if ends_term(ch) || (term.is_empty() && is_special(ch)) {
                        break;
                    }
                    term.push(ch);
                    i += 1;
                }
                match term.as_str() {
                    "AND" => Token::And,
                    "OR" => Token::Or,
                    "NOT" => Token::Not,
                    _ => Token::Term(term),
                }
            }
        };
        tokens.push((token, start));
    }

    Ok(tokens)
}

/// Length of a leading decimal number (`2`, `0.5`).
fn number_len(chars: &[char]) -> usize {
    let mut len = 0;
    let mut seen_dot = false;
    for &c in chars {
        match c {
            '0'..='9' => len += 1,
            '.' if !seen_dot => {
                seen_dot = true;
                len += 1;
            }
            _ => break,
        }
    }
    // A lone dot is not a number
    if len == 1 && seen_dot {
        0
    } else {
        len
    }
}

/// Index just past the closing delimiter, honouring backslash escapes.
fn delimited(chars: &[char], open: usize, delimiter: char) -> Option<usize> {
    let mut i = open + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            c if c == delimiter => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset).map(|(t, _)| t)
    }

    fn position(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|(_, p)| *p)
            .or_else(|| self.tokens.last().map(|(_, p)| *p))
            .unwrap_or(0)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        self.pos += 1;
        token
    }

    fn unexpected(&self) -> SyntaxError {
        match self.tokens.get(self.pos) {
            Some((token, position)) => SyntaxError::Unexpected {
                token: token.describe(),
                position: *position,
            },
            None => SyntaxError::UnexpectedEnd,
        }
    }

    fn at_group_end(&self, in_group: bool) -> bool {
        match self.peek() {
            None => true,
            Some(Token::RParen) => in_group,
            _ => false,
        }
    }

    fn query(&mut self, in_group: bool) -> Result<usize, SyntaxError> {
        let mut clauses = 0;

        while !self.at_group_end(in_group) {
            if matches!(self.peek(), Some(Token::RParen)) {
                return Err(self.unexpected());
            }
            if matches!(self.peek(), Some(Token::And | Token::Or)) {
                let position = self.position();
                if clauses == 0 {
                    return Err(SyntaxError::DanglingOperator { position });
                }
                self.advance();
                if self.at_group_end(in_group) {
                    return Err(SyntaxError::DanglingOperator { position });
                }
            }
            if matches!(self.peek(), Some(Token::Plus | Token::Minus | Token::Not)) {
                let position = self.position();
                self.advance();
                if self.at_group_end(in_group) {
                    return Err(SyntaxError::DanglingOperator { position });
                }
            }
            self.clause()?;
            clauses += 1;
        }

        Ok(clauses)
    }

    fn clause(&mut self) -> Result<(), SyntaxError> {
        if matches!(self.peek(), Some(Token::Term(_))) && self.peek_at(1) == Some(&Token::Colon) {
            self.pos += 2;
        }

        let position = self.position();
        match self.advance() {
            Some(Token::Term(_)) | Some(Token::Phrase) => self.suffixes(true),
            Some(Token::Regex) => self.suffixes(false),
            Some(Token::RangeOpen) => {
                self.range_endpoint()?;
                if matches!(self.peek(), Some(Token::Term(t)) if t == "TO") {
                    self.advance();
                }
                self.range_endpoint()?;
                match self.advance() {
                    Some(Token::RangeClose) => self.suffixes(false),
                    Some(_) => {
                        self.pos -= 1;
                        Err(self.unexpected())
                    }
                    None => Err(SyntaxError::Unterminated {
                        what: "range",
                        position,
                    }),
                }
            }
            Some(Token::LParen) => {
                if matches!(self.peek(), Some(Token::RParen)) {
                    return Err(SyntaxError::EmptyGroup { position });
                }
                self.query(true)?;
                match self.advance() {
                    Some(Token::RParen) => self.suffixes(false),
                    _ => Err(SyntaxError::Unterminated {
                        what: "group",
                        position,
                    }),
                }
            }
            Some(_) => {
                self.pos -= 1;
                Err(self.unexpected())
            }
            None => Err(SyntaxError::UnexpectedEnd),
        }
    }

    fn range_endpoint(&mut self) -> Result<(), SyntaxError> {
        match self.peek() {
            Some(Token::Term(_)) | Some(Token::Phrase) => {
                self.advance();
                Ok(())
            }
            _ => Err(self.unexpected()),
        }
    }

    /// Optional `~n` (when allowed) and `^n` after a clause, in either order.
    fn suffixes(&mut self, fuzzy_allowed: bool) -> Result<(), SyntaxError> {
        let mut seen_fuzzy = !fuzzy_allowed;
        let mut seen_boost = false;
        loop {
            match self.peek() {
                Some(Token::Fuzzy) if !seen_fuzzy => seen_fuzzy = true,
                Some(Token::Boost) if !seen_boost => seen_boost = true,
                Some(Token::Fuzzy) | Some(Token::Boost) => return Err(self.unexpected()),
                _ => return Ok(()),
            }
            self.advance();
        }
    }
}

/// Check a query string against the query-string grammar.
pub fn validate(query: &str) -> Result<(), SyntaxError> {
    let tokens = tokenize(query)?;
    if tokens.is_empty() {
        return Err(SyntaxError::Empty);
    }
    let mut parser = Parser { tokens, pos: 0 };
    parser.query(false)?;
    match parser.peek() {
        None => Ok(()),
        Some(_) => Err(parser.unexpected()),
    }
}

/// Whether the index would accept the query string.
pub fn is_valid(query: &str) -> bool {
    validate(query).is_ok()
}

/// Characters with a meaning in the query-string grammar.
pub const METACHARACTERS: &[char] = &[
    '-', ':', '+', '=', '&', '|', '>', '<', '!', '(', ')', '{', '}', '[', ']', '"', '~', '*', '?',
    '\\', '/', '^',
];

/// Replace every metacharacter with a space and collapse whitespace.
pub fn clean(query: &str) -> String {
    query
        .chars()
        .map(|c| if METACHARACTERS.contains(&c) { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_queries() {
        for query in [
            "Goethe",
            "Goethe, Johann Wolfgang",
            "[1920 TO 1950]",
            "{2010 TO 2021}",
            "(Müller OR Meier) AND Michael",
            "preferredName:\"Johann Wolfgang\"~2^3",
            "dateOfBirth:[1749 TO *]",
            "+Goethe -Schiller !Herder",
            "Goe*he Sch?ller",
            "Goethe~ Schiller~1",
            "title:/joh?n(ath[oa]n)/",
            "a && b || c",
            "NOT Kant",
            "1920-1950",
            "placeOfBirth.*:\"https://d-nb.info/gnd/4005728-8\"",
            "Schmidt\\:Helmut",
            "Wirtschaft^2 Politik",
        ] {
            assert!(is_valid(query), "expected valid: {query}");
        }
    }

    #[test]
    fn test_invalid_queries() {
        assert_eq!(validate(""), Err(SyntaxError::Empty));
        assert!(matches!(validate("()"), Err(SyntaxError::EmptyGroup { .. })));
        assert!(matches!(validate("Goethe^"), Err(SyntaxError::InvalidBoost { .. })));
        assert!(matches!(
            validate("\"Goethe"),
            Err(SyntaxError::Unterminated { what: "phrase", .. })
        ));
        assert!(matches!(
            validate("Kyoto / Japan"),
            Err(SyntaxError::Unterminated { .. })
        ));
        assert_eq!(validate("Goethe\\"), Err(SyntaxError::TrailingEscape));
        assert!(matches!(validate("Goethe AND"), Err(SyntaxError::DanglingOperator { .. })));
        assert!(matches!(validate("OR Goethe"), Err(SyntaxError::DanglingOperator { .. })));
        assert!(matches!(validate("Goethe -"), Err(SyntaxError::DanglingOperator { .. })));
        assert!(!is_valid("(Goethe"));
        assert!(!is_valid("Goethe)"));
        assert!(!is_valid("[1920 TO]"));
        assert!(!is_valid("field:"));
        assert!(!is_valid("Conference +=<>(){}[]^ (1997 : Kyoto / Japan)"));
    }

    #[test]
    fn test_clean() {
        assert_eq!(
            clean("Conference +=<>(){}[]^ (1997 : Kyoto / Japan)"),
            "Conference 1997 Kyoto Japan"
        );
        assert_eq!(clean("  a\t\tb  "), "a b");
    }
}
