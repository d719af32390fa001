use std::fmt::{self, Display, Formatter};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Token {
    LPar,
    RPar,
    True,
    False,
    And,
    Or,
    Not,
    Variable(char),
    EndOfInput,
    Invalid(char),
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        match self {
            Token::LPar => f.write_str("'('"),
            Token::RPar => f.write_str("')'"),
            Token::True => f.write_str("'T'"),
            Token::False => f.write_str("'F'"),
            Token::And => f.write_str("'&'"),
            Token::Or => f.write_str("'|'"),
            Token::Not => f.write_str("'~'"),
            Token::Variable(c) => write!(f, "variable '{}'", c),
            Token::EndOfInput => f.write_str("end of input"),
            Token::Invalid(c) => write!(f, "invalid character {:?}", c),
        }
    }
}

/// Splits a sentence into tokens, one at a time.
///
/// At most one token can be pushed back. A second `push_back` before the next call to
/// `next_token` replaces the first one.
#[derive(Debug)]
pub struct Tokenizer {
    chars: Vec<char>,
    cursor: usize,
    // offset of the token most recently returned by `next_token`
    position: usize,
    back: Option<(Token, usize)>,
}

impl Tokenizer {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            cursor: 0,
            position: 0,
            back: None,
        }
    }

    pub fn next_token(&mut self) -> Token {
        if let Some((token, position)) = self.back.take() {
            self.position = position;
            return token;
        }

        while let Some(&c) = self.chars.get(self.cursor) {
            if c.is_whitespace() {
                self.cursor += 1;
            } else {
                break;
            }
        }

        self.position = self.cursor;
        let c = match self.chars.get(self.cursor) {
            Some(&c) => c,
            None => return Token::EndOfInput,
        };
        self.cursor += 1;

        match c {
            'T' => Token::True,
            'F' => Token::False,
            c if c.is_alphabetic() => Token::Variable(c),
            '&' => Token::And,
            '|' => Token::Or,
            '~' => Token::Not,
            '(' => Token::LPar,
            ')' => Token::RPar,
            c => Token::Invalid(c),
        }
    }

    pub fn push_back(&mut self, token: Token) {
        self.back = Some((token, self.position));
    }

    /// Character offset of the most recently returned token.
    pub fn position(&self) -> usize {
        self.position
    }
}

impl Iterator for Tokenizer {
    type Item = Token;

    // Yields every token up to and including the single `EndOfInput`.
    fn next(&mut self) -> Option<Token> {
        if self.cursor > self.chars.len() {
            return None;
        }
        let token = self.next_token();
        if token == Token::EndOfInput && self.back.is_none() {
            self.cursor = self.chars.len() + 1;
        }
        Some(token)
    }
}
