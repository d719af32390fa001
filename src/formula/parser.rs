use crate::formula::tokenizer::{Token, Tokenizer};
use crate::formula::Sentence;
use log::trace;
use std::fmt::{self, Display, Formatter};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Parses a single sentence.
///
/// Grammar, lowest precedence first (both binary operators are right-associative):
///
/// ```text
/// sentence ::= clause | clause '|' sentence
/// clause   ::= atom   | atom '&' clause
/// atom     ::= term   | '~' atom
/// term     ::= VARIABLE | '(' sentence ')' | 'T' | 'F'
/// ```
pub fn parse(input: &str) -> Result<ParsedSentence, ParseError> {
    Parser::new(input).parse()
}

/// Reads the whole of `reader` and parses it as one sentence.
pub fn parse_reader<R: Read>(reader: R) -> Result<ParsedSentence, ParseError> {
    let mut reader = BufReader::new(reader);
    let mut input = String::new();
    reader.read_to_string(&mut input)?;
    parse(&input)
}

pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<ParsedSentence, ParseError> {
    let file = File::open(path)?;
    parse_reader(file)
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ParsedSentence {
    root: Sentence,
    variables: Vec<char>,
}

impl ParsedSentence {
    pub fn root(&self) -> &Sentence {
        &self.root
    }

    /// Distinct variables in the order the parser first saw them.
    pub fn variables(&self) -> &[char] {
        &self.variables
    }

    pub fn sorted_variables(&self) -> Vec<char> {
        let mut variables = self.variables.clone();
        variables.sort_unstable();
        variables
    }

    pub fn into_root(self) -> Sentence {
        self.root
    }
}

type Rule = fn(&mut Parser) -> Result<Option<Sentence>, ParseError>;

/// A recursive-descent parser for one sentence. Each grammar rule reads one token past what
/// it consumes and pushes it back when it doesn't continue.
///
/// Every operand after `~`, `&` or `|` and every parenthesized group is one level of
/// nesting. Input nested deeper than `max_depth` is rejected with `SyntaxErrorKind::TooDeep`
/// instead of exhausting the stack.
pub struct Parser {
    tokens: Tokenizer,
    variables: Vec<char>,
    depth: usize,
    max_depth: usize,
}

impl Parser {
    pub const DEFAULT_MAX_DEPTH: usize = 256;

    pub fn new(input: &str) -> Self {
        Self {
            tokens: Tokenizer::new(input),
            variables: vec![],
            depth: 0,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn parse(mut self) -> Result<ParsedSentence, ParseError> {
        let root = self.sentence()?;
        let t = self.tokens.next_token();
        match (root, t) {
            (Some(root), Token::EndOfInput) => Ok(ParsedSentence {
                root,
                variables: self.variables,
            }),
            (None, Token::EndOfInput) => {
                Err(self.syntax_error(SyntaxErrorKind::UnexpectedEnd, t))
            }
            // only a stray ')' gets here
            (_, t) => Err(self.unexpected(t)),
        }
    }

    fn sentence(&mut self) -> Result<Option<Sentence>, ParseError> {
        let left = self.clause()?;
        let t = self.tokens.next_token();
        match t {
            Token::Or => {
                let right = self.required(Token::Or, Self::sentence)?;
                match left {
                    Some(left) => Ok(Some(Sentence::or(left, right))),
                    None => Err(self.unexpected(Token::Or)),
                }
            }
            Token::RPar | Token::EndOfInput => {
                self.push_back("sentence", t);
                Ok(left)
            }
            t => Err(self.unexpected(t)),
        }
    }

    fn clause(&mut self) -> Result<Option<Sentence>, ParseError> {
        let left = self.atom()?;
        let t = self.tokens.next_token();
        match (left, t) {
            (Some(left), Token::And) => {
                let right = self.required(Token::And, Self::clause)?;
                Ok(Some(Sentence::and(left, right)))
            }
            (left, t) => {
                self.push_back("clause", t);
                Ok(left)
            }
        }
    }

    fn atom(&mut self) -> Result<Option<Sentence>, ParseError> {
        let t = self.tokens.next_token();
        if t == Token::Not {
            let operand = self.required(Token::Not, Self::atom)?;
            Ok(Some(Sentence::not(operand)))
        } else {
            self.push_back("atom", t);
            self.term()
        }
    }

    fn term(&mut self) -> Result<Option<Sentence>, ParseError> {
        let t = self.tokens.next_token();
        match t {
            Token::Variable(name) => {
                if !self.variables.contains(&name) {
                    self.variables.push(name);
                }
                Ok(Some(Sentence::Variable(name)))
            }
            Token::LPar => {
                let interior = self.nested(Token::LPar, Self::sentence)?;
                let closing = self.tokens.next_token();
                match (interior, closing) {
                    (Some(interior), Token::RPar) => Ok(Some(interior)),
                    (_, Token::EndOfInput) => {
                        Err(self.syntax_error(SyntaxErrorKind::MissingClosingParenthesis, closing))
                    }
                    (_, t) => Err(self.unexpected(t)),
                }
            }
            Token::True => Ok(Some(Sentence::Constant(true))),
            Token::False => Ok(Some(Sentence::Constant(false))),
            // whether an empty term is acceptable is up to the caller
            Token::EndOfInput => {
                self.push_back("term", t);
                Ok(None)
            }
            t => Err(self.unexpected(t)),
        }
    }

    // Runs `rule` for the operand after an operator, where running out of input is an error.
    fn required(&mut self, operator: Token, rule: Rule) -> Result<Sentence, ParseError> {
        match self.nested(operator, rule)? {
            Some(s) => Ok(s),
            None => {
                let t = self.tokens.next_token();
                Err(self.syntax_error(SyntaxErrorKind::UnexpectedEnd, t))
            }
        }
    }

    // Runs `rule` one nesting level below `operator`, which was just read.
    fn nested(&mut self, operator: Token, rule: Rule) -> Result<Option<Sentence>, ParseError> {
        if self.depth >= self.max_depth {
            return Err(self.syntax_error(SyntaxErrorKind::TooDeep, operator));
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    fn push_back(&mut self, rule: &'static str, token: Token) {
        trace!("push back {} in {}", token, rule);
        self.tokens.push_back(token);
    }

    fn unexpected(&self, found: Token) -> ParseError {
        match found {
            Token::Invalid(character) => ParseError::Token {
                position: self.tokens.position(),
                character,
            },
            found => self.syntax_error(SyntaxErrorKind::UnexpectedToken, found),
        }
    }

    fn syntax_error(&self, kind: SyntaxErrorKind, found: Token) -> ParseError {
        ParseError::Syntax {
            position: self.tokens.position(),
            kind,
            found,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SyntaxErrorKind {
    UnexpectedToken,
    MissingClosingParenthesis,
    UnexpectedEnd,
    TooDeep,
}

#[derive(Debug)]
pub enum ParseError {
    Io(std::io::Error),
    Token {
        position: usize,
        character: char,
    },
    Syntax {
        position: usize,
        kind: SyntaxErrorKind,
        found: Token,
    },
}

impl ParseError {
    pub fn position(&self) -> Option<usize> {
        match self {
            ParseError::Io(_) => None,
            ParseError::Token { position, .. } | ParseError::Syntax { position, .. } => {
                Some(*position)
            }
        }
    }

    pub fn syntax_kind(&self) -> Option<SyntaxErrorKind> {
        match self {
            ParseError::Syntax { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ParseError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        match self {
            ParseError::Io(e) => write!(f, "failed to read sentence: {}", e),
            ParseError::Token { position, character } => {
                write!(f, "unrecognized character {:?} at position {}", character, position)
            }
            ParseError::Syntax { position, kind, found } => {
                let what = match kind {
                    SyntaxErrorKind::UnexpectedToken => "unexpected token",
                    SyntaxErrorKind::MissingClosingParenthesis => "missing closing parenthesis",
                    SyntaxErrorKind::UnexpectedEnd => {
                        "expected a variable, constant, '~' or '('"
                    }
                    SyntaxErrorKind::TooDeep => "sentence is nested too deeply",
                };
                write!(f, "{} at position {}: found {}", what, position, found)
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Io(e) => Some(e),
            _ => None,
        }
    }
}
