pub mod formula;
mod search;

pub use formula::parser::{
    parse, parse_file, parse_reader, ParseError, ParsedSentence, Parser, SyntaxErrorKind,
};
pub use formula::tokenizer::{Token, Tokenizer};
pub use formula::{Assignment, EvalError, Sentence};
pub use search::{
    Cancellation, Search, SearchConfig, SearchError, Solutions, MAX_SUPPORTED_VARIABLES,
};

/// Parses `input` and searches every assignment to its variables.
pub fn solve(input: &str, config: SearchConfig) -> Result<Solutions, Error> {
    let parsed = parse(input)?;
    Ok(Search::new(&parsed).config(config).run()?)
}

#[derive(Debug)]
pub enum Error {
    Parse(ParseError),
    Search(SearchError),
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

impl From<SearchError> for Error {
    fn from(e: SearchError) -> Self {
        Self::Search(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        match self {
            Error::Parse(e) => write!(f, "parse error: {}", e),
            Error::Search(e) => write!(f, "search error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(e) => Some(e),
            Error::Search(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;
    use rand::Rng;
    use test_env_log::test;

    fn solutions(input: &str) -> Solutions {
        solve(input, SearchConfig::default()).expect("failed to solve")
    }

    fn assignment(pairs: &[(char, bool)]) -> Assignment {
        pairs.iter().copied().collect()
    }

    #[test]
    fn contradiction() {
        let s = solutions("p & ~p");
        assert_eq!(s.variables(), &['p']);
        assert!(!s.is_satisfiable());
    }

    #[test]
    fn excluded_middle() {
        let s = solutions("p | ~p");
        assert_eq!(s.variables(), &['p']);
        assert!(s.is_tautology());
        assert_eq!(
            s.assignments(),
            &[assignment(&[('p', false)]), assignment(&[('p', true)])]
        );
    }

    #[test]
    fn three_variables() {
        let s = solutions("(p & q) | r");
        assert_eq!(s.variables(), &['p', 'q', 'r']);
        assert_eq!(s.examined(), 8);
        assert_eq!(s.len(), 5);
        assert!(!s.is_tautology());

        for (p, q, r) in &[(false, false, false), (false, true, false), (true, false, false)] {
            let a = assignment(&[('p', *p), ('q', *q), ('r', *r)]);
            assert!(!s.iter().any(|found| *found == a));
        }
    }

    #[test]
    fn constant_true() {
        let s = solutions("T");
        assert!(s.variables().is_empty());
        assert!(s.is_satisfiable());
        assert_eq!(s.assignments(), &[Assignment::new()]);
    }

    #[test]
    fn right_associative_contradiction() {
        let s = solutions("p & q & (p & ~q)");
        assert_eq!(s.variables(), &['p', 'q']);
        assert_eq!(s.examined(), 4);
        assert!(!s.is_satisfiable());
    }

    #[test]
    fn malformed_input_is_a_parse_error() {
        match solve("(p & q", SearchConfig::default()) {
            Err(Error::Parse(e)) => {
                assert_eq!(e.syntax_kind(), Some(SyntaxErrorKind::MissingClosingParenthesis))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn variable_limit() {
        let config = SearchConfig::default().max_variables(3);
        assert!(solve("a | b | c", config.clone()).is_ok());
        match solve("a | b | c | d", config) {
            Err(Error::Search(SearchError::ResourceExhausted { variables: 4, limit: 3 })) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn evaluate_parsed_sentence() {
        let parsed = parse("~(a & b) | c").expect("failed to parse");
        let mut a = assignment(&[('a', true), ('b', true), ('c', false)]);
        assert_eq!(parsed.root().eval(&a), Ok(false));
        a.set('c', true);
        assert_eq!(parsed.root().eval(&a), Ok(true));
    }

    // Random strings over the accepted alphabet plus a few stray characters; parsing must
    // fail cleanly or produce a sentence that renders back to an equivalent one.
    #[test]
    fn fuzz_parser() {
        const ALPHABET: &[char] = &['p', 'q', 'T', 'F', '&', '|', '~', '(', ')', ' ', '^', '1'];
        let mut rng = rand::thread_rng();

        for _ in 0..2000 {
            let len = rng.gen_range(0, 16);
            let input: String = (0..len).map(|_| *ALPHABET.choose(&mut rng).unwrap()).collect();
            if let Ok(parsed) = parse(&input) {
                let rendered = parsed.root().to_string();
                let reparsed = parse(&rendered).expect("rendered sentence should parse");
                assert_eq!(reparsed.root(), parsed.root(), "input {:?}", input);
                assert!(solve(&input, SearchConfig::default()).is_ok());
            }
        }
    }
}
