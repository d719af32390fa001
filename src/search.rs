use crate::formula::parser::ParsedSentence;
use crate::formula::{Assignment, EvalError, Sentence};
use log::{debug, trace};
use std::fmt::{self, Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};

/// Patterns are enumerated in a `u64`, so this is a hard ceiling on any configured bound.
pub const MAX_SUPPORTED_VARIABLES: usize = 63;

#[derive(Clone, Debug)]
pub struct SearchConfig {
    pub max_variables: usize,
}

impl SearchConfig {
    pub const DEFAULT_MAX_VARIABLES: usize = 20;

    pub fn max_variables(mut self, max_variables: usize) -> Self {
        self.max_variables = max_variables;
        self
    }

    fn limit(&self) -> usize {
        self.max_variables.min(MAX_SUPPORTED_VARIABLES)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_variables: Self::DEFAULT_MAX_VARIABLES,
        }
    }
}

/// Checked before every enumeration step.
pub trait Cancellation {
    fn is_cancelled(&self, step: u64) -> bool;
}

impl Cancellation for AtomicBool {
    fn is_cancelled(&self, _step: u64) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl<F: Fn(u64) -> bool> Cancellation for F {
    fn is_cancelled(&self, step: u64) -> bool {
        self(step)
    }
}

/// Exhaustive satisfiability search.
///
/// Pattern `p` assigns the `j`-th variable (in sorted order) the value of bit `j` of `p`.
/// Patterns are tried in ascending order, which is also the order solutions are reported in.
pub struct Search<'a> {
    sentence: &'a Sentence,
    variables: Vec<char>,
    config: SearchConfig,
    cancel: Option<&'a dyn Cancellation>,
}

impl<'a> Search<'a> {
    pub fn new(parsed: &'a ParsedSentence) -> Self {
        Self::with_variables(parsed.root(), parsed.variables().iter().copied())
    }

    /// Searches over the variables occurring in `sentence`.
    pub fn for_sentence(sentence: &'a Sentence) -> Self {
        let variables = sentence.variables();
        Self::with_variables(sentence, variables)
    }

    /// Searches over `variables`, which are sorted and deduplicated first. Variables of
    /// `sentence` missing from the list surface as `SearchError::Eval`.
    pub fn with_variables(
        sentence: &'a Sentence,
        variables: impl IntoIterator<Item = char>,
    ) -> Self {
        let mut variables: Vec<char> = variables.into_iter().collect();
        variables.sort_unstable();
        variables.dedup();
        Self {
            sentence,
            variables,
            config: SearchConfig::default(),
            cancel: None,
        }
    }

    pub fn config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    /// Stops the search with `SearchError::Cancelled` once `cancel` reports it, e.g. when an
    /// `AtomicBool` is set from another thread.
    pub fn cancel_on<C: Cancellation + 'a>(mut self, cancel: &'a C) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn variables(&self) -> &[char] {
        &self.variables
    }

    pub fn run(&self) -> Result<Solutions, SearchError> {
        let n = self.variables.len();
        let limit = self.config.limit();
        if n > limit {
            return Err(SearchError::ResourceExhausted { variables: n, limit });
        }

        let mut assignment = Assignment::new();
        let mut satisfying = vec![];

        if n == 0 {
            self.check_cancelled(0)?;
            if self.sentence.eval(&assignment)? {
                satisfying.push(assignment);
            }
            return Ok(Solutions {
                variables: vec![],
                satisfying,
                examined: 1,
            });
        }

        let patterns = 1u64 << n;
        debug!("searching {} assignments over {:?}", patterns, self.variables);

        for pattern in 0..patterns {
            self.check_cancelled(pattern)?;
            for (j, name) in self.variables.iter().enumerate() {
                assignment.set(*name, pattern & (1 << j) != 0);
            }
            if self.sentence.eval(&assignment)? {
                trace!("pattern {} satisfies: {}", pattern, assignment);
                satisfying.push(assignment.clone());
            }
        }

        debug!("{} of {} assignments satisfy", satisfying.len(), patterns);
        Ok(Solutions {
            variables: self.variables.clone(),
            satisfying,
            examined: patterns,
        })
    }

    fn check_cancelled(&self, step: u64) -> Result<(), SearchError> {
        match self.cancel {
            Some(cancel) if cancel.is_cancelled(step) => Err(SearchError::Cancelled { step }),
            _ => Ok(()),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Solutions {
    variables: Vec<char>,
    satisfying: Vec<Assignment>,
    examined: u64,
}

impl Solutions {
    pub fn is_satisfiable(&self) -> bool {
        !self.satisfying.is_empty()
    }

    pub fn is_tautology(&self) -> bool {
        self.satisfying.len() as u64 == self.examined
    }

    pub fn len(&self) -> usize {
        self.satisfying.len()
    }

    pub fn is_empty(&self) -> bool {
        self.satisfying.is_empty()
    }

    /// Sorted variables the search enumerated.
    pub fn variables(&self) -> &[char] {
        &self.variables
    }

    /// Number of assignments evaluated.
    pub fn examined(&self) -> u64 {
        self.examined
    }

    pub fn iter(&self) -> impl Iterator<Item = &Assignment> {
        self.satisfying.iter()
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.satisfying
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SearchError {
    Eval(EvalError),
    ResourceExhausted { variables: usize, limit: usize },
    Cancelled { step: u64 },
}

impl From<EvalError> for SearchError {
    fn from(e: EvalError) -> Self {
        Self::Eval(e)
    }
}

impl Display for SearchError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        match self {
            SearchError::Eval(e) => write!(f, "evaluation failed: {}", e),
            SearchError::ResourceExhausted { variables, limit } => write!(
                f,
                "{} variables exceeds the search limit of {}",
                variables, limit
            ),
            SearchError::Cancelled { step } => write!(f, "search cancelled at pattern {}", step),
        }
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SearchError::Eval(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::{c, sentence_strategy, v};
    use proptest::prelude::*;
    use test_env_log::test;

    #[test]
    fn constant_sentences() {
        let t = c(true);
        let solutions = Search::for_sentence(&t).run().unwrap();
        assert!(solutions.is_satisfiable());
        assert!(solutions.is_tautology());
        assert_eq!(solutions.assignments(), &[Assignment::new()]);
        assert_eq!(solutions.examined(), 1);

        let f = c(false);
        let solutions = Search::for_sentence(&f).run().unwrap();
        assert!(!solutions.is_satisfiable());
        assert!(!solutions.is_tautology());
    }

    #[test]
    fn ascending_pattern_order() {
        let s = Sentence::or(v('b'), v('a'));
        let solutions = Search::for_sentence(&s).run().unwrap();
        assert_eq!(solutions.variables(), &['a', 'b']);
        let found: Vec<String> = solutions.iter().map(|a| a.to_string()).collect();
        // pattern 1, 2, 3 with `a` as bit 0
        assert_eq!(found, vec!["a=T b=F", "a=F b=T", "a=T b=T"]);
    }

    #[test]
    fn variables_are_sorted_and_deduplicated() {
        let s = v('p');
        let search = Search::with_variables(&s, vec!['q', 'p', 'q']);
        assert_eq!(search.variables(), &['p', 'q']);
        assert_eq!(search.run().unwrap().len(), 2);
    }

    #[test]
    fn missing_variable_fails_search() {
        let s = Sentence::and(v('p'), v('q'));
        let err = Search::with_variables(&s, vec!['p']).run().unwrap_err();
        assert_eq!(err, SearchError::Eval(EvalError::MissingVariable('q')));
    }

    #[test]
    fn too_many_variables() {
        let s = Sentence::or(v('p'), Sentence::or(v('q'), v('r')));
        let config = SearchConfig::default().max_variables(2);
        let err = Search::for_sentence(&s).config(config).run().unwrap_err();
        assert_eq!(err, SearchError::ResourceExhausted { variables: 3, limit: 2 });
    }

    #[test]
    fn configured_limit_is_capped() {
        let config = SearchConfig::default().max_variables(1000);
        assert_eq!(config.limit(), MAX_SUPPORTED_VARIABLES);

        let letters: Vec<char> = ('a'..='z')
            .chain('A'..='Z')
            .chain("αβγδεζηθικλμ".chars())
            .collect();
        assert_eq!(letters.len(), 64);
        let s = v('a');
        let err = Search::with_variables(&s, letters).config(config).run().unwrap_err();
        assert_eq!(err, SearchError::ResourceExhausted { variables: 64, limit: 63 });
    }

    #[test]
    fn cancelled_search() {
        let flag = AtomicBool::new(true);
        let s = v('p');
        let err = Search::for_sentence(&s).cancel_on(&flag).run().unwrap_err();
        assert_eq!(err, SearchError::Cancelled { step: 0 });

        flag.store(false, Ordering::Relaxed);
        assert!(Search::for_sentence(&s).cancel_on(&flag).run().is_ok());
    }

    #[test]
    fn cancellation_checked_every_step() {
        let s = Sentence::and(v('p'), Sentence::or(v('q'), v('r')));
        let seen = std::cell::RefCell::new(vec![]);
        let cancel = |step: u64| {
            seen.borrow_mut().push(step);
            step == 5
        };
        let err = Search::for_sentence(&s).cancel_on(&cancel).run().unwrap_err();
        assert_eq!(err, SearchError::Cancelled { step: 5 });
        assert_eq!(*seen.borrow(), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn cancelled_from_another_thread() {
        let letters: Vec<char> = ('a'..='t').collect();
        let s = letters[1..]
            .iter()
            .fold(v('a'), |acc, name| Sentence::or(acc, v(*name)));
        let flag = AtomicBool::new(false);
        let started = AtomicBool::new(false);
        // flags once the enumeration is past step 0, so the other thread only cancels mid-run
        let cancel = |step: u64| {
            if step > 0 {
                started.store(true, Ordering::SeqCst);
            }
            flag.load(Ordering::SeqCst)
        };

        let result = std::thread::scope(|scope| {
            scope.spawn(|| {
                while !started.load(Ordering::SeqCst) {
                    std::thread::yield_now();
                }
                flag.store(true, Ordering::SeqCst);
            });
            Search::for_sentence(&s).cancel_on(&cancel).run()
        });

        match result {
            Err(SearchError::Cancelled { step }) => assert!(step > 0),
            other => panic!("unexpected {:?}", other.map(|s| s.len())),
        }
    }

    proptest! {
        #[test]
        fn proptest_search_matches_truth_table(s in sentence_strategy()) {
            let solutions = Search::for_sentence(&s).run().unwrap();
            let vars = solutions.variables().to_vec();
            prop_assert_eq!(solutions.examined(), 1u64 << vars.len());

            let mut expected = vec![];
            for pattern in 0..(1u32 << vars.len()) {
                let a: Assignment = vars
                    .iter()
                    .enumerate()
                    .map(|(j, name)| (*name, pattern & (1 << j) != 0))
                    .collect();
                if s.eval(&a).unwrap() {
                    expected.push(a);
                }
            }
            prop_assert_eq!(solutions.assignments(), &expected[..]);
        }
    }
}
