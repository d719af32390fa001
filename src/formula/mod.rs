pub mod parser;
pub mod tokenizer;

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::iter::FromIterator;

/// A propositional sentence. Internal nodes own their children.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Sentence {
    Or(Box<Sentence>, Box<Sentence>),
    And(Box<Sentence>, Box<Sentence>),
    Not(Box<Sentence>),
    Variable(char),
    Constant(bool),
}

impl Sentence {
    pub fn or(left: Sentence, right: Sentence) -> Self {
        Sentence::Or(Box::new(left), Box::new(right))
    }

    pub fn and(left: Sentence, right: Sentence) -> Self {
        Sentence::And(Box::new(left), Box::new(right))
    }

    pub fn not(operand: Sentence) -> Self {
        Sentence::Not(Box::new(operand))
    }

    /// Evaluates the sentence under `assignment`.
    ///
    /// Both operands of `&` and `|` are always evaluated, left first, so an unbound variable
    /// is reported even when the other operand already decides the result.
    pub fn eval(&self, assignment: &Assignment) -> Result<bool, EvalError> {
        match self {
            Sentence::Constant(value) => Ok(*value),
            Sentence::Variable(name) => assignment
                .get(*name)
                .ok_or(EvalError::MissingVariable(*name)),
            Sentence::Not(operand) => Ok(!operand.eval(assignment)?),
            Sentence::And(left, right) => {
                let x = left.eval(assignment)?;
                let y = right.eval(assignment)?;
                Ok(x && y)
            }
            Sentence::Or(left, right) => {
                let x = left.eval(assignment)?;
                let y = right.eval(assignment)?;
                Ok(x || y)
            }
        }
    }

    /// Distinct variables in left-to-right order of first occurrence.
    pub fn variables(&self) -> Vec<char> {
        fn collect(s: &Sentence, out: &mut Vec<char>) {
            match s {
                Sentence::Or(l, r) | Sentence::And(l, r) => {
                    collect(l, out);
                    collect(r, out);
                }
                Sentence::Not(x) => collect(x, out),
                Sentence::Variable(name) => {
                    if !out.contains(name) {
                        out.push(*name);
                    }
                }
                Sentence::Constant(_) => {}
            }
        }

        let mut out = vec![];
        collect(self, &mut out);
        out
    }

    fn precedence(&self) -> u8 {
        match self {
            Sentence::Or(..) => 0,
            Sentence::And(..) => 1,
            Sentence::Not(_) | Sentence::Variable(_) | Sentence::Constant(_) => 2,
        }
    }
}

// Parenthesizes `child` when it binds looser than `min`.
fn write_operand(f: &mut Formatter, child: &Sentence, min: u8) -> Result<(), fmt::Error> {
    if child.precedence() < min {
        write!(f, "({})", child)
    } else {
        write!(f, "{}", child)
    }
}

impl Display for Sentence {
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        // `&` and `|` are right-associative, so only a left operand of the same operator
        // needs parentheses.
        match self {
            Sentence::Or(l, r) => {
                write_operand(f, l, 1)?;
                f.write_str(" | ")?;
                write_operand(f, r, 0)
            }
            Sentence::And(l, r) => {
                write_operand(f, l, 2)?;
                f.write_str(" & ")?;
                write_operand(f, r, 1)
            }
            Sentence::Not(x) => {
                f.write_str("~")?;
                write_operand(f, x, 2)
            }
            Sentence::Variable(name) => write!(f, "{}", name),
            Sentence::Constant(true) => f.write_str("T"),
            Sentence::Constant(false) => f.write_str("F"),
        }
    }
}

/// Truth values for a set of variables.
#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct Assignment {
    values: BTreeMap<char, bool>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: char, value: bool) {
        self.values.insert(name, value);
    }

    pub fn get(&self, name: char) -> Option<bool> {
        self.values.get(&name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, bool)> + '_ {
        self.values.iter().map(|(name, value)| (*name, *value))
    }
}

impl FromIterator<(char, bool)> for Assignment {
    fn from_iter<I: IntoIterator<Item = (char, bool)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl Display for Assignment {
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        let mut first = true;
        for (name, value) in self.iter() {
            if first {
                first = false;
            } else {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", name, if value { 'T' } else { 'F' })?;
        }
        Ok(())
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum EvalError {
    MissingVariable(char),
}

impl Display for EvalError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        match self {
            EvalError::MissingVariable(name) => write!(f, "variable '{}' is not assigned", name),
        }
    }
}

impl std::error::Error for EvalError {}

#[cfg(test)]
pub(crate) fn v(name: char) -> Sentence {
    Sentence::Variable(name)
}

#[cfg(test)]
pub(crate) fn c(value: bool) -> Sentence {
    Sentence::Constant(value)
}

/// Sentences over the variables `p`, `q`, `r` and `s`.
#[cfg(test)]
pub(crate) fn sentence_strategy() -> impl proptest::strategy::Strategy<Value = Sentence> {
    use proptest::prelude::*;

    let leaf = prop_oneof![
        any::<bool>().prop_map(Sentence::Constant),
        prop::sample::select(vec!['p', 'q', 'r', 's']).prop_map(Sentence::Variable),
    ];
    leaf.prop_recursive(5, 32, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Sentence::or(l, r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Sentence::and(l, r)),
            inner.prop_map(Sentence::not),
        ]
    })
}
