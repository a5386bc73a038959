// Copyright 2016 Vincent Vigneron. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at.your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::result;

use itertools::Itertools;
use log::trace;
use thiserror::Error;

/// A symbol of an alphabet. A symbol may span several characters (digraphs, keywords, ...).
pub type Symbol = String;

/// The epsilon symbol: the empty token, it consumes no input.
pub const EPSILON: &str = "";

/// Returns true iff `symbol` is the epsilon symbol.
pub fn is_epsilon(symbol: &str) -> bool {
    symbol.is_empty()
}

/// The destination of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Target {
    /// A state of the transition table.
    State(usize),
    /// The dead state. It has no entry in the transition table and never reaches
    /// the accept state.
    Sink,
}

impl Target {
    /// Returns the state index, `None` for the sink.
    pub fn state(self) -> Option<usize> {
        match self {
            Target::State(state) => Some(state),
            Target::Sink => None,
        }
    }

    /// Moves a state by `offset`. The sink stays the sink.
    pub fn shift(self, offset: usize) -> Target {
        match self {
            Target::State(state) => Target::State(state + offset),
            Target::Sink => Target::Sink,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Target::State(state) => write!(f, "{}", state),
            Target::Sink => write!(f, "-"),
        }
    }
}

/// The outgoing transitions of a single state. A symbol without an entry behaves
/// as a transition to the sink only.
pub type Transitions = BTreeMap<Symbol, BTreeSet<Target>>;

/// The `NFAError` type.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NFAError {
    /// No accept state is specified.
    #[error("Missing accept state.")]
    MissingAcceptState,
    /// Two different accept states are specified.
    #[error("Duplicated accept state ({0} and {1}).")]
    DuplicatedAcceptState(usize, usize),
    /// The epsilon symbol is used where a consuming symbol is expected.
    #[error("Epsilon can not be used as a consuming symbol.")]
    EpsilonSymbol,
    /// The transition table is empty but the accept state is not 0.
    #[error("Empty transition table with accept state {0}.")]
    EmptyTransitionTable(usize),
    /// The accept state is not a state of the transition table.
    #[error("Accept state {accept} out of range, the automaton has {states} states.")]
    AcceptStateOutOfRange {
        /// The offending accept state.
        accept: usize,
        /// The length of the transition table.
        states: usize,
    },
    /// A transition targets a state that is not in the transition table.
    #[error("Transition ('{symbol}',{state}) targets {target}, the automaton has {states} states.")]
    TargetOutOfRange {
        /// The source state of the transition.
        state: usize,
        /// The symbol of the transition.
        symbol: Symbol,
        /// The offending destination.
        target: usize,
        /// The length of the transition table.
        states: usize,
    },
    /// A transition uses a symbol that is neither epsilon nor part of the alphabet.
    #[error("Transition ('{symbol}',{state}) uses a symbol outside of the alphabet.")]
    UnknownSymbol {
        /// The source state of the transition.
        state: usize,
        /// The offending symbol.
        symbol: Symbol,
    },
}

/// Alias for result::Result<T,NFAError>.
pub type Result<T> = result::Result<T, NFAError>;

/// The type `NFA` represents a Non-deterministic Finite Automaton with epsilon
/// transitions. The start state is always 0 and there is exactly one accept state.
///
/// An `NFA` is never modified once built; the combinators of
/// [`combinators`](crate::nfa::combinators) always return a fresh automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NFA {
    alphabet    : BTreeSet<Symbol>,
    transitions : Vec<Transitions>,
    accept      : usize,
}

impl NFA {
    /// Creates an automaton from its alphabet, its transition table (one entry per
    /// state) and its accept state.
    ///
    /// # Errors
    ///
    /// Return a NFAError::EmptyTransitionTable if the table is empty and the accept
    /// state is not 0.
    ///
    /// Return a NFAError::AcceptStateOutOfRange if the accept state has no entry in
    /// the table.
    ///
    /// Return a NFAError::TargetOutOfRange if a transition leads outside of the table.
    ///
    /// Return a NFAError::UnknownSymbol if a transition uses a symbol that is not
    /// in the alphabet.
    pub fn new(alphabet: BTreeSet<Symbol>, transitions: Vec<Transitions>, accept: usize) -> Result<NFA> {
        NFA::validate(&alphabet, &transitions, accept)?;
        Ok(NFA { alphabet, transitions, accept })
    }

    /// Builds an automaton that is valid by construction.
    pub(crate) fn from_parts(alphabet: BTreeSet<Symbol>, transitions: Vec<Transitions>, accept: usize) -> NFA {
        debug_assert_eq!(NFA::validate(&alphabet, &transitions, accept), Ok(()));
        NFA { alphabet, transitions, accept }
    }

    fn validate(alphabet: &BTreeSet<Symbol>, transitions: &[Transitions], accept: usize) -> Result<()> {
        let states = transitions.len();
        if states == 0 {
            if accept != 0 {
                return Err(NFAError::EmptyTransitionTable(accept));
            }
        } else if accept >= states {
            return Err(NFAError::AcceptStateOutOfRange { accept, states });
        }

        for (state, entry) in transitions.iter().enumerate() {
            for (symbol, targets) in entry {
                if !is_epsilon(symbol) && !alphabet.contains(symbol) {
                    return Err(NFAError::UnknownSymbol { state, symbol: symbol.clone() });
                }

                if let Some(target) = targets.iter().filter_map(|target| target.state()).find(|&target| target >= states) {
                    return Err(NFAError::TargetOutOfRange { state, symbol: symbol.clone(), target, states });
                }
            }
        }

        Ok(())
    }

    /// Returns the alphabet of the automaton.
    pub fn alphabet(&self) -> &BTreeSet<Symbol> {
        &self.alphabet
    }

    /// Returns the transition table, indexed by state.
    pub fn transitions(&self) -> &[Transitions] {
        &self.transitions
    }

    /// Returns the accept state.
    pub fn accept_state(&self) -> usize {
        self.accept
    }

    /// Returns the number of states, i.e. the length of the transition table.
    pub fn num_of_states(&self) -> usize {
        self.transitions.len()
    }

    /// Returns the states reachable from `state` with `symbol`. The sink is never
    /// yielded.
    ///
    /// # Panics
    ///
    /// Panics if `state` is not a state of the automaton.
    pub fn targets<'a>(&'a self, state: usize, symbol: &str) -> impl Iterator<Item = usize> + 'a {
        self.transitions[state]
            .get(symbol)
            .into_iter()
            .flatten()
            .filter_map(|target| target.state())
    }

    /// Test if an input string is a word of the language defined by the NFA.
    ///
    /// Every symbol of the alphabet that is a prefix of the remaining input is tried,
    /// and epsilon transitions are followed at every position of the input. A state
    /// is expanded at most once per input position, so epsilon cycles terminate.
    ///
    /// # Examples
    ///
    /// ```
    /// use thompson_nfa::nfa::core::*;
    ///
    /// // (ab)*c where "ab" is a single symbol
    /// let nfa = NFABuilder::new()
    ///     .add_accept(2)
    ///     .add_transition("ab", 0, 1)
    ///     .add_e_transition(1, 0)
    ///     .add_transition("c", 0, 2)
    ///     .finalize()
    ///     .unwrap();
    ///
    /// assert!(nfa.accepts("c"));
    /// assert!(nfa.accepts("ababc"));
    /// assert!(!nfa.accepts("abac"));
    /// assert!(!nfa.accepts(""));
    /// ```
    pub fn accepts(&self, text: &str) -> bool {
        if self.transitions.is_empty() {
            // Only the trivial automaton has no table; its start state is its accept state.
            return text.is_empty();
        }

        self.accepts_from(text, 0, &mut HashSet::new())
    }

    /// `visited` holds the states already expanded at the current input position.
    fn accepts_from(&self, text: &str, state: usize, visited: &mut HashSet<usize>) -> bool {
        trace!("Exploring state {} with remaining input \"{}\"", state, text);
        if text.is_empty() && state == self.accept {
            return true;
        }

        if !visited.insert(state) {
            return false;
        }

        if self.targets(state, EPSILON).any(|dest| self.accepts_from(text, dest, visited)) {
            return true;
        }

        self.alphabet
            .iter()
            .filter(|symbol| !is_epsilon(symbol) && text.starts_with(symbol.as_str()))
            .any(|symbol| {
                let rest = &text[symbol.len()..];
                self.targets(state, symbol)
                    .any(|dest| self.accepts_from(rest, dest, &mut HashSet::new()))
            })
    }
}

impl fmt::Display for NFA {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let show = |symbol: &str| if is_epsilon(symbol) { "ε".to_owned() } else { symbol.to_owned() };

        writeln!(f, "ACCEPT: {}", self.accept)?;
        writeln!(f, "ALPHABET: {{{}}}", self.alphabet.iter().map(|symbol| show(symbol.as_str())).join(", "))?;
        writeln!(f, "TRANSITIONS:")?;
        for (state, entry) in self.transitions.iter().enumerate() {
            for (symbol, targets) in entry {
                writeln!(f, "  ({},{}) => {{{}}}", show(symbol.as_str()), state, targets.iter().format(", "))?;
            }
        }
        Ok(())
    }
}

/// The `NFABuilder` follows the builder pattern and allows to create a
/// Non-deterministic Finite Automaton. The builder is moved at each call so it is
/// necessary to bind to a new variable the return value for each function of the
/// builder.
///
/// The transition table gets one entry per state up to the highest state that is
/// mentioned, the accept state included.
///
/// # Errors
///
/// Return an error if the accept state is not specified.
///
/// Return an error if two different accept states are specified.
///
/// # Examples
///
/// ```
/// use thompson_nfa::nfa::core::*;
///
/// // (a|b)c
/// let nfa = NFABuilder::new()
///     .add_accept(3)
///     .add_transition("a", 0, 1)
///     .add_transition("b", 0, 2)
///     .add_e_transition(2, 1)
///     .add_transition("c", 1, 3)
///     .finalize()
///     .unwrap();
/// assert_eq!(nfa.num_of_states(), 4);
/// ```
///
/// ```
/// use thompson_nfa::nfa::core::*;
///
/// let nfa = NFABuilder::new()
///     .add_transition("t", 0, 1)
///     .finalize();
/// match nfa {
///     Err(NFAError::MissingAcceptState) => assert!(true),
///     _ => assert!(false),
/// }
/// ```
#[derive(Debug, Default)]
pub struct NFABuilder {
    alphabet    : BTreeSet<Symbol>,
    transitions : BTreeMap<usize, Transitions>,
    accept      : Option<usize>,
    states      : usize,
}

/// NFABuilding is the trait associated to the NFABuilder type.
///
/// #Errors
///
/// If self contains a NFAError then each function should transfer this error.
pub trait NFABuilding {
    /// Sets the accept state of the NFA.
    ///
    /// # Errors
    ///
    /// Return a NFAError::DuplicatedAcceptState if a different accept state was
    /// already set.
    fn add_accept(self, state: usize) -> Result<NFABuilder>;

    /// Adds a symbol to the alphabet without any transition.
    ///
    /// # Errors
    ///
    /// Return a NFAError::EpsilonSymbol for the epsilon symbol.
    fn add_symbol(self, symb: &str) -> Result<NFABuilder>;

    /// Add a transition to the NFA. The symbol joins the alphabet.
    ///
    /// # Errors
    ///
    /// Return a NFAError::EpsilonSymbol for the epsilon symbol, use
    /// `add_e_transition` instead.
    fn add_transition(self, symb: &str, src: usize, dest: usize) -> Result<NFABuilder>;

    /// Add a transition to the sink. The symbol joins the alphabet.
    ///
    /// # Errors
    ///
    /// Return a NFAError::EpsilonSymbol for the epsilon symbol.
    fn add_sink_transition(self, symb: &str, src: usize) -> Result<NFABuilder>;

    /// Add an epsilon transition to the NFA.
    fn add_e_transition(self, src: usize, dest: usize) -> Result<NFABuilder>;

    /// Finalize the building of the NFA.
    ///
    /// # Errors
    ///
    /// Return a NFAError::MissingAcceptState if no accept state is specified.
    fn finalize(self) -> Result<NFA>;
}

impl NFABuilder {
    /// Creates a new NFABuilder.
    pub fn new() -> Result<NFABuilder> {
        Ok(NFABuilder::default())
    }

    fn touch(&mut self, state: usize) {
        self.states = self.states.max(state + 1);
    }

    fn insert(&mut self, symb: &str, src: usize, dest: Target) {
        self.touch(src);
        if let Target::State(dest) = dest {
            self.touch(dest);
        }

        self.transitions
            .entry(src)
            .or_default()
            .entry(symb.to_owned())
            .or_default()
            .insert(dest);
    }

    fn add_consuming(mut self, symb: &str, src: usize, dest: Target) -> Result<NFABuilder> {
        if is_epsilon(symb) {
            return Err(NFAError::EpsilonSymbol);
        }

        self.alphabet.insert(symb.to_owned());
        self.insert(symb, src, dest);
        Ok(self)
    }
}

impl NFABuilding for NFABuilder {
    fn add_accept(self, state: usize) -> Result<NFABuilder> {
        Ok::<_, NFAError>(self).add_accept(state)
    }

    fn add_symbol(self, symb: &str) -> Result<NFABuilder> {
        Ok::<_, NFAError>(self).add_symbol(symb)
    }

    fn add_transition(self, symb: &str, src: usize, dest: usize) -> Result<NFABuilder> {
        Ok::<_, NFAError>(self).add_transition(symb, src, dest)
    }

    fn add_sink_transition(self, symb: &str, src: usize) -> Result<NFABuilder> {
        Ok::<_, NFAError>(self).add_sink_transition(symb, src)
    }

    fn add_e_transition(self, src: usize, dest: usize) -> Result<NFABuilder> {
        Ok::<_, NFAError>(self).add_e_transition(src, dest)
    }

    fn finalize(self) -> Result<NFA> {
        Ok::<_, NFAError>(self).finalize()
    }
}

/// Implementing NFABuilding trait for Result<NFABuilder> allows
/// to chain the return value of the NFABuilder instead of unwrapping them
/// at each stage of the building process.
impl NFABuilding for Result<NFABuilder> {
    fn add_accept(self, state: usize) -> Result<NFABuilder> {
        self.and_then(|mut nfa| {
            match nfa.accept {
                Some(accept) if accept != state => Err(NFAError::DuplicatedAcceptState(accept, state)),
                _ => {
                    nfa.accept = Some(state);
                    nfa.touch(state);
                    Ok(nfa)
                }
            }
        })
    }

    fn add_symbol(self, symb: &str) -> Result<NFABuilder> {
        self.and_then(|mut nfa| {
            if is_epsilon(symb) {
                return Err(NFAError::EpsilonSymbol);
            }
            nfa.alphabet.insert(symb.to_owned());
            Ok(nfa)
        })
    }

    fn add_transition(self, symb: &str, src: usize, dest: usize) -> Result<NFABuilder> {
        self.and_then(|nfa| nfa.add_consuming(symb, src, Target::State(dest)))
    }

    fn add_sink_transition(self, symb: &str, src: usize) -> Result<NFABuilder> {
        self.and_then(|nfa| nfa.add_consuming(symb, src, Target::Sink))
    }

    fn add_e_transition(self, src: usize, dest: usize) -> Result<NFABuilder> {
        self.map(|mut nfa| {
            nfa.insert(EPSILON, src, Target::State(dest));
            nfa
        })
    }

    fn finalize(self) -> Result<NFA> {
        self.and_then(|mut nfa| {
            let accept = nfa.accept.ok_or(NFAError::MissingAcceptState)?;
            let transitions = (0..nfa.states)
                .map(|state| nfa.transitions.remove(&state).unwrap_or_default())
                .collect();
            NFA::new(nfa.alphabet, transitions, accept)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    fn alphabet(symbols: &[&str]) -> BTreeSet<Symbol> {
        symbols.iter().map(|symbol| symbol.to_string()).collect()
    }

    fn entry(transitions: Vec<(&str, Vec<Target>)>) -> Transitions {
        transitions
            .into_iter()
            .map(|(symbol, targets)| (symbol.to_string(), targets.into_iter().collect()))
            .collect()
    }

    #[test]
    fn test_nfa() {
        let nfa = NFABuilder::new()
            .add_accept(3)
            .add_transition("a", 0, 1)
            .add_transition("c", 0, 3)
            .add_transition("b", 1, 2)
            .add_transition("a", 2, 1)
            .add_transition("c", 2, 3)
            .finalize()
            .unwrap();
        let samples =
            vec![("ababac", false),
                 ("ababc", true),
                 ("", false),
                 ("abc", true),
                 ("c", true),
                 ("ac", false),
                 ("ababababababababababababababababababababc", true),];

        for (input, expected_result) in samples {
            assert!(nfa.accepts(input) == expected_result, "input false for: \"{}\"", input);
        }
    }

    #[test]
    fn test_nfa_non_deterministic_choice() {
        // (a|ab)b: after reading "a" both states 1 and 2 are possible.
        let nfa = NFABuilder::new()
            .add_accept(3)
            .add_transition("a", 0, 1)
            .add_transition("a", 0, 2)
            .add_transition("b", 2, 1)
            .add_transition("b", 1, 3)
            .finalize()
            .unwrap();

        assert!(nfa.accepts("ab"));
        assert!(nfa.accepts("abb"));
        assert!(!nfa.accepts("a"));
        assert!(!nfa.accepts("abbb"));
    }

    #[test]
    fn test_nfa_multi_character_symbols() {
        // "ch" is a single symbol next to "c" and "h".
        let nfa = NFABuilder::new()
            .add_accept(2)
            .add_transition("ch", 0, 1)
            .add_transition("c", 0, 0)
            .add_transition("a", 1, 2)
            .add_sink_transition("h", 0)
            .finalize()
            .unwrap();

        assert!(nfa.accepts("cha"));
        assert!(nfa.accepts("ccha"));
        assert!(!nfa.accepts("ha"));
        assert!(!nfa.accepts("ch"));
    }

    #[test]
    fn test_nfa_epsilon_transitions() {
        let nfa = NFABuilder::new()
            .add_accept(3)
            .add_e_transition(0, 1)
            .add_transition("a", 1, 2)
            .add_e_transition(2, 3)
            .add_e_transition(0, 3)
            .finalize()
            .unwrap();

        assert!(nfa.accepts(""));
        assert!(nfa.accepts("a"));
        assert!(!nfa.accepts("aa"));
    }

    #[test]
    fn test_nfa_epsilon_cycle_terminates() {
        let nfa = NFABuilder::new()
            .add_accept(3)
            .add_e_transition(0, 1)
            .add_e_transition(1, 2)
            .add_e_transition(2, 0)
            .add_e_transition(1, 1)
            .add_transition("a", 2, 3)
            .add_symbol("b")
            .finalize()
            .unwrap();

        assert!(nfa.accepts("a"));
        assert!(!nfa.accepts(""));
        assert!(!nfa.accepts("b"));
        assert!(!nfa.accepts("aa"));
    }

    #[test]
    fn test_nfa_sink_never_accepts() {
        let nfa = NFA::new(
            alphabet(&["a"]),
            vec![
                entry(vec![("a", vec![Target::Sink, Target::State(1)]), ("", vec![Target::Sink])]),
                entry(vec![("a", vec![Target::Sink])]),
            ],
            1,
        )
        .unwrap();

        assert!(nfa.accepts("a"));
        assert!(!nfa.accepts(""));
        assert!(!nfa.accepts("aa"));
    }

    #[test]
    fn test_nfa_empty_alphabet() {
        let nfa = NFA::new(BTreeSet::new(), vec![Transitions::new()], 0).unwrap();

        assert!(nfa.accepts(""));
        assert!(!nfa.accepts("a"));
    }

    #[test]
    fn test_nfa_empty_table() {
        let nfa = NFA::new(alphabet(&["a"]), Vec::new(), 0).unwrap();

        assert_eq!(nfa.num_of_states(), 0);
        assert!(nfa.accepts(""));
        assert!(!nfa.accepts("a"));
    }

    #[test]
    fn test_nfa_empty_table_with_accept() {
        assert_eq!(NFA::new(alphabet(&["a"]), Vec::new(), 2), Err(NFAError::EmptyTransitionTable(2)));
    }

    #[test]
    fn test_nfa_accept_out_of_range() {
        assert_eq!(
            NFA::new(alphabet(&["a"]), vec![Transitions::new()], 1),
            Err(NFAError::AcceptStateOutOfRange { accept: 1, states: 1 })
        );
    }

    #[test]
    fn test_nfa_target_out_of_range() {
        let result = NFA::new(
            alphabet(&["a"]),
            vec![entry(vec![("a", vec![Target::Sink, Target::State(2)])]), Transitions::new()],
            1,
        );

        assert_eq!(
            result,
            Err(NFAError::TargetOutOfRange { state: 0, symbol: "a".to_owned(), target: 2, states: 2 })
        );
    }

    #[test]
    fn test_nfa_unknown_symbol() {
        let result = NFA::new(
            alphabet(&["a"]),
            vec![entry(vec![("b", vec![Target::State(1)])]), Transitions::new()],
            1,
        );

        assert_eq!(result, Err(NFAError::UnknownSymbol { state: 0, symbol: "b".to_owned() }));
    }

    #[test]
    fn test_nfa_targets() {
        let nfa = NFABuilder::new()
            .add_accept(2)
            .add_transition("a", 0, 1)
            .add_transition("a", 0, 2)
            .add_sink_transition("a", 0)
            .finalize()
            .unwrap();

        assert_eq!(nfa.targets(0, "a").collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(nfa.targets(1, "a").count(), 0);
        assert_eq!(nfa.targets(0, EPSILON).count(), 0);
    }

    #[test]
    fn test_nfa_display() {
        let nfa = NFABuilder::new()
            .add_accept(1)
            .add_transition("a", 0, 1)
            .add_e_transition(1, 0)
            .add_sink_transition("a", 1)
            .finalize()
            .unwrap();

        assert_eq!(
            nfa.to_string(),
            "ACCEPT: 1\n\
             ALPHABET: {a}\n\
             TRANSITIONS:\n  \
             (a,0) => {1}\n  \
             (ε,1) => {0}\n  \
             (a,1) => {-}\n"
        );
    }

    #[test]
    fn test_nfa_builder() {
        let nfa = NFABuilder::new()
            .add_accept(5)
            .add_transition("a", 0, 1)
            .finalize()
            .unwrap();

        assert_eq!(nfa.num_of_states(), 6);
        assert_eq!(nfa.accept_state(), 5);
        assert_eq!(nfa.alphabet(), &alphabet(&["a"]));
    }

    #[test]
    fn test_nfa_builder_missing_accept() {
        let nfa = NFABuilder::new()
            .add_transition("a", 0, 1)
            .finalize();
        match nfa {
            Err(NFAError::MissingAcceptState) => assert!(true),
            _ => assert!(false, "MissingAcceptState expected."),
        }
    }

    #[test]
    fn test_nfa_builder_duplicated_accept() {
        let nfa = NFABuilder::new()
            .add_accept(1)
            .add_accept(1)
            .add_accept(2)
            .add_transition("a", 0, 1)
            .finalize();
        match nfa {
            Err(NFAError::DuplicatedAcceptState(first, second)) => assert!((first, second) == (1, 2)),
            _ => assert!(false, "DuplicatedAcceptState expected."),
        }
    }

    #[test]
    fn test_nfa_builder_epsilon_symbol() {
        let nfa = NFABuilder::new()
            .add_accept(1)
            .add_transition(EPSILON, 0, 1)
            .finalize();
        match nfa {
            Err(NFAError::EpsilonSymbol) => assert!(true),
            _ => assert!(false, "EpsilonSymbol expected."),
        }
    }
}
