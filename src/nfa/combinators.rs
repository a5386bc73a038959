// Copyright 2016 Vincent Vigneron. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at.your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Thompson construction: every combinator copies its operands into a fresh
//! transition table, so the operands are never modified and never shared.

use std::collections::BTreeSet;
use std::iter;

use log::debug;

use crate::nfa::core::{NFABuilder, NFABuilding, Result, Symbol, Target, Transitions, EPSILON, NFA};

impl NFA {
    /// Creates the automaton accepting exactly the single symbol `symb`.
    ///
    /// # Errors
    ///
    /// Return a NFAError::EpsilonSymbol for the epsilon symbol, use `NFA::epsilon`
    /// instead.
    ///
    /// # Examples
    ///
    /// ```
    /// use thompson_nfa::nfa::core::NFA;
    ///
    /// let nfa = NFA::symbol("ch").unwrap();
    /// assert!(nfa.accepts("ch"));
    /// assert!(!nfa.accepts("c"));
    /// ```
    pub fn symbol(symb: &str) -> Result<NFA> {
        NFABuilder::new()
            .add_accept(1)
            .add_transition(symb, 0, 1)
            .add_sink_transition(symb, 1)
            .finalize()
    }

    /// Creates the automaton accepting only the empty string.
    pub fn epsilon() -> NFA {
        let alphabet: BTreeSet<Symbol> = iter::once(EPSILON.to_owned()).collect();
        let transitions = vec![sink_entry(&alphabet)];
        NFA::from_parts(alphabet, transitions, 0)
    }
}

fn sink_only() -> BTreeSet<Target> {
    BTreeSet::from([Target::Sink])
}

/// A state that has a transition to the sink, and only to the sink, for every symbol.
fn sink_entry(alphabet: &BTreeSet<Symbol>) -> Transitions {
    alphabet.iter().map(|symbol| (symbol.clone(), sink_only())).collect()
}

/// Number of entries an operand occupies in a combined table. The trivial automaton
/// without a table occupies a single sink-only state.
fn footprint(nfa: &NFA) -> usize {
    nfa.num_of_states().max(1)
}

/// The union of the alphabets of `automata`, epsilon included.
fn merge_alphabets(automata: &[&NFA]) -> BTreeSet<Symbol> {
    automata
        .iter()
        .flat_map(|nfa| nfa.alphabet().iter().cloned())
        .chain(iter::once(EPSILON.to_owned()))
        .collect()
}

/// Adds the epsilon transition `from -> to`. A sink in the same target set is dropped.
fn link(transitions: &mut [Transitions], from: usize, to: usize) {
    let targets = transitions[from].entry(EPSILON.to_owned()).or_default();
    targets.remove(&Target::Sink);
    targets.insert(Target::State(to));
}

/// Copies `table` for use inside a larger automaton over `alphabet`, which must
/// contain every symbol used in `table`.
///
/// The first `omit_first` entries are skipped. Every copied entry gets a target set
/// for each symbol of `alphabet`: the original targets moved by `offset`, or only the
/// sink when the original entry has no transition for that symbol. The sink is never
/// moved. An empty `table` is copied as a single sink-only state.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use thompson_nfa::nfa::combinators::copy_transitions;
/// use thompson_nfa::nfa::core::{NFA, Target};
///
/// let a = NFA::symbol("a").unwrap();
/// let alphabet: BTreeSet<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
/// let copy = copy_transitions(a.transitions(), &alphabet, 3, 0);
///
/// assert!(copy[0]["a"].contains(&Target::State(4)));
/// assert!(copy[0]["b"].contains(&Target::Sink));
/// ```
pub fn copy_transitions(table: &[Transitions], alphabet: &BTreeSet<Symbol>, offset: usize, omit_first: usize) -> Vec<Transitions> {
    if table.is_empty() {
        return iter::once(sink_entry(alphabet)).skip(omit_first).collect();
    }

    table
        .iter()
        .skip(omit_first)
        .map(|entry| {
            alphabet
                .iter()
                .map(|symbol| {
                    let targets = match entry.get(symbol) {
                        Some(targets) if !targets.is_empty() => {
                            targets.iter().map(|target| target.shift(offset)).collect()
                        }
                        _ => sink_only(),
                    };
                    (symbol.clone(), targets)
                })
                .collect()
        })
        .collect()
}

/// Creates the automaton accepting the words of `a` followed by the words of `b`.
///
/// The states of `a` keep their indices and the states of `b` follow them. The accept
/// state of `a` is linked to the start of `b` by an epsilon transition instead of
/// being merged with it, so the outgoing transitions of both stay intact.
///
/// # Examples
///
/// ```
/// use thompson_nfa::nfa::combinators::concat;
/// use thompson_nfa::nfa::core::NFA;
///
/// let a = NFA::symbol("a").unwrap();
/// let b = NFA::symbol("b").unwrap();
/// let ab = concat(&a, &b);
///
/// assert!(ab.accepts("ab"));
/// assert!(!ab.accepts("a"));
/// ```
pub fn concat(a: &NFA, b: &NFA) -> NFA {
    let alphabet = merge_alphabets(&[a, b]);
    let offset = footprint(a);

    let mut transitions = copy_transitions(a.transitions(), &alphabet, 0, 0);
    transitions.extend(copy_transitions(b.transitions(), &alphabet, offset, 0));
    link(&mut transitions, a.accept_state(), offset);

    debug!(
        "Concatenated automata with {} and {} states into {} states",
        a.num_of_states(),
        b.num_of_states(),
        transitions.len()
    );
    NFA::from_parts(alphabet, transitions, offset + b.accept_state())
}

/// Creates the automaton accepting the words of `a` and the words of `b`.
///
/// A new start state branches into both operands with epsilon transitions, and both
/// accept states lead to a new accept state at the end of the table.
pub fn disjunction(a: &NFA, b: &NFA) -> NFA {
    let alphabet = merge_alphabets(&[a, b]);
    let left = 1;
    let right = left + footprint(a);
    let accept = right + footprint(b);

    let mut transitions = Vec::with_capacity(accept + 1);
    transitions.push(sink_entry(&alphabet));
    transitions.extend(copy_transitions(a.transitions(), &alphabet, left, 0));
    transitions.extend(copy_transitions(b.transitions(), &alphabet, right, 0));
    transitions.push(sink_entry(&alphabet));

    link(&mut transitions, 0, left);
    link(&mut transitions, 0, right);
    link(&mut transitions, left + a.accept_state(), accept);
    link(&mut transitions, right + b.accept_state(), accept);

    debug!(
        "Disjunction of automata with {} and {} states into {} states",
        a.num_of_states(),
        b.num_of_states(),
        transitions.len()
    );
    NFA::from_parts(alphabet, transitions, accept)
}

/// Creates the Kleene closure of `a`: zero or more words of `a` in sequence.
///
/// State 0 is both the start and the accept state; it enters `a` through an epsilon
/// transition, and the accept state of `a` leads back to the start of `a` and to
/// state 0.
///
/// # Examples
///
/// ```
/// use thompson_nfa::nfa::combinators::repetition;
/// use thompson_nfa::nfa::core::NFA;
///
/// let many = repetition(&NFA::symbol("ab").unwrap());
///
/// assert!(many.accepts(""));
/// assert!(many.accepts("abab"));
/// assert!(!many.accepts("aba"));
/// ```
pub fn repetition(a: &NFA) -> NFA {
    let alphabet = merge_alphabets(&[a]);
    let start = 1;
    let end = start + a.accept_state();

    let mut transitions = vec![sink_entry(&alphabet)];
    transitions.extend(copy_transitions(a.transitions(), &alphabet, start, 0));

    link(&mut transitions, 0, start);
    link(&mut transitions, end, start);
    link(&mut transitions, end, 0);

    debug!("Repetition of an automaton with {} states into {} states", a.num_of_states(), transitions.len());
    NFA::from_parts(alphabet, transitions, 0)
}
