// Copyright 2016 Vincent Vigneron. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at.your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

#![deny(missing_docs)]

//! Non-deterministic finite automata with epsilon transitions, and the
//! concatenation, disjunction and repetition combinators of the Thompson
//! construction.
//!
//! ```
//! use thompson_nfa::nfa::combinators::{concat, disjunction, repetition};
//! use thompson_nfa::nfa::core::NFA;
//!
//! // (a|b)*abb
//! let a = NFA::symbol("a").unwrap();
//! let b = NFA::symbol("b").unwrap();
//! let nfa = concat(&concat(&concat(&repetition(&disjunction(&a, &b)), &a), &b), &b);
//!
//! assert!(nfa.accepts("abb"));
//! assert!(nfa.accepts("babaabb"));
//! assert!(!nfa.accepts("abba"));
//! ```

/// nfa api
pub mod nfa;
