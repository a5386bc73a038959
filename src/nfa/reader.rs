// Copyright 2016 Vincent Vigneron. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at.your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::num;
use std::path::Path;
use std::result;

use itertools::Itertools;
use log::debug;
use thiserror::Error;

use crate::nfa::core::{NFABuilder, NFABuilding, NFAError, NFA};

/// Token used as destination of a transition to the sink.
pub const SINK_TOKEN: &str = "-";

/// Type `NFAReaderError` describes the list of errors that can occur during
/// the parsing of a NFA file.
#[derive(Debug, Error)]
pub enum NFAReaderError {
    /// Error `MissingAcceptState` means the file does not contain the accept state.
    #[error("The file is empty or only contains white characters.")]
    MissingAcceptState,
    /// Error `IncompleteTransition` means the transition on the specified line only
    /// contains one element.
    #[error("Line {0}: missing the src or the dest state.")]
    IncompleteTransition(usize),
    /// Error `IllformedTransition` means the transition contains too many elements.
    #[error("Line {0}: too much elements.")]
    IllformedTransition(usize),
    /// Error `NFA` encapsulates the errors of the NFA building process (no accept
    /// state,...). The line is 0 when the error is raised once the whole file is read.
    #[error("Line {1}: NFAError {0}")]
    NFA(#[source] NFAError, usize),
    /// Error `Io` is relative to the input errors (the file does not exist, the file
    /// can not be read,...).
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Error `Parse` is relative to the parsing errors (a state is an integer).
    #[error("Line {1}: parse error {0}")]
    Parse(#[source] num::ParseIntError, usize),
}

/// Alias for result::Result<T,NFAReaderError>.
pub type Result<T> = result::Result<T, NFAReaderError>;

/// Struct `NFAReader` is an empty structure that builds a `NFA` from a file
/// or from a `&str`.
///
/// The first non-empty line holds the accept state. Every following line is a
/// transition, either `symbol src dest` or `src dest` for an epsilon transition.
/// The destination `-` stands for the sink. Symbols may be longer than one
/// character. Everything after a `#` is a comment.
pub struct NFAReader;

impl NFAReader {
    fn parse_state(contents: &str, line: usize) -> Result<usize> {
        contents.parse::<usize>().map_err(|e| NFAReaderError::Parse(e, line))
    }

    /// Reads a NFA from a file.
    ///
    /// # Description
    ///
    /// * `file_path` - The path to the file that contains the NFA.
    ///
    /// # Examples
    ///
    /// ```
    /// use thompson_nfa::nfa::reader::*;
    ///
    /// let nfa = NFAReader::new_from_file("nfa.txt");
    /// match nfa {
    ///     Ok(nfa) => {
    ///        // Do stuff with the nfa
    ///     },
    ///     Err(e) => println!("{}", e),
    /// }
    /// ```
    pub fn new_from_file<P: AsRef<Path>>(file_path: P) -> Result<NFA> {
        debug!("Reading NFA from {}", file_path.as_ref().display());
        let file = BufReader::new(File::open(file_path)?);
        NFAReader::new_from_lines(file.lines())
    }

    fn read_accept<I>(nfa: NFABuilder, lines: &mut I) -> Result<NFABuilder>
    where
        I: Iterator<Item = (usize, io::Result<String>)>,
    {
        let (nline, line) = lines.next().ok_or(NFAReaderError::MissingAcceptState)?;
        let line = line?;
        line.split_whitespace()
            .map(|token| NFAReader::parse_state(token, nline))
            .fold_ok(Ok::<_, NFAError>(nfa), |acc, state| acc.add_accept(state))?
            .map_err(|e| NFAReaderError::NFA(e, nline))
    }

    fn read_transition(nfa: NFABuilder, (nline, line): (usize, io::Result<String>)) -> Result<NFABuilder> {
        let line = line?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let nfa = match tokens.as_slice() {
            [symb, src, dest] => {
                let src = NFAReader::parse_state(src, nline)?;
                if *dest == SINK_TOKEN {
                    nfa.add_sink_transition(symb, src)
                } else {
                    nfa.add_transition(symb, src, NFAReader::parse_state(dest, nline)?)
                }
            }
            [src, dest] => {
                let src = NFAReader::parse_state(src, nline)?;
                nfa.add_e_transition(src, NFAReader::parse_state(dest, nline)?)
            }
            [_] => return Err(NFAReaderError::IncompleteTransition(nline)),
            _ => return Err(NFAReaderError::IllformedTransition(nline)),
        };
        nfa.map_err(|e| NFAReaderError::NFA(e, nline))
    }

    fn new_from_lines<I>(lines: I) -> Result<NFA>
    where
        I: Iterator<Item = io::Result<String>>,
    {
        let nfa = NFABuilder::new().map_err(|e| NFAReaderError::NFA(e, 0))?;
        let mut lines = lines
            .map(|line| line.map(|contents| contents.split('#').next().unwrap_or("").trim().to_owned()))
            .enumerate()
            .map(|(nline, line)| (nline + 1, line))
            .filter(|(_, line)| line.as_ref().map_or(true, |line| !line.is_empty()));

        let nfa = NFAReader::read_accept(nfa, &mut lines)?;
        let nfa = lines.try_fold(nfa, NFAReader::read_transition)?;
        let nfa = nfa.finalize().map_err(|e| NFAReaderError::NFA(e, 0))?;
        debug!("Read NFA with {} states", nfa.num_of_states());
        Ok(nfa)
    }

    /// Reads a NFA from a `&str`.
    ///
    /// # Description
    ///
    /// * `nfa` - The string representation of the NFA.
    ///
    /// # Examples
    ///
    /// ```
    /// use thompson_nfa::nfa::reader::*;
    ///
    /// // (abc)*
    /// let nfa =
    ///     "0\n\
    ///      0 1\n\
    ///      a 1 2\n\
    ///      b 2 3\n\
    ///      c 3 4\n\
    ///      4 0";
    /// let nfa = NFAReader::new_from_string(nfa).unwrap();
    /// assert!(nfa.accepts("abcabc"));
    /// assert!(!nfa.accepts("ab"));
    /// ```
    pub fn new_from_string(nfa: &str) -> Result<NFA> {
        NFAReader::new_from_lines(nfa.lines().map(|line| Ok(line.to_string())))
    }
}
