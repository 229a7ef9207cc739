use std::io;

use thiserror::Error as ThisError;

/// AvlError enumerates over all the invariant violations that
/// [`Avl::validate`](crate::Avl::validate) can detect. None of these
/// are expected on a tree mutated only through the public API.
#[derive(Debug, PartialEq, ThisError)]
pub enum AvlError<K> {
    /// Fatal case, index entries are not in sort-order.
    #[error("index entries out of order: {0:?} before {1:?}")]
    SortError(K, K),
    /// Fatal case, heights of left and right subtree differ by more
    /// than one.
    #[error("node {key:?} is unbalanced, balance factor {balance}")]
    UnbalancedNode { key: K, balance: isize },
    /// Fatal case, cached height does not match subtree height.
    #[error("node {key:?} caches height {cached}, actual {actual}")]
    HeightMismatch {
        key: K,
        cached: usize,
        actual: usize,
    },
    /// Fatal case, entry count does not match the number of nodes.
    #[error("index counts {expected} entries, found {found} nodes")]
    CountMismatch { expected: usize, found: usize },
}

/// CommandError is returned by the command surface, before or while
/// calling into the index.
#[derive(Debug, ThisError)]
pub enum CommandError {
    /// Identifier is not a valid integer.
    #[error("invalid id {0:?}, please enter an integer value for ID")]
    InvalidId(String),
    /// Command is missing a required argument.
    #[error("{command}: missing argument <{argument}>")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[error("unknown command {0:?}, try `help`")]
    UnknownCommand(String),
    /// Export requested on an empty index.
    #[error("no students found to export")]
    NothingToExport,
    #[error("export failed: {0}")]
    Export(#[from] io::Error),
}
