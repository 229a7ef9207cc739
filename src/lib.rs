mod avl;
mod depth;
mod error;

pub mod command;
pub mod config;
pub mod export;

pub use crate::avl::{get_balance, get_height, Avl, Iter, Node, Stats};
pub use crate::depth::Depth;
pub use crate::error::{AvlError, CommandError};

/// Index of students, keyed by integer id with the student name as label.
pub type Index = Avl<i64, String>;

#[cfg(test)]
mod command_test;
