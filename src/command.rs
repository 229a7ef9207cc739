//! Command surface over [`Index`]: text lines are parsed into [`Command`]
//! values, and a [`Dispatcher`] applies them to an index it borrows
//! mutably, answering with a [`Response`].

use std::{fmt, path::PathBuf, str::FromStr};

use log::{debug, info, warn};

use crate::error::CommandError;
use crate::export;
use crate::Index;

/// Usage text for the command surface.
pub const HELP: &str = "\
insert <id> <name>   add a student
delete <id>          remove a student
search <id>          look up a student
list                 list students in id order
show                 render the tree
export <path>        write students to a CSV file
help                 this text";

/// Command requests understood by the [`Dispatcher`].
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Insert { id: i64, label: String },
    Delete { id: i64 },
    Search { id: i64 },
    List,
    Show,
    Export { path: PathBuf },
    Help,
}

impl FromStr for Command {
    type Err = CommandError;

    /// Parse a single line, `<command> [arguments]`. The label of an
    /// insert is the rest of the line after the id, and may be empty.
    fn from_str(line: &str) -> Result<Command, CommandError> {
        let line = line.trim();
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        match name.to_lowercase().as_str() {
            "insert" | "add" => {
                let (id, label) = match rest.split_once(char::is_whitespace) {
                    Some((id, label)) => (id, label.trim()),
                    None => (rest, ""),
                };
                let id = parse_id("insert", id)?;
                let label = label.to_string();
                Ok(Command::Insert { id, label })
            }
            "delete" | "remove" => Ok(Command::Delete {
                id: parse_id("delete", rest)?,
            }),
            "search" | "find" => Ok(Command::Search {
                id: parse_id("search", rest)?,
            }),
            "list" => Ok(Command::List),
            "show" => Ok(Command::Show),
            "export" if rest.is_empty() => Err(CommandError::MissingArgument {
                command: "export",
                argument: "path",
            }),
            "export" => Ok(Command::Export {
                path: PathBuf::from(rest),
            }),
            "help" | "?" => Ok(Command::Help),
            _ => Err(CommandError::UnknownCommand(name.to_string())),
        }
    }
}

fn parse_id(command: &'static str, arg: &str) -> Result<i64, CommandError> {
    if arg.is_empty() {
        let argument = "id";
        return Err(CommandError::MissingArgument { command, argument });
    }
    arg.parse::<i64>()
        .map_err(|_| CommandError::InvalidId(arg.to_string()))
}

/// Outcome of a dispatched [`Command`].
#[derive(Clone, Debug, PartialEq)]
pub enum Response {
    Inserted { id: i64 },
    /// `label` is None when `id` was not present.
    Deleted { id: i64, label: Option<String> },
    Found { id: i64, label: String },
    NotFound { id: i64 },
    Listing(Vec<(i64, String)>),
    Tree(String),
    Exported { path: PathBuf, rows: usize },
    Help,
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Response::Inserted { id } => write!(f, "Student ID {} added.", id),
            Response::Deleted { id, label: Some(_) } => {
                write!(f, "Student ID {} removed.", id)
            }
            Response::Deleted { id, label: None } => {
                write!(f, "Student ID {} does not exist in the tree.", id)
            }
            Response::Found { id, label } => {
                write!(f, "Student ID: {}, Name: {}", id, label)
            }
            Response::NotFound { id } => {
                write!(f, "Student ID {} does not exist in the tree.", id)
            }
            Response::Listing(entries) if entries.is_empty() => {
                write!(f, "No students found.")
            }
            Response::Listing(entries) => {
                let lines: Vec<String> = entries
                    .iter()
                    .map(|(id, label)| format!("ID: {}, Name: {}", id, label))
                    .collect();
                write!(f, "{}", lines.join("\n"))
            }
            Response::Tree(tree) if tree.is_empty() => write!(f, "(empty)"),
            Response::Tree(tree) => write!(f, "{}", tree.trim_end()),
            Response::Exported { path, rows } => write!(
                f,
                "Students have been successfully exported to {} ({} rows)",
                path.display(),
                rows
            ),
            Response::Help => write!(f, "{}", HELP),
        }
    }
}

/// Dispatcher owns the mutable borrow of an [`Index`] for the duration
/// of a session and routes every [`Command`] to it.
pub struct Dispatcher<'a> {
    index: &'a mut Index,
}

impl<'a> Dispatcher<'a> {
    pub fn new(index: &'a mut Index) -> Dispatcher<'a> {
        Dispatcher { index }
    }

    /// Return the index this dispatcher operates on.
    pub fn index(&self) -> &Index {
        self.index
    }

    /// Parse `line` and dispatch the resulting command.
    pub fn dispatch_line(&mut self, line: &str) -> Result<Response, CommandError> {
        let command = line.parse::<Command>().map_err(|err| {
            warn!("rejected input {:?}: {}", line, err);
            err
        })?;
        self.dispatch(command)
    }

    pub fn dispatch(&mut self, command: Command) -> Result<Response, CommandError> {
        let resp = match command {
            Command::Insert { id, label } => {
                self.index.insert(id, label);
                debug!("{}: insert {}, {} entries", self.index.id(), id, self.index.len());
                Response::Inserted { id }
            }
            Command::Delete { id } => {
                let label = self.index.delete(&id);
                debug!("{}: delete {} -> {:?}", self.index.id(), id, label);
                Response::Deleted { id, label }
            }
            Command::Search { id } => match self.index.get(&id) {
                Some(label) => Response::Found {
                    id,
                    label: label.clone(),
                },
                None => Response::NotFound { id },
            },
            Command::List => {
                let entries = self.index.in_order();
                info!("{}: listing {} entries", self.index.id(), entries.len());
                Response::Listing(entries)
            }
            Command::Show => Response::Tree(self.index.pretty()),
            Command::Export { path } => {
                let entries = self.index.in_order();
                if entries.is_empty() {
                    return Err(CommandError::NothingToExport);
                }
                let rows = export::export_to_path(&path, &entries)?;
                Response::Exported { path, rows }
            }
            Command::Help => Response::Help,
        };
        Ok(resp)
    }
}
