use std::{env, fs, path::PathBuf, process};

use crate::command::{Command, Dispatcher, Response};
use crate::error::CommandError;
use crate::export;
use crate::Index;

#[test]
fn test_parse() {
    let cmd: Command = "insert 7 Ana Maria".parse().unwrap();
    let label = "Ana Maria".to_string();
    assert_eq!(cmd, Command::Insert { id: 7, label });

    let cmd: Command = "  ADD -3  ".parse().unwrap();
    let label = "".to_string();
    assert_eq!(cmd, Command::Insert { id: -3, label });

    assert_eq!("delete 4".parse::<Command>().unwrap(), Command::Delete { id: 4 });
    assert_eq!("search 9".parse::<Command>().unwrap(), Command::Search { id: 9 });
    assert_eq!("list".parse::<Command>().unwrap(), Command::List);
    assert_eq!("show".parse::<Command>().unwrap(), Command::Show);
    assert_eq!("help".parse::<Command>().unwrap(), Command::Help);

    let cmd: Command = "export out dir/students.csv".parse().unwrap();
    let path = PathBuf::from("out dir/students.csv");
    assert_eq!(cmd, Command::Export { path });
}

#[test]
fn test_parse_errors() {
    match "insert abc Ana".parse::<Command>() {
        Err(CommandError::InvalidId(arg)) => assert_eq!(arg, "abc"),
        res => panic!("unexpected {:?}", res),
    }
    match "delete 1.5".parse::<Command>() {
        Err(CommandError::InvalidId(arg)) => assert_eq!(arg, "1.5"),
        res => panic!("unexpected {:?}", res),
    }
    match "search".parse::<Command>() {
        Err(CommandError::MissingArgument { command, argument }) => {
            assert_eq!((command, argument), ("search", "id"))
        }
        res => panic!("unexpected {:?}", res),
    }
    match "export".parse::<Command>() {
        Err(CommandError::MissingArgument { argument, .. }) => assert_eq!(argument, "path"),
        res => panic!("unexpected {:?}", res),
    }
    match "frobnicate 1".parse::<Command>() {
        Err(CommandError::UnknownCommand(name)) => assert_eq!(name, "frobnicate"),
        res => panic!("unexpected {:?}", res),
    }
}

#[test]
fn test_dispatch() {
    let mut index = Index::new("test-index");
    let mut dispatcher = Dispatcher::new(&mut index);

    let resp = dispatcher.dispatch_line("insert 20 Beto").unwrap();
    assert_eq!(resp, Response::Inserted { id: 20 });
    dispatcher.dispatch_line("insert 10 Ana").unwrap();
    dispatcher.dispatch_line("insert 30 Carla").unwrap();

    let resp = dispatcher.dispatch_line("search 10").unwrap();
    assert_eq!(resp.to_string(), "Student ID: 10, Name: Ana");
    let resp = dispatcher.dispatch_line("search 999").unwrap();
    assert_eq!(resp, Response::NotFound { id: 999 });
    assert_eq!(resp.to_string(), "Student ID 999 does not exist in the tree.");

    let resp = dispatcher.dispatch_line("list").unwrap();
    let expected = "ID: 10, Name: Ana\nID: 20, Name: Beto\nID: 30, Name: Carla";
    assert_eq!(resp.to_string(), expected);

    let resp = dispatcher.dispatch_line("delete 20").unwrap();
    let label = Some("Beto".to_string());
    assert_eq!(resp, Response::Deleted { id: 20, label });
    let resp = dispatcher.dispatch_line("delete 20").unwrap();
    assert_eq!(resp, Response::Deleted { id: 20, label: None });

    assert!(dispatcher.dispatch_line("delete twenty").is_err());
    assert_eq!(dispatcher.index().len(), 2);
    assert!(dispatcher.index().validate().is_ok());

    let resp = dispatcher.dispatch(Command::Show).unwrap();
    assert_eq!(resp.to_string(), "30: Carla (h=2)\n    10: Ana (h=1)");

    drop(dispatcher);
    assert_eq!(index.len(), 2);
}

#[test]
fn test_dispatch_empty() {
    let mut index = Index::new("test-index");
    let mut dispatcher = Dispatcher::new(&mut index);

    let resp = dispatcher.dispatch(Command::List).unwrap();
    assert_eq!(resp, Response::Listing(vec![]));
    assert_eq!(resp.to_string(), "No students found.");
    let resp = dispatcher.dispatch(Command::Show).unwrap();
    assert_eq!(resp.to_string(), "(empty)");

    let path = PathBuf::from("never-written.csv");
    match dispatcher.dispatch(Command::Export { path }) {
        Err(CommandError::NothingToExport) => (),
        res => panic!("unexpected {:?}", res),
    }
}

#[test]
fn test_write_csv() {
    let rows = vec![
        (1_i64, "Ana".to_string()),
        (2, "Perez, Beto".to_string()),
        (3, "".to_string()),
    ];
    let mut buf: Vec<u8> = vec![];
    assert_eq!(export::write_csv(&mut buf, &rows).unwrap(), 3);
    let text = String::from_utf8(buf).unwrap();
    assert_eq!(text, "ID,Nombre\n1,Ana\n2,\"Perez, Beto\"\n3,\n");

    let mut buf: Vec<u8> = vec![];
    let rows: Vec<(i64, String)> = vec![];
    assert_eq!(export::write_csv(&mut buf, &rows).unwrap(), 0);
    assert_eq!(String::from_utf8(buf).unwrap(), "ID,Nombre\n");
}

#[test]
fn test_dispatch_export() {
    let mut index = Index::new("test-index");
    let mut dispatcher = Dispatcher::new(&mut index);
    for line in ["insert 3 Carla", "insert 1 Ana", "insert 2 Beto"].iter() {
        dispatcher.dispatch_line(line).unwrap();
    }

    let name = format!("avl-index-export-{}.csv", process::id());
    let path = env::temp_dir().join(name);
    let command = Command::Export { path: path.clone() };
    let resp = dispatcher.dispatch(command).unwrap();
    assert_eq!(resp, Response::Exported { path: path.clone(), rows: 3 });

    let text = fs::read_to_string(&path).unwrap();
    fs::remove_file(&path).unwrap();
    assert_eq!(text, "ID,Nombre\n1,Ana\n2,Beto\n3,Carla\n");
}

#[test]
fn test_export_empty_path() {
    // only the dispatcher refuses an empty index, the writer does not.
    let name = format!("avl-index-empty-{}.csv", process::id());
    let path = env::temp_dir().join(name);
    let rows: Vec<(i64, String)> = vec![];
    assert_eq!(export::export_to_path(&path, &rows).unwrap(), 0);

    let text = fs::read_to_string(&path).unwrap();
    fs::remove_file(&path).unwrap();
    assert_eq!(text, "ID,Nombre\n");
}
