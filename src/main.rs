// Interactive shell over the student index. Every line is parsed into a
// command and handed to the dispatcher, results are printed, invalid
// input is reported and the session carries on.
//
// Session flow:
// * Optionally replay commands from `--load`.
// * Read lines until `quit`, `exit`, Ctrl-C or Ctrl-D.
// * Optionally export all students to `--export` on the way out.

use std::{error::Error, fs, process};

use clap::Parser;
use log::{error, info};
use rustyline::{error::ReadlineError, DefaultEditor};

use avl_index::{command::Dispatcher, config::Config, export, Index};

fn main() {
    if let Err(err) = run() {
        eprintln!("avl-index: {}", err);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = Config::parse();
    config.init_logging()?;

    let mut index = Index::new("students");
    let mut dispatcher = Dispatcher::new(&mut index);

    if let Some(path) = &config.load {
        let script = fs::read_to_string(path)?;
        for line in script.lines().filter(|line| !line.trim().is_empty()) {
            if let Err(err) = dispatcher.dispatch_line(line) {
                error!("{:?}: {}", line, err);
            }
        }
        info!("loaded {} entries from {:?}", dispatcher.index().len(), path);
    }

    let mut rl = DefaultEditor::new()?;
    if let Some(path) = &config.history {
        // missing history on first run is fine.
        rl.load_history(path).ok();
    }

    loop {
        let line = match rl.readline("avl> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        rl.add_history_entry(line)?;
        if matches!(line, "quit" | "exit") {
            break;
        }
        match dispatcher.dispatch_line(line) {
            Ok(resp) => println!("{}", resp),
            Err(err) => println!("error: {}", err),
        }
    }

    if let Some(path) = &config.history {
        rl.save_history(path)?;
    }
    let stats = dispatcher.index().validate()?;
    info!("session ends with {} entries, height {}", stats.entries(), stats.height());
    if let Some(depths) = stats.depths() {
        depths.log_summary("students: ", stats.entries());
    }
    if let Some(path) = &config.export {
        let entries = dispatcher.index().in_order();
        let n = export::export_to_path(path, &entries)?;
        println!("exported {} students to {}", n, path.display());
    }
    Ok(())
}
