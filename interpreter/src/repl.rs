use anyhow::Result;
use rustyline::{error::ReadlineError, DefaultEditor};
use tracing::debug;

use toyrobot_lib::vm::Vm;

const PROMPT: &str = ">> ";

/// Reads programs line by line until Ctrl-C or Ctrl-D. One VM serves the
/// whole session, so the robot and the stack survive from line to line. A
/// failing line is reported and the session goes on.
pub fn run() -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let mut vm = Vm::new();

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                rl.add_history_entry(line.as_str())?;
                if let Err(e) = vm.run(&line) {
                    eprintln!("{}", e);
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                debug!("leaving repl");
                return Ok(());
            }
            Err(other) => return Err(other.into()),
        }
    }
}
