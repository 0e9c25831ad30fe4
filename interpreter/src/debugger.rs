use std::io::{Stdout, Write};

use anyhow::{anyhow, Result};
use crossterm::{self as ct, terminal};
use rustyline::{error::ReadlineError, DefaultEditor};
use toyrobot_lib::bytecode::{self, Listing};
use toyrobot_lib::vm::{ExecOutcome, Stack, Tape, Vm};

#[derive(PartialEq, Clone, Copy)]
enum UserCommand {
    Next,
    LastCommand,
    ShowStack,
    ShowBoard,
    Quit,
}

/// what the lower right pane shows
#[derive(Clone, Copy)]
enum View {
    Stack,
    Board,
}

pub fn run(code: &[u8], src: &str, stdout: &mut Stdout) -> Result<()> {
    let listing = bytecode::disassemble(code)?;
    let mut vm = Vm::with_output(vec![]);
    let mut tape = Tape::new(code);
    let mut rl = DefaultEditor::new()?;
    let mut last_cmd = None;
    let mut view = View::Stack;
    let mut status = String::from("n: next, s: stack, b: board, q: quit");
    let mut halted = false;

    use UserCommand::*;
    loop {
        render_state(stdout, &vm, &listing, src, tape.ip(), view, &status)?;
        stdout.flush()?;
        let mut cmd = read_line(&mut rl)?;
        if cmd == LastCommand {
            if let Some(last) = last_cmd {
                cmd = last;
            }
        }
        match cmd {
            // only reached without a previous command
            LastCommand => {}
            Next if halted => {}
            Next => match vm.step(&mut tape) {
                Ok(ExecOutcome::Continue) => status.clear(),
                Ok(ExecOutcome::Finished) => {
                    status = "program finished".into();
                    halted = true;
                }
                Err(e) => {
                    status = format!("runtime error: {}", e);
                    halted = true;
                }
            },
            ShowStack => view = View::Stack,
            ShowBoard => view = View::Board,
            Quit => return Ok(()),
        }
        last_cmd = Some(cmd);
    }
}

fn read_line(rl: &mut DefaultEditor) -> Result<UserCommand> {
    loop {
        let line = rl.readline("> ");
        use ReadlineError::*;
        match line {
            Ok(line) => match parse_line(&line) {
                Ok(cmd) => return Ok(cmd),
                Err(e) => eprintln!("Error: {}", e),
            },
            Err(Interrupted | Eof) => return Ok(UserCommand::Quit),
            Err(other) => return Err(other.into()),
        }
    }
}

fn parse_line(line: &str) -> Result<UserCommand> {
    use UserCommand::*;
    match line.trim() {
        "" => Ok(LastCommand),
        "n" | "next" => Ok(Next),
        "s" | "stack" => Ok(ShowStack),
        "b" | "board" => Ok(ShowBoard),
        "q" | "quit" => Ok(Quit),
        other => Err(anyhow!("invalid command: {}", other)),
    }
}

struct Rect {
    w: u16,
    h: u16,
    x: u16,
    y: u16,
}

struct Rects {
    input: Rect,
    bc: Rect,
    src: Rect,
    output: Rect,
    view: Rect,
}

impl Rect {
    pub fn render(
        &self,
        stdout: &mut Stdout,
        lines: impl IntoIterator<Item = String>,
    ) -> Result<()> {
        let wu = self.w as usize;
        let mut lines = lines.into_iter();
        for row in 0..self.h {
            let line: String = lines.next().unwrap_or_default().chars().take(wu).collect();
            ct::queue!(
                stdout,
                ct::cursor::MoveTo(self.x, self.y + row),
                ct::style::Print(format!("{:<wu$}", line, wu = wu))
            )?;
        }
        Ok(())
    }
}

fn render_state(
    stdout: &mut Stdout,
    vm: &Vm<Vec<u8>>,
    listing: &Listing,
    src: &str,
    ip: usize,
    view: View,
    status: &str,
) -> Result<()> {
    let rects = compute_rects(terminal::size()?);
    rects.src.render(stdout, src.lines().map(String::from))?;
    render_bc(stdout, &rects.bc, listing, ip)?;
    render_output(stdout, &rects.output, vm.output())?;
    match view {
        View::Stack => render_stack(stdout, &rects.view, vm.stack())?,
        View::Board => {
            let robot = vm.robot();
            let lines: Vec<String> = robot
                .board()
                .lines()
                .chain(robot.report().lines())
                .map(String::from)
                .collect();
            rects.view.render(stdout, lines)?;
        }
    }
    rects.input.render(stdout, [status.to_string()])?;
    ct::queue!(
        stdout,
        ct::cursor::MoveTo(rects.input.x, rects.input.y + 1),
        terminal::Clear(terminal::ClearType::UntilNewLine)
    )?;
    Ok(())
}

fn render_output(stdout: &mut Stdout, rect: &Rect, out: &[u8]) -> Result<()> {
    let text = String::from_utf8_lossy(out);
    let lines: Vec<_> = text.lines().collect();
    let skip = lines.len().saturating_sub((rect.h as usize).saturating_sub(1));
    let lines = std::iter::once("Output:".into())
        .chain(lines[skip..].iter().map(|l| l.to_string()));
    rect.render(stdout, lines)
}

/// top of the stack first
fn render_stack(stdout: &mut Stdout, rect: &Rect, stack: &Stack) -> Result<()> {
    let lines = std::iter::once("Stack:".into()).chain(
        stack
            .iter()
            .enumerate()
            .rev()
            .map(|(i, v)| format!("{}: {}", i, v.quoted())),
    );
    rect.render(stdout, lines)
}

fn render_bc(stdout: &mut Stdout, rect: &Rect, listing: &Listing, ip: usize) -> Result<()> {
    let next = listing.index_of(ip).unwrap_or(listing.entries.len());
    let lines = listing
        .entries
        .iter()
        .skip(next)
        .map(|(offset, inst)| format!("{:04}: {}", offset, inst));
    rect.render(stdout, lines)
}

fn compute_rects((term_w, term_h): (u16, u16)) -> Rects {
    let width14 = term_w / 4;
    let width12 = term_w / 2;
    let width34 = term_w * 3 / 4;
    let height45 = term_h * 4 / 5;
    let height15 = term_h - height45;
    let height25 = term_h * 2 / 5;

    Rects {
        input: Rect {
            x: 0,
            y: height45,
            w: term_w,
            h: height15,
        },
        src: Rect {
            x: 0,
            y: 0,
            w: width12,
            h: height45,
        },
        bc: Rect {
            x: width12,
            y: 0,
            w: width14,
            h: height45,
        },
        output: Rect {
            x: width34,
            y: 0,
            w: term_w - width34,
            h: height25,
        },
        view: Rect {
            x: width34,
            y: height25,
            w: term_w - width34,
            h: height45 - height25,
        },
    }
}
