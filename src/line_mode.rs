use calcvault::display::{format_result, format_with_spaces};
use calcvault::session::{Outcome, Session};
use anyhow::Result;
use std::io::{stdin, stdout, Stdin, Stdout, Write};
use termion::{
    clear::CurrentLine as ClearLine,
    event::Key,
    input::{Keys, TermRead},
    raw::{IntoRawMode, RawTerminal},
};

type Screen = RawTerminal<Stdout>;

fn redraw(stdout: &mut Screen, session: &Session) -> Result<()> {
    write!(stdout, "\r{}[{}] {}", ClearLine, session.angle_mode(), session.display())?;
    stdout.flush()?;
    Ok(())
}

/// Reads a masked line; `None` when cancelled with Esc.
fn read_secret(keys: &mut Keys<Stdin>, stdout: &mut Screen, label: &str) -> Result<Option<String>> {
    let mut value = String::new();
    loop {
        write!(stdout, "\r{}{}: {}", ClearLine, label, "*".repeat(value.chars().count()))?;
        stdout.flush()?;
        match keys.next() {
            Some(key) => match key? {
                Key::Char('\n') => break,
                Key::Char(c) => value.push(c),
                Key::Backspace => {
                    value.pop();
                }
                Key::Esc | Key::Ctrl('c') => return Ok(None),
                _ => {}
            },
            None => return Ok(None),
        }
    }
    write!(stdout, "\r\n")?;
    Ok(Some(value))
}

fn change_secret(keys: &mut Keys<Stdin>, stdout: &mut Screen, session: &mut Session) -> Result<()> {
    write!(stdout, "\r\n{}Settings (Esc to cancel)\r\n", ClearLine)?;
    let Some(old) = read_secret(keys, stdout, "Old secret")? else {
        write!(stdout, "\r\n")?;
        return Ok(());
    };
    let Some(new) = read_secret(keys, stdout, "New secret")? else {
        write!(stdout, "\r\n")?;
        return Ok(());
    };
    match session.change_secret(&old, &new) {
        Ok(()) => write!(stdout, "  Secret updated\r\n\n")?,
        Err(e) => write!(stdout, "  {}\r\n\n", e)?,
    }
    Ok(())
}

fn wait_for_lock(keys: &mut Keys<Stdin>, stdout: &mut Screen, session: &mut Session) -> Result<()> {
    write!(stdout, "\r\n{}Vault unlocked. Press Esc to lock.", ClearLine)?;
    stdout.flush()?;
    for key in keys.by_ref() {
        if matches!(key?, Key::Esc | Key::Ctrl('c')) {
            break;
        }
    }
    session.lock();
    write!(stdout, "\r{}", ClearLine)?;
    Ok(())
}

fn print_steps(stdout: &mut Screen, session: &Session) -> Result<()> {
    if session.detailed_mode && !session.last_steps.is_empty() {
        for (i, step) in session.last_steps.iter().enumerate() {
            write!(
                stdout,
                "\r\n  Step {}: {} = {}",
                i + 1,
                format_with_spaces(&step.operation),
                format_result(step.result)
            )?;
        }
    }
    Ok(())
}

fn print_history(stdout: &mut Screen, session: &Session) -> Result<()> {
    if session.history().is_empty() {
        write!(stdout, "\r\n  No History")?;
    }
    for entry in session.history().iter() {
        write!(stdout, "\r\n  {}", entry)?;
    }
    write!(stdout, "\r\n\n")?;
    Ok(())
}

/// Handles words typed instead of an expression: `Some(true)` quits,
/// `None` means the input is not a command.
fn run_command(stdout: &mut Screen, session: &mut Session) -> Result<Option<bool>> {
    let command = session.input().to_string();
    let handled = match command.as_str() {
        "quit" | "exit" => return Ok(Some(true)),
        "cls" => {
            session.clear_history();
            write!(stdout, "\r\n  History cleared\r\n\n")?;
            true
        }
        "hist" => {
            print_history(stdout, session)?;
            true
        }
        "details" => {
            session.detailed_mode = !session.detailed_mode;
            let state = if session.detailed_mode { "on" } else { "off" };
            write!(stdout, "\r\n  Details {}\r\n\n", state)?;
            true
        }
        "mode" => {
            session.toggle_angle_mode();
            write!(stdout, "\r\n  Angle mode {}\r\n\n", session.angle_mode())?;
            true
        }
        _ => false,
    };
    if handled {
        session.clear();
        Ok(Some(false))
    } else {
        Ok(None)
    }
}

pub fn run_line(mut session: Session) -> Result<()> {
    println!("Calculator");
    println!("Supports: + - * / ^ ! %, sin cos tan asin acos atan log ln, √ (r), π (p), e");
    println!("Commands: 'mode' deg/rad, 'details' steps, 'hist', 'cls' clears history, 'quit'\n");

    let mut stdout = stdout().into_raw_mode()?;
    let mut keys = stdin().keys();

    loop {
        redraw(&mut stdout, &session)?;

        let key = match keys.next() {
            Some(key) => key?,
            None => break,
        };

        match key {
            Key::Char('\n') | Key::Char('=') => {
                if let Some(quit) = run_command(&mut stdout, &mut session)? {
                    if quit {
                        break;
                    }
                    continue;
                }

                let expression = session.input().to_string();
                match session.submit() {
                    Outcome::Value(shown) => {
                        print_steps(&mut stdout, &session)?;
                        if expression != shown {
                            write!(stdout, "\r\n  {} = {}\r\n", format_with_spaces(&expression), shown)?;
                        }
                    }
                    Outcome::Error(e) => {
                        write!(stdout, "\r\n  Error: {}\r\n", e)?;
                    }
                    Outcome::Unlock => wait_for_lock(&mut keys, &mut stdout, &mut session)?,
                    Outcome::OpenSettings => change_secret(&mut keys, &mut stdout, &mut session)?,
                }
            }
            Key::Char('\t') => session.paren(),
            Key::Char('p') => session.append("π"),
            Key::Char('r') => session.append_function("√"),
            Key::Char(c) => {
                let mut buf = [0u8; 4];
                session.append(c.encode_utf8(&mut buf));
            }
            Key::Backspace => session.backspace(),
            Key::Ctrl('u') => session.clear(),
            Key::Ctrl('c') | Key::Esc => break,
            _ => {}
        }
    }

    write!(stdout, "\r\n")?;
    stdout.flush()?;
    Ok(())
}
