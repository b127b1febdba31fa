//! Colored status lines for the terminal.

use console::{Style, StyledObject};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Info,
    Success,
    Warning,
    Failure,
}

impl Status {
    fn style(self) -> Style {
        match self {
            Status::Info => Style::new().cyan(),
            Status::Success => Style::new().green(),
            Status::Warning => Style::new().yellow(),
            Status::Failure => Style::new().red().bold(),
        }
    }

    fn for_stderr(self) -> bool {
        matches!(self, Status::Warning | Status::Failure)
    }
}

fn styled<D: Display>(status: Status, message: D) -> StyledObject<D> {
    let style = status.style();
    if status.for_stderr() {
        style.for_stderr().apply_to(message)
    } else {
        style.apply_to(message)
    }
}

pub fn report(status: Status, message: impl Display) {
    if status.for_stderr() {
        eprintln!("{}", styled(status, message));
    } else {
        println!("{}", styled(status, message));
    }
}

pub fn info(message: impl Display) {
    report(Status::Info, message);
}

pub fn success(message: impl Display) {
    report(Status::Success, message);
}

pub fn warning(message: impl Display) {
    report(Status::Warning, message);
}

pub fn failure(message: impl Display) {
    report(Status::Failure, message);
}
