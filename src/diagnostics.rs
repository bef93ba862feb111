//! Where warnings and field failures go.
//!
//! The reader never aborts a structure because one field is bad; instead it
//! reports an [`Issue`] to a [`Diagnostics`] sink and carries on.

use core::fmt::{self, Display};

use log::Level;

use crate::Path;

/// One warning or error raised while reading a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// How serious the issue is.
    pub level: Level,
    /// Where in the document it happened.
    pub path: Path,
    /// What happened.
    pub message: String,
}

impl Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// An append-only sink for [`Issue`]s.
pub trait Diagnostics {
    /// Records an issue.
    fn report(&mut self, issue: Issue);
}

/// Forwards every issue to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn report(&mut self, issue: Issue) {
        log::log!(target: "reflect_json_reader", issue.level, "{issue}");
    }
}

impl Diagnostics for Vec<Issue> {
    fn report(&mut self, issue: Issue) {
        self.push(issue);
    }
}

impl<D: Diagnostics + ?Sized> Diagnostics for &mut D {
    fn report(&mut self, issue: Issue) {
        (**self).report(issue);
    }
}
