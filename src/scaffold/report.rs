use std::fmt;

use camino::Utf8PathBuf;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Root,
    Directory,
    File,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Root => "root",
            EntryKind::Directory => "directory",
            EntryKind::File => "file",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Created,
    AlreadyExists,
    /// Dry run: absent, would be created.
    WouldCreate,
}

/// One notification per scaffold entry, in processing order.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Event {
    pub kind: EntryKind,
    pub path: Utf8PathBuf,
    pub outcome: Outcome,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind.as_str();
        match self.outcome {
            Outcome::Created => write!(f, "  + created {} {}", kind, self.path),
            Outcome::AlreadyExists => write!(f, "  . {} exists {}", kind, self.path),
            Outcome::WouldCreate => write!(f, "  ~ would create {} {}", kind, self.path),
        }
    }
}

/// Receives events as the scaffolder produces them.
pub trait Reporter {
    fn report(&mut self, event: Event);
}

/// Ordered record of a run.
#[derive(Debug, Default, Serialize)]
pub struct Report {
    pub events: Vec<Event>,
}

impl Report {
    pub fn count(&self, outcome: Outcome) -> usize {
        self.events.iter().filter(|e| e.outcome == outcome).count()
    }

    pub fn created(&self) -> usize {
        self.count(Outcome::Created)
    }

    pub fn existing(&self) -> usize {
        self.count(Outcome::AlreadyExists)
    }

    pub fn pending(&self) -> usize {
        self.count(Outcome::WouldCreate)
    }
}

impl Reporter for Report {
    fn report(&mut self, event: Event) {
        self.events.push(event);
    }
}

/// Prints each event as it happens and keeps the report for the summary line.
#[derive(Debug, Default)]
pub struct Console {
    report: Report,
}

impl Console {
    pub fn into_report(self) -> Report {
        self.report
    }
}

impl Reporter for Console {
    fn report(&mut self, event: Event) {
        println!("{}", event);
        self.report.report(event);
    }
}
