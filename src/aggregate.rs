//! Completion percentages over the catalog.
//!
//! Everything here is a pure function of the catalog, the snapshot and the
//! combo. Only keys that exist in the current catalog are counted; orphaned
//! snapshot entries are ignored.

use crate::catalog::{Catalog, Chapter};
use crate::model::{Combo, CompletionKey, Subject};
use crate::progress::Snapshot;
use std::fmt;
use std::ops::Add;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    pub done: usize,
    pub total: usize,
}

impl Tally {
    /// Rounded percentage, half rounding up; 0 for an empty tally.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let rounded = (200 * self.done + self.total) / (2 * self.total);
        rounded.min(100) as u8
    }
}

impl Add for Tally {
    type Output = Tally;

    fn add(self, rhs: Tally) -> Tally {
        Tally {
            done: self.done + rhs.done,
            total: self.total + rhs.total,
        }
    }
}

pub fn chapter_tally(snapshot: &Snapshot, subject: Subject, chapter: &Chapter) -> Tally {
    let done = chapter
        .topics
        .iter()
        .filter(|topic| snapshot.is_done(&CompletionKey::new(subject, &chapter.name, topic)))
        .count();
    Tally {
        done,
        total: chapter.topics.len(),
    }
}

pub fn subject_tally(catalog: &Catalog, snapshot: &Snapshot, subject: Subject) -> Tally {
    catalog
        .chapters(subject)
        .iter()
        .map(|chapter| chapter_tally(snapshot, subject, chapter))
        .fold(Tally::default(), Add::add)
}

pub fn subject_percent(catalog: &Catalog, snapshot: &Snapshot, subject: Subject) -> u8 {
    subject_tally(catalog, snapshot, subject).percent()
}

/// Subjects whose letter appears in the combo, in fixed order.
pub fn included_subjects(combo: Combo) -> Vec<Subject> {
    Subject::ALL
        .into_iter()
        .filter(|subject| combo.includes(*subject))
        .collect()
}

/// Subjects listed in the navigator. Physics and Chemistry are always listed;
/// Maths and Biology follow the combo letters.
pub fn visible_subjects(combo: Combo) -> Vec<Subject> {
    Subject::ALL
        .into_iter()
        .filter(|subject| match subject {
            Subject::Physics | Subject::Chemistry => true,
            Subject::Maths | Subject::Biology => combo.includes(*subject),
        })
        .collect()
}

pub fn overall_tally(catalog: &Catalog, snapshot: &Snapshot, combo: Combo) -> Tally {
    included_subjects(combo)
        .into_iter()
        .map(|subject| subject_tally(catalog, snapshot, subject))
        .fold(Tally::default(), Add::add)
}

pub fn overall_percent(catalog: &Catalog, snapshot: &Snapshot, combo: Combo) -> u8 {
    overall_tally(catalog, snapshot, combo).percent()
}

// ============================================================
// Display
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectDisplay {
    Percent(u8),
    NotApplicable,
}

impl fmt::Display for SubjectDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectDisplay::Percent(p) => write!(f, "{p}%"),
            SubjectDisplay::NotApplicable => f.write_str("N/A"),
        }
    }
}

pub fn subject_display(
    catalog: &Catalog,
    snapshot: &Snapshot,
    combo: Combo,
    subject: Subject,
) -> SubjectDisplay {
    if combo.includes(subject) {
        SubjectDisplay::Percent(subject_percent(catalog, snapshot, subject))
    } else {
        SubjectDisplay::NotApplicable
    }
}

/// Figures shown in the dashboard header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub subjects: Vec<(Subject, SubjectDisplay)>,
    pub overall: u8,
}

impl Dashboard {
    pub fn compute(catalog: &Catalog, snapshot: &Snapshot) -> Self {
        let combo = snapshot.combo;
        Dashboard {
            subjects: Subject::ALL
                .into_iter()
                .map(|subject| (subject, subject_display(catalog, snapshot, combo, subject)))
                .collect(),
            overall: overall_percent(catalog, snapshot, combo),
        }
    }

    pub fn overall_text(&self) -> String {
        format!("{}%", self.overall)
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Dashboard::compute(&Catalog::default(), &Snapshot::default())
    }
}
