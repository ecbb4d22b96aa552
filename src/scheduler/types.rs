use crate::model::{ShiftId, ShiftInstance};
use chrono::{DateTime, FixedOffset, NaiveDate, Timelike};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

/// Membre éligible pour une occurrence, avec sa projection locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// Position dans le roster (ordre d'insertion, départage des égalités).
    pub roster_index: usize,
    pub name: String,
    pub email: String,
    pub local_start: DateTime<FixedOffset>,
    pub local_end: DateTime<FixedOffset>,
    /// Jours fériés du membre touchés par l'occurrence (annotation seulement).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub holidays: Vec<NaiveDate>,
}

impl Candidate {
    pub fn start_hour(&self) -> u32 {
        self.local_start.hour()
    }
    pub fn end_hour(&self) -> u32 {
        self.local_end.hour()
    }
    pub fn on_holiday(&self) -> bool {
        !self.holidays.is_empty()
    }
}

/// Une occurrence et ses candidats, dans l'ordre du roster.
#[derive(Debug, Clone, Serialize)]
pub struct ShiftCandidates {
    pub instance: ShiftInstance,
    pub candidates: Vec<Candidate>,
}

impl ShiftCandidates {
    pub fn is_uncovered(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Identifiant d'occurrence -> candidats, ordre d'insertion conservé.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct CandidatePool {
    entries: Vec<ShiftCandidates>,
    #[serde(skip)]
    index: HashMap<ShiftId, usize>,
}

impl CandidatePool {
    /// Refuse un identifiant déjà présent : deux occurrences distinctes ne
    /// doivent jamais être fusionnées.
    pub fn insert(&mut self, entry: ShiftCandidates) -> Result<(), SchedError> {
        let id = entry.instance.id().clone();
        if self.index.contains_key(&id) {
            return Err(SchedError::DuplicateShift(id));
        }
        self.index.insert(id, self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    pub fn get(&self, id: &ShiftId) -> Option<&ShiftCandidates> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ShiftCandidates> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a CandidatePool {
    type Item = &'a ShiftCandidates;
    type IntoIter = std::slice::Iter<'a, ShiftCandidates>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateAvailability {
    pub template: String,
    pub pool: CandidatePool,
}

/// Résultat du filtrage pour tous les créneaux, dans l'ordre de configuration.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AvailabilityReport {
    pub templates: Vec<TemplateAvailability>,
}

impl AvailabilityReport {
    pub fn template(&self, name: &str) -> Option<&TemplateAvailability> {
        self.templates.iter().find(|t| t.template == name)
    }

    pub fn shifts(&self) -> impl Iterator<Item = &ShiftCandidates> {
        self.templates.iter().flat_map(|t| t.pool.iter())
    }

    /// Nombre d'occurrences sans aucun membre éligible.
    pub fn uncovered(&self) -> usize {
        self.shifts().filter(|s| s.is_uncovered()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignee {
    pub roster_index: usize,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Assignment {
    pub template: String,
    pub shift_id: ShiftId,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    /// `None` : occurrence explicitement non assignée.
    pub assignee: Option<Assignee>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AssignmentTable {
    pub rows: Vec<Assignment>,
    pub unassigned: usize,
}

impl AssignmentTable {
    pub fn assigned_to<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Assignment> {
        self.rows
            .iter()
            .filter(move |r| r.assignee.as_ref().is_some_and(|a| a.name == name))
    }
}

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("invalid weekday {0:?}")]
    InvalidWeekday(String),
    #[error("failed to parse time {value:?}: expected \"HH:MM ZONE\"")]
    InvalidTimeFormat { value: String },
    #[error("invalid timezone {zone:?} for {owner:?}")]
    InvalidTimezone { zone: String, owner: String },
    #[error("invalid time range: end must be after start")]
    InvalidTimeRange,
    #[error("invalid schedule duration {0:?}")]
    InvalidDuration(String),
    #[error("holiday calendar {path}: {message}")]
    HolidayCalendar { path: String, message: String },
    #[error("found duplicate shift with id {0}, this is probably a program bug")]
    DuplicateShift(ShiftId),
}
