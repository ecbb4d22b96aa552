pub mod assignment;
pub mod availability;
mod types;

pub use assignment::{AssignmentLoad, AssignmentPolicy, LeastLoaded};
pub use availability::{check_hours, Verdict};
pub use types::{
    Assignee, Assignment, AssignmentTable, AvailabilityReport, Candidate, CandidatePool,
    SchedError, ShiftCandidates, TemplateAvailability,
};

use crate::holiday::HolidayCalendar;
use crate::model::{Roster, ShiftInstance};
use crate::template::{self, Horizon};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Scheduler : un run de génération sur un roster emprunté.
///
/// Le calcul est pur : chaque appel repart de zéro et alloue ses propres
/// occurrences et pools.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler<'a> {
    roster: &'a Roster,
    calendar: Option<&'a HolidayCalendar>,
    horizon: Horizon,
}

impl<'a> Scheduler<'a> {
    pub fn new(roster: &'a Roster) -> Self {
        Self {
            roster,
            calendar: None,
            horizon: Horizon::default(),
        }
    }

    pub fn with_calendar(mut self, calendar: &'a HolidayCalendar) -> Self {
        self.calendar = Some(calendar);
        self
    }

    pub fn with_horizon(mut self, horizon: Horizon) -> Self {
        self.horizon = horizon;
        self
    }

    /// Occurrences de tous les créneaux, dans l'ordre de configuration.
    pub fn expand(&self, now: DateTime<Utc>) -> Result<Vec<ShiftInstance>, SchedError> {
        let mut out = Vec::new();
        for shift in &self.roster.shifts {
            out.extend(template::expand_within(shift, now, self.horizon)?);
        }
        Ok(out)
    }

    /// Expansion, classification et filtrage pour tout le roster.
    ///
    /// Toute erreur de configuration arrête le run sans rapport partiel ; une
    /// occurrence sans candidat est seulement signalée.
    pub fn availability(&self, now: DateTime<Utc>) -> Result<AvailabilityReport, SchedError> {
        let zones = availability::resolve_zones(&self.roster.members)?;
        let mut report = AvailabilityReport::default();

        for shift in &self.roster.shifts {
            let mut pool = CandidatePool::default();
            for instance in template::expand_within(shift, now, self.horizon)? {
                let candidates =
                    availability::candidates_for(&instance, &self.roster.members, &zones, self.calendar);
                if candidates.is_empty() {
                    warn!(
                        shift = %shift.name,
                        start = %instance.start(),
                        chronotype = %instance.chronotype(),
                        "no available people for this shift day"
                    );
                }
                pool.insert(ShiftCandidates {
                    instance,
                    candidates,
                })?;
            }
            report.templates.push(TemplateAvailability {
                template: shift.name.clone(),
                pool,
            });
        }

        info!(
            templates = report.templates.len(),
            occurrences = report.shifts().count(),
            uncovered = report.uncovered(),
            "availability computed"
        );
        Ok(report)
    }

    /// Une personne (ou "non assigné") par occurrence, selon `policy`.
    pub fn assign(
        &self,
        report: &AvailabilityReport,
        policy: &mut dyn AssignmentPolicy,
    ) -> AssignmentTable {
        let table = assignment::assign(report, policy);
        if table.unassigned > 0 {
            warn!(unassigned = table.unassigned, "some shifts have no assignee");
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Member, ShiftTemplate};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 2, 12, 0, 0).unwrap()
    }

    #[test]
    fn duplicate_days_are_an_internal_error() {
        let roster = Roster {
            members: vec![Member::new("a", "a@x", "UTC")],
            shifts: vec![ShiftTemplate::new(
                "dup",
                &["Saturday", "Saturday"],
                "22:00 UTC",
                "06:00 UTC",
            )],
        };
        let err = Scheduler::new(&roster).availability(now()).unwrap_err();
        assert!(matches!(err, SchedError::DuplicateShift(_)));
    }

    #[test]
    fn same_times_in_two_templates_are_distinct_pools() {
        let roster = Roster {
            members: vec![Member::new("a", "a@x", "UTC")],
            shifts: vec![
                ShiftTemplate::new("primary", &["Monday"], "09:00 UTC", "17:00 UTC"),
                ShiftTemplate::new("backup", &["Monday"], "09:00 UTC", "17:00 UTC"),
            ],
        };
        let report = Scheduler::new(&roster).availability(now()).unwrap();
        assert_eq!(report.templates.len(), 2);
        assert_eq!(report.shifts().count(), 2);
    }

    #[test]
    fn bad_member_zone_aborts_before_any_report() {
        let roster = Roster {
            members: vec![Member::new("a", "a@x", "Not/AZone")],
            shifts: vec![ShiftTemplate::new("s", &["Monday"], "09:00 UTC", "17:00 UTC")],
        };
        assert!(matches!(
            Scheduler::new(&roster).availability(now()),
            Err(SchedError::InvalidTimezone { .. })
        ));
    }

    #[test]
    fn uncovered_occurrences_are_counted_not_fatal() {
        let roster = Roster {
            members: vec![Member::new("a", "a@x", "UTC").with_hours(9, 17)],
            shifts: vec![
                ShiftTemplate::new("day", &["Monday"], "09:00 UTC", "17:00 UTC"),
                ShiftTemplate::new("night", &["Monday", "Tuesday"], "22:00 UTC", "06:00 UTC"),
            ],
        };
        let scheduler = Scheduler::new(&roster);
        let report = scheduler.availability(now()).unwrap();
        assert_eq!(report.uncovered(), 2);
        let table = scheduler.assign(&report, &mut LeastLoaded);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.unassigned, 2);
    }

    #[test]
    fn horizon_multiplies_occurrences() {
        let roster = Roster {
            members: vec![Member::new("a", "a@x", "UTC")],
            shifts: vec![ShiftTemplate::new("s", &["Monday"], "09:00 UTC", "17:00 UTC")],
        };
        let scheduler = Scheduler::new(&roster).with_horizon(Horizon::from_days(28).unwrap());
        assert_eq!(scheduler.expand(now()).unwrap().len(), 4);
    }
}
