use super::types::{Assignee, Assignment, AssignmentTable, AvailabilityReport, ShiftCandidates};
use std::collections::HashMap;
use tracing::warn;

/// Nombre d'occurrences déjà attribuées à chaque membre pendant le run.
#[derive(Debug, Clone, Default)]
pub struct AssignmentLoad {
    counts: HashMap<usize, usize>,
}

impl AssignmentLoad {
    pub fn count(&self, roster_index: usize) -> usize {
        self.counts.get(&roster_index).copied().unwrap_or(0)
    }

    fn record(&mut self, roster_index: usize) {
        *self.counts.entry(roster_index).or_insert(0) += 1;
    }
}

/// Choisit un candidat (index dans `shift.candidates`) pour une occurrence.
///
/// Les candidats portent leurs jours fériés : une politique peut s'en servir
/// pour classer, sans jamais changer l'éligibilité.
pub trait AssignmentPolicy {
    fn choose(&mut self, shift: &ShiftCandidates, load: &AssignmentLoad) -> Option<usize>;
}

/// Le moins chargé d'abord, puis l'ordre du roster.
#[derive(Debug, Default, Clone, Copy)]
pub struct LeastLoaded;

impl AssignmentPolicy for LeastLoaded {
    fn choose(&mut self, shift: &ShiftCandidates, load: &AssignmentLoad) -> Option<usize> {
        shift
            .candidates
            .iter()
            .enumerate()
            .min_by_key(|(_, c)| (load.count(c.roster_index), c.roster_index))
            .map(|(i, _)| i)
    }
}

pub(super) fn assign(
    report: &AvailabilityReport,
    policy: &mut dyn AssignmentPolicy,
) -> AssignmentTable {
    let mut load = AssignmentLoad::default();
    let mut table = AssignmentTable::default();

    for shift in report.shifts() {
        let chosen = policy
            .choose(shift, &load)
            .and_then(|i| shift.candidates.get(i));
        let assignee = chosen.map(|c| {
            load.record(c.roster_index);
            Assignee {
                roster_index: c.roster_index,
                name: c.name.clone(),
                email: c.email.clone(),
            }
        });
        if assignee.is_none() {
            warn!(
                shift = %shift.instance.template(),
                start = %shift.instance.start(),
                "no one assigned to shift"
            );
            table.unassigned += 1;
        }
        table.rows.push(Assignment {
            template: shift.instance.template().to_string(),
            shift_id: shift.instance.id().clone(),
            start: shift.instance.start(),
            end: shift.instance.end(),
            assignee,
        });
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ShiftInstance;
    use crate::scheduler::types::{Candidate, CandidatePool, TemplateAvailability};
    use chrono::{Duration, TimeZone, Utc};

    fn candidate(idx: usize, name: &str) -> Candidate {
        let t = Utc.with_ymd_and_hms(2025, 7, 5, 22, 0, 0).unwrap().fixed_offset();
        Candidate {
            roster_index: idx,
            name: name.into(),
            email: format!("{name}@x"),
            local_start: t,
            local_end: t + Duration::hours(8),
            holidays: Vec::new(),
        }
    }

    fn report(shifts: Vec<Vec<Candidate>>) -> AvailabilityReport {
        let base = Utc.with_ymd_and_hms(2025, 7, 5, 22, 0, 0).unwrap().fixed_offset();
        let mut pool = CandidatePool::default();
        for (day, candidates) in shifts.into_iter().enumerate() {
            let start = base + Duration::days(day as i64);
            let instance = ShiftInstance::new("t", start, start + Duration::hours(8)).unwrap();
            pool.insert(ShiftCandidates {
                instance,
                candidates,
            })
            .unwrap();
        }
        AvailabilityReport {
            templates: vec![TemplateAvailability {
                template: "t".into(),
                pool,
            }],
        }
    }

    #[test]
    fn balances_load_then_roster_order() {
        let r = report(vec![
            vec![candidate(0, "a"), candidate(1, "b")],
            vec![candidate(0, "a"), candidate(1, "b")],
            vec![candidate(1, "b"), candidate(0, "a")],
            vec![candidate(1, "b")],
        ]);
        let table = assign(&r, &mut LeastLoaded);
        let names: Vec<_> = table
            .rows
            .iter()
            .map(|row| row.assignee.as_ref().map(|a| a.name.as_str()))
            .collect();
        assert_eq!(names, vec![Some("a"), Some("b"), Some("a"), Some("b")]);
        assert_eq!(table.unassigned, 0);
    }

    #[test]
    fn empty_pool_is_explicitly_unassigned() {
        let r = report(vec![vec![], vec![candidate(0, "a")]]);
        let table = assign(&r, &mut LeastLoaded);
        assert_eq!(table.rows.len(), 2);
        assert!(table.rows[0].assignee.is_none());
        assert_eq!(table.unassigned, 1);
        assert_eq!(table.assigned_to("a").count(), 1);
    }

    #[test]
    fn out_of_range_choice_counts_as_unassigned() {
        struct Broken;
        impl AssignmentPolicy for Broken {
            fn choose(&mut self, _: &ShiftCandidates, _: &AssignmentLoad) -> Option<usize> {
                Some(42)
            }
        }
        let r = report(vec![vec![candidate(0, "a")]]);
        assert_eq!(assign(&r, &mut Broken).unassigned, 1);
    }
}
