use super::types::{Candidate, SchedError};
use crate::holiday::HolidayCalendar;
use crate::model::{Member, ShiftInstance};
use chrono::{Duration, Timelike};
use chrono_tz::Tz;
use tracing::debug;

/// Décision des contraintes dures (heures locales) pour un membre.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Eligible,
    StartsTooEarly { hour: u32, earliest: u8 },
    /// `hour` vaut heure de fin + 24 quand le créneau passe minuit.
    EndsTooLate { hour: u32, latest: u8 },
}

/// Fenêtre locale `[start_hour, end_hour]` contre `[earliest, latest]`.
///
/// Si `start_hour >= end_hour` le créneau passe minuit et la fin est comptée
/// sur le lendemain (`end_hour + 24`).
pub fn check_hours(start_hour: u32, end_hour: u32, earliest: u8, latest: u8) -> Verdict {
    if start_hour < u32::from(earliest) {
        return Verdict::StartsTooEarly {
            hour: start_hour,
            earliest,
        };
    }
    let effective_end = if start_hour < end_hour {
        end_hour
    } else {
        end_hour + 24
    };
    if effective_end > u32::from(latest) {
        return Verdict::EndsTooLate {
            hour: effective_end,
            latest,
        };
    }
    Verdict::Eligible
}

/// Résout le fuseau de chaque membre ; le premier fuseau inconnu arrête le run.
pub(super) fn resolve_zones(members: &[Member]) -> Result<Vec<Tz>, SchedError> {
    members
        .iter()
        .map(|m| {
            m.constraints
                .timezone
                .parse::<Tz>()
                .map_err(|_| SchedError::InvalidTimezone {
                    zone: m.constraints.timezone.clone(),
                    owner: m.name.clone(),
                })
        })
        .collect()
}

/// Évalue un membre pour une occurrence ; `None` si une contrainte dure échoue.
pub fn evaluate(
    instance: &ShiftInstance,
    roster_index: usize,
    member: &Member,
    tz: Tz,
    calendar: Option<&HolidayCalendar>,
) -> Option<Candidate> {
    let local_start = instance.start().with_timezone(&tz);
    let local_end = instance.end().with_timezone(&tz);
    let c = &member.constraints;

    let verdict = check_hours(
        local_start.hour(),
        local_end.hour(),
        c.earliest_oncall_hour,
        c.latest_oncall_hour,
    );
    match verdict {
        Verdict::Eligible => {}
        Verdict::StartsTooEarly { hour, earliest } => {
            debug!(
                member = %member.name,
                shift = %instance.template(),
                tz = %tz,
                "skipping: shift starts too early, want at least {earliest}, got {hour}"
            );
            return None;
        }
        Verdict::EndsTooLate { hour, latest } => {
            debug!(
                member = %member.name,
                shift = %instance.template(),
                tz = %tz,
                "skipping: shift ends too late, want no later than {latest}, got {hour}"
            );
            return None;
        }
    }

    // borne de fin exclue : une fin à minuit ne touche pas le lendemain
    let last_day = (local_end - Duration::nanoseconds(1)).date_naive();
    let holidays =
        c.public_holidays
            .holidays_between(local_start.date_naive(), last_day, calendar);
    if !holidays.is_empty() {
        debug!(member = %member.name, shift = %instance.template(), ?holidays, "eligible on a public holiday");
    }

    Some(Candidate {
        roster_index,
        name: member.name.clone(),
        email: member.email.clone(),
        local_start: local_start.fixed_offset(),
        local_end: local_end.fixed_offset(),
        holidays,
    })
}

/// Candidats éligibles, dans l'ordre du roster.
pub(super) fn candidates_for(
    instance: &ShiftInstance,
    members: &[Member],
    zones: &[Tz],
    calendar: Option<&HolidayCalendar>,
) -> Vec<Candidate> {
    members
        .iter()
        .zip(zones)
        .enumerate()
        .filter_map(|(idx, (member, tz))| evaluate(instance, idx, member, *tz, calendar))
        .collect()
}
