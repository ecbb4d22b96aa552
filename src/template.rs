//! Expansion des créneaux récurrents en occurrences datées.
//!
//! Les heures sont lues au format fixe `"HH:MM ZONE"`. La zone est un
//! décalage fixe (abréviation connue ou `+HH:MM`) : les changements d'heure
//! ne sont pas modélisés, un créneau "09:00 CET" reste à UTC+1 en été.

use crate::model::{ShiftInstance, ShiftTemplate};
use crate::scheduler::SchedError;
use chrono::{DateTime, Datelike, Days, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono::Weekday;
use tracing::debug;

/// Heure murale ancrée dans un décalage fixe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockTime {
    pub time: NaiveTime,
    pub offset: FixedOffset,
    /// Jeton de zone tel qu'écrit dans la configuration.
    pub zone: String,
}

impl ClockTime {
    /// Instant absolu correspondant à cette heure murale à la date donnée.
    pub fn on(&self, date: NaiveDate) -> Result<DateTime<FixedOffset>, SchedError> {
        self.offset
            .from_local_datetime(&date.and_time(self.time))
            .single()
            .ok_or(SchedError::InvalidTimeRange)
    }
}

/// Parse `"22:00 UTC"`, `"09:30 CEST"`, `"18:00 +05:30"`.
pub fn parse_clock_time(raw: &str) -> Result<ClockTime, SchedError> {
    let bad = || SchedError::InvalidTimeFormat {
        value: raw.to_string(),
    };
    let (hm, zone) = raw.trim().split_once(' ').ok_or_else(bad)?;
    if hm.len() != 5 || zone.is_empty() || zone.contains(char::is_whitespace) {
        return Err(bad());
    }
    let time = NaiveTime::parse_from_str(hm, "%H:%M").map_err(|_| bad())?;
    let offset = zone_offset(zone).ok_or_else(|| SchedError::InvalidTimezone {
        zone: zone.to_string(),
        owner: raw.to_string(),
    })?;
    Ok(ClockTime {
        time,
        offset,
        zone: zone.to_string(),
    })
}

fn zone_offset(zone: &str) -> Option<FixedOffset> {
    if zone.starts_with('+') || zone.starts_with('-') {
        return numeric_offset(zone);
    }
    let minutes = match zone {
        "UTC" | "GMT" | "Z" | "WET" => 0,
        "BST" | "CET" | "WEST" => 60,
        "CEST" | "EET" => 120,
        "EEST" | "MSK" => 180,
        "IST" => 330,
        "SGT" | "HKT" | "AWST" => 480,
        "JST" | "KST" => 540,
        "AEST" => 600,
        "AEDT" => 660,
        "NZST" => 720,
        "NZDT" => 780,
        "HST" => -600,
        "AKST" => -540,
        "AKDT" | "PST" => -480,
        "PDT" | "MST" => -420,
        "MDT" | "CST" => -360,
        "CDT" | "EST" => -300,
        "EDT" => -240,
        _ => return None,
    };
    FixedOffset::east_opt(minutes * 60)
}

/// `+HH`, `+HHMM` ou `+HH:MM`.
fn numeric_offset(zone: &str) -> Option<FixedOffset> {
    let (sign, digits) = zone.split_at(1);
    let digits: String = digits.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if hours > 14 || minutes > 59 {
        return None;
    }
    let secs = (hours * 60 + minutes) * 60;
    FixedOffset::east_opt(if sign == "-" { -secs } else { secs })
}

/// Jeton de jour : noms anglais canoniques, sensibles à la casse.
pub fn parse_weekday(token: &str) -> Result<Weekday, SchedError> {
    Ok(match token {
        "Sunday" => Weekday::Sun,
        "Monday" => Weekday::Mon,
        "Tuesday" => Weekday::Tue,
        "Wednesday" => Weekday::Wed,
        "Thursday" => Weekday::Thu,
        "Friday" => Weekday::Fri,
        "Saturday" => Weekday::Sat,
        other => return Err(SchedError::InvalidWeekday(other.to_string())),
    })
}

/// Fenêtre de génération, en jours entiers, au plus un an.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Horizon {
    days: u32,
}

impl Default for Horizon {
    fn default() -> Self {
        Self { days: 7 }
    }
}

impl Horizon {
    pub const MAX_DAYS: u32 = 366;

    pub fn days(self) -> u32 {
        self.days
    }

    pub fn from_days(days: u32) -> Result<Self, SchedError> {
        if days == 0 || days > Self::MAX_DAYS {
            return Err(SchedError::InvalidDuration(days.to_string()));
        }
        Ok(Self { days })
    }

    /// Arrondi au jour supérieur.
    pub fn from_duration(duration: Duration) -> Result<Self, SchedError> {
        let secs = duration.num_seconds();
        if secs <= 0 {
            return Err(SchedError::InvalidDuration(duration.to_string()));
        }
        let days = (secs + 86_399) / 86_400;
        let days = u32::try_from(days).map_err(|_| SchedError::InvalidDuration(duration.to_string()))?;
        Self::from_days(days)
    }

    /// Parse `"2w"`, `"1w3d"`, `"36h"`, `"90m"`.
    pub fn parse(raw: &str) -> Result<Self, SchedError> {
        let bad = || SchedError::InvalidDuration(raw.to_string());
        let mut total = Duration::zero();
        let mut digits = String::new();
        for c in raw.trim().chars() {
            if c.is_ascii_digit() {
                digits.push(c);
                continue;
            }
            let n: i64 = digits.parse().map_err(|_| bad())?;
            digits.clear();
            let part = match c {
                'w' => Duration::try_weeks(n),
                'd' => Duration::try_days(n),
                'h' => Duration::try_hours(n),
                'm' => Duration::try_minutes(n),
                's' => Duration::try_seconds(n),
                _ => None,
            }
            .ok_or_else(bad)?;
            total = total.checked_add(&part).ok_or_else(bad)?;
        }
        if !digits.is_empty() {
            return Err(bad());
        }
        Self::from_duration(total).map_err(|_| bad())
    }
}

/// Prochaine occurrence (aujourd'hui inclus) de chaque jour du créneau.
pub fn expand_next(
    template: &ShiftTemplate,
    now: DateTime<Utc>,
) -> Result<Vec<ShiftInstance>, SchedError> {
    expand_within(template, now, Horizon::default())
}

/// Répète le motif hebdomadaire tant que le jour tombe dans l'horizon.
///
/// Ordre : semaine, puis ordre des jours dans le créneau.
pub fn expand_within(
    template: &ShiftTemplate,
    now: DateTime<Utc>,
    horizon: Horizon,
) -> Result<Vec<ShiftInstance>, SchedError> {
    let weekdays = template
        .days
        .iter()
        .map(|d| parse_weekday(d))
        .collect::<Result<Vec<_>, _>>()?;
    let start = parse_clock_time(&template.start_time)?;
    let end = parse_clock_time(&template.end_time)?;

    let today = now.with_timezone(&start.offset).date_naive();
    let mut out = Vec::new();
    for week in 0.. {
        let mut added = false;
        for wd in &weekdays {
            let ahead = days_until(today.weekday(), *wd) + 7 * week;
            if ahead >= horizon.days() {
                continue;
            }
            let date = today
                .checked_add_days(Days::new(u64::from(ahead)))
                .ok_or(SchedError::InvalidTimeRange)?;
            out.push(build_instance(&template.name, date, &start, &end)?);
            added = true;
        }
        if !added {
            break;
        }
    }
    debug!(
        shift = %template.name,
        occurrences = out.len(),
        horizon_days = horizon.days(),
        "expanded shift template"
    );
    Ok(out)
}

fn days_until(from: Weekday, to: Weekday) -> u32 {
    (to.num_days_from_sunday() + 7 - from.num_days_from_sunday()) % 7
}

fn build_instance(
    name: &str,
    date: NaiveDate,
    start: &ClockTime,
    end: &ClockTime,
) -> Result<ShiftInstance, SchedError> {
    let start_at = start.on(date)?;
    let mut end_at = end.on(date)?;
    if end_at <= start_at {
        let next = date.succ_opt().ok_or(SchedError::InvalidTimeRange)?;
        end_at = end.on(next)?;
    }
    ShiftInstance::new(name, start_at, end_at)
}
