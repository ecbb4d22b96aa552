//! Classification d'une occurrence selon les jours qu'elle couvre.
//!
//! Le week-end est fixé à samedi + dimanche, quelle que soit la locale.

use chrono::{DateTime, Datelike, Days, TimeZone, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chronotype {
    /// Aucun jour parcouru (fin avant début).
    #[default]
    Undefined,
    /// Uniquement du lundi au vendredi.
    Weekday,
    /// Uniquement samedi / dimanche.
    Weekend,
    /// Les deux.
    Mixed,
}

impl fmt::Display for Chronotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Chronotype::Undefined => "undefined",
            Chronotype::Weekday => "weekday",
            Chronotype::Weekend => "weekend",
            Chronotype::Mixed => "mixed",
        })
    }
}

pub fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}

/// Parcourt les jours de `start` à `end` par pas d'un jour calendaire.
///
/// Un jour suivant n'est visité que si le créneau couvre encore la même heure
/// ce jour-là. Le premier jour fixe la classe ; le premier jour contradictoire
/// donne `Mixed` et arrête le parcours.
pub fn classify_span<Tz: TimeZone>(start: &DateTime<Tz>, end: &DateTime<Tz>) -> Chronotype {
    let mut kind = Chronotype::Undefined;
    let mut cursor = start.clone();
    while cursor <= *end {
        let day = if is_weekend(cursor.weekday()) {
            Chronotype::Weekend
        } else {
            Chronotype::Weekday
        };
        kind = match kind {
            Chronotype::Undefined => day,
            k if k == day => k,
            _ => return Chronotype::Mixed,
        };
        cursor = match cursor.checked_add_days(Days::new(1)) {
            Some(next) => next,
            None => break,
        };
    }
    kind
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    // 2025-07-04 est un vendredi
    fn at(d: u32, h: u32) -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(2025, 7, d, h, 0, 0).unwrap().fixed_offset()
    }

    #[test]
    fn saturday_to_sunday_is_weekend() {
        assert_eq!(classify_span(&at(5, 8), &at(6, 20)), Chronotype::Weekend);
    }

    #[test]
    fn monday_to_friday_is_weekday() {
        assert_eq!(classify_span(&at(7, 9), &at(11, 17)), Chronotype::Weekday);
    }

    #[test]
    fn friday_into_saturday_is_mixed() {
        assert_eq!(classify_span(&at(4, 8), &at(5, 20)), Chronotype::Mixed);
    }

    #[test]
    fn sunday_into_monday_is_mixed() {
        assert_eq!(classify_span(&at(6, 8), &at(7, 9)), Chronotype::Mixed);
    }

    #[test]
    fn overnight_sunday_shift_stays_weekend() {
        // 22h -> 6h : le lundi n'est pas couvert à 22h
        assert_eq!(classify_span(&at(6, 22), &at(7, 6)), Chronotype::Weekend);
    }

    #[test]
    fn inverted_range_is_undefined() {
        assert_eq!(classify_span(&at(6, 22), &at(5, 6)), Chronotype::Undefined);
    }

    #[test]
    fn weekday_is_read_in_the_span_offset() {
        // vendredi 23h UTC = samedi 8h à Tokyo, vendredi 19h à New York
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let new_york = FixedOffset::west_opt(4 * 3600).unwrap();
        let start = Utc.with_ymd_and_hms(2025, 7, 4, 23, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 7, 5, 1, 0, 0).unwrap();
        assert_eq!(
            classify_span(&start.with_timezone(&tokyo), &end.with_timezone(&tokyo)),
            Chronotype::Weekend
        );
        assert_eq!(
            classify_span(&start.with_timezone(&new_york), &end.with_timezone(&new_york)),
            Chronotype::Weekday
        );
    }
}
