//! Calendrier des jours fériés : année -> pays -> liste de jours ("Jan 2").
//!
//! Contrainte souple : consulté pour annoter les candidats, jamais pour les
//! exclure.

use crate::model::HolidayPolicy;
use crate::scheduler::SchedError;
use chrono::{Datelike, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Jour de l'année sans année, texte `"Jan 2"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthDay {
    month: u32,
    day: u32,
}

impl MonthDay {
    /// Le 29 février est accepté.
    pub fn new(month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(2000, month, day).map(|_| Self { month, day })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
        }
    }

    pub fn month(&self) -> u32 {
        self.month
    }
    pub fn day(&self) -> u32 {
        self.day
    }
}

impl FromStr for MonthDay {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let date = NaiveDate::parse_from_str(&format!("{} 2000", s.trim()), "%b %d %Y")?;
        Ok(Self::of(date))
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match NaiveDate::from_ymd_opt(2000, self.month, self.day) {
            Some(date) => write!(f, "{}", date.format("%b %-d")),
            None => write!(f, "{:02}-{:02}", self.month, self.day),
        }
    }
}

impl Serialize for MonthDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map_err(|e| de::Error::custom(format!("invalid holiday {raw:?}: {e}")))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayCalendar {
    #[serde(default)]
    pub years: BTreeMap<i32, BTreeMap<String, Vec<MonthDay>>>,
}

impl HolidayCalendar {
    /// Charge un fichier YAML, ou JSON si l'extension est `.json`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SchedError> {
        let path = path.as_ref();
        let fail = |message: String| SchedError::HolidayCalendar {
            path: path.display().to_string(),
            message,
        };
        let data = fs::read_to_string(path).map_err(|e| fail(e.to_string()))?;
        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            serde_json::from_str(&data).map_err(|e| fail(e.to_string()))
        } else {
            Self::from_yaml_str(&data).map_err(|e| fail(e.to_string()))
        }
    }

    pub fn from_yaml_str(data: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(data)
    }

    pub fn dates(&self, year: i32, country: &str) -> &[MonthDay] {
        self.years
            .get(&year)
            .and_then(|by_country| by_country.get(country))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_public_holiday(&self, date: NaiveDate, country: &str) -> bool {
        self.dates(date.year(), country).contains(&MonthDay::of(date))
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (year, by_country) in &self.years {
            out.push_str(&format!("{year}:\n"));
            for (country, dates) in by_country {
                out.push_str(&format!("    {country}\n"));
                for d in dates {
                    out.push_str(&format!("        {d}\n"));
                }
            }
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

impl HolidayPolicy {
    /// Pays (si calendrier) + `include_dates`, moins `exclude_dates`.
    pub fn is_holiday(&self, date: NaiveDate, calendar: Option<&HolidayCalendar>) -> bool {
        if self.exclude_dates.contains(&date) {
            return false;
        }
        if self.include_dates.contains(&date) {
            return true;
        }
        !self.country_name.is_empty()
            && calendar.is_some_and(|c| c.is_public_holiday(date, &self.country_name))
    }

    /// Jours fériés dans `[from, to]`, bornes incluses.
    pub fn holidays_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        calendar: Option<&HolidayCalendar>,
    ) -> Vec<NaiveDate> {
        from.iter_days()
            .take_while(|d| *d <= to)
            .filter(|d| self.is_holiday(*d, calendar))
            .collect()
    }
}
