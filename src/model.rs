use crate::chronotype::{classify_span, Chronotype};
use crate::scheduler::SchedError;
use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::cell::OnceCell;
use std::fmt;
use std::fmt::Write as _;

/// Membre d'astreinte
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub email: String,
    pub constraints: Constraints,
}

impl Member {
    /// Membre disponible toute la journée locale, sans jours fériés.
    pub fn new<N: Into<String>, E: Into<String>, T: Into<String>>(
        name: N,
        email: E,
        timezone: T,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            constraints: Constraints {
                timezone: timezone.into(),
                earliest_oncall_hour: 0,
                latest_oncall_hour: default_latest_hour(),
                public_holidays: HolidayPolicy::default(),
            },
        }
    }

    pub fn with_hours(mut self, earliest: u8, latest: u8) -> Self {
        self.constraints.earliest_oncall_hour = earliest;
        self.constraints.latest_oncall_hour = latest;
        self
    }

    pub fn with_holidays(mut self, policy: HolidayPolicy) -> Self {
        self.constraints.public_holidays = policy;
        self
    }
}

/// Contraintes dures (heures locales) et souples (jours fériés) d'un membre.
///
/// `latest_oncall_hour` peut dépasser 23 : 30 signifie "jusqu'à 6h le lendemain".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraints {
    pub timezone: String,
    #[serde(default)]
    pub earliest_oncall_hour: u8,
    #[serde(default = "default_latest_hour")]
    pub latest_oncall_hour: u8,
    #[serde(default)]
    pub public_holidays: HolidayPolicy,
}

fn default_latest_hour() -> u8 {
    24
}

/// Jours fériés d'un membre : ceux du pays, plus `include_dates`, moins `exclude_dates`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayPolicy {
    #[serde(default)]
    pub country_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_dates: Vec<NaiveDate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_dates: Vec<NaiveDate>,
}

/// Créneau récurrent : jours de la semaine et heures "HH:MM ZONE".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftTemplate {
    pub name: String,
    pub days: Vec<String>,
    pub start_time: String,
    pub end_time: String,
}

impl ShiftTemplate {
    pub fn new<N, S, E>(name: N, days: &[&str], start_time: S, end_time: E) -> Self
    where
        N: Into<String>,
        S: Into<String>,
        E: Into<String>,
    {
        Self {
            name: name.into(),
            days: days.iter().map(|d| (*d).to_owned()).collect(),
            start_time: start_time.into(),
            end_time: end_time.into(),
        }
    }
}

/// Entrées d'un run : membres et créneaux, possédés par la configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub shifts: Vec<ShiftTemplate>,
}

impl Roster {
    pub fn find_member<'a>(&'a self, name: &str) -> Option<&'a Member> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// Identifiant d'occurrence : SHA-256 hexadécimal de "<début> - <fin>".
///
/// Sert uniquement de clé de dédoublonnage dans un run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShiftId(String);

impl ShiftId {
    pub fn from_bounds(start: &DateTime<FixedOffset>, end: &DateTime<FixedOffset>) -> Self {
        let text = format!("{} - {}", bound_text(start), bound_text(end));
        let digest = Sha256::digest(text.as_bytes());
        let mut hex = String::with_capacity(digest.len() * 2);
        for byte in digest {
            let _ = write!(hex, "{byte:02x}");
        }
        Self(hex)
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShiftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn bound_text(at: &DateTime<FixedOffset>) -> String {
    at.with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Occurrence concrète d'un créneau.
///
/// Les bornes gardent le décalage du créneau d'origine ; l'identifiant et le
/// chronotype sont calculés à la première demande puis figés.
#[derive(Debug, Clone)]
pub struct ShiftInstance {
    template: String,
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
    id: OnceCell<ShiftId>,
    chronotype: OnceCell<Chronotype>,
}

impl ShiftInstance {
    /// Crée une occurrence en validant que `end > start`.
    pub fn new<N: Into<String>>(
        template: N,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Result<Self, SchedError> {
        if end <= start {
            return Err(SchedError::InvalidTimeRange);
        }
        Ok(Self {
            template: template.into(),
            start,
            end,
            id: OnceCell::new(),
            chronotype: OnceCell::new(),
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }
    pub fn start(&self) -> DateTime<FixedOffset> {
        self.start
    }
    pub fn end(&self) -> DateTime<FixedOffset> {
        self.end
    }

    pub fn id(&self) -> &ShiftId {
        self.id
            .get_or_init(|| ShiftId::from_bounds(&self.start, &self.end))
    }

    pub fn chronotype(&self) -> Chronotype {
        *self
            .chronotype
            .get_or_init(|| classify_span(&self.start, &self.end))
    }

    /// Durée en minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

impl PartialEq for ShiftInstance {
    fn eq(&self, other: &Self) -> bool {
        self.template == other.template && self.start == other.start && self.end == other.end
    }
}

impl Eq for ShiftInstance {}

impl Serialize for ShiftInstance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ShiftInstance", 5)?;
        state.serialize_field("template", &self.template)?;
        state.serialize_field("id", self.id())?;
        state.serialize_field("start", &self.start)?;
        state.serialize_field("end", &self.end)?;
        state.serialize_field("chronotype", &self.chronotype())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap().fixed_offset()
    }

    #[test]
    fn same_bounds_same_id() {
        let a = ShiftInstance::new("a", at(2025, 7, 5, 22, 0), at(2025, 7, 6, 6, 0)).unwrap();
        let b = ShiftInstance::new("b", at(2025, 7, 5, 22, 0), at(2025, 7, 6, 6, 0)).unwrap();
        assert_eq!(a.id(), b.id());
        assert_eq!(a.id().as_str().len(), 64);
    }

    #[test]
    fn one_minute_changes_id() {
        let base = ShiftInstance::new("a", at(2025, 7, 5, 22, 0), at(2025, 7, 6, 6, 0)).unwrap();
        let later_start = ShiftInstance::new(
            "a",
            base.start() + Duration::minutes(1),
            base.end(),
        )
        .unwrap();
        let later_end =
            ShiftInstance::new("a", base.start(), base.end() + Duration::minutes(1)).unwrap();
        assert_ne!(base.id(), later_start.id());
        assert_ne!(base.id(), later_end.id());
    }

    #[test]
    fn id_ignores_display_offset() {
        let utc = at(2025, 7, 5, 22, 0);
        let paris = utc.with_timezone(&FixedOffset::east_opt(2 * 3600).unwrap());
        assert_eq!(
            ShiftId::from_bounds(&utc, &(utc + Duration::hours(8))),
            ShiftId::from_bounds(&paris, &(paris + Duration::hours(8)))
        );
    }

    #[test]
    fn rejects_empty_or_inverted_range() {
        let t = at(2025, 7, 5, 22, 0);
        assert!(matches!(
            ShiftInstance::new("a", t, t),
            Err(SchedError::InvalidTimeRange)
        ));
        assert!(ShiftInstance::new("a", t, t - Duration::hours(1)).is_err());
    }

    #[test]
    fn member_defaults_from_yaml() {
        let m: Member = serde_yaml::from_str(
            "name: Alice\nemail: alice@example.com\nconstraints:\n  timezone: Europe/Paris\n",
        )
        .unwrap();
        assert_eq!(m.constraints.earliest_oncall_hour, 0);
        assert_eq!(m.constraints.latest_oncall_hour, 24);
        assert!(m.constraints.public_holidays.include_dates.is_empty());
    }
}
