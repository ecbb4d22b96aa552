#![forbid(unsafe_code)]
//! Oncall-gen : moteur de génération de plannings d'astreinte (sans BD).
//!
//! - Expansion de créneaux récurrents (jours + heure locale "HH:MM ZONE").
//! - Classification semaine / week-end / mixte.
//! - Éligibilité par membre : fuseau IANA, heures au plus tôt / au plus tard.
//! - Jours fériés : contrainte souple, annotée mais jamais excluante.
//! - Assignation finale par politique interchangeable.

pub mod chronotype;
pub mod config;
pub mod holiday;
pub mod io;
pub mod model;
pub mod report;
pub mod scheduler;
pub mod template;

pub use chronotype::{classify_span, Chronotype};
pub use config::{Config, GeneratorConfig, EXAMPLE_CONFIG};
pub use holiday::{HolidayCalendar, MonthDay};
pub use model::{Constraints, HolidayPolicy, Member, Roster, ShiftId, ShiftInstance, ShiftTemplate};
pub use report::{ReportRenderer, TextReport};
pub use scheduler::{
    AssignmentPolicy, AssignmentTable, AvailabilityReport, Candidate, CandidatePool, LeastLoaded,
    SchedError, Scheduler, ShiftCandidates,
};
pub use template::{expand_next, expand_within, parse_clock_time, ClockTime, Horizon};
