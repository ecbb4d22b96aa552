use crate::holiday::HolidayCalendar;
use crate::model::Roster;
use crate::scheduler::SchedError;
use crate::template::Horizon;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Fichier de configuration complet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Directive `tracing` par défaut (ex. `info`, `oncall_gen=debug`).
    #[serde(default)]
    pub loglevel: Option<String>,
    #[serde(default)]
    pub oncall_generator: GeneratorConfig,
    /// Répertoire du fichier chargé, pour les chemins relatifs.
    #[serde(skip)]
    pub config_dir: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// `"2w"`, `"10d"`... ; une semaine si absent.
    #[serde(default)]
    pub schedule_duration: Option<String>,
    #[serde(default)]
    pub public_holiday_calendar_file: Option<PathBuf>,
    #[serde(flatten)]
    pub roster: Roster,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_yaml_str(&data, dir).with_context(|| format!("loading config {}", path.display()))
    }

    pub fn from_yaml_str<P: AsRef<Path>>(data: &str, config_dir: P) -> Result<Self> {
        let mut cfg: Config = serde_yaml::from_str(data).context("parsing config YAML")?;
        cfg.config_dir = config_dir.as_ref().to_path_buf();
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&mut self) -> Result<()> {
        self.oncall_generator
            .validate(&self.config_dir)
            .context("invalid `oncall_generator` config")
    }
}

impl GeneratorConfig {
    /// Vérifie la forme des entrées et résout le chemin du calendrier.
    ///
    /// Jours et heures des créneaux sont validés par le moteur lui-même.
    pub fn validate(&mut self, config_dir: &Path) -> Result<()> {
        self.horizon()?;
        if let Some(file) = self.public_holiday_calendar_file.take() {
            self.public_holiday_calendar_file = Some(resolve_path(file, config_dir)?);
        }
        for (idx, m) in self.roster.members.iter().enumerate() {
            if m.name.trim().is_empty() {
                bail!("empty or missing member name at index {idx}");
            }
            if m.email.trim().is_empty() {
                bail!("empty or missing member email at index {idx}");
            }
            let c = &m.constraints;
            if c.timezone.trim().is_empty() {
                bail!("missing or empty timezone for member {:?}", m.name);
            }
            if c.earliest_oncall_hour > 23 {
                bail!(
                    "earliest_oncall_hour must be within 0..=23 for member {:?}, got {}",
                    m.name,
                    c.earliest_oncall_hour
                );
            }
            if c.latest_oncall_hour > 47 {
                bail!(
                    "latest_oncall_hour must be within 0..=47 for member {:?}, got {}",
                    m.name,
                    c.latest_oncall_hour
                );
            }
        }
        for (idx, s) in self.roster.shifts.iter().enumerate() {
            if s.name.trim().is_empty() {
                bail!("empty or missing shift name at index {idx}");
            }
            if s.days.is_empty() {
                bail!("shift {:?} must define at least one day", s.name);
            }
        }
        Ok(())
    }

    pub fn horizon(&self) -> Result<Horizon, SchedError> {
        match &self.schedule_duration {
            Some(raw) => Horizon::parse(raw),
            None => Ok(Horizon::default()),
        }
    }

    pub fn load_calendar(&self) -> Result<Option<HolidayCalendar>, SchedError> {
        self.public_holiday_calendar_file
            .as_ref()
            .map(HolidayCalendar::load)
            .transpose()
    }
}

/// `~/x` part du répertoire personnel, un chemin relatif du répertoire de config.
fn resolve_path(file: PathBuf, config_dir: &Path) -> Result<PathBuf> {
    if let Ok(rest) = file.strip_prefix("~") {
        let home = dirs::home_dir().context("cannot expand `~`: no home directory")?;
        return Ok(home.join(rest));
    }
    if file.is_relative() {
        Ok(config_dir.join(file))
    } else {
        Ok(file)
    }
}

pub const EXAMPLE_CONFIG: &str = r#"# oncall-gen configuration
loglevel: info

oncall_generator:
  # horizon of the generated schedule: w(eeks), d(ays), h(ours), m(inutes)
  schedule_duration: 2w
  # relative paths are resolved against this file's directory, `~` against $HOME
  public_holiday_calendar_file: holidays.yaml

  members:
    - name: Alice Martin
      email: alice@example.com
      constraints:
        timezone: America/New_York
        earliest_oncall_hour: 18
        # may exceed 23: 30 means "until 6am the next day"
        latest_oncall_hour: 30
        public_holidays:
          country_name: US
          include_dates:
            - 2025-07-03
          exclude_dates: []
    - name: Kenji Sato
      email: kenji@example.com
      constraints:
        timezone: Asia/Tokyo
        earliest_oncall_hour: 9
        latest_oncall_hour: 17
        public_holidays:
          country_name: JP

  shifts:
    # start/end are "HH:MM ZONE", ZONE being a fixed offset (UTC, CET, +02:00...)
    - name: weekend_noram
      days: [Saturday, Sunday]
      start_time: "22:00 UTC"
      end_time: "06:00 UTC"
    - name: weekday_apac
      days: [Monday, Tuesday, Wednesday, Thursday, Friday]
      start_time: "00:00 UTC"
      end_time: "08:00 UTC"
"#;
