use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};

/// Source of "today" and "now" for the ledger.
///
/// Payment rules compare renewal dates against today's calendar date, so the
/// services take the clock as a dependency instead of reading it directly.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    /// Local calendar date, UTC instants
    #[default]
    System,
    /// Frozen at the given instant
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Clock frozen at midnight UTC on `date`
    pub fn fixed_on(date: NaiveDate) -> Self {
        Clock::Fixed(date.and_time(NaiveTime::MIN).and_utc())
    }

    pub fn today(&self) -> NaiveDate {
        match self {
            Clock::System => Local::now().date_naive(),
            Clock::Fixed(instant) => instant.date_naive(),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(instant) => *instant,
        }
    }
}
