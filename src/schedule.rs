use crate::error::Error;
use crate::session::NewSession;
use crate::supabase::rest::{self, Authority};
use chrono::{Days, NaiveDate};

#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum Cadence {
    Daily,
    Weekly,
}

impl Cadence {
    fn step_days(&self) -> u64 {
        match self {
            Self::Daily => 1,
            Self::Weekly => 7,
        }
    }
}

/// Expands a recurring lesson into one occurrence per date from `start` to
/// `end` inclusive, advancing by the cadence step. Empty when `start` is
/// after `end`.
pub fn expand_occurrences(start: NaiveDate, end: NaiveDate, cadence: Cadence) -> Vec<NaiveDate> {
    let step = Days::new(cadence.step_days());
    let mut occurrences = Vec::new();
    let mut date = start;
    while date <= end {
        occurrences.push(date);
        match date.checked_add_days(step) {
            Some(next) => date = next,
            None => break,
        }
    }
    occurrences
}

/// Creates one `sessions` row per occurrence, all sharing the same
/// time-of-day and session type, in a single batch insert.
pub async fn create_recurring_sessions(
    start: NaiveDate,
    end: NaiveDate,
    cadence: Cadence,
    time: &str,
    session_type: &str,
) -> Result<usize, Error> {
    let rows = expand_occurrences(start, end, cadence)
        .into_iter()
        .map(|date| NewSession {
            date,
            time: time.to_string(),
            session_type: session_type.to_string(),
        })
        .collect::<Vec<_>>();
    if rows.is_empty() {
        return Ok(0);
    }
    rest::insert("sessions", &rows, Authority::CallerSession).await?;
    Ok(rows.len())
}

/// Creates a single, non-recurring session.
pub async fn create_session(date: NaiveDate, time: &str, session_type: &str) -> Result<(), Error> {
    let row = NewSession {
        date,
        time: time.to_string(),
        session_type: session_type.to_string(),
    };
    rest::insert("sessions", &row, Authority::CallerSession).await
}
