use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Half-open interval `[hora_inicio, hora_fin)` on a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub hora_inicio: NaiveTime,
    pub hora_fin: NaiveTime,
}

impl Slot {
    /// Returns `None` unless `hora_inicio < hora_fin`.
    pub fn new(hora_inicio: NaiveTime, hora_fin: NaiveTime) -> Option<Self> {
        (hora_inicio < hora_fin).then_some(Self {
            hora_inicio,
            hora_fin,
        })
    }

    /// Touching intervals (one ends where the other starts) do not overlap.
    pub fn overlaps(&self, other: &Slot) -> bool {
        self.hora_inicio < other.hora_fin && self.hora_fin > other.hora_inicio
    }
}

pub fn parse_fecha(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| anyhow::anyhow!("invalid date (expected YYYY-MM-DD): {s}"))
}

/// Accepts `HH:MM` or `HH:MM:SS`.
pub fn parse_hora(s: &str) -> anyhow::Result<NaiveTime> {
    let s = s.trim();
    let parts: Vec<&str> = s.split(':').collect();
    let (hour, minute, second) = match parts.as_slice() {
        [h, m] => (*h, *m, "0"),
        [h, m, sec] => (*h, *m, *sec),
        _ => return Err(anyhow::anyhow!("invalid time format: {s}")),
    };
    if [hour, minute, second]
        .iter()
        .any(|part| part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()))
    {
        return Err(anyhow::anyhow!("invalid time format: {s}"));
    }
    let hour: u32 = hour
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid hour in: {s}"))?;
    let minute: u32 = minute
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid minute in: {s}"))?;
    let second: u32 = second
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid second in: {s}"))?;
    NaiveTime::from_hms_opt(hour, minute, second)
        .ok_or_else(|| anyhow::anyhow!("time out of range: {s}"))
}
