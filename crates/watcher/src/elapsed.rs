//! Human-readable elapsed time ("3 minutes ago", "3분 전")

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};

/// Unit of an elapsed-time component
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Period {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
}

impl Period {
    /// Coarsest first
    const DESCENDING: [Period; 5] = [
        Period::Day,
        Period::Hour,
        Period::Minute,
        Period::Second,
        Period::Millisecond,
    ];

    pub fn as_millis(self) -> u128 {
        match self {
            Period::Millisecond => 1,
            Period::Second => 1_000,
            Period::Minute => 60_000,
            Period::Hour => 3_600_000,
            Period::Day => 86_400_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitName {
    pub singular: &'static str,
    pub plural: &'static str,
}

impl UnitName {
    pub fn pick(&self, count: u128) -> &'static str {
        if count == 1 {
            self.singular
        } else {
            self.plural
        }
    }
}

/// Language table for elapsed-time and file status strings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodNames {
    /// Shown when less than one base period has passed
    pub just_now: &'static str,
    pub millisecond: UnitName,
    pub second: UnitName,
    pub minute: UnitName,
    pub hour: UnitName,
    pub day: UnitName,
    /// Between a count and its unit
    pub gap: &'static str,
    /// Appended after the last component
    pub suffix: &'static str,
    /// Status of a file whose write time cannot be queried
    pub not_found: &'static str,
    /// Status of a file that changed but could not be read
    pub unreadable: &'static str,
}

impl PeriodNames {
    pub const ENGLISH: PeriodNames = PeriodNames {
        just_now: "just a moment ago",
        millisecond: UnitName { singular: "ms", plural: "ms" },
        second: UnitName { singular: "second", plural: "seconds" },
        minute: UnitName { singular: "minute", plural: "minutes" },
        hour: UnitName { singular: "hour", plural: "hours" },
        day: UnitName { singular: "day", plural: "days" },
        gap: " ",
        suffix: " ago",
        not_found: "file not found",
        unreadable: "file could not be opened",
    };

    pub const KOREAN: PeriodNames = PeriodNames {
        just_now: "조금 전",
        millisecond: UnitName { singular: "ms", plural: "ms" },
        second: UnitName { singular: "초", plural: "초" },
        minute: UnitName { singular: "분", plural: "분" },
        hour: UnitName { singular: "시간", plural: "시간" },
        day: UnitName { singular: "일", plural: "일" },
        gap: "",
        suffix: " 전",
        not_found: "파일을 찾을 수 없음",
        unreadable: "파일을 열 수 없음",
    };

    pub fn unit(&self, period: Period) -> &UnitName {
        match period {
            Period::Millisecond => &self.millisecond,
            Period::Second => &self.second,
            Period::Minute => &self.minute,
            Period::Hour => &self.hour,
            Period::Day => &self.day,
        }
    }
}

/// Display language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Korean,
}

impl Language {
    pub fn names(self) -> &'static PeriodNames {
        match self {
            Language::English => &PeriodNames::ENGLISH,
            Language::Korean => &PeriodNames::KOREAN,
        }
    }
}

/// Format `elapsed` with units no finer than `base`.
///
/// Less than one `base` unit yields `names.just_now`. With `cut_smaller`
/// only the coarsest non-zero unit is kept.
pub fn format_elapsed(
    elapsed: Duration,
    base: Period,
    cut_smaller: bool,
    names: &PeriodNames,
) -> String {
    let total = elapsed.as_millis();
    if total < base.as_millis() {
        return names.just_now.to_string();
    }

    let mut remaining = total;
    let mut parts = Vec::new();
    for period in Period::DESCENDING {
        if period < base {
            break;
        }
        let count = remaining / period.as_millis();
        remaining %= period.as_millis();
        if count == 0 {
            continue;
        }

        parts.push(format!("{}{}{}", count, names.gap, names.unit(period).pick(count)));
        if cut_smaller {
            break;
        }
    }

    format!("{}{}", parts.join(" "), names.suffix)
}

/// [`format_elapsed`] for the time between `then` and `now`; a future `then` is "just now"
pub fn format_since(
    then: SystemTime,
    now: SystemTime,
    base: Period,
    cut_smaller: bool,
    names: &PeriodNames,
) -> String {
    let elapsed = now.duration_since(then).unwrap_or_default();
    format_elapsed(elapsed, base, cut_smaller, names)
}
