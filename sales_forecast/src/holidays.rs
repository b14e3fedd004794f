//! Public holiday calendars used as model regressors

use crate::error::{ForecastError, Result};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A region whose public holidays can be added to a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HolidayRegion {
    /// United States federal holidays
    #[serde(rename = "US")]
    UnitedStates,
}

/// A named holiday on a specific date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: String,
}

impl HolidayRegion {
    /// Short region code
    pub fn code(&self) -> &'static str {
        match self {
            HolidayRegion::UnitedStates => "US",
        }
    }

    /// All holidays in a calendar year, in date order
    pub fn holidays_in_year(&self, year: i32) -> Vec<Holiday> {
        let mut holidays = match self {
            HolidayRegion::UnitedStates => us_holidays(year),
        };
        holidays.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.name.cmp(&b.name)));
        holidays
    }

    /// All holidays between `start` and `end` inclusive, in date order
    pub fn holidays_between(&self, start: NaiveDate, end: NaiveDate) -> Vec<Holiday> {
        if end < start {
            return Vec::new();
        }

        // Observed dates can spill into the neighbouring year
        (start.year() - 1..=end.year() + 1)
            .flat_map(|year| self.holidays_in_year(year))
            .filter(|h| h.date >= start && h.date <= end)
            .collect()
    }
}

impl FromStr for HolidayRegion {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "US" | "USA" | "UNITED STATES" => Ok(HolidayRegion::UnitedStates),
            _ => Err(ForecastError::InvalidParameter(format!(
                "Unsupported holiday region: {}",
                s
            ))),
        }
    }
}

fn us_holidays(year: i32) -> Vec<Holiday> {
    let mut holidays = Vec::new();

    let mut fixed = |month: u32, day: u32, name: &str| {
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            holidays.push(Holiday {
                date,
                name: name.to_string(),
            });
            // Weekend dates are observed on the closest weekday
            let observed = match date.weekday() {
                Weekday::Sat => Some(date - Duration::days(1)),
                Weekday::Sun => Some(date + Duration::days(1)),
                _ => None,
            };
            if let Some(observed) = observed {
                holidays.push(Holiday {
                    date: observed,
                    name: format!("{} (Observed)", name),
                });
            }
        }
    };

    fixed(1, 1, "New Year's Day");
    if year >= 2021 {
        fixed(6, 19, "Juneteenth National Independence Day");
    }
    fixed(7, 4, "Independence Day");
    fixed(11, 11, "Veterans Day");
    fixed(12, 25, "Christmas Day");

    let floating = [
        (1, Weekday::Mon, 3, "Martin Luther King Jr. Day"),
        (2, Weekday::Mon, 3, "Washington's Birthday"),
        (9, Weekday::Mon, 1, "Labor Day"),
        (10, Weekday::Mon, 2, "Columbus Day"),
        (11, Weekday::Thu, 4, "Thanksgiving"),
    ];
    for (month, weekday, n, name) in floating {
        if let Some(date) = NaiveDate::from_weekday_of_month_opt(year, month, weekday, n) {
            holidays.push(Holiday {
                date,
                name: name.to_string(),
            });
        }
    }

    if let Some(date) = last_weekday_of_month(year, 5, Weekday::Mon) {
        holidays.push(Holiday {
            date,
            name: "Memorial Day".to_string(),
        });
    }

    holidays
}

fn last_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let mut date = NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()?;
    while date.weekday() != weekday {
        date = date.pred_opt()?;
    }
    Some(date)
}
