use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// Monday to Sunday, the order schedules are rendered in.
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Which days of the week a recurser wants to be paired on.
///
/// Stored as a nested map keyed by lowercase day name, so every persisted
/// schedule carries all seven days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeekSchedule {
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
}

impl WeekSchedule {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Monday through Friday, the schedule every new subscriber starts with.
    pub fn weekdays() -> Self {
        Self {
            monday: true,
            tuesday: true,
            wednesday: true,
            thursday: true,
            friday: true,
            saturday: false,
            sunday: false,
        }
    }

    pub fn from_days<'a>(days: impl IntoIterator<Item = &'a Weekday>) -> Self {
        let mut schedule = Self::empty();
        for day in days {
            schedule.set(*day, true);
        }
        schedule
    }

    pub fn is_scheduled(&self, day: Weekday) -> bool {
        match day {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }

    pub fn set(&mut self, day: Weekday, scheduled: bool) {
        let slot = match day {
            Weekday::Mon => &mut self.monday,
            Weekday::Tue => &mut self.tuesday,
            Weekday::Wed => &mut self.wednesday,
            Weekday::Thu => &mut self.thursday,
            Weekday::Fri => &mut self.friday,
            Weekday::Sat => &mut self.saturday,
            Weekday::Sun => &mut self.sunday,
        };
        *slot = scheduled;
    }

    pub fn days(&self) -> Vec<Weekday> {
        WEEK.into_iter()
            .filter(|day| self.is_scheduled(*day))
            .collect()
    }

    /// Human readable list, e.g. `Mondays, Wednesdays, and Fridays`.
    pub fn describe(&self) -> String {
        let days: Vec<String> = self
            .days()
            .into_iter()
            .map(|day| format!("{}s", day_name(day)))
            .collect();

        match days.split_last() {
            None => "no days".to_string(),
            Some((only, [])) => only.clone(),
            Some((last, rest)) => format!("{}, and {}", rest.join(", "), last),
        }
    }
}

/// Lowercase attribute name of a day inside the stored schedule map.
pub fn field_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
