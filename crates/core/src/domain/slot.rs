// Booking time slots

use chrono::{DateTime, Duration, NaiveTime, Utc};

/// First bookable hour of the day
pub const OPENING_HOUR: u32 = 9;

/// Hour at which the last slot ends (exclusive)
pub const CLOSING_HOUR: u32 = 18;

/// Number of days, starting today, that slots are generated for
pub const BOOKING_DAYS: i64 = 7;

/// Number of slots offered to a client
pub const OFFERED_SLOTS: usize = 14;

/// Hourly slots starting today at opening time, in ascending order.
///
/// Slots are computed in UTC from `now_millis` and returned as epoch ms. Only
/// the first [`OFFERED_SLOTS`] are returned.
pub fn available_slots(now_millis: i64) -> Vec<i64> {
    let Some(now) = DateTime::<Utc>::from_timestamp_millis(now_millis) else {
        return Vec::new();
    };
    let today = now.date_naive();

    let mut slots = Vec::with_capacity(OFFERED_SLOTS);
    'days: for day in 0..BOOKING_DAYS {
        let date = today + Duration::days(day);
        for hour in OPENING_HOUR..CLOSING_HOUR {
            if slots.len() == OFFERED_SLOTS {
                break 'days;
            }
            if let Some(time) = NaiveTime::from_hms_opt(hour, 0, 0) {
                slots.push(date.and_time(time).and_utc().timestamp_millis());
            }
        }
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn millis(y: i32, m: u32, d: u32, h: u32, min: u32) -> i64 {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
            .timestamp_millis()
    }

    #[test]
    fn test_slots_start_today_at_opening() {
        let slots = available_slots(millis(2026, 3, 10, 14, 37));
        assert_eq!(slots.len(), OFFERED_SLOTS);
        assert_eq!(slots[0], millis(2026, 3, 10, 9, 0));
    }

    #[test]
    fn test_slots_roll_over_to_next_day() {
        let slots = available_slots(millis(2026, 3, 10, 8, 0));
        // 9 slots today (09:00..17:00), then tomorrow from opening
        assert_eq!(slots[8], millis(2026, 3, 10, 17, 0));
        assert_eq!(slots[9], millis(2026, 3, 11, 9, 0));
        assert_eq!(*slots.last().unwrap(), millis(2026, 3, 11, 13, 0));
    }

    #[test]
    fn test_slots_are_hourly_within_opening_hours() {
        let slots = available_slots(millis(2026, 12, 31, 23, 59));
        assert!(slots.windows(2).all(|w| w[0] < w[1]));
        for slot in slots {
            let hour = DateTime::<Utc>::from_timestamp_millis(slot).unwrap().hour();
            assert!((OPENING_HOUR..CLOSING_HOUR).contains(&hour));
        }
    }
}
