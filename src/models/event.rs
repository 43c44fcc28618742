use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "event_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Workshop,
    Seminar,
    CulturalFest,
    SportsEvent,
    ClubEvent,
    Exam,
}

/// A school event. Created unapproved by a teacher; flipped to approved
/// exactly once by an administrator; never deleted in-flow.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub event_type: EventType,
    pub department: String,
    pub date_time: DateTime<Utc>,
    /// Hours, two-decimal precision, bounded 0.2..=8.
    pub duration_hours: Decimal,
    /// Link to uploaded material, if any. Upload storage is out of scope.
    pub material: Option<String>,
    pub venue_id: Option<Uuid>,
    pub target_groups: String,
    pub registration_required: bool,
    pub resources: String,
    pub created_by: Option<Uuid>,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Start time plus duration. Two-decimal hours always map to a whole
    /// number of milliseconds, so nothing is lost in the conversion.
    pub fn end_time(&self) -> DateTime<Utc> {
        let millis = (self.duration_hours * Decimal::from(3_600_000))
            .to_i64()
            .unwrap_or(0);
        self.date_time + Duration::milliseconds(millis)
    }
}

#[derive(Debug, Deserialize, validator::Validate)]
pub struct NewEvent {
    #[validate(length(min = 1, max = 255, message = "Event name must not be blank"))]
    pub name: String,
    pub event_type: EventType,
    #[validate(length(min = 1, max = 100, message = "Department must not be blank"))]
    pub department: String,
    pub date_time: DateTime<Utc>,
    pub duration_hours: Decimal,
    pub material: Option<String>,
    pub venue_id: Option<Uuid>,
    #[serde(default)]
    pub coordinator_ids: Vec<Uuid>,
    #[validate(length(min = 1, max = 200, message = "Target groups must not be blank"))]
    pub target_groups: String,
    #[serde(default = "default_registration_required")]
    pub registration_required: bool,
    #[serde(default)]
    pub resources: String,
}

fn default_registration_required() -> bool {
    true
}

pub const MIN_DURATION_HOURS: Decimal = Decimal::from_parts(2, 0, 0, false, 1);
pub const MAX_DURATION_HOURS: Decimal = Decimal::from_parts(8, 0, 0, false, 0);

impl NewEvent {
    /// Range check for the duration field; the rest of the field validation
    /// lives in the `Validate` derive.
    pub fn duration_in_range(&self) -> bool {
        self.duration_hours >= MIN_DURATION_HOURS && self.duration_hours <= MAX_DURATION_HOURS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str_exact(s).unwrap()
    }

    fn event_with_duration(duration: Decimal) -> Event {
        Event {
            id: Uuid::new_v4(),
            name: "Science Fair".into(),
            event_type: EventType::Workshop,
            department: "Science".into(),
            date_time: "2026-03-01T09:00:00Z".parse().unwrap(),
            duration_hours: duration,
            material: None,
            venue_id: None,
            target_groups: "Students".into(),
            registration_required: true,
            resources: String::new(),
            created_by: None,
            approved: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn end_time_adds_whole_hours() {
        let event = event_with_duration(dec("2"));
        assert_eq!(event.end_time() - event.date_time, Duration::hours(2));
    }

    #[test]
    fn end_time_is_exact_for_two_decimal_durations() {
        // 0.01 h = 36 s, so any two-decimal duration is a whole second count.
        let event = event_with_duration(dec("1.25"));
        assert_eq!(
            event.end_time() - event.date_time,
            Duration::minutes(75)
        );

        let event = event_with_duration(dec("0.2"));
        assert_eq!(
            event.end_time() - event.date_time,
            Duration::seconds(720)
        );
    }

    #[test]
    fn duration_bounds_are_inclusive() {
        assert_eq!(MIN_DURATION_HOURS, dec("0.2"));
        assert_eq!(MAX_DURATION_HOURS, dec("8"));
    }
}
