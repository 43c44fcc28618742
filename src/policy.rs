//! Capability predicates gating the workflow operations. Each is a pure
//! function of the acting user (and sometimes the target entity); failing a
//! predicate aborts the operation before any data is touched.

use crate::models::{Event, Profile, Role, User};

/// An authenticated user together with their profile, resolved once per
/// request. Accounts without a profile are neither students nor teachers.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user: User,
    pub profile: Option<Profile>,
}

impl Actor {
    pub fn is_student(&self) -> bool {
        self.has_role(Role::Student)
    }

    pub fn is_teacher(&self) -> bool {
        self.has_role(Role::Teacher)
    }

    /// The elevated/staff bit is owned by the auth subsystem, not the
    /// profile role.
    pub fn is_admin(&self) -> bool {
        self.user.is_staff
    }

    pub fn owns_event(&self, event: &Event) -> bool {
        event.created_by == Some(self.user.id)
    }

    fn has_role(&self, role: Role) -> bool {
        self.profile.as_ref().is_some_and(|p| p.role == role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn user(is_staff: bool) -> User {
        User {
            id: Uuid::new_v4(),
            username: "casey".into(),
            email: "casey@school.example".into(),
            password_hash: String::new(),
            is_staff,
            created_at: Utc::now(),
        }
    }

    fn actor(role: Option<Role>, is_staff: bool) -> Actor {
        let user = user(is_staff);
        let profile = role.map(|role| Profile {
            user_id: user.id,
            role,
            parent_email: None,
        });
        Actor { user, profile }
    }

    #[test]
    fn role_predicates_follow_the_profile() {
        let student = actor(Some(Role::Student), false);
        assert!(student.is_student());
        assert!(!student.is_teacher());

        let teacher = actor(Some(Role::Teacher), false);
        assert!(teacher.is_teacher());
        assert!(!teacher.is_student());
    }

    #[test]
    fn missing_profile_means_no_role() {
        let bare = actor(None, false);
        assert!(!bare.is_student());
        assert!(!bare.is_teacher());
    }

    #[test]
    fn admin_comes_from_the_staff_flag_not_the_role() {
        let staff = actor(None, true);
        assert!(staff.is_admin());

        let teacher = actor(Some(Role::Teacher), false);
        assert!(!teacher.is_admin());
    }

    #[test]
    fn event_ownership_matches_creator() {
        let teacher = actor(Some(Role::Teacher), false);
        let mut event = crate::models::Event {
            id: Uuid::new_v4(),
            name: "Chess Open".into(),
            event_type: crate::models::EventType::ClubEvent,
            department: "Clubs".into(),
            date_time: Utc::now(),
            duration_hours: rust_decimal::Decimal::ONE,
            material: None,
            venue_id: None,
            target_groups: "Students".into(),
            registration_required: true,
            resources: String::new(),
            created_by: Some(teacher.user.id),
            approved: false,
            created_at: Utc::now(),
        };
        assert!(teacher.owns_event(&event));

        event.created_by = None;
        assert!(!teacher.owns_event(&event));
    }
}
