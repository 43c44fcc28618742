//! Email body rendering. One askama text template per notification kind,
//! wrapped in plain functions so callers never touch the template structs.

use askama::Template;

use crate::models::{Event, Feedback, User};

#[derive(Template)]
#[template(path = "emails/registration_confirmation.txt")]
struct RegistrationConfirmation<'a> {
    user: &'a User,
    event: &'a Event,
}

#[derive(Template)]
#[template(path = "emails/registration_cancelled.txt")]
struct RegistrationCancelled<'a> {
    user: &'a User,
    event: &'a Event,
}

#[derive(Template)]
#[template(path = "emails/parent_registration_notification.txt")]
struct ParentRegistrationNotification<'a> {
    student: &'a User,
    event: &'a Event,
}

#[derive(Template)]
#[template(path = "emails/parent_registration_cancelled.txt")]
struct ParentRegistrationCancelled<'a> {
    student: &'a User,
    event: &'a Event,
}

#[derive(Template)]
#[template(path = "emails/parent_feedback_notification.txt")]
struct ParentFeedbackNotification<'a> {
    student: &'a User,
    event: &'a Event,
    feedback: &'a Feedback,
}

pub fn registration_confirmation(user: &User, event: &Event) -> askama::Result<String> {
    RegistrationConfirmation { user, event }.render()
}

pub fn registration_cancelled(user: &User, event: &Event) -> askama::Result<String> {
    RegistrationCancelled { user, event }.render()
}

pub fn parent_registration_notification(student: &User, event: &Event) -> askama::Result<String> {
    ParentRegistrationNotification { student, event }.render()
}

pub fn parent_registration_cancelled(student: &User, event: &Event) -> askama::Result<String> {
    ParentRegistrationCancelled { student, event }.render()
}

pub fn parent_feedback_notification(
    student: &User,
    event: &Event,
    feedback: &Feedback,
) -> askama::Result<String> {
    ParentFeedbackNotification {
        student,
        event,
        feedback,
    }
    .render()
}
