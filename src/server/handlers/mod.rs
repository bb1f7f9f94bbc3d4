pub mod auth;
pub mod breeding;
pub mod calving;
pub mod cattle;
pub mod dashboard;
pub mod health;
pub mod milk;
pub mod status;
pub mod users;

use chrono::NaiveDate;

/// The farm's calendar day, used for every date-dependent rule.
pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
