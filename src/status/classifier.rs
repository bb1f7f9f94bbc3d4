//! Lifecycle status rules.
//!
//! Age is the calendar month difference between birth date and today
//! (`years * 12 + months`), ignoring the day of month. Females are classified
//! by age only until they have a breeding or calving on record; from then on
//! the latest reproductive events decide.

use chrono::{Datelike, Days, Months, NaiveDate};

use super::{CattleStatus, Classification, Sex, StatusCategory};
use crate::errors::StatusError;

/// Storage format for every record date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const STEAMING_MONTHS: u32 = 7;
const PREGNANCY_CHECK_DAYS: u64 = 42;

pub fn age_in_months(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    (today.year() - birth_date.year()) * 12 + (today.month() as i32 - birth_date.month() as i32)
}

/// Start of the dry-off period: seven calendar months after breeding.
pub fn steaming_date(breeding_date: NaiveDate) -> NaiveDate {
    breeding_date
        .checked_add_months(Months::new(STEAMING_MONTHS))
        .unwrap_or(NaiveDate::MAX)
}

pub fn pregnancy_check_date(breeding_date: NaiveDate) -> NaiveDate {
    breeding_date
        .checked_add_days(Days::new(PREGNANCY_CHECK_DAYS))
        .unwrap_or(NaiveDate::MAX)
}

/// Parses a stored `YYYY-MM-DD` date. Unpadded forms such as `2024-3-5` are
/// rejected so that text order of stored dates matches calendar order.
pub fn parse_record_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .filter(|date| date.format(DATE_FORMAT).to_string() == value)
}

pub(crate) fn parse_birth_date(value: Option<&str>) -> Result<NaiveDate, StatusError> {
    let value = value
        .filter(|v| !v.trim().is_empty())
        .ok_or(StatusError::MissingBirthDate)?;
    parse_record_date(value).ok_or_else(|| StatusError::InvalidBirthDate(value.to_string()))
}

pub(crate) fn parse_event_date(event: &'static str, value: &str) -> Result<NaiveDate, StatusError> {
    parse_record_date(value).ok_or_else(|| StatusError::InvalidEventDate {
        event,
        value: value.to_string(),
    })
}

/// Derive the lifecycle status of one animal.
///
/// `latest_breeding` and `latest_calving` are the dates of the most recent
/// breeding and calving events. They are ignored for males.
pub fn classify(
    sex: Sex,
    birth_date: NaiveDate,
    latest_breeding: Option<NaiveDate>,
    latest_calving: Option<NaiveDate>,
    today: NaiveDate,
) -> Classification {
    let age = age_in_months(birth_date, today);
    match sex {
        Sex::Male => classify_male(age),
        Sex::Female => classify_female(age, latest_breeding, latest_calving, today),
    }
}

fn classify_male(age: i32) -> Classification {
    let status = match age {
        i32::MIN..=3 => CattleStatus::NewbornCalf,
        4..=10 => CattleStatus::WeanedCalf,
        11..=23 => CattleStatus::Yearling,
        _ => CattleStatus::MatureBull,
    };
    Classification::of(StatusCategory::Bull, status)
}

fn classify_female(
    age: i32,
    latest_breeding: Option<NaiveDate>,
    latest_calving: Option<NaiveDate>,
    today: NaiveDate,
) -> Classification {
    use CattleStatus::*;
    use StatusCategory::*;

    match (latest_breeding, latest_calving) {
        (None, None) => match age {
            i32::MIN..=3 => Classification::of(YoungStock, NewbornCalf),
            4..=10 => Classification::of(YoungStock, Weaned),
            _ => Classification::of(YoungStock, BullyingHeifer),
        },
        (Some(_), None) => Classification::of(YoungStock, InCalfHeifer),
        (Some(bred), Some(calved)) if bred > calved => {
            if today >= steaming_date(bred) {
                Classification::of(MatureStock, Dry)
            } else {
                Classification::of(MatureStock, LactatingInCalf)
            }
        }
        (Some(_), Some(_)) | (None, Some(_)) => Classification::of(MatureStock, Lactating),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn pair(c: Classification) -> (&'static str, &'static str) {
        (c.category.as_str(), c.status.as_str())
    }

    #[test]
    fn age_uses_calendar_months() {
        assert_eq!(age_in_months(date("2024-01-31"), date("2024-02-01")), 1);
        assert_eq!(age_in_months(date("2023-12-15"), date("2024-12-14")), 12);
        assert_eq!(age_in_months(date("2024-05-01"), date("2024-04-01")), -1);
    }

    #[test]
    fn record_dates_must_be_zero_padded() {
        assert_eq!(parse_record_date(" 2024-03-05 "), Some(date("2024-03-05")));
        assert_eq!(parse_record_date("2024-3-5"), None);
        assert_eq!(parse_record_date("2024-10-1"), None);
        assert_eq!(parse_record_date("05/03/2024"), None);
    }

    #[test]
    fn derived_breeding_dates() {
        assert_eq!(steaming_date(date("2024-01-10")), date("2024-08-10"));
        assert_eq!(steaming_date(date("2024-07-31")), date("2025-02-28"));
        assert_eq!(pregnancy_check_date(date("2024-01-10")), date("2024-02-21"));
    }

    #[test]
    fn female_without_events_at_400_days_is_bullying_heifer() {
        let today = date("2024-06-15");
        let born = today - chrono::Duration::days(400);
        let c = classify(Sex::Female, born, None, None, today);
        assert_eq!(pair(c), ("young_stock", "bullying heifer"));
    }

    #[test]
    fn female_age_brackets() {
        let today = date("2024-12-01");
        let cases = [
            ("2024-10-01", "newborn calf"),
            ("2024-09-01", "newborn calf"),
            ("2024-08-01", "weaned"),
            ("2024-02-01", "weaned"),
            ("2024-01-01", "bullying heifer"),
        ];
        for (born, expected) in cases {
            let c = classify(Sex::Female, date(born), None, None, today);
            assert_eq!(pair(c), ("young_stock", expected), "born {}", born);
        }
    }

    #[test]
    fn bred_female_without_calving_is_in_calf_heifer() {
        let c = classify(
            Sex::Female,
            date("2022-11-01"),
            Some(date("2024-01-10")),
            None,
            date("2024-03-01"),
        );
        assert_eq!(pair(c), ("young_stock", "in_calf heifer"));
    }

    #[test]
    fn bred_after_calving_is_lactating_in_calf_until_steaming() {
        let born = date("2021-03-01");
        let bred = Some(date("2024-01-10"));
        let calved = Some(date("2023-06-01"));

        let before = classify(Sex::Female, born, bred, calved, date("2024-07-01"));
        assert_eq!(pair(before), ("mature_stock", "lactating in_calf"));

        let after = classify(Sex::Female, born, bred, calved, date("2024-09-01"));
        assert_eq!(pair(after), ("mature_stock", "dry"));
    }

    #[test]
    fn steaming_boundary_is_exact() {
        let born = date("2021-03-01");
        let bred = Some(date("2024-01-10"));
        let calved = Some(date("2023-06-01"));

        let eve = classify(Sex::Female, born, bred, calved, date("2024-08-09"));
        assert_eq!(eve.status, CattleStatus::LactatingInCalf);

        let day = classify(Sex::Female, born, bred, calved, date("2024-08-10"));
        assert_eq!(day.status, CattleStatus::Dry);
    }

    #[test]
    fn calving_after_breeding_is_lactating() {
        let c = classify(
            Sex::Female,
            date("2021-03-01"),
            Some(date("2023-10-01")),
            Some(date("2024-02-01")),
            date("2024-03-01"),
        );
        assert_eq!(pair(c), ("mature_stock", "lactating"));
    }

    #[test]
    fn same_day_breeding_and_calving_counts_as_calving_latest() {
        let d = date("2024-02-01");
        let c = classify(Sex::Female, date("2021-03-01"), Some(d), Some(d), date("2024-03-01"));
        assert_eq!(c.status, CattleStatus::Lactating);
    }

    #[test]
    fn calving_without_breeding_record_is_lactating() {
        let c = classify(
            Sex::Female,
            date("2020-01-01"),
            None,
            Some(date("2024-02-01")),
            date("2024-03-01"),
        );
        assert_eq!(pair(c), ("mature_stock", "lactating"));
    }

    #[test]
    fn events_override_age_for_young_females() {
        let today = date("2024-03-01");
        let young = date("2023-12-01");
        let bred = classify(Sex::Female, young, Some(date("2024-02-01")), None, today);
        assert_eq!(bred.status, CattleStatus::InCalfHeifer);

        let calved = classify(Sex::Female, young, None, Some(date("2024-02-01")), today);
        assert_eq!(calved.status, CattleStatus::Lactating);
    }

    #[test]
    fn male_brackets_ignore_events() {
        let today = date("2024-12-01");
        let cases = [
            ("2024-09-01", "newborn calf"),
            ("2024-08-01", "weaned calf"),
            ("2024-02-01", "weaned calf"),
            ("2024-01-01", "yearling"),
            ("2023-01-01", "yearling"),
            ("2022-12-01", "mature bull"),
        ];
        for (born, expected) in cases {
            let plain = classify(Sex::Male, date(born), None, None, today);
            let with_events = classify(
                Sex::Male,
                date(born),
                Some(date("2024-06-01")),
                Some(date("2024-01-01")),
                today,
            );
            assert_eq!(pair(plain), ("bull", expected), "born {}", born);
            assert_eq!(plain, with_events);
        }
    }

    #[test]
    fn male_born_25_months_ago_is_mature_bull() {
        let today = date("2024-06-15");
        let born = date("2022-05-15");
        assert_eq!(age_in_months(born, today), 25);
        let c = classify(Sex::Male, born, None, None, today);
        assert_eq!(pair(c), ("bull", "mature bull"));
    }

    #[test]
    fn future_birth_date_is_newborn() {
        let c = classify(Sex::Female, date("2025-01-01"), None, None, date("2024-06-01"));
        assert_eq!(c.status, CattleStatus::NewbornCalf);
    }

    #[test]
    fn every_result_is_a_valid_pair() {
        let today = date("2024-09-01");
        let dates = [None, Some(date("2023-06-01")), Some(date("2024-01-10"))];
        for sex in [Sex::Male, Sex::Female] {
            for born in ["2024-08-01", "2024-01-01", "2021-01-01"] {
                for bred in dates {
                    for calved in dates {
                        let c = classify(sex, date(born), bred, calved, today);
                        assert!(c.category.allows(c.status), "{}", c);
                    }
                }
            }
        }
    }

    #[test]
    fn birth_date_parsing() {
        assert_eq!(parse_birth_date(None), Err(StatusError::MissingBirthDate));
        assert_eq!(parse_birth_date(Some("  ")), Err(StatusError::MissingBirthDate));
        assert!(matches!(
            parse_birth_date(Some("03/04/2021")),
            Err(StatusError::InvalidBirthDate(_))
        ));
        assert_eq!(parse_birth_date(Some("2021-04-03")), Ok(date("2021-04-03")));
    }
}
