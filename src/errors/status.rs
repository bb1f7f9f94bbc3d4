//! Data errors raised while deriving an animal's lifecycle status.
//!
//! These never abort a herd sweep: the affected animal is skipped and the
//! error is logged.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatusError {
    /// Birth date missing on the animal record
    #[error("Birth date is missing")]
    MissingBirthDate,

    /// Birth date present but not `YYYY-MM-DD`
    #[error("Invalid birth date '{0}'")]
    InvalidBirthDate(String),

    /// Breeding or calving date on the latest event could not be parsed
    #[error("Invalid {event} date '{value}'")]
    InvalidEventDate { event: &'static str, value: String },

    /// Sex is neither male nor female
    #[error("Unrecognised sex '{0}'")]
    UnknownSex(String),

    #[error("Unknown status category '{0}'")]
    UnknownCategory(String),

    #[error("Unknown status '{0}'")]
    UnknownStatus(String),

    /// Status label is not valid within the given category
    #[error("Status '{status}' is not valid for category '{category}'")]
    InvalidPair { category: String, status: String },
}

impl StatusError {
    pub fn error_code(&self) -> &'static str {
        match self {
            StatusError::MissingBirthDate => "MISSING_BIRTH_DATE",
            StatusError::InvalidBirthDate(_) => "INVALID_BIRTH_DATE",
            StatusError::InvalidEventDate { .. } => "INVALID_EVENT_DATE",
            StatusError::UnknownSex(_) => "UNKNOWN_SEX",
            StatusError::UnknownCategory(_) => "UNKNOWN_STATUS_CATEGORY",
            StatusError::UnknownStatus(_) => "UNKNOWN_STATUS",
            StatusError::InvalidPair { .. } => "INVALID_STATUS_PAIR",
        }
    }
}

impl From<StatusError> for super::CoreError {
    fn from(err: StatusError) -> Self {
        let field = match &err {
            StatusError::MissingBirthDate | StatusError::InvalidBirthDate(_) => "birth_date",
            StatusError::InvalidEventDate { event, .. } => match *event {
                "calving" => "calving_date",
                _ => "breeding_date",
            },
            StatusError::UnknownSex(_) => "sex",
            StatusError::UnknownCategory(_) => "status_category",
            StatusError::UnknownStatus(_) | StatusError::InvalidPair { .. } => "status",
        };
        super::CoreError::invalid_field(field, err.to_string())
    }
}
