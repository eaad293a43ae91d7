//! Issue validation rules.

use crate::enums::Status;
use crate::issue::Issue;

/// Error type for validation failures.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("title is required")]
    TitleRequired,

    #[error("title must be 500 characters or less (got {0})")]
    TitleTooLong(usize),

    #[error("priority must be between 0 and 4 (got {0})")]
    InvalidPriority(i32),

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("invalid issue type: {0}")]
    InvalidIssueType(String),

    #[error("closed issues must have closed_at timestamp")]
    ClosedWithoutTimestamp,

    #[error("non-closed issues cannot have closed_at timestamp")]
    NotClosedWithTimestamp,

    #[error("an issue cannot block or be blocked by itself")]
    SelfReference,
}

fn status_is_valid(status: &Status, custom_statuses: &[&str]) -> bool {
    match status {
        Status::Custom(s) => custom_statuses.contains(&s.as_str()),
        _ => true,
    }
}

fn issue_type_is_valid(issue_type: &crate::enums::IssueType, custom_types: &[&str]) -> bool {
    match issue_type {
        crate::enums::IssueType::Custom(s) => custom_types.contains(&s.as_str()),
        _ => true,
    }
}

/// Validates an issue using built-in rules only.
pub fn validate(issue: &Issue) -> Result<(), ValidationError> {
    validate_with_custom(issue, &[], &[])
}

/// Validates an issue, allowing custom statuses.
pub fn validate_with_custom_statuses(
    issue: &Issue,
    custom_statuses: &[&str],
) -> Result<(), ValidationError> {
    validate_with_custom(issue, custom_statuses, &[])
}

/// Validates an issue, allowing custom statuses and types (per-repo config, §4.3).
pub fn validate_with_custom(
    issue: &Issue,
    custom_statuses: &[&str],
    custom_types: &[&str],
) -> Result<(), ValidationError> {
    if issue.title.is_empty() {
        return Err(ValidationError::TitleRequired);
    }
    if issue.title.len() > 500 {
        return Err(ValidationError::TitleTooLong(issue.title.len()));
    }
    if !(0..=4).contains(&issue.priority) {
        return Err(ValidationError::InvalidPriority(issue.priority));
    }
    if !status_is_valid(&issue.status, custom_statuses) {
        return Err(ValidationError::InvalidStatus(
            issue.status.as_str().to_owned(),
        ));
    }
    if !issue_type_is_valid(&issue.issue_type, custom_types) {
        return Err(ValidationError::InvalidIssueType(
            issue.issue_type.as_str().to_owned(),
        ));
    }
    if issue.status == Status::Closed && issue.closed_at.is_none() {
        return Err(ValidationError::ClosedWithoutTimestamp);
    }
    if issue.status != Status::Closed && issue.closed_at.is_some() {
        return Err(ValidationError::NotClosedWithTimestamp);
    }

    Ok(())
}
