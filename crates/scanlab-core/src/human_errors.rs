// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the command-line tools.
//
// Every technical error is mapped to plain English with a clear suggestion.

use crate::error::ScanlabError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// User must do something (retake the photo, fix a path or a setting).
    ActionRequired,
    /// Cannot be fixed by the user — an internal or library failure.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    pub severity: Severity,
}

/// Convert a `ScanlabError` into a `HumanError`.
pub fn humanize_error(err: &ScanlabError) -> HumanError {
    match err {
        ScanlabError::NoDocumentFound => HumanError {
            message: "Failed to find polygon with four points.".into(),
            suggestion: "Photograph the page on a contrasting background with all four corners visible.".into(),
            severity: Severity::ActionRequired,
        },

        ScanlabError::Transform(detail) => HumanError {
            message: "The page outline could not be straightened.".into(),
            suggestion: format!(
                "The detected corners are too close together or in a line. Try another photo. (Detail: {detail})"
            ),
            severity: Severity::ActionRequired,
        },

        ScanlabError::InvalidArgument(detail) => HumanError {
            message: "The request was not valid.".into(),
            suggestion: detail.clone(),
            severity: Severity::ActionRequired,
        },

        ScanlabError::Config(detail) => HumanError {
            message: "The configuration file has a bad setting.".into(),
            suggestion: format!("Fix the setting and run again. (Detail: {detail})"),
            severity: Severity::ActionRequired,
        },

        ScanlabError::ImageError(detail) => {
            if detail.contains("open") || detail.contains("decode") {
                HumanError {
                    message: "That image could not be read.".into(),
                    suggestion: format!(
                        "Check the path and that the file is a JPEG, PNG, or similar image. (Detail: {detail})"
                    ),
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "Something went wrong while processing the image.".into(),
                    suggestion: format!("Try again with a different image. (Detail: {detail})"),
                    severity: Severity::Permanent,
                }
            }
        }

        ScanlabError::Io(io_err) => HumanError {
            message: "A file could not be read or written.".into(),
            suggestion: format!("Check the path exists and is writable. (Detail: {io_err})"),
            severity: Severity::ActionRequired,
        },

        ScanlabError::Serialization(serde_err) => HumanError {
            message: "The configuration file is not valid JSON.".into(),
            suggestion: format!("Fix the file and run again. (Detail: {serde_err})"),
            severity: Severity::ActionRequired,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_document_is_action_required() {
        let human = humanize_error(&ScanlabError::NoDocumentFound);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.message.contains("four points"));
    }

    #[test]
    fn unreadable_image_is_action_required() {
        let err = ScanlabError::ImageError("failed to open receipt.jpg: No such file".into());
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.suggestion.contains("receipt.jpg"));
    }

    #[test]
    fn encoding_failure_is_permanent() {
        let err = ScanlabError::ImageError("PNG encoding failed: out of memory".into());
        assert_eq!(humanize_error(&err).severity, Severity::Permanent);
    }

    #[test]
    fn transform_failure_carries_detail() {
        let err = ScanlabError::Transform("singular correspondence".into());
        let human = humanize_error(&err);
        assert!(human.suggestion.contains("singular correspondence"));
    }
}
