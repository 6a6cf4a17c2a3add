// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the command-line front end.
//
// Every technical error is mapped to a plain sentence with a clear suggestion.
// The severity drives whether the caller should expect a retry to help.

use crate::error::UmkehrError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The user must change their input (selection, output name, settings).
    ActionRequired,
    /// The document itself cannot be processed as given.
    Permanent,
    /// Disk or environment trouble that may go away on its own.
    Transient,
}

/// A human-readable error with a plain message and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain summary (first line of output).
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    /// Severity level.
    pub severity: Severity,
}

/// Convert an `UmkehrError` into a `HumanError`.
///
/// Pipeline wrappers are looked through: the message describes the
/// originating problem, not the stage that surfaced it.
pub fn humanize_error(err: &UmkehrError) -> HumanError {
    match err.root_cause() {
        UmkehrError::Parse(detail) => HumanError {
            message: "The page selection could not be understood.".into(),
            suggestion: format!(
                "Use page numbers starting at 1, ranges like 2-5, commas between parts, or \"all\". ({detail})"
            ),
            severity: Severity::ActionRequired,
        },

        UmkehrError::Configuration(detail) => HumanError {
            message: "A setting is missing or not allowed.".into(),
            suggestion: format!("Check the options you passed. ({detail})"),
            severity: Severity::ActionRequired,
        },

        UmkehrError::Document(detail) => {
            if detail.contains("pdfium library") {
                HumanError {
                    message: "The page renderer is not available.".into(),
                    suggestion: format!(
                        "Install the PDFium library or point --pdfium-lib at the directory containing it. ({detail})"
                    ),
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "The document could not be read or written.".into(),
                    suggestion: format!(
                        "Make sure the input is a valid, unencrypted PDF and the output location is writable. ({detail})"
                    ),
                    severity: Severity::Permanent,
                }
            }
        }

        UmkehrError::Image(detail) => HumanError {
            message: "A page image could not be processed.".into(),
            suggestion: format!("Try a lower --dpi or lossless encoding. ({detail})"),
            severity: Severity::Permanent,
        },

        raster @ UmkehrError::RasterSize { .. } => HumanError {
            message: "A page image came out the wrong size.".into(),
            suggestion: format!("Try rendering again with a different --dpi. ({raster})"),
            severity: Severity::Permanent,
        },

        UmkehrError::Io(io_err) => HumanError {
            message: "A file could not be read or written.".into(),
            suggestion: format!("Check disk space and permissions. ({io_err})"),
            severity: Severity::Transient,
        },

        UmkehrError::Serialization(json_err) => HumanError {
            message: "The configuration file is not valid JSON.".into(),
            suggestion: format!("Fix the file or leave out --config. ({json_err})"),
            severity: Severity::ActionRequired,
        },

        other => HumanError {
            message: "Something went wrong.".into(),
            suggestion: other.to_string(),
            severity: Severity::Permanent,
        },
    }
}
