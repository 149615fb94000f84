use std::fmt;

use crate::export::error::ExportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Result of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// Frame count of the exported range, `end - start + 1`.
    pub frames_written: i64,
    pub output_file_name: String,
}

/// What a front end shows after an export attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub severity: Severity,
    pub message: String,
}

impl ExportReport {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Logs the report at the level matching its severity.
    pub fn log(&self) {
        match self.severity {
            Severity::Info => log::info!("{}", self.message),
            Severity::Error => log::error!("{}", self.message),
        }
    }
}

impl From<&Result<ExportSummary, ExportError>> for ExportReport {
    fn from(result: &Result<ExportSummary, ExportError>) -> Self {
        match result {
            Ok(summary) => ExportReport {
                severity: Severity::Info,
                message: format!(
                    "Exported {} frames to {}",
                    summary.frames_written, summary.output_file_name
                ),
            },
            Err(error) => ExportReport {
                severity: Severity::Error,
                message: error.user_message(),
            },
        }
    }
}

impl From<Result<ExportSummary, ExportError>> for ExportReport {
    fn from(result: Result<ExportSummary, ExportError>) -> Self {
        ExportReport::from(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::error::ObjectRole;

    #[test]
    fn success_names_frames_and_file() {
        let report = ExportReport::from(Ok(ExportSummary {
            frames_written: 48,
            output_file_name: "sh010.txt".to_string(),
        }));

        assert_eq!(report.severity, Severity::Info);
        assert_eq!(report.message, "Exported 48 frames to sh010.txt");
        assert!(!report.is_error());
    }

    #[test]
    fn reversed_range_reports_signed_count() {
        let report = ExportReport::from(Ok(ExportSummary {
            frames_written: -4,
            output_file_name: "sh010.txt".to_string(),
        }));

        assert_eq!(report.message, "Exported -4 frames to sh010.txt");
    }

    #[test]
    fn failures_use_short_messages() {
        let report = ExportReport::from(Err(ExportError::MissingObject(ObjectRole::Target)));
        assert!(report.is_error());
        assert_eq!(
            report.message,
            "You need to select both camera and target objects"
        );

        let report = ExportReport::from(Err(ExportError::NoOutputPath));
        assert_eq!(report.message, "You need to select a file to export");
        assert_eq!(report.severity.to_string(), "ERROR");
    }
}
