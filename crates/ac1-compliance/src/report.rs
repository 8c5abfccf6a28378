//! Compliance findings and the report that collects them.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Area of the convention a finding belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Filename,
    Dimension,
    Variable,
    Attribute,
    Units,
    Vocabulary,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Filename => "filename",
            Category::Dimension => "dimension",
            Category::Variable => "variable",
            Category::Attribute => "attribute",
            Category::Units => "units",
            Category::Vocabulary => "vocabulary",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub category: Category,
    /// Offending dimension, variable, attribute or file name
    pub entity: String,
    pub message: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.category, self.entity, self.message)
    }
}

/// Outcome of validating one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplianceReport {
    filename: String,
    file_type: Option<String>,
    findings: Vec<Finding>,
}

/// Serialized form, with the derived counts spelled out.
#[derive(Serialize)]
struct ReportDocument<'a> {
    filename: &'a str,
    file_type: Option<&'a str>,
    passed: bool,
    error_count: usize,
    warning_count: usize,
    findings: &'a [Finding],
}

impl ComplianceReport {
    pub fn new(filename: impl Into<String>, file_type: Option<String>) -> Self {
        Self {
            filename: filename.into(),
            file_type,
            findings: Vec::new(),
        }
    }

    pub(crate) fn push(
        &mut self,
        severity: Severity,
        category: Category,
        entity: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.findings.push(Finding {
            severity,
            category,
            entity: entity.into(),
            message: message.into(),
        });
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Detected `ARRAY/product`, if a schema matched.
    pub fn file_type(&self) -> Option<&str> {
        self.file_type.as_deref()
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity == Severity::Warning)
    }

    /// No error-severity findings; warnings do not fail a dataset.
    pub fn passed(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Findings of one category and severity.
    pub fn matching(&self, severity: Severity, category: Category) -> Vec<&Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == severity && f.category == category)
            .collect()
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&ReportDocument {
            filename: &self.filename,
            file_type: self.file_type.as_deref(),
            passed: self.passed(),
            error_count: self.error_count(),
            warning_count: self.warning_count(),
            findings: &self.findings,
        })
    }
}

impl fmt::Display for ComplianceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(60);
        writeln!(f, "{}", rule)?;
        writeln!(f, "AC1 Compliance Report: {}", self.filename)?;
        writeln!(f, "{}", rule)?;
        if let Some(file_type) = &self.file_type {
            writeln!(f, "File Type: {}", file_type)?;
        }
        writeln!(f, "Status: {}", if self.passed() { "PASS" } else { "FAIL" })?;
        writeln!(f, "Errors: {}", self.error_count())?;
        writeln!(f, "Warnings: {}", self.warning_count())?;

        let sections = [
            ("ERRORS", self.errors().collect::<Vec<_>>()),
            ("WARNINGS", self.warnings().collect()),
        ];
        for (title, findings) in sections {
            if findings.is_empty() {
                continue;
            }
            writeln!(f)?;
            writeln!(f, "{:-^68}", format!(" {} ", title))?;
            for (i, finding) in findings.iter().enumerate() {
                writeln!(f, "{:2}. {}", i + 1, finding)?;
            }
        }
        writeln!(f)?;
        write!(f, "{}", rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> ComplianceReport {
        let mut report = ComplianceReport::new(
            "OS_RAPID_20040402-20040403_DPR_transports_T12H.nc",
            Some("RAPID/component_transports".to_string()),
        );
        report.push(Severity::Warning, Category::Attribute, "creator_name", "prohibited");
        report
    }

    #[test]
    fn test_warnings_do_not_fail() {
        let mut report = report();
        assert!(report.passed());
        assert_eq!(report.warning_count(), 1);

        report.push(Severity::Error, Category::Dimension, "TIME", "missing");
        assert!(!report.passed());
        assert_eq!(report.matching(Severity::Error, Category::Dimension).len(), 1);
    }

    #[test]
    fn test_text_rendering() {
        let text = report().to_string();
        assert!(text.contains("AC1 Compliance Report: OS_RAPID_20040402-20040403_DPR_transports_T12H.nc"));
        assert!(text.contains("File Type: RAPID/component_transports"));
        assert!(text.contains("Status: PASS"));
        assert!(text.contains("Warnings: 1"));
        assert!(text.contains(" 1. [attribute] creator_name: prohibited"));
        assert!(!text.contains("ERRORS"));
    }

    #[test]
    fn test_json_document() {
        let json: serde_json::Value = serde_json::from_str(&report().to_json_pretty().unwrap()).unwrap();
        assert_eq!(json["passed"], true);
        assert_eq!(json["warning_count"], 1);
        assert_eq!(json["findings"][0]["severity"], "warning");
        assert_eq!(json["findings"][0]["category"], "attribute");
    }
}
