use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Warning,
    Info,
}

/// A non-fatal finding recorded while compiling, such as a clamp or widening.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub entity: String,
    /// Index of the offending command within the entity's commands, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_index: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(
        entity: impl Into<String>,
        command_index: Option<usize>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            entity: entity.into(),
            command_index,
            message: message.into(),
        }
    }

    pub fn info(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Info,
            entity: entity.into(),
            command_index: None,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            DiagnosticSeverity::Warning => "warning",
            DiagnosticSeverity::Info => "info",
        };
        match self.command_index {
            Some(index) => write!(
                f,
                "{prefix}: {} (command #{} for '{}')",
                self.message, index, self.entity
            ),
            None => write!(f, "{prefix}: {} ('{}')", self.message, self.entity),
        }
    }
}
