/// Core error types for the choreo compiler.
use std::fmt;

/// A specialized Result type for choreo operations.
pub type ChoreoResult<T> = Result<T, ChoreoError>;

/// Top-level error type encompassing every compile and export failure.
#[derive(Debug, thiserror::Error)]
pub enum ChoreoError {
    #[error("unresolved reference: {kind} '{name}' is not declared ({context})")]
    UnresolvedReference {
        kind: String,
        name: String,
        context: String,
    },

    #[error("command #{index} for '{entity}': {message}")]
    Command {
        entity: String,
        index: usize,
        message: String,
    },

    #[error("unknown command type '{kind}' (command #{index} for '{entity}')")]
    UnknownCommand {
        entity: String,
        index: usize,
        kind: String,
    },

    #[error("open-ended stay cannot be resolved: the movie has no terminal time")]
    UnresolvedTillEnd,

    #[error("plan validation failed:\n{}", IssueList(.0))]
    Validation(Vec<ChoreoError>),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("export error: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ChoreoError {
    /// Create an unresolved-reference error.
    pub fn unresolved(
        kind: impl Into<String>,
        name: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        ChoreoError::UnresolvedReference {
            kind: kind.into(),
            name: name.into(),
            context: context.into(),
        }
    }

    /// Create a fatal error pinned to one command of one entity.
    pub fn command(entity: impl Into<String>, index: usize, message: impl fmt::Display) -> Self {
        ChoreoError::Command {
            entity: entity.into(),
            index,
            message: message.to_string(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        ChoreoError::InvalidArgument(message.into())
    }
}

struct IssueList<'a>(&'a [ChoreoError]);

impl fmt::Display for IssueList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  - {}", issue)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_error_display() {
        let err = ChoreoError::command("Runner", 2, "infinite speed");
        assert_eq!(err.to_string(), "command #2 for 'Runner': infinite speed");
    }

    #[test]
    fn test_unresolved_display() {
        let err = ChoreoError::unresolved("actor", "Ghost", "sequence #0");
        assert!(err.to_string().contains("actor 'Ghost'"));
    }

    #[test]
    fn test_validation_lists_every_issue() {
        let err = ChoreoError::Validation(vec![
            ChoreoError::invalid("fps must be positive"),
            ChoreoError::unresolved("camera", "Cam9", "timeline event #1"),
        ]);
        let text = err.to_string();
        assert!(text.contains("fps must be positive"));
        assert!(text.contains("Cam9"));
        assert_eq!(text.lines().count(), 3);
    }
}
