//! Options and per-compile state threaded through the planner.

use serde::Serialize;

use choreo_core::{ChoreoConfig, CorridorAnchor, Diagnostic, FrameRate};

/// Knobs the planner reads. Derived from `choreo.toml`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanOptions {
    pub corridor_anchor: CorridorAnchor,
    pub samples_per_segment: usize,
    pub min_focal_length: f64,
    pub max_focal_length: f64,
    pub default_occupancy: f64,
    pub default_height_pct: f64,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self::from(&ChoreoConfig::default())
    }
}

impl From<&ChoreoConfig> for PlanOptions {
    fn from(config: &ChoreoConfig) -> Self {
        Self {
            corridor_anchor: config.corridor.anchor,
            samples_per_segment: config.spline.samples_per_segment,
            min_focal_length: config.camera.min_focal_length,
            max_focal_length: config.camera.max_focal_length,
            default_occupancy: config.camera.default_occupancy,
            default_height_pct: config.camera.default_height_pct,
        }
    }
}

impl PlanOptions {
    pub fn with_corridor_anchor(mut self, anchor: CorridorAnchor) -> Self {
        self.corridor_anchor = anchor;
        self
    }
}

/// Mutable state for one compilation. Nothing here outlives the compile.
#[derive(Debug)]
pub struct CompileContext {
    pub fps: FrameRate,
    pub options: PlanOptions,
    diagnostics: Vec<Diagnostic>,
}

impl CompileContext {
    pub fn new(fps: FrameRate, options: PlanOptions) -> Self {
        Self {
            fps,
            options,
            diagnostics: Vec::new(),
        }
    }

    /// Record a recoverable problem and log it.
    pub fn warn(&mut self, entity: &str, command_index: Option<usize>, message: impl Into<String>) {
        let diagnostic = Diagnostic::warning(entity, command_index, message);
        tracing::warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    pub fn note(&mut self, entity: &str, message: impl Into<String>) {
        let diagnostic = Diagnostic::info(entity, message);
        tracing::info!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use choreo_core::DiagnosticSeverity;

    #[test]
    fn test_options_follow_config() {
        let mut config = ChoreoConfig::default();
        config.corridor.anchor = CorridorAnchor::NearestEdge;
        config.camera.max_focal_length = 200.0;
        let options = PlanOptions::from(&config);
        assert_eq!(options.corridor_anchor, CorridorAnchor::NearestEdge);
        assert_eq!(options.max_focal_length, 200.0);
        assert_eq!(PlanOptions::default().samples_per_segment, 32);
    }

    #[test]
    fn test_warnings_are_collected() {
        let mut ctx = CompileContext::new(FrameRate::new(24.0), PlanOptions::default());
        ctx.warn("Runner", Some(2), "corridor widened");
        ctx.note("Runner", "till-end stay resolved");
        let diags = ctx.into_diagnostics();
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].severity, DiagnosticSeverity::Warning);
        assert_eq!(diags[0].command_index, Some(2));
    }
}
