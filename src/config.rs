//! Configuration for field placement and PDF export.

use serde::{Deserialize, Serialize};

/// What to do when a placement, move or resize would overlap another
/// field on the same page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OverlapPolicy {
    /// Leave the field where it was.
    Reject,
    /// Spiral-search the nearest free position; fall back to the
    /// requested one when the search is exhausted.
    #[default]
    SnapNearest,
    /// Accept the overlap (a warning is logged).
    Allow,
}

/// Placement configuration used by [`crate::store::FieldStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuilderConfig {
    /// Grid spacing in page units.
    pub grid_size: f32,

    /// Snap new and dragged positions to the grid.
    pub snap_to_grid: bool,

    /// Overlap handling for add/move/resize.
    pub overlap_policy: OverlapPolicy,

    /// Width given to newly placed fields.
    pub default_field_width: f32,

    /// Height given to newly placed fields.
    pub default_field_height: f32,

    /// Font size given to newly placed fields.
    pub default_font_size: f32,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl BuilderConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            grid_size: 10.0,
            snap_to_grid: true,
            overlap_policy: OverlapPolicy::SnapNearest,
            default_field_width: 150.0,
            default_field_height: 30.0,
            default_font_size: 12.0,
        }
    }

    /// Set the grid spacing.
    pub fn with_grid_size(mut self, grid_size: f32) -> Self {
        self.grid_size = grid_size;
        self
    }

    /// Enable or disable grid snapping.
    pub fn with_snap_to_grid(mut self, enable: bool) -> Self {
        self.snap_to_grid = enable;
        self
    }

    /// Set the overlap policy.
    pub fn with_overlap_policy(mut self, policy: OverlapPolicy) -> Self {
        self.overlap_policy = policy;
        self
    }

    /// Set the size of newly placed fields.
    pub fn with_default_field_size(mut self, width: f32, height: f32) -> Self {
        self.default_field_width = width;
        self.default_field_height = height;
        self
    }

    /// Set the font size of newly placed fields.
    pub fn with_default_font_size(mut self, size: f32) -> Self {
        self.default_font_size = size;
        self
    }
}

/// Text placement used when flattening widgets into page content.
///
/// The defaults are the fixed output contract: text is drawn at
/// `(rect.x + 2, rect.y + rect.height - 15)` in PDF space with a 12pt
/// font, whatever font size the field was configured with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlattenOptions {
    /// Font size for drawn text.
    pub font_size: f32,
    /// Horizontal padding from the widget's left edge.
    pub x_offset: f32,
    /// Distance from the widget's top edge down to the text baseline.
    pub baseline_offset: f32,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            x_offset: 2.0,
            baseline_offset: 15.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BuilderConfig::default();
        assert_eq!(config.grid_size, 10.0);
        assert!(config.snap_to_grid);
        assert_eq!(config.overlap_policy, OverlapPolicy::SnapNearest);
        assert_eq!(config.default_field_width, 150.0);
        assert_eq!(config.default_field_height, 30.0);
    }

    #[test]
    fn test_builder_setters() {
        let config = BuilderConfig::new()
            .with_grid_size(5.0)
            .with_snap_to_grid(false)
            .with_overlap_policy(OverlapPolicy::Reject)
            .with_default_field_size(100.0, 20.0)
            .with_default_font_size(9.0);
        assert_eq!(config.grid_size, 5.0);
        assert!(!config.snap_to_grid);
        assert_eq!(config.overlap_policy, OverlapPolicy::Reject);
        assert_eq!(config.default_field_width, 100.0);
        assert_eq!(config.default_field_height, 20.0);
        assert_eq!(config.default_font_size, 9.0);
    }

    #[test]
    fn test_policy_wire_names() {
        assert_eq!(serde_json::to_string(&OverlapPolicy::SnapNearest).unwrap(), "\"snapNearest\"");
        let policy: OverlapPolicy = serde_json::from_str("\"reject\"").unwrap();
        assert_eq!(policy, OverlapPolicy::Reject);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: BuilderConfig =
            serde_json::from_str(r#"{"gridSize": 20, "overlapPolicy": "allow"}"#).unwrap();
        assert_eq!(config.grid_size, 20.0);
        assert_eq!(config.overlap_policy, OverlapPolicy::Allow);
        assert!(config.snap_to_grid);
    }

    #[test]
    fn test_flatten_defaults() {
        let opts = FlattenOptions::default();
        assert_eq!(opts.font_size, 12.0);
        assert_eq!(opts.x_offset, 2.0);
        assert_eq!(opts.baseline_offset, 15.0);
    }
}
