//! Parameter builder: settings and live source state in, one consistent
//! [`FrameParameters`] snapshot out.

use std::sync::Arc;

use nineslice_types::geometry::{
    BorderInsets, Dimensions2D, FrameParameters, RenderFlags, ScaleVector,
};
use nineslice_types::settings::Settings;

use crate::config::ScaleMode;
use crate::host::SceneScaleQuery;

// ---------------------------------------------------------------------------
// Settings keys and ranges
// ---------------------------------------------------------------------------

pub const SETTING_SHOW_UVS: &str = "show_uvs";
pub const SETTING_UNIFORM_SCALE: &str = "uniform_scale";
pub const SETTING_USE_LINEAR_FILTERING: &str = "use_linear_filtering";
pub const SETTING_OUTPUT_SCALE_X: &str = "output_scale_x";
pub const SETTING_OUTPUT_SCALE_Y: &str = "output_scale_y";
pub const SETTING_BORDER_TOP: &str = "border_top";
pub const SETTING_BORDER_LEFT: &str = "border_left";
pub const SETTING_BORDER_BOTTOM: &str = "border_bottom";
pub const SETTING_BORDER_RIGHT: &str = "border_right";

pub const SCALE_DEFAULT: f64 = 4.0;
pub const SCALE_MIN: f64 = 0.0;
pub const SCALE_MAX: f64 = 20.0;
pub const SCALE_STEP: f64 = 0.1;

pub const BORDER_DEFAULT: f64 = 8.0;
pub const BORDER_MIN: f64 = 0.0;
pub const BORDER_STEP: f64 = 1.0;

/// Register the defaults for every key the given profile reads.
pub fn apply_defaults(settings: &mut Settings, mode: ScaleMode) {
    settings.set_default_bool(SETTING_SHOW_UVS, false);
    settings.set_default_bool(SETTING_USE_LINEAR_FILTERING, false);

    if mode == ScaleMode::Fixed {
        settings.set_default_bool(SETTING_UNIFORM_SCALE, true);
        settings.set_default_double(SETTING_OUTPUT_SCALE_X, SCALE_DEFAULT);
        settings.set_default_double(SETTING_OUTPUT_SCALE_Y, SCALE_DEFAULT);
    }

    settings.set_default_double(SETTING_BORDER_TOP, BORDER_DEFAULT);
    settings.set_default_double(SETTING_BORDER_LEFT, BORDER_DEFAULT);
    settings.set_default_double(SETTING_BORDER_BOTTOM, BORDER_DEFAULT);
    settings.set_default_double(SETTING_BORDER_RIGHT, BORDER_DEFAULT);
}

fn clamp_scale(v: f64) -> f64 {
    if v.is_nan() {
        SCALE_MIN
    } else {
        v.clamp(SCALE_MIN, SCALE_MAX)
    }
}

// ---------------------------------------------------------------------------
// ParameterBuilder
// ---------------------------------------------------------------------------

/// Holds the settings-derived half of the frame parameters and combines
/// it with the live source size each frame.
pub struct ParameterBuilder {
    mode: ScaleMode,
    scene_query: Option<Arc<dyn SceneScaleQuery>>,
    borders: BorderInsets,
    flags: RenderFlags,
    uniform_scale: bool,
    fixed_scale: ScaleVector,
}

impl ParameterBuilder {
    pub fn new(mode: ScaleMode) -> Self {
        Self {
            mode,
            scene_query: None,
            borders: BorderInsets::default(),
            flags: RenderFlags::default(),
            uniform_scale: true,
            fixed_scale: ScaleVector::ONE,
        }
    }

    /// Install the scene lookup used by [`ScaleMode::SceneItem`].
    pub fn with_scene_query(mut self, query: Arc<dyn SceneScaleQuery>) -> Self {
        self.scene_query = Some(query);
        self
    }

    pub fn mode(&self) -> ScaleMode {
        self.mode
    }

    pub fn borders(&self) -> BorderInsets {
        self.borders
    }

    pub fn flags(&self) -> RenderFlags {
        self.flags
    }

    pub fn uniform_scale(&self) -> bool {
        self.uniform_scale
    }

    /// User-entered scale (fixed profile only; `{1, 1}` otherwise).
    pub fn fixed_scale(&self) -> ScaleVector {
        self.fixed_scale
    }

    /// Re-read borders, flags and (fixed profile) scale from `settings`.
    ///
    /// Scales are clamped to `SCALE_MIN..=SCALE_MAX`. With uniform scaling
    /// on, the Y scale follows X and the mirrored value is written back so
    /// the host UI shows the coupling.
    pub fn update(&mut self, settings: &mut Settings) {
        self.flags = RenderFlags {
            show_uv_debug: settings.get_bool(SETTING_SHOW_UVS),
            use_linear_filtering: settings.get_bool(SETTING_USE_LINEAR_FILTERING),
        };

        if self.mode == ScaleMode::Fixed {
            let uniform = settings.get_bool(SETTING_UNIFORM_SCALE);
            let scale_x = clamp_scale(settings.get_double(SETTING_OUTPUT_SCALE_X));
            let scale_y = clamp_scale(settings.get_double(SETTING_OUTPUT_SCALE_Y));

            self.uniform_scale = uniform;
            self.fixed_scale = if uniform {
                ScaleVector::uniform(scale_x as f32)
            } else {
                ScaleVector::new(scale_x as f32, scale_y as f32)
            };

            if uniform {
                settings.set_double(SETTING_OUTPUT_SCALE_Y, scale_x);
            }
        }

        self.borders = BorderInsets::new(
            settings.get_double(SETTING_BORDER_TOP) as f32,
            settings.get_double(SETTING_BORDER_LEFT) as f32,
            settings.get_double(SETTING_BORDER_BOTTOM) as f32,
            settings.get_double(SETTING_BORDER_RIGHT) as f32,
        );
    }

    /// Output scale for this frame. A mirrored placement reports a negative
    /// scale; only its magnitude sizes the output.
    pub fn scale_for(&self, source_name: &str) -> ScaleVector {
        match self.mode {
            ScaleMode::Fixed => self.fixed_scale,
            ScaleMode::SceneItem => self
                .scene_query
                .as_ref()
                .and_then(|q| q.find_scale_for(source_name))
                .map(|s| ScaleVector::new(s.x.abs(), s.y.abs()))
                .unwrap_or(ScaleVector::ONE),
        }
    }

    /// Snapshot for one frame of a source of the given size.
    pub fn build(&self, source_name: &str, source_size: Dimensions2D) -> FrameParameters {
        FrameParameters {
            borders: self.borders,
            source_size,
            output_size: source_size.scaled(self.scale_for(source_name)),
            flags: self.flags,
        }
    }
}
