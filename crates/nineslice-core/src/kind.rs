//! Filter kinds: the host-facing registration surface.
//!
//! A host discovers filters through a [`FilterRegistry`] of
//! [`FilterKind`]s. Each kind creates [`FilterInstance`]s for sources the
//! user attaches it to and answers the host's questions about defaults and
//! UI properties. Lifecycle calls never return errors: creation yields
//! `None` on failure and everything else is infallible from the host's
//! point of view.

use std::sync::Arc;

use nineslice_types::error::{NineSliceError, Result};
use nineslice_types::geometry::Dimensions2D;
use nineslice_types::properties::Properties;
use nineslice_types::settings::Settings;

use crate::config::{FilterConfig, ScaleMode};
use crate::filter::NineSliceFilter;
use crate::gpu::{GraphicsContext, GraphicsDevice};
use crate::host::{FilterSource, SceneScaleQuery};
use crate::locale::Locale;
use crate::params::{
    self, BORDER_MIN, BORDER_STEP, SCALE_MAX, SCALE_MIN, SCALE_STEP, SETTING_BORDER_BOTTOM,
    SETTING_BORDER_LEFT, SETTING_BORDER_RIGHT, SETTING_BORDER_TOP, SETTING_OUTPUT_SCALE_X,
    SETTING_OUTPUT_SCALE_Y, SETTING_SHOW_UVS, SETTING_UNIFORM_SCALE, SETTING_USE_LINEAR_FILTERING,
};

/// Registration id of the nine-slice filter.
pub const NINE_SLICE_ID: &str = "filter_9slice";

// -----------------------------------------------------------------------
// FilterInstance trait
// -----------------------------------------------------------------------

/// A live filter attached to one source.
pub trait FilterInstance: Send {
    /// Apply changed settings.
    fn update(&mut self, settings: &mut Settings);

    /// Render one frame with the device of the held graphics context.
    fn render(&mut self, device: &mut dyn GraphicsDevice);

    /// Source size seen by the most recent render (zero before the first).
    fn last_source_size(&self) -> Dimensions2D;
}

impl FilterInstance for NineSliceFilter {
    fn update(&mut self, settings: &mut Settings) {
        NineSliceFilter::update(self, settings);
    }

    fn render(&mut self, device: &mut dyn GraphicsDevice) {
        NineSliceFilter::render(self, device);
    }

    fn last_source_size(&self) -> Dimensions2D {
        NineSliceFilter::last_source_size(self)
    }
}

// -----------------------------------------------------------------------
// FilterKind trait
// -----------------------------------------------------------------------

/// A registrable filter type.
pub trait FilterKind: Send + Sync {
    /// Stable registration id.
    fn id(&self) -> &str;

    /// Localized display name.
    fn name(&self) -> &str;

    /// Attach to `source`. `None` when the filter cannot run at all.
    fn create(
        &self,
        settings: &mut Settings,
        source: Arc<dyn FilterSource>,
    ) -> Option<Box<dyn FilterInstance>>;

    /// Detach and release an instance.
    fn destroy(&self, instance: Box<dyn FilterInstance>) {
        drop(instance);
    }

    fn update(&self, instance: &mut dyn FilterInstance, settings: &mut Settings) {
        instance.update(settings);
    }

    fn render(&self, instance: &mut dyn FilterInstance, device: &mut dyn GraphicsDevice) {
        instance.render(device);
    }

    /// Register default values for every settings key the filter reads.
    fn get_defaults(&self, settings: &mut Settings);

    /// UI schema, optionally tailored to a live instance.
    fn get_properties(&self, instance: Option<&dyn FilterInstance>) -> Properties;
}

// -----------------------------------------------------------------------
// NineSliceKind
// -----------------------------------------------------------------------

/// The nine-slice filter kind.
pub struct NineSliceKind {
    config: FilterConfig,
    graphics: Arc<GraphicsContext>,
    scene_query: Option<Arc<dyn SceneScaleQuery>>,
    locale: Locale,
}

impl NineSliceKind {
    pub fn new(config: FilterConfig, graphics: Arc<GraphicsContext>) -> Self {
        Self {
            config,
            graphics,
            scene_query: None,
            locale: Locale::en_us(),
        }
    }

    /// Scene lookup handed to every instance (scene-item profile).
    pub fn with_scene_query(mut self, query: Arc<dyn SceneScaleQuery>) -> Self {
        self.scene_query = Some(query);
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Create the concrete instance type.
    pub fn create_filter(
        &self,
        settings: &mut Settings,
        source: Arc<dyn FilterSource>,
    ) -> Option<NineSliceFilter> {
        NineSliceFilter::create(
            &self.config,
            settings,
            source,
            Arc::clone(&self.graphics),
            self.scene_query.clone(),
        )
    }
}

impl FilterKind for NineSliceKind {
    fn id(&self) -> &str {
        NINE_SLICE_ID
    }

    fn name(&self) -> &str {
        self.locale.text("NineSlice.Name")
    }

    fn create(
        &self,
        settings: &mut Settings,
        source: Arc<dyn FilterSource>,
    ) -> Option<Box<dyn FilterInstance>> {
        self.create_filter(settings, source)
            .map(|f| Box::new(f) as Box<dyn FilterInstance>)
    }

    fn get_defaults(&self, settings: &mut Settings) {
        params::apply_defaults(settings, self.config.scale_mode);
    }

    fn get_properties(&self, instance: Option<&dyn FilterInstance>) -> Properties {
        let fixed = self.config.scale_mode == ScaleMode::Fixed;
        let text = |key: &'static str| self.locale.text(key);

        // Border sliders stop one pixel short of the source; nothing to
        // offer before an instance has seen a frame.
        let (width_max, height_max) = match instance {
            Some(inst) => {
                let size = inst.last_source_size();
                (
                    f64::from(size.width - 1.0).max(BORDER_MIN),
                    f64::from(size.height - 1.0).max(BORDER_MIN),
                )
            }
            None => (BORDER_MIN, BORDER_MIN),
        };

        let mut props = Properties::new();
        props.add_bool(SETTING_SHOW_UVS, text("NineSlice.ShowUVs"));
        if fixed {
            props.add_bool(SETTING_UNIFORM_SCALE, text("NineSlice.UniformScale"));
        }
        props.add_bool(
            SETTING_USE_LINEAR_FILTERING,
            text("NineSlice.LinearFiltering"),
        );

        if fixed {
            for (key, label) in [
                (SETTING_OUTPUT_SCALE_X, "NineSlice.ScaleX"),
                (SETTING_OUTPUT_SCALE_Y, "NineSlice.ScaleY"),
            ] {
                props.add_float_slider(key, text(label), SCALE_MIN, SCALE_MAX, SCALE_STEP);
            }
        }

        for (key, label, max) in [
            (SETTING_BORDER_TOP, "NineSlice.Top", height_max),
            (SETTING_BORDER_LEFT, "NineSlice.Left", width_max),
            (SETTING_BORDER_BOTTOM, "NineSlice.Bottom", height_max),
            (SETTING_BORDER_RIGHT, "NineSlice.Right", width_max),
        ] {
            props.add_float_slider(key, text(label), BORDER_MIN, max, BORDER_STEP);
        }

        props
    }
}

// -----------------------------------------------------------------------
// FilterRegistry
// -----------------------------------------------------------------------

/// Registered filter kinds, keyed by id.
#[derive(Default)]
pub struct FilterRegistry {
    kinds: Vec<Box<dyn FilterKind>>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a kind. Ids are unique; a second registration under the
    /// same id is rejected and the first one stays.
    pub fn register(&mut self, kind: Box<dyn FilterKind>) -> Result<()> {
        if self.contains(kind.id()) {
            return Err(NineSliceError::Registry(format!(
                "filter kind '{}' already registered",
                kind.id()
            )));
        }
        log::debug!("registered filter kind '{}'", kind.id());
        self.kinds.push(kind);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&dyn FilterKind> {
        self.kinds.iter().find(|k| k.id() == id).map(|k| &**k)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.kinds.iter().any(|k| k.id() == id)
    }

    /// Registered ids in registration order.
    pub fn ids(&self) -> Vec<&str> {
        self.kinds.iter().map(|k| k.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
