//! Nine-slice filter instance: program lifecycle and per-frame rendering.
//!
//! # Concurrency contract
//!
//! `update` may be called from a UI thread and `render` from the host's
//! graphics thread, but never at the same time: the host serializes them.
//! Both take `&mut self`, so a host that really does call from two threads
//! has to put the instance behind its own lock. Program creation,
//! destruction and reload additionally run inside the exclusive
//! [`GraphicsContext`] section; per-frame parameter writes do not.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use nineslice_types::geometry::{Dimensions2D, FrameParameters};
use nineslice_types::settings::Settings;

use crate::PLUGIN_NAME;
use crate::config::{FilterConfig, ScaleMode};
use crate::gpu::{GraphicsContext, GraphicsDevice, ProgramId, ProgramSlots};
use crate::host::{FilterSource, SceneScaleQuery};
use crate::params::ParameterBuilder;

/// Log with the `[nineslice: 'source name']` prefix.
macro_rules! filter_log {
    ($level:ident, $filter:expr, $($arg:tt)+) => {
        log::$level!(
            "[{}: '{}'] {}",
            PLUGIN_NAME,
            $filter.source.name(),
            format_args!($($arg)+)
        )
    };
}

/// One attached nine-slice filter.
pub struct NineSliceFilter {
    source: Arc<dyn FilterSource>,
    graphics: Arc<GraphicsContext>,
    effect_path: PathBuf,
    builder: ParameterBuilder,
    program: Option<ProgramId>,
    slots: ProgramSlots,
    last_source_size: Dimensions2D,
}

impl NineSliceFilter {
    /// Load the program and apply the initial settings.
    ///
    /// Returns `None` if the program cannot be loaded; the half-built
    /// instance is torn down through the regular destroy path first.
    pub fn create(
        config: &FilterConfig,
        settings: &mut Settings,
        source: Arc<dyn FilterSource>,
        graphics: Arc<GraphicsContext>,
        scene_query: Option<Arc<dyn SceneScaleQuery>>,
    ) -> Option<Self> {
        let mut builder = ParameterBuilder::new(config.scale_mode);
        if let Some(query) = scene_query {
            builder = builder.with_scene_query(query);
        }

        let mut filter = Self {
            source,
            graphics,
            effect_path: config.effect_path.clone(),
            builder,
            program: None,
            slots: ProgramSlots::default(),
            last_source_size: Dimensions2D::default(),
        };

        if !filter.reload() {
            return None;
        }

        filter.update(settings);
        Some(filter)
    }

    /// Destroy the current program (if any) and load it again.
    ///
    /// On failure the instance keeps running without a program and every
    /// render is skipped until a later reload succeeds.
    pub fn reload(&mut self) -> bool {
        let gfx = self.graphics.enter();
        let Some(mut device) = gfx.try_device() else {
            filter_log!(warn, self, "Graphics device busy, effect not reloaded.");
            return self.program.is_some();
        };

        if let Some(old) = self.program.take() {
            device.destroy_program(old);
            self.slots = ProgramSlots::default();
            filter_log!(info, self, "Destroyed existing effect.");
        }

        match device.create_program(&self.effect_path) {
            Ok(program) => {
                let (slots, missing) = ProgramSlots::resolve(&*device, program);
                for name in missing {
                    filter_log!(warn, self, "Failed to get {name} param.");
                }
                self.program = Some(program);
                self.slots = slots;
                true
            }
            Err(e) => {
                filter_log!(error, self, "Failed to create effect: {e}");
                false
            }
        }
    }

    /// Apply changed settings. Takes effect on the next render.
    pub fn update(&mut self, settings: &mut Settings) {
        self.builder.update(settings);
    }

    /// Parameters the next frame would use, from the live source size.
    pub fn frame_parameters(&self) -> FrameParameters {
        self.builder.build(self.source.name(), self.source.size())
    }

    /// Render one frame. Never fails observably: without a program, or when
    /// the device cannot run the pass, the frame is skipped.
    ///
    /// The caller must hold the graphics context and pass its device.
    pub fn render(&mut self, device: &mut dyn GraphicsDevice) {
        let Some(program) = self.program else {
            return;
        };

        let params = self.frame_parameters();
        self.last_source_size = params.source_size;

        if !device.begin_filter_pass(&*self.source) {
            return;
        }

        if let Some(slot) = self.slots.border {
            device.set_vec4(slot, params.borders.to_vec4());
        }
        if let Some(slot) = self.slots.source_size {
            device.set_vec2(slot, params.source_size.to_vec2());
        }
        if let Some(slot) = self.slots.output_size {
            device.set_vec2(slot, params.output_size.to_vec2());
        }
        if let Some(slot) = self.slots.show_uvs {
            device.set_bool(slot, params.flags.show_uv_debug);
        }
        if let Some(slot) = self.slots.use_linear_filtering {
            device.set_bool(slot, params.flags.use_linear_filtering);
        }

        let (width, height) = params.output_size.raster();
        if let Err(e) = device.end_filter_pass(program, width, height) {
            filter_log!(debug, self, "Skipped frame: {e}");
        }
    }

    /// Release the program and drop the instance.
    pub fn destroy(self) {
        drop(self);
    }

    pub fn source(&self) -> &Arc<dyn FilterSource> {
        &self.source
    }

    pub fn scale_mode(&self) -> ScaleMode {
        self.builder.mode()
    }

    pub fn effect_path(&self) -> &Path {
        &self.effect_path
    }

    pub fn program(&self) -> Option<ProgramId> {
        self.program
    }

    pub fn slots(&self) -> ProgramSlots {
        self.slots
    }

    pub fn builder(&self) -> &ParameterBuilder {
        &self.builder
    }

    /// Source size observed by the most recent render.
    pub fn last_source_size(&self) -> Dimensions2D {
        self.last_source_size
    }
}

impl Drop for NineSliceFilter {
    fn drop(&mut self) {
        let Some(program) = self.program.take() else {
            return;
        };
        let gfx = self.graphics.enter();
        match gfx.try_device() {
            Some(mut device) => device.destroy_program(program),
            None => filter_log!(warn, self, "Graphics device busy, effect {} leaked.", program.0),
        }
    }
}
