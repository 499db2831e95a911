//! CPU implementation of the nine-slice graphics device.
//!
//! Programs live in a slot table; a destroyed program frees its slot for
//! the next load. Each program keeps one value per declared uniform,
//! starting at the declared default. A filter pass copies the source frame
//! in `begin_filter_pass` and rasterizes it with the slice renderer in
//! `end_filter_pass`, reading `border`, `source_size`, `output_size`,
//! `show_uvs` and `use_linear_filtering` back out of the uniform table.

use std::path::{Path, PathBuf};

use nineslice_core::gpu::{
    GraphicsDevice, PARAM_BORDER, PARAM_OUTPUT_SIZE, PARAM_SHOW_UVS, PARAM_SOURCE_SIZE,
    PARAM_USE_LINEAR_FILTERING, ParamId, ProgramId,
};
use nineslice_core::host::FilterSource;
use nineslice_core::slice;
use nineslice_types::error::{NineSliceError, Result};
use nineslice_types::geometry::{BorderInsets, Dimensions2D, FrameParameters, RenderFlags};
use nineslice_types::image::RgbaImage;

use crate::effect_file::{EffectFile, UniformValue};

/// Largest render target the device will allocate, in pixels.
pub const MAX_TARGET_PIXELS: u64 = 1 << 26;

/// A loaded program and its current uniform values.
struct Program {
    path: PathBuf,
    effect: EffectFile,
    values: Vec<UniformValue>,
}

impl Program {
    fn value(&self, name: &str) -> Option<UniformValue> {
        self.effect
            .uniform(name)
            .and_then(|(idx, _)| self.values.get(idx).copied())
    }

    fn vec4(&self, name: &str) -> [f32; 4] {
        match self.value(name) {
            Some(UniformValue::Vec4(v)) => v,
            _ => [0.0; 4],
        }
    }

    fn vec2(&self, name: &str) -> [f32; 2] {
        match self.value(name) {
            Some(UniformValue::Vec2(v)) => v,
            _ => [0.0; 2],
        }
    }

    fn flag(&self, name: &str) -> bool {
        matches!(self.value(name), Some(UniformValue::Bool(true)))
    }

    /// Frame parameters as the program currently sees them.
    fn frame_parameters(&self) -> FrameParameters {
        FrameParameters {
            borders: BorderInsets::from_vec4(self.vec4(PARAM_BORDER)),
            source_size: Dimensions2D::from_vec2(self.vec2(PARAM_SOURCE_SIZE)),
            output_size: Dimensions2D::from_vec2(self.vec2(PARAM_OUTPUT_SIZE)),
            flags: RenderFlags {
                show_uv_debug: self.flag(PARAM_SHOW_UVS),
                use_linear_filtering: self.flag(PARAM_USE_LINEAR_FILTERING),
            },
        }
    }
}

/// Software device rendering into an RGBA buffer.
#[derive(Default)]
pub struct SoftwareDevice {
    programs: Vec<Option<Program>>,
    input: Option<RgbaImage>,
    output: Option<RgbaImage>,
    passes: u64,
}

impl SoftwareDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Result of the most recent completed pass.
    pub fn output(&self) -> Option<&RgbaImage> {
        self.output.as_ref()
    }

    /// Take the result of the most recent pass, leaving none behind.
    pub fn take_output(&mut self) -> Option<RgbaImage> {
        self.output.take()
    }

    /// Number of completed passes.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Number of currently loaded programs.
    pub fn program_count(&self) -> usize {
        self.programs.iter().filter(|p| p.is_some()).count()
    }

    /// Effect file a program was loaded from.
    pub fn program_path(&self, program: ProgramId) -> Option<&Path> {
        self.program(program).map(|p| p.path.as_path())
    }

    /// Current value of a named uniform.
    pub fn uniform_value(&self, program: ProgramId, name: &str) -> Option<UniformValue> {
        self.program(program).and_then(|p| p.value(name))
    }

    fn program(&self, program: ProgramId) -> Option<&Program> {
        self.programs
            .get(program.0 as usize)
            .and_then(Option::as_ref)
    }

    /// Write `value` into a slot if the declared type matches.
    fn write(&mut self, param: ParamId, value: UniformValue) {
        let Some(program) = self
            .programs
            .get_mut(param.program.0 as usize)
            .and_then(Option::as_mut)
        else {
            log::warn!("write to unknown program {}", param.program.0);
            return;
        };
        let Some(slot) = program.values.get_mut(param.index) else {
            log::warn!("write to unknown parameter {}", param.index);
            return;
        };
        if std::mem::discriminant(slot) != std::mem::discriminant(&value) {
            let name = &program.effect.uniforms()[param.index].name;
            log::warn!("type mismatch writing {name}: {value:?}");
            return;
        }
        *slot = value;
    }
}

impl GraphicsDevice for SoftwareDevice {
    fn create_program(&mut self, path: &Path) -> Result<ProgramId> {
        let effect = EffectFile::load(path)?;
        let values = effect.uniforms().iter().map(|u| u.initial_value()).collect();
        let program = Program {
            path: path.to_path_buf(),
            effect,
            values,
        };

        for (i, slot) in self.programs.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(program);
                return Ok(ProgramId(i as u64));
            }
        }
        let id = self.programs.len();
        self.programs.push(Some(program));
        Ok(ProgramId(id as u64))
    }

    fn destroy_program(&mut self, program: ProgramId) {
        match self.programs.get_mut(program.0 as usize) {
            Some(slot) if slot.is_some() => *slot = None,
            _ => log::debug!("destroy of unknown program {}", program.0),
        }
    }

    fn param_by_name(&self, program: ProgramId, name: &str) -> Option<ParamId> {
        let (index, _) = self.program(program)?.effect.uniform(name)?;
        Some(ParamId { program, index })
    }

    fn set_vec2(&mut self, param: ParamId, value: [f32; 2]) {
        self.write(param, UniformValue::Vec2(value));
    }

    fn set_vec4(&mut self, param: ParamId, value: [f32; 4]) {
        self.write(param, UniformValue::Vec4(value));
    }

    fn set_bool(&mut self, param: ParamId, value: bool) {
        self.write(param, UniformValue::Bool(value));
    }

    fn begin_filter_pass(&mut self, source: &dyn FilterSource) -> bool {
        self.input = source.frame().filter(|img| !img.is_empty());
        if self.input.is_none() {
            log::debug!("source '{}' has no frame to filter", source.name());
        }
        self.input.is_some()
    }

    fn end_filter_pass(&mut self, program: ProgramId, width: u32, height: u32) -> Result<()> {
        let input = self
            .input
            .take()
            .ok_or_else(|| NineSliceError::Device("no filter pass in progress".into()))?;
        let params = self
            .program(program)
            .ok_or_else(|| NineSliceError::Device(format!("invalid program id: {}", program.0)))?
            .frame_parameters();
        if u64::from(width) * u64::from(height) > MAX_TARGET_PIXELS {
            return Err(NineSliceError::Device(format!(
                "render target {width}x{height} exceeds {MAX_TARGET_PIXELS} pixels"
            )));
        }

        self.output = Some(slice::render(&params, &input, width, height));
        self.passes += 1;
        Ok(())
    }

    fn read_pixels(&self) -> Result<RgbaImage> {
        self.output
            .clone()
            .ok_or_else(|| NineSliceError::Device("no completed filter pass".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use nineslice_types::color::Color;

    const EFFECT: &str = include_str!("../../../data/sliced.effect");

    struct Card {
        image: RgbaImage,
    }

    impl FilterSource for Card {
        fn name(&self) -> &str {
            "card"
        }

        fn width(&self) -> u32 {
            self.image.width()
        }

        fn height(&self) -> u32 {
            self.image.height()
        }

        fn frame(&self) -> Option<RgbaImage> {
            Some(self.image.clone())
        }
    }

    fn effect_dir() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sliced.effect");
        fs::write(&path, EFFECT).unwrap();
        (dir, path)
    }

    fn bind(dev: &SoftwareDevice, program: ProgramId, name: &str) -> ParamId {
        dev.param_by_name(program, name).unwrap()
    }

    #[test]
    fn load_starts_at_declared_defaults() {
        let (_dir, path) = effect_dir();
        let mut dev = SoftwareDevice::new();
        let program = dev.create_program(&path).unwrap();
        assert_eq!(dev.program_path(program), Some(path.as_path()));
        assert_eq!(
            dev.uniform_value(program, "border"),
            Some(UniformValue::Vec4([8.0; 4]))
        );
        assert_eq!(
            dev.uniform_value(program, "show_uvs"),
            Some(UniformValue::Bool(false))
        );
        assert!(dev.param_by_name(program, "no_such_param").is_none());
    }

    #[test]
    fn load_failure_is_program_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.effect");
        fs::write(&path, "uniform float4 border;\n").unwrap();
        let mut dev = SoftwareDevice::new();
        let err = dev.create_program(&path).unwrap_err();
        assert!(matches!(err, NineSliceError::ProgramLoad(_)));
        assert_eq!(dev.program_count(), 0);
    }

    #[test]
    fn destroyed_slots_are_reused() {
        let (_dir, path) = effect_dir();
        let mut dev = SoftwareDevice::new();
        let a = dev.create_program(&path).unwrap();
        let b = dev.create_program(&path).unwrap();
        assert_ne!(a, b);
        dev.destroy_program(a);
        assert_eq!(dev.program_count(), 1);
        assert!(dev.param_by_name(a, "border").is_none());
        let c = dev.create_program(&path).unwrap();
        assert_eq!(c, a);
        dev.destroy_program(ProgramId(99));
        assert_eq!(dev.program_count(), 2);
    }

    #[test]
    fn mismatched_writes_are_ignored() {
        let (_dir, path) = effect_dir();
        let mut dev = SoftwareDevice::new();
        let program = dev.create_program(&path).unwrap();
        let border = bind(&dev, program, "border");
        dev.set_bool(border, true);
        assert_eq!(
            dev.uniform_value(program, "border"),
            Some(UniformValue::Vec4([8.0; 4]))
        );
        dev.set_vec4(border, [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(
            dev.uniform_value(program, "border"),
            Some(UniformValue::Vec4([1.0, 2.0, 3.0, 4.0]))
        );
    }

    #[test]
    fn pass_renders_bound_parameters() {
        let (_dir, path) = effect_dir();
        let mut dev = SoftwareDevice::new();
        let program = dev.create_program(&path).unwrap();
        let source_size = bind(&dev, program, "source_size");
        let output_size = bind(&dev, program, "output_size");
        let show_uvs = bind(&dev, program, "show_uvs");
        dev.set_vec2(source_size, [20.0, 20.0]);
        dev.set_vec2(output_size, [40.0, 40.0]);
        dev.set_bool(show_uvs, true);

        let card = Card {
            image: RgbaImage::new(20, 20),
        };
        assert!(dev.begin_filter_pass(&card));
        dev.end_filter_pass(program, 40, 40).unwrap();
        assert_eq!(dev.passes(), 1);
        assert_eq!(dev.read_pixels().unwrap().dimensions(), (40, 40));

        let out = dev.take_output().unwrap();
        assert_eq!(out.dimensions(), (40, 40));
        assert_eq!(out.pixel(0, 0), slice::DEBUG_PALETTE[0]);
        assert_eq!(out.pixel(20, 20), slice::DEBUG_PALETTE[4]);
        assert_eq!(out.pixel(39, 39), slice::DEBUG_PALETTE[8]);
        assert!(dev.output().is_none());
        assert!(dev.read_pixels().is_err());
    }

    #[test]
    fn empty_source_rejects_pass() {
        let mut dev = SoftwareDevice::new();
        let card = Card {
            image: RgbaImage::new(0, 0),
        };
        assert!(!dev.begin_filter_pass(&card));
        assert!(dev.end_filter_pass(ProgramId(0), 1, 1).is_err());
    }

    #[test]
    fn unknown_program_fails_pass() {
        let mut dev = SoftwareDevice::new();
        let mut image = RgbaImage::new(2, 2);
        image.fill(Color::WHITE);
        let card = Card { image };
        assert!(dev.begin_filter_pass(&card));
        let err = dev.end_filter_pass(ProgramId(3), 2, 2).unwrap_err();
        assert!(err.to_string().contains("invalid program id: 3"));
        assert!(dev.output().is_none());
    }

    #[test]
    fn oversized_target_skips_pass() {
        let (_dir, path) = effect_dir();
        let mut dev = SoftwareDevice::new();
        let program = dev.create_program(&path).unwrap();
        let card = Card {
            image: RgbaImage::new(100, 50),
        };
        assert!(dev.begin_filter_pass(&card));
        let err = dev.end_filter_pass(program, 100_000, 50_000).unwrap_err();
        assert!(matches!(err, NineSliceError::Device(_)));
        assert!(dev.output().is_none());
        assert_eq!(dev.passes(), 0);
    }
}
