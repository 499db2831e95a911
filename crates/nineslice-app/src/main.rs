//! Nine-slice command-line driver.
//!
//! Loads the filter module into a registry, attaches the nine-slice kind to
//! a still image and renders one frame through the software device:
//!
//! ```text
//! nineslice-app card.png card_x4.png border_top=12 border_bottom=12
//! nineslice-app --pattern 64x48 debug.png show_uvs=true output_scale_x=6
//! ```

mod args;
mod image_io;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use args::{Args, Command, Input};
use nineslice_backend_soft::SoftwareDevice;
use nineslice_core::geometry::ScaleVector;
use nineslice_core::image::RgbaImage;
use nineslice_core::kind::NINE_SLICE_ID;
use nineslice_core::settings::Settings;
use nineslice_core::{
    FilterConfig, FilterRegistry, FilterSource, GraphicsContext, SceneScaleQuery, module,
};

const DEFAULT_CONFIG: &str = "nineslice.toml";

/// A still image standing in for a live video source.
struct ImageSource {
    name: String,
    image: RgbaImage,
}

impl FilterSource for ImageSource {
    fn name(&self) -> &str {
        &self.name
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

/// Reports one placement scale for every source.
struct CliPlacement(ScaleVector);

impl SceneScaleQuery for CliPlacement {
    fn find_scale_for(&self, _source_name: &str) -> Option<ScaleVector> {
        Some(self.0)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match args::parse(std::env::args().skip(1)) {
        Ok(Command::Run(args)) => run(args),
        Ok(Command::Help) => {
            println!("{}", args::USAGE);
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", args::USAGE);
            Err(e)
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let config = FilterConfig::load_or_default(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    log::info!(
        "Effect: {} ({:?} scale)",
        config.effect_path.display(),
        config.scale_mode
    );

    let graphics = Arc::new(GraphicsContext::new(Box::new(SoftwareDevice::new())));
    let scene_query = args
        .scene_scale
        .map(|s| Arc::new(CliPlacement(s)) as Arc<dyn SceneScaleQuery>);

    let mut registry = FilterRegistry::new();
    module::load(&mut registry, config, Arc::clone(&graphics), scene_query)?;
    let kind = registry
        .get(NINE_SLICE_ID)
        .context("nine-slice filter kind not registered")?;

    if args.print_properties {
        println!("{}", serde_json::to_string_pretty(&kind.get_properties(None))?);
        module::unload();
        return Ok(());
    }

    let mut settings = match &args.settings_file {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            Settings::from_json(&json)?
        }
        None => Settings::new(),
    };
    kind.get_defaults(&mut settings);
    for assignment in &args.assignments {
        settings.apply_assignment(assignment)?;
    }

    let (name, image) = match &args.input {
        Some(Input::Png(path)) => (source_name(path), image_io::load_png(path)?),
        Some(Input::Pattern { width, height }) => {
            ("pattern".to_string(), image_io::test_pattern(*width, *height))
        }
        None => anyhow::bail!("missing input image"),
    };
    log::info!("Source '{name}': {}x{}", image.width(), image.height());
    let source: Arc<dyn FilterSource> = Arc::new(ImageSource { name, image });

    let mut instance = kind
        .create(&mut settings, source)
        .context("could not create the nine-slice filter (see log)")?;

    let output = {
        let gfx = graphics.enter();
        kind.render(&mut *instance, &mut *gfx.device());
        let pixels = gfx.device().read_pixels();
        pixels.context("filter produced no frame")?
    };
    kind.destroy(instance);
    module::unload();

    if let Some(path) = &args.output {
        image_io::save_png(path, &output)?;
        log::info!(
            "Wrote {}x{} to {}",
            output.width(),
            output.height(),
            path.display()
        );
    }

    if let Some(path) = &args.save_settings {
        std::fs::write(path, settings.to_json()?)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    Ok(())
}

fn source_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}
