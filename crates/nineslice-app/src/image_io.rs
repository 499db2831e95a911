//! PNG input/output and the generated test pattern.

use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result, bail};

use nineslice_core::color::Color;
use nineslice_core::image::RgbaImage;

/// Decode a PNG into 8-bit RGBA, whatever its stored format.
pub fn load_png(path: &Path) -> Result<RgbaImage> {
    let file = fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut decoder = png::Decoder::new(BufReader::new(file));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder
        .read_info()
        .with_context(|| format!("reading {}", path.display()))?;
    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    let bytes = &buf[..info.buffer_size()];

    let rgba: Vec<u8> = match info.color_type {
        png::ColorType::Rgba => bytes.to_vec(),
        png::ColorType::Rgb => bytes
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        png::ColorType::GrayscaleAlpha => bytes
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        png::ColorType::Grayscale => bytes.iter().flat_map(|&g| [g, g, g, 255]).collect(),
        png::ColorType::Indexed => bail!("{}: palette was not expanded", path.display()),
    };

    Ok(RgbaImage::from_raw(info.width, info.height, rgba)?)
}

pub fn save_png(path: &Path, image: &RgbaImage) -> Result<()> {
    let file = fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let writer = BufWriter::new(file);
    let mut encoder = png::Encoder::new(writer, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_bytes())?;
    Ok(())
}

/// Framed checker card: a dark 8 px frame with light corner marks around
/// an 8 px checkerboard, so stretched and unstretched regions are easy to
/// tell apart.
pub fn test_pattern(width: u32, height: u32) -> RgbaImage {
    const FRAME: u32 = 8;
    let frame = Color::rgb(40, 44, 52);
    let mark = Color::rgb(229, 192, 123);
    let light = Color::rgb(220, 220, 220);
    let dark = Color::rgb(150, 150, 150);

    RgbaImage::from_fn(width, height, |x, y| {
        let near_x = x < FRAME || x + FRAME >= width;
        let near_y = y < FRAME || y + FRAME >= height;
        if near_x && near_y {
            mark
        } else if near_x || near_y {
            frame
        } else if (x / 8 + y / 8) % 2 == 0 {
            light
        } else {
            dark
        }
    })
}
