//! Command-line parsing.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use nineslice_core::geometry::ScaleVector;

pub const USAGE: &str = "\
usage: nineslice-app [options] <input.png | --pattern WxH> <output.png> [key=value ...]

options:
  --config FILE         filter config (default: nineslice.toml if present)
  --settings FILE       load saved settings (JSON) before applying key=value
  --save-settings FILE  write the final user settings (JSON)
  --pattern WxH         use a generated checker pattern instead of an input PNG
  --scene-scale X,Y     placement scale reported to scene_item mode
  --properties          print the filter's UI properties (JSON) and exit
  -h, --help            show this help";

/// Where the source image comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Png(PathBuf),
    Pattern { width: u32, height: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub config: Option<PathBuf>,
    pub settings_file: Option<PathBuf>,
    pub save_settings: Option<PathBuf>,
    pub scene_scale: Option<ScaleVector>,
    pub print_properties: bool,
    pub input: Option<Input>,
    pub output: Option<PathBuf>,
    pub assignments: Vec<String>,
}

/// Outcome of parsing: run, or show help.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(Args),
    Help,
}

pub fn parse<I: IntoIterator<Item = String>>(argv: I) -> Result<Command> {
    let mut args = Args {
        config: None,
        settings_file: None,
        save_settings: None,
        scene_scale: None,
        print_properties: false,
        input: None,
        output: None,
        assignments: Vec::new(),
    };
    let mut positional = Vec::new();

    let mut iter = argv.into_iter();
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .with_context(|| format!("{flag} needs a value"))
        };
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "--config" => args.config = Some(value("--config")?.into()),
            "--settings" => args.settings_file = Some(value("--settings")?.into()),
            "--save-settings" => args.save_settings = Some(value("--save-settings")?.into()),
            "--pattern" => {
                let (width, height) = parse_size(&value("--pattern")?)?;
                args.input = Some(Input::Pattern { width, height });
            }
            "--scene-scale" => args.scene_scale = Some(parse_scale(&value("--scene-scale")?)?),
            "--properties" => args.print_properties = true,
            flag if flag.starts_with("--") => bail!("unknown option {flag}"),
            other if other.contains('=') => args.assignments.push(other.to_string()),
            other => positional.push(PathBuf::from(other)),
        }
    }

    let mut positional = positional.into_iter();
    if args.input.is_none() {
        args.input = positional.next().map(Input::Png);
    }
    args.output = positional.next();
    if let Some(extra) = positional.next() {
        bail!("unexpected argument {}", extra.display());
    }

    if !args.print_properties {
        if args.input.is_none() {
            bail!("missing input image");
        }
        if args.output.is_none() {
            bail!("missing output path");
        }
    }

    Ok(Command::Run(args))
}

fn parse_size(text: &str) -> Result<(u32, u32)> {
    let (w, h) = text
        .split_once('x')
        .with_context(|| format!("expected WxH, got '{text}'"))?;
    let width: u32 = w.parse().with_context(|| format!("bad width '{w}'"))?;
    let height: u32 = h.parse().with_context(|| format!("bad height '{h}'"))?;
    if width == 0 || height == 0 {
        bail!("pattern size must be non-zero, got {text}");
    }
    Ok((width, height))
}

fn parse_scale(text: &str) -> Result<ScaleVector> {
    let (x, y) = text
        .split_once(',')
        .with_context(|| format!("expected X,Y, got '{text}'"))?;
    let x: f32 = x.trim().parse().with_context(|| format!("bad scale '{x}'"))?;
    let y: f32 = y.trim().parse().with_context(|| format!("bad scale '{y}'"))?;
    Ok(ScaleVector::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(argv: &[&str]) -> Result<Args> {
        match parse(argv.iter().map(|s| s.to_string()))? {
            Command::Run(args) => Ok(args),
            Command::Help => bail!("unexpected help"),
        }
    }

    #[test]
    fn png_in_png_out_with_settings() {
        let args = run(&["in.png", "out.png", "border_top=4", "show_uvs=true"]).unwrap();
        assert_eq!(args.input, Some(Input::Png("in.png".into())));
        assert_eq!(args.output, Some("out.png".into()));
        assert_eq!(args.assignments, ["border_top=4", "show_uvs=true"]);
    }

    #[test]
    fn pattern_replaces_input() {
        let args = run(&["--pattern", "64x32", "out.png", "--config", "n.toml"]).unwrap();
        assert_eq!(
            args.input,
            Some(Input::Pattern {
                width: 64,
                height: 32
            })
        );
        assert_eq!(args.output, Some("out.png".into()));
        assert_eq!(args.config, Some("n.toml".into()));
    }

    #[test]
    fn scene_scale() {
        let args = run(&["a.png", "b.png", "--scene-scale", "2.5, 3"]).unwrap();
        assert_eq!(args.scene_scale, Some(ScaleVector::new(2.5, 3.0)));
    }

    #[test]
    fn properties_need_no_paths() {
        let args = run(&["--properties"]).unwrap();
        assert!(args.print_properties);
        assert!(args.input.is_none());
    }

    #[test]
    fn help() {
        assert_eq!(parse(["-h".to_string()]).unwrap(), Command::Help);
    }

    #[test]
    fn rejects_bad_input() {
        for argv in [
            &["in.png"][..],
            &["in.png", "out.png", "extra.png"],
            &["--pattern", "64", "out.png"],
            &["--pattern", "0x8", "out.png"],
            &["--scene-scale"],
            &["--bogus", "in.png", "out.png"],
        ] {
            assert!(run(argv).is_err(), "{argv:?}");
        }
    }
}
