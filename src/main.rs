// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};
use std::str::FromStr;

fn main() {
    if let Err(e) = process() {
        eprintln!("Error: {}.", e);
        std::process::exit(1);
    }
}

fn process() -> Result<(), String> {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            println!("{}", HELP);
            return Err(e);
        }
    };

    if !args.quiet {
        if let Ok(()) = log::set_logger(&LOGGER) {
            log::set_max_level(log::LevelFilter::Warn);
        }
    }

    let backend = svg2img::renderer_by_name(&args.renderer).map_err(|e| e.to_string())?;

    // Everything is validated before the first render so a long batch
    // doesn't abort halfway through.
    let mut files = Vec::new();
    let mut problems = Vec::new();

    for input in &args.inputs {
        if input.is_dir() {
            match collect_svg_files(input) {
                Ok(ref mut list) if !list.is_empty() => files.append(list),
                Ok(_) => problems.push(format!("{:?} contains no SVG files", input)),
                Err(e) => problems.push(e),
            }
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            problems.push(format!("{:?} does not exist", input));
        }
    }

    if let Some(ref dir) = args.out_dir {
        if !dir.is_dir() {
            problems.push(format!("{:?} is not a directory", dir));
        }
    }

    if !problems.is_empty() {
        for problem in &problems {
            eprintln!("Error: {}.", problem);
        }
        return Err(format!("{} invalid argument(s)", problems.len()));
    }

    for path in &files {
        convert_file(path, &args, backend.as_ref())?;
    }

    Ok(())
}

const HELP: &str = "\
svg2img is an SVG to raster image conversion tool.

USAGE:
  svg2img [OPTIONS] <in-svg>...

  svg2img in.svg
  svg2img -f png,ico --size 64,128,256 icons/
  svg2img --dpi 96,192 --renderer external in.svg

OPTIONS:
      --help                Prints this help
  -V, --version             Prints version

  -f, --format LIST         Comma-separated list of output formats
                            [default: png]
  -s, --scaling FILTER      Resampling filter used for downscaling
                            [default: lanczos] [possible values: nearest,
                            lanczos, bilinear, bicubic, box, hamming,
                            rerender]
      --dpi LIST            Comma-separated list of output resolutions
                            [possible values: 10..4000]
      --size LIST           Comma-separated list of output widths in pixels;
                            heights keep the aspect ratio
      --dim LIST            Comma-separated list of output dimensions
                            as WxH pairs, e.g. 512x256
      --renderer NAME       Rendering backend
                            [default: embedded] [possible values: embedded,
                            external]
      --area AREA           Document area to render
                            [default: page] [possible values: page, drawing,
                            'x y w h']
      --margin MARGIN       Margin around the rendered area in pixels
                            (external renderer only)
  -o, --out-dir DIR         Directory the images are written to
                            [default: input file directory]
      --quiet               Disables warnings

ARGS:
  <in-svg>...               Input files or directories
";

struct Args {
    formats: Vec<String>,
    filter: svg2img::Filter,
    dpi: Vec<u32>,
    requests: Vec<svg2img::SizeRequest>,
    renderer: String,
    out_dir: Option<PathBuf>,
    quiet: bool,
    opt: svg2img::Options,
    inputs: Vec<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
    collect_args().map_err(|e| e.to_string())
}

fn collect_args() -> Result<Args, pico_args::Error> {
    let mut input = pico_args::Arguments::from_env();

    if input.contains("--help") {
        print!("{}", HELP);
        std::process::exit(0);
    }

    if input.contains(["-V", "--version"]) {
        println!("{}", env!("CARGO_PKG_VERSION"));
        std::process::exit(0);
    }

    let formats = input
        .opt_value_from_fn(["-f", "--format"], parse_formats)?
        .unwrap_or_else(|| vec!["png".to_string()]);
    let filter = input
        .opt_value_from_fn(["-s", "--scaling"], parse_filter)?
        .unwrap_or_default();
    let dpi = input.opt_value_from_fn("--dpi", parse_dpi_list)?.unwrap_or_default();

    let mut requests = input.opt_value_from_fn("--size", parse_size_list)?.unwrap_or_default();
    let dims = input.opt_value_from_fn("--dim", parse_dim_list)?.unwrap_or_default();
    requests.extend(dims);

    let renderer = input
        .opt_value_from_str("--renderer")?
        .unwrap_or_else(|| "embedded".to_string());
    let area = input.opt_value_from_fn("--area", parse_area)?.unwrap_or_default();
    let margin = input.opt_value_from_fn("--margin", parse_margin)?;
    let out_dir = input.opt_value_from_str(["-o", "--out-dir"])?;
    let quiet = input.contains("--quiet");

    let mut inputs = Vec::new();
    while let Some(path) = input.opt_free_from_str::<PathBuf>()? {
        inputs.push(path);
    }

    if inputs.is_empty() {
        return Err(pico_args::Error::MissingArgument);
    }

    let opt = svg2img::Options { area, margin, ..svg2img::Options::default() };

    Ok(Args {
        formats,
        filter,
        dpi,
        requests,
        renderer,
        out_dir,
        quiet,
        opt,
        inputs,
    })
}

fn parse_formats(s: &str) -> Result<Vec<String>, String> {
    let mut formats = Vec::new();
    for format in s.split(',') {
        let format = format.trim().to_lowercase();
        if format.is_empty() {
            return Err("the format list contains an empty entry".to_string());
        }

        formats.push(format);
    }

    Ok(formats)
}

fn parse_filter(s: &str) -> Result<svg2img::Filter, String> {
    svg2img::Filter::from_str(s).map_err(|e| e.to_string())
}

fn parse_area(s: &str) -> Result<svg2img::Area, String> {
    svg2img::Area::from_str(s).map_err(|e| e.to_string())
}

fn parse_dpi_list(s: &str) -> Result<Vec<u32>, String> {
    let mut list = Vec::new();
    for value in s.split(',') {
        let n: u32 = value.trim().parse().map_err(|_| "invalid number")?;

        if !(10..=4000).contains(&n) {
            return Err("DPI out of bounds".to_string());
        }

        list.push(n);
    }

    Ok(list)
}

fn parse_size_list(s: &str) -> Result<Vec<svg2img::SizeRequest>, String> {
    let mut list = Vec::new();
    for value in s.split(',') {
        list.push(svg2img::SizeRequest::Width(parse_length(value.trim())?));
    }

    Ok(list)
}

fn parse_dim_list(s: &str) -> Result<Vec<svg2img::SizeRequest>, String> {
    let mut list = Vec::new();
    for value in s.split(',') {
        let mut parts = value.trim().split('x');
        let width = parts.next().map(parse_length).transpose()?;
        let height = parts.next().map(parse_length).transpose()?;

        match (width, height, parts.next()) {
            (Some(width), Some(height), None) => {
                list.push(svg2img::SizeRequest::WidthHeight(width, height));
            }
            _ => return Err(format!("'{}' is not a WxH pair", value)),
        }
    }

    Ok(list)
}

fn parse_length(s: &str) -> Result<u32, String> {
    let n: u32 = s.parse().map_err(|_| "invalid length")?;

    if n > 0 {
        Ok(n)
    } else {
        Err("LENGTH cannot be zero".to_string())
    }
}

fn parse_margin(s: &str) -> Result<u32, String> {
    s.parse().map_err(|_| "invalid margin".to_string())
}

fn collect_svg_files(dir: &Path) -> Result<Vec<PathBuf>, String> {
    let entries = std::fs::read_dir(dir).map_err(|_| format!("failed to read {:?}", dir))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|_| format!("failed to read {:?}", dir))?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("svg") {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

fn convert_file(path: &Path, args: &Args, backend: &dyn svg2img::Render) -> Result<(), String> {
    let doc = svg2img::Document::load(path).map_err(|e| e.to_string())?;
    let intrinsic = doc.size(&args.opt).map_err(|e| e.to_string())?;

    let sizes = svg2img::plan_sizes(intrinsic, &args.dpi, &args.requests, args.opt.dpi);
    let images = svg2img::render_all(&doc, &sizes, args.filter, backend, &args.opt)
        .map_err(|e| e.to_string())?;

    let dir = match args.out_dir {
        Some(ref dir) => dir.clone(),
        None => path.parent().map(|p| p.to_path_buf()).unwrap_or_default(),
    };
    let stem = dir.join(path.file_stem().unwrap_or_else(|| path.as_os_str()));

    if images.len() == 1 {
        svg2img::export(&images[0], &stem, &args.formats).map_err(|e| e.to_string())
    } else {
        svg2img::export_multi(&images, &stem, &args.formats).map_err(|e| e.to_string())
    }
}

/// A simple stderr logger.
static LOGGER: SimpleLogger = SimpleLogger;
struct SimpleLogger;
impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::LevelFilter::Warn
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            let target = if !record.target().is_empty() {
                record.target()
            } else {
                record.module_path().unwrap_or_default()
            };

            let line = record.line().unwrap_or(0);

            match record.level() {
                log::Level::Error => eprintln!("Error (in {}:{}): {}", target, line, record.args()),
                log::Level::Warn => eprintln!("Warning (in {}:{}): {}", target, line, record.args()),
                log::Level::Info => eprintln!("Info (in {}:{}): {}", target, line, record.args()),
                log::Level::Debug => eprintln!("Debug (in {}:{}): {}", target, line, record.args()),
                log::Level::Trace => eprintln!("Trace (in {}:{}): {}", target, line, record.args()),
            }
        }
    }

    fn flush(&self) {}
}
