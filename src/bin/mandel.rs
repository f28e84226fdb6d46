// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
extern crate env_logger;
extern crate failure;
#[macro_use]
extern crate log;
extern crate mandelbrot;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use failure::{err_msg, Error};
use mandelbrot::colors::BLACK;
use mandelbrot::{Backend, EngineConfig, Frame, MandelbrotEngine, UpdateOutcome};
use std::str::FromStr;
use std::time::Instant;

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + Ord>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const SIZE: &str = "size";
const ZOOM: &str = "zoom";
const OFFSET: &str = "offset";
const ITERATIONS: &str = "iterations";
const THREADS: &str = "threads";
const BACKEND: &str = "backend";
const PREVIEW: &str = "preview";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get() * 4;

    App::new("mandel")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Mandelbrot set renderer")
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("1280x720")
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse grid size"))
                .help("Size of the pixel grid"),
        )
        .arg(
            Arg::with_name(ZOOM)
                .required(false)
                .long(ZOOM)
                .short("z")
                .takes_value(true)
                .default_value("0.004")
                .validator(|s| match f64::from_str(&s) {
                    Ok(_) => Ok(()),
                    Err(_) => Err("Could not parse zoom".to_string()),
                })
                .help("Size of one pixel on the complex plane"),
        )
        .arg(
            Arg::with_name(OFFSET)
                .required(false)
                .long(OFFSET)
                .short("o")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-0.7,0.0")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse offset"))
                .help("Point of the complex plane under the center of the grid"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("1000")
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        1_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 1000000",
                    )
                })
                .help("Iterations before a point is considered inside the set"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of threads to use in solver (default: one per core)"),
        )
        .arg(
            Arg::with_name(BACKEND)
                .required(false)
                .long(BACKEND)
                .short("b")
                .takes_value(true)
                .possible_values(&["points", "raster"])
                .default_value("points")
                .help("Buffer to render into"),
        )
        .arg(
            Arg::with_name(PREVIEW)
                .required(false)
                .long(PREVIEW)
                .short("p")
                .takes_value(true)
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse preview size"))
                .help("Print a COLSxROWS character preview of the frame"),
        )
        .get_matches()
}

fn value<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str, Error> {
    matches
        .value_of(name)
        .ok_or_else(|| err_msg(format!("missing --{}", name)))
}

// Interior points are drawn solid; escaped points by brightness.
fn preview(frame: &Frame, cols: usize, rows: usize) -> String {
    let plane = frame.plane();
    const RAMP: &[u8] = b" .:-=+*%";
    let mut out = String::with_capacity((cols + 1) * rows);
    for row in 0..rows {
        for col in 0..cols {
            let (x, y) = (col * plane.0 / cols, row * plane.1 / rows);
            let c = match frame.color_at(x, y) {
                Some(color) if color == BLACK => '@',
                Some(color) => {
                    let [r, g, b] = color.0;
                    let luma = (299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b)) / 1000;
                    RAMP[(luma as usize * RAMP.len()) / 256] as char
                }
                None => ' ',
            };
            out.push(c);
        }
        out.push('\n');
    }
    out
}

fn inside(frame: &Frame) -> usize {
    let plane = frame.plane();
    let mut count = 0;
    for y in 0..plane.1 {
        for x in 0..plane.0 {
            if frame.color_at(x, y) == Some(BLACK) {
                count += 1;
            }
        }
    }
    count
}

fn run(matches: &ArgMatches) -> Result<(), Error> {
    let (width, height) = parse_pair::<usize>(value(matches, SIZE)?, 'x')
        .ok_or_else(|| err_msg("Error parsing grid dimensions"))?;
    let zoom = f64::from_str(value(matches, ZOOM)?)?;
    let (offset_x, offset_y) = parse_pair::<f64>(value(matches, OFFSET)?, ',')
        .ok_or_else(|| err_msg("Error parsing offset"))?;
    let iterations = usize::from_str(value(matches, ITERATIONS)?)?;
    let threads = match matches.value_of(THREADS) {
        Some(threads) => usize::from_str(threads)?,
        None => num_cpus::get(),
    };
    let backend = Backend::from_str(value(matches, BACKEND)?).map_err(err_msg)?;

    let engine = MandelbrotEngine::new(EngineConfig {
        width,
        height,
        ..EngineConfig::default()
    })?;
    engine.set_zoom(zoom);
    engine.set_offset(offset_x, offset_y);
    engine.set_max_iterations(iterations)?;
    engine.set_max_threads(threads)?;
    engine.select_backend(backend);

    info!("Current Settings:");
    info!("\tOffsetX: {:<10}", engine.offset().0);
    info!("\tOffsetY: {:<10}", engine.offset().1);
    info!("\tZoom: {:<10}", engine.zoom());
    info!("\tMax Iterations: {:<10}", engine.max_iterations());
    info!("\tThreads: {:<10}", engine.max_threads());
    info!("\tBackend: {:<10}", engine.backend());

    let started = Instant::now();
    let generation = match engine.update()? {
        UpdateOutcome::Committed { generation } => generation,
        other => return Err(err_msg(format!("Frame was not committed: {:?}", other))),
    };
    let elapsed = started.elapsed();
    let frame = engine
        .draw()
        .ok_or_else(|| err_msg("No frame was committed"))?;

    let plane = frame.plane();
    if let Some(size) = matches.value_of(PREVIEW) {
        let (cols, rows) =
            parse_pair::<usize>(size, 'x').ok_or_else(|| err_msg("Error parsing preview size"))?;
        if cols > 0 && rows > 0 {
            print!("{}", preview(&frame, cols, rows));
        }
    }
    println!(
        "{}x{} {} frame, generation {}: {} of {} pixels inside the set in {} ms",
        plane.0,
        plane.1,
        frame.backend(),
        generation,
        inside(&frame),
        plane.len(),
        elapsed.as_millis()
    );
    Ok(())
}

fn main() {
    env_logger::init();
    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
