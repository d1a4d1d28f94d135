// Dual-licensed under the MIT License or the Apache License, Version 2.0.

//! Binary driver for `volumetric-render`.
//!
//! Builds a scene, relights it once, renders one frame, and writes it out. There
//! is no window, no mouse-driven camera, no GIF export — those remain external
//! collaborators this crate does not implement.

#![deny(rust_2018_idioms)]

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;

mod scenes;
use scenes::BuiltinScene;

/// Render a built-in volumetric test scene to a PNG file.
#[derive(Parser, Debug)]
#[command(name = "volumetric-render", version, about)]
struct Cli {
    /// Which built-in scene to render.
    #[arg(value_enum, default_value_t = SceneArg::Sphere)]
    scene: SceneArg,

    /// Output image width in pixels.
    #[arg(long, default_value_t = 512)]
    width: usize,

    /// Output image height in pixels.
    #[arg(long, default_value_t = 512)]
    height: usize,

    /// Camera azimuth in degrees.
    #[arg(long, default_value_t = 20.0)]
    phi: f64,

    /// Camera elevation in degrees.
    #[arg(long, default_value_t = 15.0)]
    theta: f64,

    /// Output PNG path.
    #[arg(long, default_value = "render.png")]
    output: PathBuf,

    /// Increase logging verbosity; may be repeated.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum SceneArg {
    Sphere,
    EmissiveVoxel,
    Lensing,
}

impl From<SceneArg> for BuiltinScene {
    fn from(value: SceneArg) -> Self {
        match value {
            SceneArg::Sphere => BuiltinScene::Sphere,
            SceneArg::EmissiveVoxel => BuiltinScene::EmissiveVoxel,
            SceneArg::Lensing => BuiltinScene::Lensing,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    simplelog::TermLogger::init(
        match cli.verbose {
            0 => simplelog::LevelFilter::Warn,
            1 => simplelog::LevelFilter::Debug,
            _ => simplelog::LevelFilter::Trace,
        },
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    let mut scene: volumetric_render::Scene = BuiltinScene::from(cli.scene).build();
    {
        let camera = scene.camera_mut();
        camera.set_phi(cli.phi, true);
        camera.set_theta(cli.theta, true);
    }

    let start = Instant::now();
    scene.update_light();
    log::debug!("update_light: {:.3} ms", start.elapsed().as_secs_f64() * 1e3);

    let mut target = volumetric_render::Image::new(cli.width, cli.height);
    let start = Instant::now();
    scene.render(&mut target);
    log::debug!("render: {:.3} ms", start.elapsed().as_secs_f64() * 1e3);

    write_png(&target, &cli.output)?;
    log::info!("wrote {}", cli.output.display());
    Ok(())
}

/// Converts the render target to 8-bit sRGB-ish output and writes it as a PNG via
/// the `image` crate.
fn write_png(target: &volumetric_render::Image, path: &std::path::Path) -> anyhow::Result<()> {
    let (width, height) = target.dimensions();
    let mut buffer = image::RgbImage::new(width as u32, height as u32);
    for (x, y, pixel) in buffer.enumerate_pixels_mut() {
        // The render target's j=0 row is the bottom of the image;
        // `image::RgbImage` is top-down, so the row is flipped on write.
        let color = target.get(x as usize, height - 1 - y as usize);
        *pixel = image::Rgb([
            to_u8(color.red),
            to_u8(color.green),
            to_u8(color.blue),
        ]);
    }
    buffer.save(path)?;
    Ok(())
}

fn to_u8(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}
