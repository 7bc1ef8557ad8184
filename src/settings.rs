//! Runtime settings, overridable from command line flags.

use std::{path::PathBuf, time::Duration};

use bevy::prelude::*;
use clap::Parser;

const DEFAULT_FOV_DEGREES: f32 = 40.0;
const DEFAULT_CAMERA_DISTANCE: f32 = 20.0;
const DEFAULT_RESIZE_DEBOUNCE: Duration = Duration::from_millis(150);
const DEFAULT_TEXTURE_CACHE_CAPACITY: usize = 64;
const DEFAULT_BRP_PORT: u16 = 15702;

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "card-wall")]
#[command(about = "Play cards from your hand onto a wall")]
pub struct Cli {
    /// Vertical field of view of the table camera, in degrees
    #[arg(long, default_value_t = DEFAULT_FOV_DEGREES, value_parser = parse_fov)]
    fov: f32,
    /// Distance from the camera to the card plane
    #[arg(long, default_value_t = DEFAULT_CAMERA_DISTANCE, value_parser = parse_distance)]
    camera_distance: f32,
    /// Maximum number of generated card faces kept alive
    #[arg(long, default_value_t = DEFAULT_TEXTURE_CACHE_CAPACITY, value_parser = parse_capacity)]
    texture_cache: usize,
    /// JSON catalog replacing the built-in cards
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Port for the Bevy Remote Protocol (native dev builds)
    #[arg(long, default_value_t = DEFAULT_BRP_PORT)]
    brp_port: u16,
    /// Skip the title screen (dev builds)
    #[arg(long)]
    table: bool,
}

fn parse_fov(value: &str) -> Result<f32, String> {
    match value.parse::<f32>() {
        Ok(fov) if fov > 1.0 && fov < 179.0 => Ok(fov),
        _ => Err("expected degrees between 1 and 179".to_string()),
    }
}

fn parse_distance(value: &str) -> Result<f32, String> {
    match value.parse::<f32>() {
        Ok(distance) if distance > 0.0 => Ok(distance),
        _ => Err("expected a positive distance".to_string()),
    }
}

fn parse_capacity(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(capacity) if capacity > 0 => Ok(capacity),
        _ => Err("expected at least one cached face".to_string()),
    }
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct TableSettings {
    /// Vertical field of view of the table camera.
    pub fov_degrees: f32,
    /// Distance from the camera to the card plane.
    pub camera_distance: f32,
    pub resize_debounce: Duration,
    /// Maximum number of generated card faces kept alive.
    pub texture_cache_capacity: usize,
    /// JSON catalog replacing the built-in cards.
    pub catalog_path: Option<PathBuf>,
    pub brp_port: u16,
    pub skip_title: bool,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            fov_degrees: DEFAULT_FOV_DEGREES,
            camera_distance: DEFAULT_CAMERA_DISTANCE,
            resize_debounce: DEFAULT_RESIZE_DEBOUNCE,
            texture_cache_capacity: DEFAULT_TEXTURE_CACHE_CAPACITY,
            catalog_path: None,
            brp_port: DEFAULT_BRP_PORT,
            skip_title: false,
        }
    }
}

impl From<Cli> for TableSettings {
    fn from(cli: Cli) -> Self {
        Self {
            fov_degrees: cli.fov,
            camera_distance: cli.camera_distance,
            texture_cache_capacity: cli.texture_cache,
            catalog_path: cli.catalog,
            brp_port: cli.brp_port,
            skip_title: cli.table,
            ..default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<TableSettings, clap::Error> {
        Cli::try_parse_from(std::iter::once("card-wall").chain(args.iter().copied()))
            .map(TableSettings::from)
    }

    #[test]
    fn defaults_without_flags() {
        assert_eq!(parse(&[]).unwrap(), TableSettings::default());
    }

    #[test]
    fn parses_known_flags() {
        let settings = parse(&[
            "--fov=55",
            "--camera-distance",
            "12.5",
            "--catalog=cards.json",
            "--texture-cache=8",
            "--brp-port=16000",
            "--table",
        ])
        .unwrap();
        assert_eq!(settings.fov_degrees, 55.0);
        assert_eq!(settings.camera_distance, 12.5);
        assert_eq!(settings.catalog_path, Some(PathBuf::from("cards.json")));
        assert_eq!(settings.texture_cache_capacity, 8);
        assert_eq!(settings.brp_port, 16000);
        assert!(settings.skip_title);
        assert_eq!(settings.resize_debounce, DEFAULT_RESIZE_DEBOUNCE);
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(parse(&["--fov=wide"]).is_err());
        assert!(parse(&["--fov=180"]).is_err());
        assert!(parse(&["--camera-distance=-3"]).is_err());
        assert!(parse(&["--texture-cache=0"]).is_err());
        assert!(parse(&["--brp-port=70000"]).is_err());
    }

    #[test]
    fn rejects_unknown_flags() {
        assert!(parse(&["--verbose"]).is_err());
    }
}
