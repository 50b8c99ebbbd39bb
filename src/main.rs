mod canvas;
mod colors;
mod geolocate;
mod globe;
mod help;
mod settings;
mod terminal;
mod zoneclock;

use clap::{Parser, Subcommand};
use globe::GlobeConfig;
use settings::Settings;
use std::io;

#[derive(Parser)]
#[command(name = "termglobe")]
#[command(author = "Terminal Globe")]
#[command(version = "0.1.0")]
#[command(about = "Interactive 3D globe for the terminal: drag, autospin, day/night terminator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive globe (mouse drag, autospin, terminator)
    Globe {
        /// Animation speed (seconds per frame)
        #[arg(short, long, default_value = "0.03")]
        time: f32,

        /// Initial tilt in degrees
        #[arg(long)]
        tilt: Option<f64>,

        /// Autospin step in radians per frame
        #[arg(long)]
        speed: Option<f64>,

        /// Start with autospin off
        #[arg(long)]
        no_rotate: bool,

        /// Marker latitude in degrees (needs --lon)
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Marker longitude in degrees (needs --lat)
        #[arg(long, allow_hyphen_values = true)]
        lon: Option<f64>,

        /// Hide the day/night terminator
        #[arg(long)]
        no_terminator: bool,

        /// Skip the IP geolocation lookup
        #[arg(long)]
        offline: bool,

        /// Print a single frame to stdout (no interactive display)
        #[arg(short, long)]
        print: bool,
    },

    /// Print a single globe frame to stdout
    Snapshot {
        /// Marker latitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Marker longitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: Option<f64>,

        /// Tilt in degrees
        #[arg(long, default_value = "12.0")]
        tilt: f64,

        /// Output width in terminal cells
        #[arg(long, default_value = "100")]
        width: u16,

        /// Output height in terminal cells
        #[arg(long, default_value = "45")]
        height: u16,

        /// Hide the day/night terminator
        #[arg(long)]
        no_terminator: bool,
    },
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load();

    match cli.command {
        Commands::Globe {
            time,
            tilt,
            speed,
            no_rotate,
            lat,
            lon,
            no_terminator,
            offline,
            print,
        } => {
            let location = merge_location(lat, lon, &settings);
            let config = GlobeConfig {
                time_step: time,
                tilt_deg: tilt.or(settings.globe.tilt).unwrap_or(12.0),
                spin_speed: speed
                    .or(settings.globe.spin_speed)
                    .unwrap_or(globe::engine::DEFAULT_SPIN_SPEED),
                autorotate: !no_rotate,
                show_terminator: !no_terminator && settings.globe.show_terminator.unwrap_or(true),
                geolocate: !offline
                    && location.is_none()
                    && settings.globe.geolocate.unwrap_or(true),
                location,
                color_scheme: settings.globe.color_scheme.unwrap_or(0),
                print,
            };
            globe::run(config)?;
        }
        Commands::Snapshot {
            lat,
            lon,
            tilt,
            width,
            height,
            no_terminator,
        } => {
            let location = merge_location(lat, lon, &settings);
            let config = GlobeConfig {
                tilt_deg: tilt,
                show_terminator: !no_terminator,
                location,
                autorotate: false,
                ..GlobeConfig::default()
            };
            globe::print_frame(&config, width.max(20), height.max(10));
        }
    }

    Ok(())
}

/// CLI coordinates win over the config file; a lone --lat or --lon is
/// rejected rather than half-applied.
fn merge_location(lat: Option<f64>, lon: Option<f64>, settings: &Settings) -> Option<(f64, f64)> {
    match (lat, lon) {
        (Some(lat), Some(lon)) => Some((lat, lon)),
        (None, None) => settings.globe.latitude.zip(settings.globe.longitude),
        _ => {
            eprintln!("Both --lat and --lon are required to place the marker; ignoring.");
            None
        }
    }
}
