//! Command-line front end for positional astronomy queries.
//!
//! Converts sexagesimal angles, measures angular separations, rotates
//! coordinates between reference frames, and runs cone searches over CSV
//! catalogs.
//!
//! Usage:
//! ```bash
//! astroquery hms 12:30:00
//! astroquery dms "-10 30 00"
//! astroquery sep 100 45 101 45
//! astroquery euler 266.405 -28.936 --select 1
//! astroquery euler 266.405 -28.936 --select 1 --config survey.json
//! astroquery cone catalog.csv --ra 100 --dec 45 --radius 0.5 --fields "id,ra,dec"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use astrometry::angle::{parse_dms, parse_hms};
use astrometry::{angular_separation, cone_matches, euler_select, Cone, Equinox};
use astrotable::{cone_from_triplet, Table, TableConfig};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "astroquery")]
#[command(about = "Sexagesimal conversion, separations, frame rotations and cone search")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert hours:minutes:seconds to decimal degrees
    Hms {
        #[arg(allow_hyphen_values = true)]
        text: String,
    },

    /// Convert degrees:minutes:seconds to decimal degrees
    Dms {
        #[arg(allow_hyphen_values = true)]
        text: String,
    },

    /// Angular separation between two positions, in degrees
    Sep {
        #[arg(allow_negative_numbers = true)]
        ra1: f64,
        #[arg(allow_negative_numbers = true)]
        dec1: f64,
        #[arg(allow_negative_numbers = true)]
        ra2: f64,
        #[arg(allow_negative_numbers = true)]
        dec2: f64,
    },

    /// Rotate a position between reference frames
    Euler {
        #[arg(allow_negative_numbers = true)]
        lon: f64,
        #[arg(allow_negative_numbers = true)]
        lat: f64,

        /// Direction: 1 eq->gal, 2 gal->eq, 3 eq->ecl, 4 ecl->eq, 5 ecl->gal, 6 gal->ecl
        #[arg(short, long)]
        select: u8,

        /// Use B1950 equatorial/ecliptic coordinates, overriding the config
        #[arg(long)]
        b1950: bool,

        /// JSON table config supplying the default equinox
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Cone search over a CSV catalog
    Cone {
        /// CSV file with a header row
        path: PathBuf,

        /// Cone center right ascension (degrees)
        #[arg(long, allow_negative_numbers = true)]
        ra: f64,

        /// Cone center declination (degrees)
        #[arg(long, allow_negative_numbers = true)]
        dec: f64,

        /// Cone radius (degrees)
        #[arg(long)]
        radius: f64,

        /// Fields to keep: "*" or a comma/space separated list
        #[arg(long, default_value = "*")]
        fields: String,

        /// RA column, overriding config and auto-detection
        #[arg(long)]
        ra_column: Option<String>,

        /// Dec column, overriding config and auto-detection
        #[arg(long)]
        dec_column: Option<String>,

        /// JSON table config
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Command::Hms { text } => {
            println!("{:.8}", parse_hms(&text)?);
            Ok(())
        }
        Command::Dms { text } => {
            println!("{:.8}", parse_dms(&text)?);
            Ok(())
        }
        Command::Sep {
            ra1,
            dec1,
            ra2,
            dec2,
        } => {
            println!("{:.8}", angular_separation(ra1, dec1, ra2, dec2));
            Ok(())
        }
        Command::Euler {
            lon,
            lat,
            select,
            b1950,
            config,
        } => cmd_euler(lon, lat, select, b1950, config.as_deref()),
        Command::Cone {
            path,
            ra,
            dec,
            radius,
            fields,
            ra_column,
            dec_column,
            config,
        } => cmd_cone(
            &path,
            cone_from_triplet(&[ra, dec, radius])?,
            &fields,
            ra_column,
            dec_column,
            config.as_deref(),
        ),
    }
}

fn cmd_euler(
    lon: f64,
    lat: f64,
    select: u8,
    b1950: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let equinox = config.equinox_or(b1950.then_some(Equinox::B1950));
    log::debug!("Rotating with selector {select} at equinox {equinox}");

    let (lon_out, lat_out) = euler_select(lon, lat, select, equinox)?;
    println!("{lon_out:.8} {lat_out:.8}");
    Ok(())
}

fn load_config(config_path: Option<&Path>) -> Result<TableConfig> {
    match config_path {
        Some(config_path) => TableConfig::load_from_file(config_path)
            .with_context(|| format!("Failed to load config {}", config_path.display())),
        None => Ok(TableConfig::default()),
    }
}

fn cmd_cone(
    path: &Path,
    cone: Cone,
    fields: &str,
    ra_column: Option<String>,
    dec_column: Option<String>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if ra_column.is_some() {
        config.ra_column = ra_column;
    }
    if dec_column.is_some() {
        config.dec_column = dec_column;
    }

    let table = Table::from_csv_path(path)
        .with_context(|| format!("Failed to read catalog {}", path.display()))?;
    let table = config.apply(table)?;
    log::info!(
        "Loaded '{}': {} row(s), ra={:?}, dec={:?}",
        table.name(),
        table.nrows(),
        table.ra_name(),
        table.dec_name()
    );

    let selected = table.select_where(fields, None, Some(cone))?;
    print!("{}", selected.info());

    // Positions come from the full table so they print even when `fields` drops them
    let ra = table.ra_degrees()?;
    let dec = table.dec_degrees()?;
    let (indices, distances) = cone_matches(ra.view(), dec.view(), &cone)?;

    println!();
    println!("{:>14} {:>14} {:>14}", "ra", "dec", "separation");
    for (&i, d) in indices.iter().zip(distances.iter()) {
        println!("{:>14.6} {:>14.6} {:>14.6}", ra[i], dec[i], d);
    }

    Ok(())
}
