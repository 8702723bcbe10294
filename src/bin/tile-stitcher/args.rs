use clap::{
    app_from_crate, crate_authors, crate_description, crate_name, crate_version, value_t,
    AppSettings, Arg, ArgMatches,
};
use std::{path::PathBuf, time::Duration};

use crate::validators::*;
use tile_stitcher::{BoundingBox, Config, FetchErrorPolicy, UrlFormat, DEFAULT_URL, MAX_LEVEL};

const LAT1_ARG: &str = "lat1";
const LON1_ARG: &str = "lon1";
const LAT2_ARG: &str = "lat2";
const LON2_ARG: &str = "lon2";
const URL_ARG: &str = "url";
const SUBDOMAINS_ARG: &str = "subdomains";
const OUTPUT_ARG: &str = "output";
const TIMEOUT_ARG: &str = "timeout";
const PARALLEL_FETCHES_ARG: &str = "num_parallel";
const SIZE_CEILING_ARG: &str = "size_ceiling";
const MAX_LEVEL_ARG: &str = "max_level";
const ERRORS_AS_ABSENT_ARG: &str = "errors_as_absent";
const DRY_RUN_ARG: &str = "dry_run";

pub struct Args {
    pub bounding_box: BoundingBox,
    pub parallel_fetches: u8,
    pub timeout: Duration,
    pub output: PathBuf,
    pub url: String,
    pub subdomains: Vec<String>,
    pub size_ceiling: u32,
    pub max_level: u8,
    pub errors_as_absent: bool,
    pub dry_run: bool,
}

impl std::convert::From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            bounding_box: args.bounding_box,
            fetch_rate: args.parallel_fetches,
            output_path: args.output,
            url: UrlFormat::with_subdomains(args.url, args.subdomains),
            timeout: args.timeout,
            size_ceiling: args.size_ceiling,
            max_level: args.max_level,
            fetch_errors: if args.errors_as_absent {
                FetchErrorPolicy::TreatAsAbsent
            } else {
                FetchErrorPolicy::Abort
            },
        }
    }
}

impl Args {
    pub fn parse() -> Self {
        let matches = get_matches();

        // every value below has passed its validator
        let coord = |name: &str| value_t!(matches, name, f64).unwrap_or_else(|e| e.exit());

        let bounding_box = BoundingBox::new(
            coord(LAT1_ARG),
            coord(LON1_ARG),
            coord(LAT2_ARG),
            coord(LON2_ARG),
        );

        let subdomains = matches
            .value_of(SUBDOMAINS_ARG)
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect();

        Self {
            bounding_box,
            subdomains,
            parallel_fetches: value_t!(matches, PARALLEL_FETCHES_ARG, u8)
                .unwrap_or_else(|e| e.exit()),
            timeout: Duration::from_secs(
                value_t!(matches, TIMEOUT_ARG, u64).unwrap_or_else(|e| e.exit()),
            ),
            output: PathBuf::from(matches.value_of(OUTPUT_ARG).unwrap_or("result.jpg")),
            url: matches.value_of(URL_ARG).unwrap_or(DEFAULT_URL).to_owned(),
            size_ceiling: value_t!(matches, SIZE_CEILING_ARG, u32)
                .unwrap_or_else(|e| e.exit()),
            max_level: value_t!(matches, MAX_LEVEL_ARG, u8).unwrap_or_else(|e| e.exit()),
            errors_as_absent: matches.is_present(ERRORS_AS_ABSENT_ARG),
            dry_run: matches.is_present(DRY_RUN_ARG),
        }
    }
}

fn get_matches() -> ArgMatches<'static> {
    app_from_crate!()
        .setting(AppSettings::AllowNegativeNumbers)
        .setting(AppSettings::GlobalVersion)
        .setting(AppSettings::VersionlessSubcommands)
        .arg(
            Arg::with_name(LAT1_ARG)
                .help("Latitude of the first bounding box corner (in degrees)")
                .required(true)
                .index(1)
                .validator(is_geo_coord),
        )
        .arg(
            Arg::with_name(LON1_ARG)
                .help("Longitude of the first bounding box corner (in degrees)")
                .required(true)
                .index(2)
                .validator(is_geo_coord),
        )
        .arg(
            Arg::with_name(LAT2_ARG)
                .help("Latitude of the opposite bounding box corner (in degrees)")
                .required(true)
                .index(3)
                .validator(is_geo_coord),
        )
        .arg(
            Arg::with_name(LON2_ARG)
                .help("Longitude of the opposite bounding box corner (in degrees)")
                .required(true)
                .index(4)
                .validator(is_geo_coord),
        )
        .arg(
            Arg::with_name(PARALLEL_FETCHES_ARG)
                .help("The amount of tiles fetched in parallel.")
                .validator(is_numeric_in(1, u8::MAX.into()))
                .default_value("5")
                .takes_value(true)
                .short("r")
                .long("rate"),
        )
        .arg(
            Arg::with_name(TIMEOUT_ARG)
                .help("The timeout (in seconds) for fetching a single tile. Pass 0 for no timeout.")
                .validator(is_numeric_in(0, u64::MAX))
                .default_value("10")
                .takes_value(true)
                .short("t")
                .long("timeout"),
        )
        .arg(
            Arg::with_name(SIZE_CEILING_ARG)
                .help("Skip levels whose mosaic would be wider than this many pixels.")
                .validator(is_numeric_in(1, u32::MAX.into()))
                .default_value("4096")
                .takes_value(true)
                .long("size-ceiling"),
        )
        .arg(
            Arg::with_name(MAX_LEVEL_ARG)
                .help("The finest level to consider")
                .validator(is_numeric_in(1, MAX_LEVEL.into()))
                .default_value("23")
                .takes_value(true)
                .long("max-level"),
        )
        .arg(
            Arg::with_name(OUTPUT_ARG)
                .help("The file to write the image to. The extension selects the image format.")
                .default_value("result.jpg")
                .takes_value(true)
                .short("o")
                .long("output"),
        )
        .arg(
            Arg::with_name(URL_ARG)
                .help("The URL with format specifiers `{quadkey}`, `{x}`, `{y}`, `{z}` to fetch the tiles from. Also supports the format specifier `{s}` which cycles through the subdomains to spread the load between different servers.")
                .default_value(DEFAULT_URL)
                .takes_value(true)
                .short("u")
                .long("url"),
        )
        .arg(
            Arg::with_name(SUBDOMAINS_ARG)
                .help("Comma separated values substituted for `{s}`")
                .default_value("0,1,2,3")
                .takes_value(true)
                .short("s")
                .long("subdomains"),
        )
        .arg(
            Arg::with_name(ERRORS_AS_ABSENT_ARG)
                .help("Treat tiles that fail to download like missing tiles instead of aborting")
                .required(false)
                .takes_value(false)
                .long("errors-as-absent"),
        )
        .arg(
            Arg::with_name(DRY_RUN_ARG)
                .help("Only determine the level and the image size, don't write anything.")
                .required(false)
                .takes_value(false)
                .long("dry-run"),
        )
        .get_matches()
}
