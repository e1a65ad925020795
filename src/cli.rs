// ============================================================================
// PixelProbe CLI: headless pixel sampling via command-line arguments
// ============================================================================
//
// Usage examples:
//   pixelprobe --input photo.png --pick 10,20 --pick 0,0
//   pixelprobe -i shot.png --pick 5,5 --filter-a 255 --output picks.csv
//   pixelprobe -i "shots/*.png" --pick 0,0 --output-dir csv/
//
// No GUI is opened in CLI mode. Every input goes through the same session
// operations the GUI uses: load, manual picks, optional filter, export.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::error::{Error, Result};
use crate::export;
use crate::filter::FilterSpec;
use crate::pixels::PixelCoord;
use crate::session::Inspector;

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// PixelProbe headless pixel sampler.
#[derive(Parser, Debug)]
#[command(
    name = "pixelprobe",
    about = "PixelProbe headless pixel sampler",
    long_about = "Read exact RGBA values at given coordinates and write them as CSV\n\
                  without opening the GUI.\n\n\
                  Example:\n  \
                  pixelprobe --input photo.png --pick 10,20 --pick 0,0\n  \
                  pixelprobe -i \"*.png\" --pick 0,0 --filter-a 255 --output-dir out/"
)]
pub struct CliArgs {
    /// Input file(s). Glob patterns accepted (e.g. "*.png", "shots/*.jpg").
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<String>,

    /// Pixel to sample as X,Y. Repeat for several pixels; order is kept.
    #[arg(short, long, value_name = "X,Y", value_parser = parse_pick)]
    pub pick: Vec<PixelCoord>,

    /// Keep only picks whose red channel equals this value.
    #[arg(long, value_name = "0-255")]
    pub filter_r: Option<u8>,

    /// Keep only picks whose green channel equals this value.
    #[arg(long, value_name = "0-255")]
    pub filter_g: Option<u8>,

    /// Keep only picks whose blue channel equals this value.
    #[arg(long, value_name = "0-255")]
    pub filter_b: Option<u8>,

    /// Keep only picks whose alpha channel equals this value.
    #[arg(long, value_name = "0-255")]
    pub filter_a: Option<u8>,

    /// Output CSV path. Only valid for single-file input.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory, one `<stem>.csv` per input (`<stem>_2.csv`, ... when
    /// stems repeat). Required when more than one input is given; a single
    /// input without `--output` or `--output-dir` goes to stdout.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Print per-file progress and timing to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Returns `true` when any CLI-mode flag is present in the real process arguments.
    /// Used by `main()` to route before creating an eframe window.
    pub fn is_cli_mode() -> bool {
        std::env::args().any(|a| a == "--input" || a == "-i")
    }

    pub fn filter_spec(&self) -> FilterSpec {
        FilterSpec {
            r: self.filter_r,
            g: self.filter_g,
            b: self.filter_b,
            a: self.filter_a,
        }
    }
}

/// Where a single input's CSV goes.
#[derive(Debug, Clone, PartialEq)]
pub enum Destination {
    File(PathBuf),
    Stdout,
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run all CLI processing and return an OS exit code.
/// `0` = all files succeeded, `1` = one or more files failed.
pub fn run(args: CliArgs) -> ExitCode {
    let inputs = resolve_inputs(&args.input);
    if inputs.is_empty() {
        eprintln!("error: no input files matched the given pattern(s).");
        return ExitCode::FAILURE;
    }

    if let Err(e) = check_outputs(&args, inputs.len()) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    if let Some(dir) = &args.output_dir {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!(
                "error: could not create output directory '{}': {}",
                dir.display(),
                e
            );
            return ExitCode::FAILURE;
        }
    }

    let total = inputs.len();
    let multi = total > 1;
    let spec = args.filter_spec();
    let mut any_failure = false;

    let destinations =
        plan_destinations(&inputs, args.output.as_deref(), args.output_dir.as_deref());

    for (idx, (input_path, dest)) in inputs.iter().zip(destinations).enumerate() {
        if multi || args.verbose {
            eprintln!("[{}/{}] {}", idx + 1, total, input_path.display());
        }
        let file_start = Instant::now();

        let Some(dest) = dest else {
            eprintln!("  error: cannot determine output path for '{}'.", input_path.display());
            any_failure = true;
            continue;
        };

        match run_one(input_path, &args.pick, &spec, &dest) {
            Ok(rows) => {
                if args.verbose || multi {
                    let target = match &dest {
                        Destination::File(p) => p.display().to_string(),
                        Destination::Stdout => "stdout".to_string(),
                    };
                    eprintln!(
                        "  → {} rows to {} ({:.0}ms)",
                        rows,
                        target,
                        file_start.elapsed().as_secs_f64() * 1000.0
                    );
                }
            }
            Err(e) => {
                eprintln!("  error: {}", e);
                any_failure = true;
            }
        }
    }

    if any_failure { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

// ============================================================================
// Per-file processing pipeline
// ============================================================================

/// Load, pick, filter, export. Returns the number of rows written.
///
/// Out-of-bounds picks are reported and skipped; the remaining picks
/// still go through.
pub fn run_one(
    input: &Path,
    picks: &[PixelCoord],
    spec: &FilterSpec,
    dest: &Destination,
) -> Result<usize> {
    let mut inspector = Inspector::new();
    inspector.load_image(input)?;

    for coord in picks {
        if let Err(e) = inspector.select_manual(coord.x, coord.y) {
            eprintln!("  warning: {}", e);
        }
    }

    if !spec.is_unconstrained() {
        inspector.apply_filter(spec);
    }

    match dest {
        Destination::File(path) => inspector.export_csv(path),
        Destination::Stdout => {
            let records = inspector.records();
            if records.is_empty() {
                return Err(Error::EmptySelection);
            }
            export::write_csv(records, std::io::stdout().lock()).map_err(|source| {
                Error::Export {
                    path: PathBuf::from("<stdout>"),
                    source,
                }
            })?;
            Ok(records.len())
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Parse `X,Y` into a pixel coordinate.
pub fn parse_pick(s: &str) -> std::result::Result<PixelCoord, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{}'", s))?;
    let x = x
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid X in '{}': {}", s, e))?;
    let y = y
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid Y in '{}': {}", s, e))?;
    Ok(PixelCoord::new(x, y))
}

/// Expand glob patterns and literal paths into a deduplicated, ordered list.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let as_path = Path::new(pattern);

        if as_path.exists() {
            if !result.iter().any(|p| p.as_path() == as_path) {
                result.push(as_path.to_path_buf());
            }
            continue;
        }

        match glob::glob(pattern) {
            Ok(entries) => {
                let mut matched = false;
                for entry in entries.flatten() {
                    let is_image = entry
                        .extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(crate::io::is_image_extension);
                    if !is_image {
                        continue;
                    }
                    if !result.contains(&entry) {
                        result.push(entry);
                    }
                    matched = true;
                }
                if !matched {
                    eprintln!("warning: pattern '{}' matched no image files.", pattern);
                }
            }
            Err(e) => {
                eprintln!("warning: invalid glob '{}': {}", pattern, e);
            }
        }
    }

    result
}

/// Batch runs must write one file per input: several inputs need
/// `--output-dir`, and `--output` is only valid for a single input.
fn check_outputs(args: &CliArgs, input_count: usize) -> Result<()> {
    if input_count <= 1 {
        return Ok(());
    }
    if args.output.is_some() {
        return Err(Error::Cli(format!(
            "{} input files given but --output only accepts a single file path.\n\
             Use --output-dir alone to write one CSV per input.",
            input_count
        )));
    }
    if args.output_dir.is_none() {
        return Err(Error::Cli(format!(
            "{} input files given but no --output-dir.\n\
             Their CSVs cannot share stdout; use --output-dir for batch processing.",
            input_count
        )));
    }
    Ok(())
}

/// Where the CSV for each input goes, in input order.
///
/// Priority:
/// 1. `--output` (explicit path, single-file input)
/// 2. `--output-dir` (batch directory, `<stem>.csv`; repeated stems get
///    `<stem>_2.csv`, `<stem>_3.csv`, ...)
/// 3. stdout
///
/// `None` for an input without a usable file stem.
fn plan_destinations(
    inputs: &[PathBuf],
    output: Option<&Path>,
    output_dir: Option<&Path>,
) -> Vec<Option<Destination>> {
    let mut taken: HashSet<PathBuf> = HashSet::new();
    inputs
        .iter()
        .map(|input| {
            if let Some(out) = output {
                return Some(Destination::File(out.to_path_buf()));
            }
            let Some(dir) = output_dir else {
                return Some(Destination::Stdout);
            };
            let stem = input.file_stem()?.to_string_lossy().into_owned();
            let mut candidate = dir.join(format!("{}.csv", stem));
            let mut n = 2;
            while !taken.insert(candidate.clone()) {
                candidate = dir.join(format!("{}_{}.csv", stem, n));
                n += 1;
            }
            Some(Destination::File(candidate))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::ffi::OsStr;
    use tempfile::tempdir;

    #[test]
    fn test_parse_pick() {
        assert_eq!(parse_pick("10,20"), Ok(PixelCoord::new(10, 20)));
        assert_eq!(parse_pick(" 3 , 4 "), Ok(PixelCoord::new(3, 4)));
        assert!(parse_pick("10").is_err());
        assert!(parse_pick("-1,2").is_err());
        assert!(parse_pick("a,b").is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = CliArgs::try_parse_from([
            "pixelprobe", "-i", "a.png", "--pick", "1,2", "-p", "3,4", "--filter-a", "255",
        ])
        .unwrap();
        assert_eq!(args.input, vec!["a.png".to_string()]);
        assert_eq!(args.pick, vec![PixelCoord::new(1, 2), PixelCoord::new(3, 4)]);
        assert_eq!(args.filter_spec(), FilterSpec { a: Some(255), ..FilterSpec::default() });
    }

    #[test]
    fn test_args_reject_out_of_range_filter() {
        let parsed = CliArgs::try_parse_from(["pixelprobe", "-i", "a.png", "--filter-r", "256"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_output_file_needs_single_input() {
        let args = CliArgs::try_parse_from(["pixelprobe", "-i", "a.png", "b.png", "-o", "x.csv"])
            .unwrap();
        assert!(matches!(check_outputs(&args, 2), Err(Error::Cli(_))));
        assert!(check_outputs(&args, 1).is_ok());

        // An output dir alongside does not make --output valid for a batch.
        let args = CliArgs::try_parse_from([
            "pixelprobe", "-i", "a.png", "b.png", "-o", "x.csv", "--output-dir", "out",
        ])
        .unwrap();
        assert!(matches!(check_outputs(&args, 2), Err(Error::Cli(_))));
    }

    #[test]
    fn test_batch_needs_output_dir() {
        let args = CliArgs::try_parse_from(["pixelprobe", "-i", "a.png", "b.png"]).unwrap();
        assert!(matches!(check_outputs(&args, 2), Err(Error::Cli(_))));
        assert!(check_outputs(&args, 1).is_ok());

        let args = CliArgs::try_parse_from(["pixelprobe", "-i", "a.png", "b.png", "--output-dir", "out"])
            .unwrap();
        assert!(check_outputs(&args, 2).is_ok());
    }

    #[test]
    fn test_plan_destinations() {
        let one = [PathBuf::from("/data/shot.png")];
        assert_eq!(
            plan_destinations(&one, Some(Path::new("x.csv")), None),
            vec![Some(Destination::File(PathBuf::from("x.csv")))]
        );
        assert_eq!(
            plan_destinations(&one, None, Some(Path::new("/out"))),
            vec![Some(Destination::File(PathBuf::from("/out/shot.csv")))]
        );
        assert_eq!(plan_destinations(&one, None, None), vec![Some(Destination::Stdout)]);
    }

    #[test]
    fn test_plan_destinations_repeated_stems_get_unique_names() {
        let inputs = [
            PathBuf::from("/a/shot.png"),
            PathBuf::from("/b/shot.png"),
            PathBuf::from("/c/shot.jpg"),
            PathBuf::from("/c/other.png"),
        ];
        let planned = plan_destinations(&inputs, None, Some(Path::new("/out")));
        let expected: Vec<_> = ["shot.csv", "shot_2.csv", "shot_3.csv", "other.csv"]
            .into_iter()
            .map(|name| Some(Destination::File(Path::new("/out").join(name))))
            .collect();
        assert_eq!(planned, expected);
    }

    #[test]
    fn test_batch_with_same_stems_keeps_every_csv() {
        let dir = tempdir().unwrap();
        for (sub, value) in [("a", 1u8), ("b", 2u8)] {
            std::fs::create_dir(dir.path().join(sub)).unwrap();
            RgbaImage::from_pixel(2, 2, Rgba([value, value, value, 255]))
                .save(dir.path().join(sub).join("shot.png"))
                .unwrap();
        }
        let out = dir.path().join("out");
        let a = dir.path().join("a").join("shot.png");
        let b = dir.path().join("b").join("shot.png");
        let args = CliArgs::try_parse_from([
            OsStr::new("pixelprobe"),
            OsStr::new("-i"),
            a.as_os_str(),
            b.as_os_str(),
            OsStr::new("--pick"),
            OsStr::new("0,0"),
            OsStr::new("--output-dir"),
            out.as_os_str(),
        ])
        .unwrap();

        assert_eq!(run(args), ExitCode::SUCCESS);
        assert_eq!(
            std::fs::read_to_string(out.join("shot.csv")).unwrap(),
            "X,Y,R,G,B,A,Hex\n0,0,1,1,1,255,#010101\n"
        );
        assert_eq!(
            std::fs::read_to_string(out.join("shot_2.csv")).unwrap(),
            "X,Y,R,G,B,A,Hex\n0,0,2,2,2,255,#020202\n"
        );
    }

    #[test]
    fn test_batch_with_single_output_file_fails_without_writing() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        RgbaImage::new(2, 2).save(&a).unwrap();
        RgbaImage::new(2, 2).save(&b).unwrap();
        let one = dir.path().join("one.csv");
        let out = dir.path().join("out");
        let args = CliArgs::try_parse_from([
            OsStr::new("pixelprobe"),
            OsStr::new("-i"),
            a.as_os_str(),
            b.as_os_str(),
            OsStr::new("--pick"),
            OsStr::new("0,0"),
            OsStr::new("-o"),
            one.as_os_str(),
            OsStr::new("--output-dir"),
            out.as_os_str(),
        ])
        .unwrap();

        assert_eq!(run(args), ExitCode::FAILURE);
        assert!(!one.exists());
        assert!(!out.exists());
    }

    #[test]
    fn test_resolve_inputs_glob_skips_non_images() {
        let dir = tempdir().unwrap();
        RgbaImage::new(1, 1).save(dir.path().join("a.png")).unwrap();
        RgbaImage::new(1, 1).save(dir.path().join("b.png")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hi").unwrap();

        let pattern = dir.path().join("*").to_string_lossy().into_owned();
        let mut inputs = resolve_inputs(&[pattern.clone(), pattern]);
        inputs.sort();
        assert_eq!(inputs, vec![dir.path().join("a.png"), dir.path().join("b.png")]);
    }

    #[test]
    fn test_run_one_writes_csv_and_skips_bad_picks() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("img.png");
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        img.put_pixel(1, 2, Rgba([255, 0, 0, 255]));
        img.put_pixel(3, 3, Rgba([255, 0, 0, 0]));
        img.save(&input).unwrap();
        let out = dir.path().join("out.csv");

        let picks = [
            PixelCoord::new(1, 2),
            PixelCoord::new(4, 0),
            PixelCoord::new(3, 3),
            PixelCoord::new(0, 0),
        ];
        let spec = FilterSpec { r: Some(255), ..FilterSpec::default() };
        let rows = run_one(&input, &picks, &spec, &Destination::File(out.clone())).unwrap();

        assert_eq!(rows, 2);
        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "X,Y,R,G,B,A,Hex\n1,2,255,0,0,255,#FF0000\n3,3,255,0,0,0,#FF0000\n"
        );
    }

    #[test]
    fn test_run_one_without_picks_is_empty_selection() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("img.png");
        RgbaImage::new(2, 2).save(&input).unwrap();
        let out = dir.path().join("out.csv");

        let err = run_one(&input, &[], &FilterSpec::default(), &Destination::File(out.clone()))
            .unwrap_err();
        assert!(matches!(err, Error::EmptySelection));
        assert!(!out.exists());
    }

    #[test]
    fn test_run_one_bad_input() {
        let dir = tempdir().unwrap();
        let err = run_one(
            &dir.path().join("missing.png"),
            &[PixelCoord::new(0, 0)],
            &FilterSpec::default(),
            &Destination::Stdout,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }
}
