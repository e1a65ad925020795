mod app;
mod canvas;
mod components;

use app::PixelProbeApp;
use eframe::egui;
use pixelprobe::cli;
use pixelprobe::logger;

fn main() -> Result<(), eframe::Error> {
    // -- CLI / headless mode ---------------------------------------------
    if cli::CliArgs::is_cli_mode() {
        use clap::Parser;
        let args = cli::CliArgs::parse();
        if args.verbose {
            logger::init();
        }
        let code = cli::run(args);
        std::process::exit(if code == std::process::ExitCode::SUCCESS {
            0
        } else {
            1
        });
    }

    // -- GUI mode -----------------------------------------------------

    // Initialize session log (overwrites previous session log)
    logger::init();

    // Anything on the command line that is not a flag is an image to open.
    let startup_files: Vec<std::path::PathBuf> = std::env::args_os()
        .skip(1)
        .map(std::path::PathBuf::from)
        .filter(|p| !p.to_string_lossy().starts_with('-'))
        .collect();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([640.0, 420.0])
            .with_title("PixelProbe"),
        ..Default::default()
    };

    eframe::run_native(
        "PixelProbe",
        options,
        Box::new(move |cc| Box::new(PixelProbeApp::new(cc, startup_files))),
    )
}
