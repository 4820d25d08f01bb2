//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - loads the CSSE repository
//! - builds chart views
//! - renders SVG/ASCII output, exports, or launches the TUI

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, ExportArgs, PlotArgs, ShowArgs};
use crate::data::{resolve_repo_dir, TimeSeriesRepository};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `covid` binary.
pub fn run() -> Result<(), AppError> {
    // `covid` and `covid --lag 3` behave like `covid tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    // Log lines would corrupt the TUI's alternate screen.
    let default_filter = match cli.command {
        Command::Tui(_) => "error",
        _ => "info",
    };
    init_logging(default_filter);

    let repo_dir = resolve_repo_dir(cli.data_dir.as_deref());
    let repo = TimeSeriesRepository::open(repo_dir)?;

    match cli.command {
        Command::Countries(args) => {
            let scope = crate::cli::scope_from_flag(args.us);
            println!("{}", crate::report::format_country_list(&repo.names_in(scope), scope));
            Ok(())
        }
        Command::Plot(args) => handle_plot(&repo, args),
        Command::Show(args) => handle_show(&repo, args),
        Command::Export(args) => handle_export(&repo, args),
        Command::Tui(args) => crate::tui::run(repo, args),
    }
}

fn init_logging(default_filter: &str) {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_plot(repo: &TimeSeriesRepository, args: PlotArgs) -> Result<(), AppError> {
    let request = args.chart.to_request(args.columns);
    let views = pipeline::build_country_views(repo, &request)?;

    crate::plot::render_svg(&args.out, &views, request.columns, (args.width, args.height))?;
    info!("Wrote {} chart(s) to {}", views.len(), args.out.display());

    for view in &views {
        if args.ascii {
            println!("{}", crate::plot::render_ascii_chart(view, 100, 25));
        }
        println!("{}\n", crate::report::format_view_summary(view));
    }
    Ok(())
}

fn handle_show(repo: &TimeSeriesRepository, args: ShowArgs) -> Result<(), AppError> {
    let request = args.chart.to_request(1);
    let views = pipeline::build_country_views(repo, &request)?;

    for view in &views {
        println!("{}", crate::plot::render_ascii_chart(view, args.width, args.height));
        println!("{}\n", crate::report::format_view_summary(view));
    }
    Ok(())
}

fn handle_export(repo: &TimeSeriesRepository, args: ExportArgs) -> Result<(), AppError> {
    let request = args.chart.to_request(1);
    let views = pipeline::build_country_views(repo, &request)?;

    crate::io::export::write_views(&args.out, &views)?;
    info!("Exported {} series to {}", views.len(), args.out.display());
    Ok(())
}

/// Rewrite argv so `covid` defaults to `covid tui`.
///
/// Rules:
/// - `covid`                      -> `covid tui`
/// - `covid --lag 3 ...`          -> `covid tui --lag 3 ...`
/// - `covid --help/--version/-h`  -> unchanged (show top-level help/version)
/// - `covid --data-dir D ...`     -> unchanged (global flag before a subcommand)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "countries" | "plot" | "show" | "export" | "tui"
    );
    if is_subcommand {
        return argv;
    }

    if arg1 == "--data-dir" || arg1.starts_with("--data-dir=") {
        // Only default to the TUI when no subcommand follows the global flag.
        let has_subcommand = argv.iter().skip(2).any(|a| {
            matches!(a.as_str(), "countries" | "plot" | "show" | "export" | "tui")
        });
        if !has_subcommand {
            argv.push("tui".to_string());
        }
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
