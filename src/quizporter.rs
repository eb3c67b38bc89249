use clap::{Parser, Subcommand};
use colored::Colorize;
use designquiz::libquiz::db;
use designquiz::{ContentPack, Error};
use env_logger::Env;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "quizporter")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, default_value = "info")]
    log_level: String,
    #[arg(short, long, value_name = "FILE", default_value = "quizzes.db")]
    db: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Copy a JSON content pack into the database
    Import { json: PathBuf },
    /// Write the database out as a JSON content pack
    Export { json: PathBuf },
}

fn run(args: &Args, conn: &rusqlite::Connection) -> Result<bool, Error> {
    match &args.command {
        Commands::Import { json } => {
            let pack = ContentPack::read(json)?;
            info!(
                "{}",
                format!(
                    "Importing data... ({} Lessons, {} Quizzes)",
                    pack.lessons.len(),
                    pack.quiz_count()
                )
                .blue()
            );
            let report = db::import_pack(conn, &pack)?;
            for err in &report.skipped {
                error!("{}", format!("├ ✘ {}", err).red().strikethrough());
            }
            info!(
                "{}",
                format!(
                    "└ Added {} lessons and {} quizzes",
                    report.lessons_added, report.quizzes_added
                )
                .green()
            );
            Ok(report.skipped.is_empty())
        }
        Commands::Export { json } => {
            let pack = db::export_pack(conn)?;
            std::fs::write(json, pack.to_json()?)?;
            info!(
                "{}",
                format!(
                    "Exported {} lessons and {} quizzes to {:?}",
                    pack.lessons.len(),
                    pack.quiz_count(),
                    json
                )
                .green()
            );
            Ok(true)
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level.as_str())).init();

    info!(
        "{}",
        format!("{:?} with Database at {:?}", args.command, args.db).cyan()
    );
    let conn = match db::create_or_open(&args.db) {
        Ok(conn) => conn,
        Err(err) => {
            error!("{}{}", "Unable to open Database: ".red(), err);
            return ExitCode::FAILURE;
        }
    };

    let outcome = run(&args, &conn);
    if let Err(err) = db::close_db(conn) {
        error!("{}", format!("{}", err).red());
    }
    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("{}", format!("{}!", err).red());
            ExitCode::FAILURE
        }
    }
}
