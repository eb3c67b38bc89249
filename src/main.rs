use clap::{Parser, Subcommand};
use colored::Colorize;
use designquiz::libquiz::db;
use designquiz::{lint, ContentPack, Error, LessonIndex, Presentation, QuizKind, Registry};
use env_logger::Env;
use log::{debug, error, warn};
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;

#[derive(Parser, Debug)]
#[command(name = "designquiz")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Read quizzes from a JSON content pack instead of the database
    #[arg(short, long, value_name = "FILE", conflicts_with = "db")]
    pack: Option<PathBuf>,
    #[arg(short, long, value_name = "FILE", default_value = "quizzes.db")]
    db: PathBuf,
    #[arg(short, long, default_value = "error")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List lessons and their quizzes
    List,
    /// Print a quiz without asking for an answer
    Show { name: String },
    /// Evaluate 1-based variant numbers against a quiz
    Check {
        name: String,
        #[arg(required = true)]
        choices: Vec<usize>,
    },
    /// Answer a quiz interactively
    Take {
        name: String,
        #[arg(short, long)]
        shuffle: bool,
    },
    /// Report malformed quizzes and content smells
    Lint,
}

struct Loaded {
    lessons: Vec<LessonIndex>,
    registry: Registry,
    rejected: Vec<Error>,
}

fn load(args: &Args) -> Result<Loaded, Error> {
    let pack = match &args.pack {
        Some(path) => ContentPack::read(path)?,
        None => {
            if !args.db.exists() {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("no content database at {:?}", args.db),
                )));
            }
            let conn = db::open_db(&args.db)?;
            let pack = db::export_pack(&conn);
            db::close_db(conn)?;
            pack?
        }
    };

    let (registry, lessons, rejected) = pack.into_catalog();
    Ok(Loaded {
        lessons,
        registry,
        rejected,
    })
}

fn unavailable(err: &Error) -> ExitCode {
    println!("{}", format!("Quiz unavailable: {}.", err).yellow());
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level.as_str())).init();

    let loaded = match load(&args) {
        Ok(loaded) => loaded,
        Err(err) => {
            error!("[Setup] Cannot load quizzes: {}", err);
            return ExitCode::FAILURE;
        }
    };
    for err in &loaded.rejected {
        warn!("[Setup] {}", err);
    }
    debug!("[Setup] {} quizzes available", loaded.registry.len());
    let registry = &loaded.registry;

    match &args.command {
        Commands::List => {
            for lesson in &loaded.lessons {
                println!(
                    "{}",
                    format!("==========> {} ({}) <==========", lesson.title, lesson.slug).cyan()
                );
                for entry in &lesson.quizzes {
                    let name = &entry.name;
                    let record = if entry.registered {
                        registry.lookup(name).ok()
                    } else {
                        None
                    };
                    match record {
                        Some(record) => {
                            let kind = match record.kind() {
                                QuizKind::Single => "single",
                                QuizKind::Multiple => "multiple",
                            };
                            println!(
                                "  {} {}",
                                name.bold(),
                                format!("({}, {} variants)", kind, record.variants.len()).dimmed()
                            );
                        }
                        None => println!("  {}", name.red().strikethrough()),
                    }
                }
            }
            ExitCode::SUCCESS
        }
        Commands::Show { name } => {
            let record = match registry.lookup(name) {
                Ok(record) => record,
                Err(err) => return unavailable(&err),
            };
            cli::print_quiz(&Presentation::in_order(record), &format!("{}: ", name));
            ExitCode::SUCCESS
        }
        Commands::Check { name, choices } => {
            let record = match registry.lookup(name) {
                Ok(record) => record,
                Err(err) => return unavailable(&err),
            };
            let presentation = Presentation::in_order(record);
            let selected = match cli::selection_from_numbers(&presentation, choices) {
                Ok(selected) => selected,
                Err(message) => {
                    println!("{}", message.bright_red());
                    return ExitCode::FAILURE;
                }
            };
            if cli::check(&presentation, &selected) {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Commands::Take { name, shuffle } => {
            let record = match registry.lookup(name) {
                Ok(record) => record,
                Err(err) => return unavailable(&err),
            };
            let presentation = if *shuffle {
                Presentation::shuffled(record, &mut rand::rng())
            } else {
                Presentation::in_order(record)
            };
            match cli::take(&presentation) {
                Some(true) | None => ExitCode::SUCCESS,
                Some(false) => ExitCode::FAILURE,
            }
        }
        Commands::Lint => {
            let mut defects = loaded.rejected.len();
            for err in &loaded.rejected {
                println!("{} {}", "✘".red(), err.to_string().red());
            }
            for record in registry.iter() {
                for found in lint(record) {
                    defects += 1;
                    println!("{} {}: {}", "!".yellow(), record.name.bold(), found);
                }
            }
            if defects == 0 {
                println!(
                    "{}",
                    format!("{} quizzes, no defects.", registry.len()).bright_green()
                );
                ExitCode::SUCCESS
            } else {
                println!(
                    "{}",
                    format!("{} quizzes, {} defects.", registry.len(), defects).bright_red()
                );
                ExitCode::FAILURE
            }
        }
    }
}
