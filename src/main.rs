//! # rusty-timetable
//!
//! Command-line front end for the timetable engine.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rusty_timetable::config::Config;
use rusty_timetable::service::TimetableService;
use rusty_timetable::timetable::cohort::{course_key, EducationBase};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// rusty-timetable - College class schedules from spreadsheet timetables
#[derive(Parser)]
#[command(name = "rusty-timetable")]
#[command(author, version, about = "College class schedules from spreadsheet timetables", long_about = None)]
struct Cli {
    /// JSON config file (defaults to $TIMETABLE_CONFIG, then built-in settings)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Options selecting a course timetable.
#[derive(clap::Args)]
struct CourseArgs {
    /// Course number
    #[arg(long)]
    course: u32,

    /// Education base: 9 or 11 grades
    #[arg(long, default_value = "9")]
    base: EducationBase,

    /// Workbook path or URL replacing the configured one
    #[arg(long, value_name = "PATH_OR_URL")]
    source: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// List the groups of a course
    Groups {
        #[command(flatten)]
        course: CourseArgs,
    },
    /// Print a group's schedule
    Schedule {
        #[command(flatten)]
        course: CourseArgs,

        /// Group name as listed by `groups`
        #[arg(short, long)]
        group: String,

        /// Print the schedule as JSON instead of chat messages
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    match cli.command {
        Command::Groups { course } => {
            let service = service_for(config, &course)?;
            let groups = service.groups_for(course.base, course.course);
            if groups.is_empty() {
                bail!("No groups found for course {} (base {})", course.course, course.base);
            }
            for group in groups {
                println!("{group}");
            }
        }
        Command::Schedule { course, group, json } => {
            let service = service_for(config, &course)?;
            let schedule = service
                .schedule_for(course.base, course.course, &group)
                .with_context(|| format!("Failed to build the schedule of {group}"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&schedule)?);
            } else {
                for message in service.render(&schedule, &group) {
                    println!("{message}\n");
                }
            }
        }
    }
    Ok(())
}

/// Checks the course against the base and applies a `--source` override.
fn service_for(mut config: Config, args: &CourseArgs) -> Result<TimetableService> {
    if !args.base.courses().contains(&args.course) {
        bail!("Course {} is not available for base {}", args.course, args.base);
    }
    if let Some(source) = &args.source {
        let key = course_key(args.base.workbook_course(args.course));
        let cohort = config
            .cohorts
            .get_mut(&key)
            .with_context(|| format!("No timetable is configured for '{key}'"))?;
        cohort.source = source.clone();
    }
    Ok(TimetableService::new(config))
}
