//! Command-line interface for thesis
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command group is implemented in its own submodule.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::model::{parse_date, ProjectId};
use crate::output::OutputOptions;
use crate::store::ThesisStore;

mod init;
mod milestone;
mod note;
mod project;
mod report;
mod task;
mod words;

/// thesis - dissertation progress tracker
///
/// Tracks chapters (milestones), tasks and daily word counts for a
/// dissertation and reports weighted progress, writing streaks and digests.
#[derive(Parser, Debug)]
#[command(name = "thesis")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding `.thesis/` (defaults to current directory)
    #[arg(long, global = true, env = "THESIS_ROOT")]
    pub root: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the store and default config
    Init,

    /// Project management
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Milestone (chapter) management
    #[command(subcommand)]
    Milestone(MilestoneCommands),

    /// Task management and ordering
    #[command(subcommand)]
    Task(TaskCommands),

    /// Daily word counts
    #[command(subcommand)]
    Words(WordsCommands),

    /// Project notes
    #[command(subcommand)]
    Note(NoteCommands),

    /// Weighted progress per task, milestone and project
    Progress {
        #[arg(long)]
        project: Option<ProjectId>,
    },

    /// Writing streaks and badges
    Streak {
        #[arg(long)]
        project: Option<ProjectId>,

        /// Evaluate as of this day (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Tasks due soon and inactivity nudge
    Digest {
        #[arg(long)]
        project: Option<ProjectId>,

        /// Evaluate as of this day (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Export task rows
    Export {
        #[arg(long)]
        project: Option<ProjectId>,

        /// Output format: table or csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show recent store changes
    Audit {
        #[arg(long)]
        project: Option<ProjectId>,

        /// Maximum entries to show
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Quote of the day
    Quote {
        /// Day to pick the quote for (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
    },
}

/// Project subcommands
#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Create a project
    New {
        title: String,

        /// Field of study
        #[arg(long)]
        field: Option<String>,

        /// Expected defense date (YYYY-MM-DD)
        #[arg(long)]
        defense: Option<String>,

        /// Add the five core chapters with outline/draft/revise/finalize tasks
        #[arg(long)]
        templates: bool,
    },

    /// List projects with progress
    List {
        /// Include archived projects
        #[arg(long)]
        all: bool,
    },

    /// Show one project (default: the only active project)
    Show { id: Option<ProjectId> },

    /// Archive a project
    Archive { id: ProjectId },
}

/// Milestone subcommands
#[derive(Subcommand, Debug)]
pub enum MilestoneCommands {
    /// Append a milestone
    Add {
        name: String,

        #[arg(long)]
        project: Option<ProjectId>,
    },

    /// List milestones in order
    List {
        #[arg(long)]
        project: Option<ProjectId>,
    },
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Append a task to a milestone
    Add {
        title: String,

        #[arg(long)]
        milestone: u64,

        /// Word target (0 disables effort tracking)
        #[arg(long, default_value_t = 0)]
        target: u32,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,

        /// Priority: low, med, high
        #[arg(long, default_value = "med")]
        priority: String,

        #[arg(long)]
        description: Option<String>,
    },

    /// List tasks in display order
    List {
        #[arg(long)]
        project: Option<ProjectId>,

        #[arg(long)]
        milestone: Option<u64>,

        /// Filter by status: todo, doing, done
        #[arg(long)]
        status: Option<String>,
    },

    /// Set task status
    Status {
        id: u64,
        /// todo, doing or done
        status: String,
    },

    /// Set the word target
    Target { id: u64, words: u32 },

    /// Change title, description, priority or due date
    Edit {
        id: u64,

        #[arg(long)]
        title: Option<String>,

        /// New description (empty string clears it)
        #[arg(long)]
        description: Option<String>,

        /// Priority: low, med, high
        #[arg(long)]
        priority: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,

        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
    },

    /// Swap a task with its neighbour
    Move {
        id: u64,
        /// up or down
        direction: String,
    },

    /// Place a task after another, or into another milestone
    Reorder {
        id: u64,

        /// Sibling to insert after
        #[arg(long)]
        after: Option<u64>,

        /// Destination milestone (same project)
        #[arg(long)]
        milestone: Option<u64>,

        /// top or auto
        #[arg(long, default_value = "auto")]
        position: String,
    },

    /// Delete a task
    Rm { id: u64 },
}

/// Word log subcommands
#[derive(Subcommand, Debug)]
pub enum WordsCommands {
    /// Record words written on a day
    Log {
        words: u32,

        #[arg(long)]
        project: Option<ProjectId>,

        /// Attribute the words to a task
        #[arg(long)]
        task: Option<u64>,

        /// Day written (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        note: Option<String>,
    },

    /// List word logs, newest first
    List {
        #[arg(long)]
        project: Option<ProjectId>,

        #[arg(long)]
        limit: Option<usize>,
    },
}

/// Note subcommands
#[derive(Subcommand, Debug)]
pub enum NoteCommands {
    /// Add a note to a project
    Add {
        title: String,

        #[arg(long, default_value = "")]
        body: String,

        #[arg(long)]
        project: Option<ProjectId>,
    },

    /// List notes, newest first
    List {
        #[arg(long)]
        project: Option<ProjectId>,
    },

    /// Change a note's title or body
    Edit {
        id: u64,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        body: Option<String>,
    },

    /// Delete a note
    Rm { id: u64 },
}

/// Global settings every command receives
#[derive(Debug, Clone)]
pub struct Globals {
    pub root: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

impl Globals {
    pub fn output(&self) -> OutputOptions {
        OutputOptions {
            json: self.json,
            quiet: self.quiet,
        }
    }

    pub fn root_dir(&self) -> Result<PathBuf> {
        match &self.root {
            Some(path) => Ok(path.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }

    pub fn open_store(&self) -> Result<ThesisStore> {
        ThesisStore::open(&self.root_dir()?)
    }
}

pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub(crate) fn parse_optional_date(value: Option<&str>) -> Result<Option<NaiveDate>> {
    value.map(parse_date).transpose()
}

pub(crate) fn date_or_today(value: Option<&str>) -> Result<NaiveDate> {
    Ok(parse_optional_date(value)?.unwrap_or_else(today))
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let globals = Globals {
            root: self.root,
            json: self.json,
            quiet: self.quiet,
        };

        match self.command {
            Commands::Init => init::run(&globals),
            Commands::Project(cmd) => match cmd {
                ProjectCommands::New {
                    title,
                    field,
                    defense,
                    templates,
                } => project::run_new(
                    &globals,
                    project::NewOptions {
                        title,
                        field,
                        defense,
                        templates,
                    },
                ),
                ProjectCommands::List { all } => project::run_list(&globals, all),
                ProjectCommands::Show { id } => project::run_show(&globals, id),
                ProjectCommands::Archive { id } => project::run_archive(&globals, id),
            },
            Commands::Milestone(cmd) => match cmd {
                MilestoneCommands::Add { name, project } => {
                    milestone::run_add(&globals, project, &name)
                }
                MilestoneCommands::List { project } => milestone::run_list(&globals, project),
            },
            Commands::Task(cmd) => match cmd {
                TaskCommands::Add {
                    title,
                    milestone,
                    target,
                    due,
                    priority,
                    description,
                } => task::run_add(
                    &globals,
                    task::AddOptions {
                        title,
                        milestone,
                        target,
                        due,
                        priority,
                        description,
                    },
                ),
                TaskCommands::List {
                    project,
                    milestone,
                    status,
                } => task::run_list(
                    &globals,
                    task::ListOptions {
                        project,
                        milestone,
                        status,
                    },
                ),
                TaskCommands::Status { id, status } => task::run_status(&globals, id, &status),
                TaskCommands::Target { id, words } => task::run_target(&globals, id, words),
                TaskCommands::Edit {
                    id,
                    title,
                    description,
                    priority,
                    due,
                    clear_due,
                } => task::run_edit(
                    &globals,
                    task::EditOptions {
                        id,
                        title,
                        description,
                        priority,
                        due,
                        clear_due,
                    },
                ),
                TaskCommands::Move { id, direction } => {
                    task::run_move(&globals, id, &direction)
                }
                TaskCommands::Reorder {
                    id,
                    after,
                    milestone,
                    position,
                } => task::run_reorder(
                    &globals,
                    task::ReorderOptions {
                        id,
                        after,
                        milestone,
                        position,
                    },
                ),
                TaskCommands::Rm { id } => task::run_rm(&globals, id),
            },
            Commands::Words(cmd) => match cmd {
                WordsCommands::Log {
                    words,
                    project,
                    task,
                    date,
                    note,
                } => words::run_log(
                    &globals,
                    words::LogOptions {
                        words,
                        project,
                        task,
                        date,
                        note,
                    },
                ),
                WordsCommands::List { project, limit } => {
                    words::run_list(&globals, project, limit)
                }
            },
            Commands::Note(cmd) => match cmd {
                NoteCommands::Add {
                    title,
                    body,
                    project,
                } => note::run_add(&globals, project, &title, &body),
                NoteCommands::List { project } => note::run_list(&globals, project),
                NoteCommands::Edit { id, title, body } => note::run_edit(&globals, id, title, body),
                NoteCommands::Rm { id } => note::run_rm(&globals, id),
            },
            Commands::Progress { project } => report::run_progress(&globals, project),
            Commands::Streak { project, date } => {
                report::run_streak(&globals, project, date.as_deref())
            }
            Commands::Digest { project, date } => {
                report::run_digest(&globals, project, date.as_deref())
            }
            Commands::Export { project, format } => {
                report::run_export(&globals, project, &format)
            }
            Commands::Audit { project, limit } => report::run_audit(&globals, project, limit),
            Commands::Quote { date } => report::run_quote(&globals, date.as_deref()),
        }
    }
}
