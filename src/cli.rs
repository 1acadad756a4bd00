//! Command-line surface of the `my-voice` binary.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use secrecy::ExposeSecret;

use crate::config::Settings;
use crate::editor::{
    DayField, DayList, DraftAction, DraftError, EditError, ExerciseField, ExerciseList,
    RoutineEditor, RoutineView, SubmitError,
};
use crate::models::{
    Equipment, NewProgressEntry, RepsUnit, RoutineGenerationRequest, RoutinePayload,
    TrainingGoal, TrainingLevel, WeightUnit,
};
use crate::routes::Route;
use crate::services::ApiError;
use crate::store::app_store::error_route;
use crate::store::{AppStore, CacheError, LastViewed, ProgressQuery, ProgressSort, SortOrder};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to read configuration: {0}")]
    Config(#[from] ::config::ConfigError),
    #[error("credentials missing: set credentials.email and MY_VOICE_PASSWORD")]
    MissingCredentials,
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Submit(#[from] SubmitError),
    #[error("routine file is not usable: {0}")]
    Draft(#[from] DraftError),
    #[error("failed to read input file {path}: {source}")]
    InputFile { path: String, source: std::io::Error },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    /// Screen the user should go to next, if the failure calls for one.
    pub fn route(&self) -> Option<Route> {
        match self {
            CliError::Api(e) => error_route(e),
            CliError::Submit(e) => e.route(),
            CliError::MissingCredentials => Some(Route::Login),
            _ => None,
        }
    }
}

impl From<EditError> for CliError {
    fn from(error: EditError) -> Self {
        match error {
            EditError::Draft(e) => CliError::Draft(e),
            EditError::SessionExpired => CliError::Submit(SubmitError::SessionExpired),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "my-voice", version, about = "My Voice training routines from the terminal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Routine management
    Routines {
        #[command(subcommand)]
        action: RoutinesCmd,
    },
    /// Training log
    Progress {
        #[command(subcommand)]
        action: ProgressCmd,
    },
    /// Coach view of assigned clients
    Clients {
        #[command(subcommand)]
        action: ClientsCmd,
    },
}

#[derive(Subcommand, Debug)]
pub enum RoutinesCmd {
    /// List routines
    List,
    /// Show one routine, opening on the last viewed day
    Show {
        routine_id: String,
        /// Day to open instead of the remembered one
        #[arg(long)]
        day: Option<String>,
    },
    /// Delete a routine
    Delete { routine_id: String },
    /// Ask the backend to generate a routine
    Generate {
        #[arg(long, value_enum)]
        level: LevelArg,
        #[arg(long, value_enum)]
        goal: GoalArg,
        #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(1..=7))]
        days: u8,
        #[arg(long, value_enum)]
        equipment: EquipmentArg,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Create a routine from a JSON file shaped like the create payload
    Create { file: PathBuf },
}

#[derive(Subcommand, Debug)]
pub enum ProgressCmd {
    /// List log entries
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        muscle: Option<String>,
        /// First day to include, YYYY-MM-DD
        #[arg(long)]
        from: Option<String>,
        /// Last day to include, YYYY-MM-DD
        #[arg(long)]
        to: Option<String>,
        #[arg(long, value_enum, default_value_t = SortArg::Date)]
        sort: SortArg,
        /// Oldest / lightest / A-Z first
        #[arg(long)]
        asc: bool,
    },
    /// Log a set
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        sets: u32,
        #[arg(long)]
        reps: u32,
        #[arg(long, default_value_t = 0.0)]
        weight: f64,
        #[arg(long, default_value = "")]
        notes: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ClientsCmd {
    /// List clients of the logged-in coach
    List,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LevelArg {
    Principiante,
    Intermedio,
    Avanzado,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum GoalArg {
    Fuerza,
    Hipertrofia,
    Resistencia,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum EquipmentArg {
    Gym,
    Casa,
    Pesas,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SortArg {
    Date,
    Name,
    Weight,
}

impl From<LevelArg> for TrainingLevel {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::Principiante => TrainingLevel::Principiante,
            LevelArg::Intermedio => TrainingLevel::Intermedio,
            LevelArg::Avanzado => TrainingLevel::Avanzado,
        }
    }
}

impl From<GoalArg> for TrainingGoal {
    fn from(goal: GoalArg) -> Self {
        match goal {
            GoalArg::Fuerza => TrainingGoal::Fuerza,
            GoalArg::Hipertrofia => TrainingGoal::Hipertrofia,
            GoalArg::Resistencia => TrainingGoal::Resistencia,
        }
    }
}

impl From<EquipmentArg> for Equipment {
    fn from(equipment: EquipmentArg) -> Self {
        match equipment {
            EquipmentArg::Gym => Equipment::Gym,
            EquipmentArg::Casa => Equipment::Casa,
            EquipmentArg::Pesas => Equipment::Pesas,
        }
    }
}

impl From<SortArg> for ProgressSort {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::Date => ProgressSort::Date,
            SortArg::Name => ProgressSort::Name,
            SortArg::Weight => ProgressSort::Weight,
        }
    }
}

/// Logs in with the configured credentials and runs one command.
pub async fn run(cli: Cli, settings: &Settings) -> Result<(), CliError> {
    let mut store = AppStore::from_settings(settings)?;
    let credentials = &settings.credentials;
    if credentials.email.is_empty() || credentials.password.expose_secret().is_empty() {
        return Err(CliError::MissingCredentials);
    }
    store
        .login(&credentials.email, credentials.password.clone())
        .await?;

    match cli.command {
        Commands::Routines { action } => {
            routines(&mut store, action, &settings.cache.last_viewed_path).await
        }
        Commands::Progress { action } => progress(&mut store, action).await,
        Commands::Clients { action } => match action {
            ClientsCmd::List => {
                let clients = store.fetch_clients().await?;
                print_json(&clients)
            }
        },
    }
}

async fn routines(
    store: &mut AppStore,
    action: RoutinesCmd,
    cache_path: &Path) -> Result<(), CliError> {
    match action {
        RoutinesCmd::List => {
            for routine in store.fetch_routines().await? {
                println!("{}\t{}\t{} days", routine.id, routine.name, routine.days.len());
            }
            Ok(())
        }
        RoutinesCmd::Show { routine_id, day } => {
            let routine = store.fetch_routine(&routine_id).await?;
            let mut memory = LastViewed::load_or_default(cache_path);
            let wanted = day.as_deref().or_else(|| memory.day_for(&routine_id));
            let view = RoutineView::new(routine, wanted);
            print_view(&view);
            memory.remember(&routine_id, view.selected_day_id());
            memory.save(cache_path)?;
            Ok(())
        }
        RoutinesCmd::Delete { routine_id } => {
            store.delete_routine(&routine_id).await?;
            println!("Deleted {}", routine_id);
            Ok(())
        }
        RoutinesCmd::Generate { level, goal, days, equipment, name, notes } => {
            let request = RoutineGenerationRequest {
                level: level.into(),
                goal: goal.into(),
                days,
                equipment: equipment.into(),
                name,
                notes,
            };
            let routine = store.generate_routine(&request).await?;
            print_json(&routine)
        }
        RoutinesCmd::Create { file } => {
            let contents = fs::read_to_string(&file).map_err(|source| CliError::InputFile {
                path: file.display().to_string(),
                source,
            })?;
            let payload: RoutinePayload = serde_json::from_str(&contents)?;
            let mut editor = editor_from_payload(&payload)?;
            let saved = store.save_routine(&mut editor).await?;
            println!("Created {} ({})", saved.routine.id, saved.routine.name);
            Ok(())
        }
    }
}

async fn progress(store: &mut AppStore, action: ProgressCmd) -> Result<(), CliError> {
    match action {
        ProgressCmd::List { search, muscle, from, to, sort, asc } => {
            let entries = store.fetch_progress().await?;
            // the muscle filter resolves names through the routines
            let routines = if muscle.is_some() {
                store.fetch_routines().await?
            } else {
                Vec::new()
            };
            let query = ProgressQuery {
                search,
                from: from.as_deref().map(|d| parse_day(d, false)).transpose()?,
                to: to.as_deref().map(|d| parse_day(d, true)).transpose()?,
                muscle,
                sort: sort.into(),
                order: if asc { SortOrder::Asc } else { SortOrder::Desc },
            };
            for entry in query.apply(&entries, &routines) {
                println!(
                    "{}\t{}\t{}x{} {}\t{} {}",
                    entry.date.format("%Y-%m-%d"),
                    entry.name,
                    entry.sets,
                    entry.reps,
                    entry.reps_unit,
                    entry.weight,
                    entry.weight_unit
                );
            }
            Ok(())
        }
        ProgressCmd::Add { name, sets, reps, weight, notes } => {
            let entry = NewProgressEntry {
                name,
                sets,
                reps,
                reps_unit: RepsUnit::Count,
                weight,
                weight_unit: WeightUnit::Kg,
                notes,
                date: Utc::now(),
            };
            let stored = store.add_progress(&entry).await?;
            print_json(&stored)
        }
    }
}

/// Replays a payload through the editor so it gets the same validation as
/// the routine form.
pub fn editor_from_payload(payload: &RoutinePayload) -> Result<RoutineEditor, CliError> {
    let mut editor = RoutineEditor::create();
    editor.dispatch(DraftAction::RenameRoutine(payload.name.clone()))?;

    for (index, day) in payload.days.iter().enumerate() {
        let day_id = match editor.draft().day_id_at(index) {
            Some(existing) => existing.clone(),
            None => editor
                .dispatch(DraftAction::AddDay)?
                .ok_or_else(|| CliError::InvalidInput("day was not created".into()))?,
        };
        for (field, value) in [
            (DayField::DayName, day.day_name.clone()),
            (DayField::Explanation, day.explanation.clone()),
        ] {
            editor.dispatch(DraftAction::EditDay { day: day_id.clone(), field, value })?;
        }
        // lists go in whole; joining them would split items that hold a comma
        for (list, items) in [
            (DayList::MusclesWorked, day.muscles_worked.clone()),
            (DayList::WarmupOptions, day.warmup_options.clone()),
        ] {
            editor.dispatch(DraftAction::SetDayList { day: day_id.clone(), list, items })?;
        }

        for exercise in &day.exercises {
            let exercise_id = editor
                .dispatch(DraftAction::AddExercise { day: day_id.clone() })?
                .ok_or_else(|| CliError::InvalidInput("exercise was not created".into()))?;
            let fields = [
                (ExerciseField::Name, exercise.name.clone()),
                (ExerciseField::Sets, exercise.sets.to_string()),
                (ExerciseField::Reps, exercise.reps.to_string()),
                (ExerciseField::RepsUnit, exercise.reps_unit.to_string()),
                (ExerciseField::Weight, exercise.weight.to_string()),
                (ExerciseField::WeightUnit, exercise.weight_unit.to_string()),
                (ExerciseField::Rest, exercise.rest.clone()),
                (ExerciseField::Notes, exercise.notes.clone().unwrap_or_default()),
                (ExerciseField::CircuitId, exercise.circuit_id.clone()),
                (ExerciseField::Completed, exercise.completed.to_string()),
            ];
            for (field, value) in fields {
                editor.dispatch(DraftAction::EditExercise {
                    day: day_id.clone(),
                    exercise: exercise_id.clone(),
                    field,
                    value,
                })?;
            }
            for (list, items) in [
                (ExerciseList::MuscleGroup, exercise.muscle_group.clone()),
                (ExerciseList::Tips, exercise.tips.clone()),
            ] {
                editor.dispatch(DraftAction::SetExerciseList {
                    day: day_id.clone(),
                    exercise: exercise_id.clone(),
                    list,
                    items,
                })?;
            }
            for video in &exercise.videos {
                let video_id = editor
                    .dispatch(DraftAction::AddVideo {
                        day: day_id.clone(),
                        exercise: exercise_id.clone(),
                        url: video.url.clone(),
                    })?
                    .ok_or_else(|| CliError::InvalidInput("video was not created".into()))?;
                if video.is_current {
                    editor.dispatch(DraftAction::SetCurrentVideo {
                        day: day_id.clone(),
                        exercise: exercise_id.clone(),
                        video: video_id,
                    })?;
                }
            }
        }
    }
    Ok(editor)
}

fn parse_day(value: &str, end_of_day: bool) -> Result<DateTime<Utc>, CliError> {
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| CliError::InvalidInput(format!("{}: {}", value, e)))?;
    let time = if end_of_day {
        date.and_hms_opt(23, 59, 59)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    time.map(|t| t.and_utc())
        .ok_or_else(|| CliError::InvalidInput(value.to_string()))
}

fn print_view(view: &RoutineView) {
    println!("{}", view.routine().name);
    let Some(day) = view.selected_day() else {
        println!("(no days)");
        return;
    };
    let completion = day.completion();
    println!(
        "{}: {}/{} done ({}%)",
        day.day_name,
        completion.completed,
        completion.total,
        completion.percent()
    );
    let groups = view.circuits();
    for circuit in &groups.circuits {
        println!("  Circuit {}", circuit.id);
        for exercise in &circuit.members {
            println!("    - {} {}x{}", exercise.name, exercise.sets, exercise.reps);
        }
    }
    for exercise in &groups.standalone {
        println!("  - {} {}x{}", exercise.name, exercise.sets, exercise.reps);
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
