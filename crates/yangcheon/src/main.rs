use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use yangcheon::config::AppConfig;
use yangcheon::electives::{group_tokens, teacher_options, CLASS_GROUPS, STUDENT_ELECTIVES};
use yangcheon::lunch::fetch_lunch_text;
use yangcheon::messaging::{
    IidTopicBroker, SubscriptionTask, TopicBroker, TopicManager, UnconfiguredBroker,
};
use yangcheon::period::{period_time_strings, weekday_label, SystemClock, WEEKDAY_COUNT};
use yangcheon::prefs::{Settings, SqlitePreferences};
use yangcheon::schedule::{
    split_override, AppVariant, GradeClass, ScheduleClient, NO_SELECTION,
};
use yangcheon::timetable::{RenderedCell, Timetable};
use yangcheon::wifi::{SuggestionStatus, WifiConnectionResult, WifiTarget};

mod logger;

#[derive(Parser, Debug)]
#[command(name = "yangcheon", version, about = "Yangcheon Life timetable and settings")]
struct CliArgs {
    /// JSON config file; a missing file means defaults
    #[arg(long, default_value = "yangcheon.json")]
    config: PathBuf,
    /// Override the configured app variant (student or teacher)
    #[arg(long)]
    variant: Option<AppVariant>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch and print this week's timetable
    Timetable {
        /// Print the rendered grid as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the teachers known to the backend
    Teachers,
    /// Select the homeroom and move the notification topic
    SelectClass { grade: u8, class: u8 },
    /// Select the teacher whose timetable is shown
    SelectTeacher { id: String },
    /// Store the elective shown for a placeholder, e.g. `탐구B 화학I/203`.
    /// Only `subject/room` values change the timetable; bare labels are kept
    /// but not shown.
    Override { token: String, value: String },
    /// Turn class notifications on or off
    Notifications { state: Toggle },
    /// Leave every other class topic and (re)join the current one
    SweepTopics,
    /// Show the WiFi network of a homeroom or room
    Wifi {
        grade: Option<u8>,
        class: Option<u8>,
        /// Room as printed in a timetable ("203", "홈베이스B")
        #[arg(long, conflicts_with_all = ["grade", "class"])]
        room: Option<String>,
    },
    /// Print the lunch menu
    Lunch,
    /// List elective choices; teachers pass a grade and optionally a group
    Electives {
        grade: Option<u8>,
        group: Option<String>,
    },
    /// Clear every stored setting
    Reset,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Toggle {
    On,
    Off,
}

#[tokio::main]
async fn main() -> Result<()> {
    logger::init_logging();

    let args = CliArgs::parse();
    let mut config = AppConfig::load(&args.config)
        .with_context(|| format!("Failed to load config {}", args.config.display()))?;
    if let Some(variant) = args.variant {
        config.variant = variant;
    }

    let store = SqlitePreferences::open(&config.preferences_path).with_context(|| {
        format!(
            "Failed to open preferences at {}",
            config.preferences_path.display()
        )
    })?;
    let settings = Settings::new(Arc::new(store));
    let topics = TopicManager::new(topic_broker(&config));

    run(args.command, &config, &settings, &topics).await
}

fn topic_broker(config: &AppConfig) -> Arc<dyn TopicBroker> {
    match IidTopicBroker::new(&config.messaging) {
        Ok(broker) => Arc::new(broker),
        Err(e) => {
            warn!(error = %e, "Push messaging disabled");
            Arc::new(UnconfiguredBroker)
        }
    }
}

async fn run(
    command: Command,
    config: &AppConfig,
    settings: &Settings,
    topics: &TopicManager,
) -> Result<()> {
    let variant = config.variant;

    match command {
        Command::Timetable { json } => {
            let Some(key) = settings.identity_key(variant)? else {
                bail!("No teacher selected; run `select-teacher <id>` first");
            };

            let client = ScheduleClient::new(&config.schedule_client_config())?;
            let timetable = Timetable::new(client, Arc::new(SystemClock));
            if !timetable.refresh(&key).await {
                eprintln!("Could not refresh the timetable for {key}");
            }

            let grid = timetable.grid().await;
            let overrides = settings.overrides_for(&grid, variant)?;
            let rows = timetable.rows(&overrides, variant).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print_rows(&rows);
            }
        }
        Command::Teachers => {
            let client = ScheduleClient::new(&config.schedule_client_config())?;
            let teachers = client
                .fetch_teachers()
                .await
                .context("Failed to fetch teacher list")?;
            for teacher in teachers {
                println!(
                    "{}\t{}\t{}",
                    teacher.id,
                    teacher.name,
                    teacher.subject.unwrap_or_default()
                );
            }
        }
        Command::SelectClass { grade, class } => {
            let Some(selection) = GradeClass::new(grade, class) else {
                bail!("No such class: {grade}-{class}");
            };

            let task = settings.change_class(selection, topics)?;
            settings.complete_initial_setup()?;
            println!("Selected {}학년 {}반", selection.grade(), selection.class());

            if let Some(task) = task {
                report(task).await;
            }
        }
        Command::SelectTeacher { id } => {
            let client = ScheduleClient::new(&config.schedule_client_config())?;
            let teachers = client
                .fetch_teachers()
                .await
                .context("Failed to fetch teacher list")?;
            let Some(teacher) = teachers.into_iter().find(|t| t.id == id) else {
                bail!("Unknown teacher id {id}");
            };

            settings.set_teacher(&teacher)?;
            settings.complete_initial_setup()?;
            println!("Selected {} ({})", teacher.name, teacher.id);
        }
        Command::Override { token, value } => {
            if !variant.is_placeholder(&token) {
                bail!("{token} is not an elective placeholder for the {variant:?} app");
            }
            if !NO_SELECTION.contains(&value.as_str()) && split_override(&value).is_none() {
                warn!(value = %value, "Override is not `subject/room` and will be ignored");
            }
            settings.set_override(variant, &token, &value)?;
            println!("{token} -> {value}");
        }
        Command::Notifications { state } => {
            let enabled = matches!(state, Toggle::On);
            let task = settings.set_notifications_enabled(enabled, topics)?;
            println!("Notifications {}", if enabled { "on" } else { "off" });
            report(task).await;
        }
        Command::SweepTopics => {
            if !settings.notifications_enabled()? {
                println!("Notifications are off; nothing to sweep");
                return Ok(());
            }
            let current = settings.grade_class()?;
            report(topics.sweep(&current)).await;
        }
        Command::Wifi { grade, class, room } => {
            let target = match (room, grade, class) {
                (Some(room), _, _) => WifiTarget::from_room(&room)
                    .with_context(|| format!("No WiFi network known for {room}"))?,
                (None, Some(grade), Some(class)) => GradeClass::new(grade, class)
                    .map(WifiTarget::RegularClassroom)
                    .with_context(|| format!("No such class: {grade}-{class}"))?,
                (None, None, None) => WifiTarget::RegularClassroom(settings.grade_class()?),
                _ => bail!("Pass both a grade and a class, or --room"),
            };

            let suggestion = target.suggestion();
            println!("{}", target.display_name());
            println!("SSID: {} (hidden, WPA2)", suggestion.ssid);
            println!("Password: {}", suggestion.wpa2_passphrase);

            let fallback = WifiConnectionResult::new(target, SuggestionStatus::Failed);
            info!(ssid = %suggestion.ssid, "Prepared WiFi suggestion");
            println!("\n{}", fallback.message);
        }
        Command::Lunch => {
            let client = reqwest::Client::builder()
                .user_agent(&config.user_agent)
                .build()?;
            let lines = fetch_lunch_text(&client, &config.lunch_url)
                .await
                .context("Failed to fetch lunch page")?;
            for line in lines {
                println!("{line}");
            }
        }
        Command::Electives { grade, group } => match (variant, grade) {
            (AppVariant::Student, _) | (AppVariant::Teacher, None) => {
                for choice in STUDENT_ELECTIVES {
                    println!("{choice}");
                }
            }
            (AppVariant::Teacher, Some(grade)) => {
                let groups: Vec<&str> = match group.as_deref() {
                    Some(group) => vec![group],
                    None => CLASS_GROUPS.to_vec(),
                };
                for group in groups {
                    for token in group_tokens(grade, group) {
                        println!("[{group}] {token}: {}", teacher_options(grade, token).join(", "));
                    }
                }
            }
        },
        Command::Reset => {
            settings.reset()?;
            println!("All settings cleared");
        }
    }

    Ok(())
}

async fn report(task: SubscriptionTask) {
    let outcomes = task.wait().await;
    let failed = outcomes.iter().filter(|o| !o.succeeded()).count();
    println!(
        "Topic requests: {} sent, {} failed",
        outcomes.len(),
        failed
    );
}

fn print_rows(rows: &[Vec<RenderedCell>]) {
    let header: Vec<&str> = (1..=WEEKDAY_COUNT).filter_map(weekday_label).collect();
    println!("교시\t\t{}", header.join("\t\t"));

    for row in rows {
        let Some(first) = row.first() else {
            continue;
        };
        let (start, end) = period_time_strings(first.period).unwrap_or(("", ""));
        let cells: Vec<String> = row
            .iter()
            .map(|cell| {
                let text = cell
                    .display
                    .as_ref()
                    .map(|d| format!("{}({})", d.subject, d.secondary))
                    .unwrap_or_else(|| "-".to_string());
                if cell.is_current {
                    format!("*{text}")
                } else {
                    text
                }
            })
            .collect();
        println!("{} {start}-{end}\t{}", first.period, cells.join("\t"));
    }
}
