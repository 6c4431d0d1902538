use anyhow::{bail, Context, Result};
use serde::Serialize;
use skillradar::api::client::ApiClient;
use skillradar::core::config::Config;
use skillradar::core::startup::{authenticate, bootstrap, Landing};
use skillradar::core::state::AppState;
use skillradar::core::tracing_init::init_tracing;
use skillradar::merge::engine::CommitOutcome;
use skillradar::merge::onboarding::OnboardingDraft;
use skillradar::models::league::xp_to_next_league;
use std::env;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

const USAGE: &str = "usage: skillradar [config.toml] \
    [summary | add <skill> | remove <skill> | resume <file> | onboard <name> <skill>... | assess <skill>]";

fn main() -> Result<()> {
    let mut args: Vec<String> = env::args().skip(1).collect();

    let config_path = if args.first().is_some_and(|arg| arg.ends_with(".toml")) {
        PathBuf::from(args.remove(0))
    } else {
        PathBuf::from("config.toml")
    };

    // Load and validate configuration
    let config = Config::from_file(&config_path)
        .context(format!(
            "Failed to load configuration from '{}'. \
            If this is your first run, copy config.example.toml to config.toml and adjust the values.",
            config_path.display()
        ))?;

    // Initialize tracing/logging
    init_tracing(&config.logging);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    runtime.block_on(async_main(config, config_path, args))
}

async fn async_main(config: Config, config_path: PathBuf, args: Vec<String>) -> Result<()> {
    info!(
        config_path = %config_path.display(),
        base_url = %config.api.base_url,
        auth_mode = ?config.auth.mode,
        log_level = %config.logging.level,
        "Skill Radar starting"
    );

    let client = ApiClient::new(config.api.base_url.clone(), config.api.timeout())
        .context("Failed to create API client")?;

    debug!(base_url = %client.base_url(), timeout_secs = config.api.timeout_secs, "API client ready");

    let session = authenticate(&client, &config.auth).await?;
    let state = AppState::new(session);
    let landing = bootstrap(&state).await?;

    let command = args.first().map(String::as_str).unwrap_or("summary");
    let rest = args.get(1..).unwrap_or_default();

    match (command, rest) {
        ("summary", []) => {
            if landing == Landing::Onboarding {
                warn!("No skills yet, run `onboard` to add some");
            }
            print_summary(&state)
        }
        ("add", [skill]) => {
            let outcome = state.merge.add(skill).await?;
            print_outcome(&outcome)
        }
        ("remove", [skill]) => {
            let outcome = state.merge.remove(skill).await?;
            print_outcome(&outcome)
        }
        ("resume", [path]) => import_resume(&state, Path::new(path)).await,
        ("onboard", [name, skills @ ..]) => onboard(&state, name, skills).await,
        ("assess", [skill]) => assess(&state, skill).await,
        _ => bail!(USAGE),
    }
}

#[derive(Serialize)]
struct Summary<'a> {
    username: &'a str,
    total_xp: u64,
    league: String,
    xp_to_next_league: Option<u64>,
    skills: Vec<String>,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to encode output")?;
    println!("{}", json);
    Ok(())
}

fn print_summary(state: &AppState) -> Result<()> {
    let skills = state.skill_store.current_skills().to_names();

    match state.dashboard.snapshot() {
        Some(snapshot) => print_json(&Summary {
            username: &snapshot.user.username,
            total_xp: snapshot.user.total_xp,
            league: snapshot.user.league().to_string(),
            xp_to_next_league: xp_to_next_league(snapshot.user.total_xp),
            skills,
        }),
        None => print_json(&Summary {
            username: &state.session.identity().username,
            total_xp: 0,
            league: "unknown".to_string(),
            xp_to_next_league: None,
            skills,
        }),
    }
}

fn print_outcome(outcome: &CommitOutcome) -> Result<()> {
    match outcome {
        CommitOutcome::Unchanged => print_json(&serde_json::json!({ "changed": false })),
        CommitOutcome::Committed(skills) => print_json(&serde_json::json!({
            "changed": true,
            "skills": skills.to_names(),
        })),
    }
}

async fn import_resume(state: &AppState, path: &Path) -> Result<()> {
    let contents = tokio::fs::read(path)
        .await
        .context(format!("Failed to read resume: {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("resume.pdf");

    let outcome = state.merge.import_resume(file_name, contents).await?;
    print_outcome(&outcome)
}

async fn onboard(state: &AppState, name: &str, skills: &[String]) -> Result<()> {
    let mut draft = OnboardingDraft::for_identity(state.session.identity());
    draft.set_display_name(name);
    for skill in skills {
        draft.add(skill)?;
    }

    let outcome = state.merge.save_onboarding(&draft).await?;
    print_outcome(&outcome)
}

/// Walk one assessment on stdin: one line per question with the 1-based
/// option number.
async fn assess(state: &AppState, skill: &str) -> Result<()> {
    let controller = &state.assessment;
    controller.start(skill).await?;

    let view = controller.view();
    if !view.history.is_empty() {
        info!(attempts = view.history.len(), "Previous attempts loaded");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    for question in &view.questions {
        println!("\n{}", question.prompt);
        for (index, option) in question.options.iter().enumerate() {
            println!("  {}) {}", index + 1, option);
        }

        loop {
            let Some(line) = lines.next_line().await.context("Failed to read answer")? else {
                bail!("Input closed before every question was answered");
            };
            let choice = match line.trim().parse::<usize>() {
                Ok(choice) if choice > 0 => choice - 1,
                _ => {
                    println!("Enter a number between 1 and {}", question.options.len());
                    continue;
                }
            };
            match controller.select_answer(question.id, choice) {
                Ok(()) => break,
                Err(e) => println!("{}", e),
            }
        }
    }

    let result = controller.submit().await?;
    print_json(&result)?;

    if let Some(snapshot) = state.dashboard.snapshot() {
        info!(
            total_xp = snapshot.user.total_xp,
            league = %snapshot.user.league(),
            "Dashboard updated"
        );
    }

    Ok(())
}
