use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{
    config::normalize_server_url,
    panel::{AlertSeverity, PanelTab},
    review_modal::ReviewModalError,
    load_settings, ContributionClient, ContributionsAndReviewPanel, FormatRtePreview,
    ModalOutcome, PanelEvent, PanelServices, PanelSnapshot, ReviewModal, ReviewModalHost,
};
use shared::domain::{SuggestionId, SuggestionType};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(about = "Browse and review contributor suggestions")]
struct Args {
    /// Settings file; defaults to review.toml in the working directory.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    server_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the tabs the signed-in user can open.
    Tabs,
    /// List the suggestions on one tab.
    List {
        #[arg(value_enum)]
        tab: TabArg,
    },
    /// Open one suggestion and submit a decision for it.
    Review {
        #[arg(value_enum)]
        tab: TabArg,
        suggestion_id: String,
        #[arg(long, value_enum)]
        decision: DecisionArg,
        #[arg(long, default_value = "")]
        message: String,
        #[arg(long)]
        commit_message: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TabArg {
    MyQuestions,
    MyTranslations,
    ReviewQuestions,
    ReviewTranslations,
}

impl From<TabArg> for PanelTab {
    fn from(tab: TabArg) -> Self {
        match tab {
            TabArg::MyQuestions => PanelTab::Contributions(SuggestionType::AddQuestion),
            TabArg::MyTranslations => PanelTab::Contributions(SuggestionType::TranslateContent),
            TabArg::ReviewQuestions => PanelTab::Review(SuggestionType::AddQuestion),
            TabArg::ReviewTranslations => PanelTab::Review(SuggestionType::TranslateContent),
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DecisionArg {
    Accept,
    Reject,
    Cancel,
}

/// Stands in for the review dialog: prints what a reviewer would see and
/// closes it with the decision given on the command line.
struct ScriptedReview {
    decision: DecisionArg,
    message: String,
    commit_message: Option<String>,
}

#[async_trait]
impl ReviewModalHost for ScriptedReview {
    async fn present(&self, mut modal: ReviewModal) -> ModalOutcome {
        match &mut modal {
            ReviewModal::Question(session) => {
                println!("Question for skill: {}", session.question_header());
                println!("Author: {}", session.author_name());
                println!("Content: {}", session.content_html());
                println!(
                    "Difficulty: {} ({})",
                    session.skill_difficulty_label().unwrap_or("unlisted"),
                    session.skill_difficulty()
                );
                println!("Rubric: {}", session.skill_rubric_explanation());
            }
            ReviewModal::Translation(session) => {
                println!("Translation into {}", session.language_code());
                println!("Original: {}", session.content_html());
                println!("Translation: {}", session.translation_html());
                if let Some(commit_message) = &self.commit_message {
                    session.set_commit_message(commit_message.clone());
                }
            }
        }
        modal.set_review_message(self.message.clone());

        let outcome = match self.decision {
            DecisionArg::Accept => modal.accept(),
            DecisionArg::Reject => modal.reject(),
            DecisionArg::Cancel => return modal.cancel(),
        };
        match outcome {
            Ok(outcome) => outcome,
            Err(ReviewModalError::ReadOnly(suggestion_id)) => {
                warn!(%suggestion_id, "suggestion is not reviewable from this tab");
                ModalOutcome::Cancelled
            }
            Err(err) => {
                warn!(error = %err, "review dialog closed without a decision");
                ModalOutcome::Cancelled
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref()).context("failed to load settings")?;
    if let Some(server_url) = &args.server_url {
        settings.server_url = normalize_server_url(server_url);
    }
    info!(server_url = %settings.server_url, "starting review client");

    let client = Arc::new(ContributionClient::new(&settings)?);
    let modals = match &args.command {
        Command::Review {
            decision,
            message,
            commit_message,
            ..
        } => ScriptedReview {
            decision: *decision,
            message: message.clone(),
            commit_message: commit_message.clone(),
        },
        _ => ScriptedReview {
            decision: DecisionArg::Cancel,
            message: String::new(),
            commit_message: None,
        },
    };
    let panel = ContributionsAndReviewPanel::new(
        Arc::new(settings),
        PanelServices {
            suggestions: client.clone(),
            user: client,
            modals: Arc::new(modals),
            preview: Arc::new(FormatRtePreview),
        },
    );
    let mut events = panel.subscribe_events();

    let result = run(&panel, args.command).await;
    print_alerts(&mut events);
    result
}

async fn run(panel: &ContributionsAndReviewPanel, command: Command) -> Result<()> {
    panel.init().await?;
    let snapshot = panel.snapshot().await;
    if !snapshot.user_is_logged_in {
        bail!("not logged in; sign in on the website first");
    }

    match command {
        Command::Tabs => print_tabs(&snapshot),
        Command::List { tab } => {
            open_tab(panel, tab.into()).await?;
            print_summaries(&panel.snapshot().await);
        }
        Command::Review {
            tab, suggestion_id, ..
        } => {
            open_tab(panel, tab.into()).await?;
            match panel
                .on_click_view_suggestion(&SuggestionId::new(suggestion_id))
                .await?
            {
                Some(resolved) => println!(
                    "{} {}",
                    resolved.action.as_str(),
                    resolved.suggestion_id
                ),
                None => println!("No decision submitted."),
            }
        }
    }
    Ok(())
}

async fn open_tab(panel: &ContributionsAndReviewPanel, tab: PanelTab) -> Result<()> {
    match tab {
        PanelTab::Contributions(kind) => panel.switch_to_contributions_tab(kind).await?,
        PanelTab::Review(kind) => panel.switch_to_review_tab(kind).await?,
    }
    Ok(())
}

fn print_tabs(snapshot: &PanelSnapshot) {
    println!("My contributions:");
    for tab in &snapshot.contribution_tabs {
        println!("  {}", tab.text);
    }
    if snapshot.review_tabs.is_empty() {
        println!("No review rights.");
        return;
    }
    println!("Review:");
    for tab in &snapshot.review_tabs {
        println!("  {}", tab.text);
    }
}

fn print_summaries(snapshot: &PanelSnapshot) {
    if snapshot.contribution_summaries.is_empty() {
        println!("No suggestions.");
        return;
    }
    for summary in &snapshot.contribution_summaries {
        println!(
            "{}  [{}]  {}  ({})  -> {}",
            summary.id,
            summary.label_text,
            summary.heading,
            summary.subheading,
            summary.action_button_title
        );
    }
}

fn print_alerts(events: &mut broadcast::Receiver<PanelEvent>) {
    loop {
        match events.try_recv() {
            Ok(PanelEvent::Alert(alert)) => match alert.severity {
                AlertSeverity::Success => println!("{}", alert.message),
                AlertSeverity::Warning => eprintln!("warning: {}", alert.message),
            },
            Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
}
