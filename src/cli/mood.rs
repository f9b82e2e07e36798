use std::time::Duration;

use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    Res, cli,
    config::Settings,
    error,
    error::CoreError,
    info,
    mood::MoodReport,
    utils, warning,
};

/// Prints the full mood report: summary, trend, tracks and recommendations.
pub async fn mood(settings: &Settings, limit: Option<u32>, json: bool) {
    let report = load_report(settings, limit).await;

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(out) => println!("{}", out),
            Err(e) => error!("Failed to serialise report. Err: {}", e),
        }
        return;
    }

    let analysis = &report.analysis;
    if let Some(profile) = &report.profile {
        info!("Mood report for {}", profile.name());
    }
    info!("Overall mood: {}", utils::format_score(analysis.overall_mood));
    info!("Average energy: {}", utils::format_score(analysis.average_energy));
    info!("{}", report.description);
    info!("Trend over the last 7 days: {}", report.direction);

    println!("{}", Table::new(utils::trend_rows(&report)));

    if report.plays.is_empty() {
        warning!("No recent plays.");
    } else {
        println!("{}", Table::new(utils::track_rows(&report.plays)));
        if !analysis.has_data() {
            warning!("None of the recent plays have audio features.");
        }
    }

    println!("{}", Table::new(utils::recommendation_rows(&report)));
}

/// Prints the recommendations only.
pub async fn recommend(settings: &Settings, limit: Option<u32>) {
    let report = load_report(settings, limit).await;
    println!("{}", Table::new(utils::recommendation_rows(&report)));
}

async fn load_report(settings: &Settings, limit: Option<u32>) -> MoodReport {
    let pb = ProgressBar::new_spinner();
    pb.set_message("Analysing recent plays...");
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    let result = run(settings, limit).await;
    pb.finish_and_clear();

    match result {
        Ok(report) => report,
        Err(e) => match e.downcast_ref::<CoreError>() {
            Some(core) if core.requires_reauth() => {
                error!("{}. Please run mindbeat auth.", core)
            }
            _ => error!("Failed to analyse mood. Err: {}", e),
        },
    }
}

async fn run(settings: &Settings, limit: Option<u32>) -> Res<MoodReport> {
    let session = cli::Session::open(settings)?;
    let mut pipeline = session.pipeline(settings);
    if let Some(limit) = limit {
        pipeline = pipeline.with_limit(limit);
    }

    // One clock reading for both the trend buckets and their labels.
    let now = Local::now().fixed_offset();
    let history = pipeline.analyze_history_at(now).await?;
    let profile = session.profile().await;

    Ok(MoodReport::new(history.analysis, now.date_naive())
        .with_plays(history.plays)
        .with_profile(profile))
}
