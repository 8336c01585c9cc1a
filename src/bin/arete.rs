use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "arete", about = "Arête performance analytics CLI")]
struct Cli {
    /// User whose projects and tasks are analyzed
    #[arg(long, env = "ARETE_USER_ID")]
    user: String,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full metrics → analysis pipeline and record it
    Analyze {
        /// Period: weekly or monthly
        #[arg(long, default_value = "weekly")]
        period: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List recent analytics runs
    History {
        /// Maximum runs to show (default 10)
        #[arg(long)]
        limit: Option<u32>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compute metrics for the current window without recording a run
    Metrics {
        /// Period: weekly or monthly
        #[arg(long, default_value = "weekly")]
        period: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the pipeline and export xlsx + PDF reports
    Report {
        /// Period: weekly or monthly
        #[arg(long, default_value = "weekly")]
        period: String,
        /// Output directory for the report files
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// List the user's projects
    Projects {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the user's tasks
    Tasks {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set a task's progress percentage (optimistic, reverts on failure)
    Progress {
        /// Task id
        task_id: String,
        /// New progress percentage (0-100)
        percent: u8,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = arete::Config::from_env()?;
    let arete = arete::Arete::from_config(&config);
    let user = cli.user;

    match cli.command {
        Commands::Analyze { period, json } => {
            let period = arete::Period::parse(&period)?;
            handle_analyze(&arete, &user, period, json).await?;
        }
        Commands::History { limit, json } => {
            handle_history(&arete, &user, limit, json).await?;
        }
        Commands::Metrics { period, json } => {
            let period = arete::Period::parse(&period)?;
            handle_metrics(&arete, &user, period, json).await?;
        }
        Commands::Report { period, out } => {
            let period = arete::Period::parse(&period)?;
            handle_report(&arete, &user, period, &out).await?;
        }
        Commands::Projects { json } => {
            handle_projects(&arete, &user, json).await?;
        }
        Commands::Tasks { json } => {
            handle_tasks(&arete, &user, json).await?;
        }
        Commands::Progress { task_id, percent } => {
            handle_progress(&arete, &user, &task_id, percent).await?;
        }
    }

    Ok(())
}

async fn handle_analyze(
    arete: &arete::Arete,
    user: &str,
    period: arete::Period,
    json: bool,
) -> anyhow::Result<()> {
    let outcome = arete.analyze(user, period, Utc::now()).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.run)?);
    } else {
        println!(
            "Run {} completed: {} {} to {}",
            outcome.run.id, period, outcome.run.start_date, outcome.run.end_date
        );
        println!("Score: {}/100", outcome.analysis.score);
        println!();
        print_analysis(&outcome.analysis);
    }
    Ok(())
}

async fn handle_history(
    arete: &arete::Arete,
    user: &str,
    limit: Option<u32>,
    json: bool,
) -> anyhow::Result<()> {
    let runs = arete.history(user, limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&runs)?);
    } else if runs.is_empty() {
        println!("No runs recorded.");
    } else {
        for run in &runs {
            let score = run
                .score
                .map(|s| format!("{s}/100"))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{} [{}] {} {} to {} | score: {score} | model: {}",
                run.created_at.format("%Y-%m-%d %H:%M"),
                run.status.as_str(),
                run.period,
                run.start_date,
                run.end_date,
                run.model
            );
        }
    }
    Ok(())
}

async fn handle_metrics(
    arete: &arete::Arete,
    user: &str,
    period: arete::Period,
    json: bool,
) -> anyhow::Result<()> {
    let metrics = arete.performance_metrics(user, period, Utc::now()).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
    } else {
        println!(
            "Performance Metrics: {} ({} to {})",
            metrics.period, metrics.date_range.start, metrics.date_range.end
        );
        print_aggregates(&metrics.aggregates);
        print_trends(&metrics.trends);
        if !metrics.highlights.is_empty() {
            println!("  Highlights:");
            for highlight in &metrics.highlights {
                println!("    - {highlight}");
            }
        }
    }
    Ok(())
}

async fn handle_report(
    arete: &arete::Arete,
    user: &str,
    period: arete::Period,
    out: &std::path::Path,
) -> anyhow::Result<()> {
    let outcome = arete.analyze_and_export(user, period, out, Utc::now()).await?;

    println!("Run {} completed with score {}/100", outcome.run.id, outcome.analysis.score);
    if let Some(ref excel) = outcome.run.excel_url {
        println!("  Workbook: {excel}");
    }
    if let Some(ref pdf) = outcome.run.pdf_url {
        println!("  PDF:      {pdf}");
    }
    Ok(())
}

async fn handle_projects(arete: &arete::Arete, user: &str, json: bool) -> anyhow::Result<()> {
    let projects = arete.store().projects(user).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
    } else if projects.is_empty() {
        println!("No projects found.");
    } else {
        let now = Utc::now();
        for project in &projects {
            let deadline = match project.deadline {
                Some(d) => match arete::date_util::days_until(d, now) {
                    late if late < 0 => format!("{d} ({} days overdue)", -late),
                    left => format!("{d} ({left} days left)"),
                },
                None => "no deadline".to_string(),
            };
            println!(
                "[{}] {} ({}) {}% | {deadline}",
                project.status.as_str(),
                project.title,
                project.priority.as_str(),
                project.progress_percent
            );
        }
        let percentages: Vec<u8> = projects.iter().map(|p| p.progress_percent).collect();
        println!(
            "\n{} projects, portfolio progress {}%",
            projects.len(),
            arete::metrics::mean_progress(&percentages)
        );
    }
    Ok(())
}

async fn handle_tasks(arete: &arete::Arete, user: &str, json: bool) -> anyhow::Result<()> {
    let tasks = arete.store().tasks(user).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
    } else if tasks.is_empty() {
        println!("No tasks found.");
    } else {
        let now = Utc::now();
        for task in &tasks {
            let due = task
                .due_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "no due date".to_string());
            let overdue = if task.is_overdue(now) { " (overdue)" } else { "" };
            println!(
                "[{}] {} ({}) {}% | due: {due}{overdue}",
                task.status.as_str(),
                task.title,
                task.priority.as_str(),
                task.progress_percent
            );
        }
        println!("\n{} tasks", tasks.len());
    }
    Ok(())
}

async fn handle_progress(
    arete: &arete::Arete,
    user: &str,
    task_id: &str,
    percent: u8,
) -> anyhow::Result<()> {
    let tasks = arete.store().tasks(user).await?;
    let task = tasks
        .iter()
        .find(|t| t.id == task_id)
        .ok_or_else(|| anyhow::anyhow!("No task {task_id} for this user"))?;

    let mut tracker = arete::ProgressTracker::new(&task.id, task.progress_percent);
    match tracker.propose(arete.store(), percent).await {
        Ok(value) => {
            println!("Progress confirmed at {value}%");
            Ok(())
        }
        Err(e) => {
            println!("Update failed, reverted to {}%", tracker.value());
            Err(e.into())
        }
    }
}

fn print_analysis(analysis: &arete::AnalysisResult) {
    println!("{}", analysis.narrative);
    if !analysis.bullets.is_empty() {
        println!("\nKey points:");
        for bullet in &analysis.bullets {
            println!("  - {bullet}");
        }
    }
    if !analysis.actions.is_empty() {
        println!("\nRecommended actions:");
        for (i, action) in analysis.actions.iter().enumerate() {
            println!("  {}. {} (impact: {}, effort: {})", i + 1, action.title, action.impact, action.effort);
            println!("     Target: {}", action.metric);
        }
    }
}

fn print_aggregates(a: &arete::metrics::Aggregates) {
    println!("  Throughput:");
    println!("    Created:    {}", a.tasks_created);
    println!("    Completed:  {}", a.tasks_completed);
    println!("    Completion: {}%", a.completion_rate);
    println!("  Delivery:");
    println!("    On-time:    {}%", a.on_time_rate);
    println!("    Overdue:    {} ({} avg delay days)", a.overdue_count, a.avg_overdue_days);
    println!("    Avg cycle:  {} days", a.avg_cycle_days);
    println!("  Capacity:");
    println!("    WIP:        {}", a.wip_avg);
    println!("  Estimates:");
    println!("    Accuracy:   {}%", a.estimate_accuracy);
}

fn print_trends(t: &arete::metrics::Trends) {
    println!("  Trends:");
    println!("    Blocked time:   {} hrs", t.blocked_time);
    println!("    Dependency lag: {} days", t.dependency_lag);
    if !t.throughput_by_priority.is_empty() {
        let by_priority: Vec<String> = t
            .throughput_by_priority
            .iter()
            .map(|(priority, count)| format!("{priority}: {count}"))
            .collect();
        println!("    Throughput by priority: {}", by_priority.join(", "));
    }
    if !t.focus_by_tag.is_empty() {
        let by_tag: Vec<String> = t
            .focus_by_tag
            .iter()
            .map(|(tag, count)| format!("{tag}: {count}"))
            .collect();
        println!("    Focus by tag: {}", by_tag.join(", "));
    }
}
