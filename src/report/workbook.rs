//! xlsx rendering. Five sheets: Overview, Projects, Tasks, Trends,
//! Recommendations. Values land as plain cells (strings and numbers);
//! the only styling is column widths.

use rust_xlsxwriter::{Workbook, Worksheet};

use crate::analysis::{AnalysisResult, RecommendedAction};
use crate::error::Result;
use crate::metrics::{PerformanceMetrics, Trends};
use crate::store::{Project, Task};

/// Render the workbook to xlsx bytes.
pub fn render(
    analysis: &AnalysisResult,
    metrics: &PerformanceMetrics,
    projects: &[Project],
    tasks: &[Task],
) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    overview_sheet(workbook.add_worksheet(), analysis, metrics)?;
    projects_sheet(workbook.add_worksheet(), projects)?;
    tasks_sheet(workbook.add_worksheet(), tasks)?;
    trends_sheet(workbook.add_worksheet(), &metrics.trends)?;
    recommendations_sheet(workbook.add_worksheet(), &analysis.actions)?;
    Ok(workbook.save_to_buffer()?)
}

fn overview_sheet(
    sheet: &mut Worksheet,
    analysis: &AnalysisResult,
    metrics: &PerformanceMetrics,
) -> Result<()> {
    sheet.set_name("Overview")?;
    sheet.set_column_width(0, 20)?;
    sheet.set_column_width(1, 40)?;

    sheet.write_string(0, 0, "Arête Performance Report")?;
    sheet.write_string(1, 0, format!("Period: {}", metrics.period))?;
    sheet.write_string(
        2,
        0,
        format!(
            "Date Range: {} to {}",
            metrics.date_range.start, metrics.date_range.end
        ),
    )?;

    sheet.write_string(4, 0, "Key Performance Indicators")?;
    sheet.write_string(5, 0, "Metric")?;
    sheet.write_string(5, 1, "Value")?;

    let a = &metrics.aggregates;
    sheet.write_string(6, 0, "Overall Score")?;
    sheet.write_string(6, 1, format!("{}/100", analysis.score))?;
    sheet.write_string(7, 0, "Tasks Created")?;
    sheet.write_number(7, 1, a.tasks_created as f64)?;
    sheet.write_string(8, 0, "Tasks Completed")?;
    sheet.write_number(8, 1, a.tasks_completed as f64)?;
    sheet.write_string(9, 0, "Completion Rate")?;
    sheet.write_string(9, 1, format!("{}%", a.completion_rate))?;
    sheet.write_string(10, 0, "On-Time Rate")?;
    sheet.write_string(10, 1, format!("{}%", a.on_time_rate))?;
    sheet.write_string(11, 0, "Overdue Count")?;
    sheet.write_number(11, 1, a.overdue_count as f64)?;
    sheet.write_string(12, 0, "Average Cycle Days")?;
    sheet.write_number(12, 1, a.avg_cycle_days as f64)?;
    sheet.write_string(13, 0, "Estimate Accuracy")?;
    sheet.write_string(13, 1, format!("{}%", a.estimate_accuracy))?;

    sheet.write_string(15, 0, "Analysis Summary")?;
    sheet.write_string(16, 0, "Narrative")?;
    sheet.write_string(16, 1, &analysis.narrative)?;

    sheet.write_string(18, 0, "Key Points")?;
    for (i, bullet) in analysis.bullets.iter().enumerate() {
        sheet.write_string(19 + i as u32, 1, bullet)?;
    }
    Ok(())
}

fn projects_sheet(sheet: &mut Worksheet, projects: &[Project]) -> Result<()> {
    sheet.set_name("Projects")?;
    for (col, width) in [25, 15, 10, 10, 15, 30].into_iter().enumerate() {
        sheet.set_column_width(col as u16, width)?;
    }

    sheet.write_string(0, 0, "Projects Overview")?;
    for (col, header) in ["Title", "Status", "Priority", "Progress", "Deadline", "Tags"]
        .into_iter()
        .enumerate()
    {
        sheet.write_string(2, col as u16, header)?;
    }

    for (i, project) in projects.iter().enumerate() {
        let row = 3 + i as u32;
        sheet.write_string(row, 0, &project.title)?;
        sheet.write_string(row, 1, project.status.as_str())?;
        sheet.write_string(row, 2, project.priority.as_str())?;
        sheet.write_string(row, 3, format!("{}%", project.progress_percent))?;
        let deadline = project
            .deadline
            .map(|d| d.to_string())
            .unwrap_or_else(|| "Not set".to_string());
        sheet.write_string(row, 4, deadline)?;
        sheet.write_string(row, 5, project.tags.join(", "))?;
    }
    Ok(())
}

fn tasks_sheet(sheet: &mut Worksheet, tasks: &[Task]) -> Result<()> {
    sheet.set_name("Tasks")?;
    for (col, width) in [30, 15, 10, 10, 15, 12, 12].into_iter().enumerate() {
        sheet.set_column_width(col as u16, width)?;
    }

    sheet.write_string(0, 0, "Tasks Overview")?;
    let headers = [
        "Title",
        "Status",
        "Priority",
        "Progress",
        "Due Date",
        "Estimate (hrs)",
        "Actual (hrs)",
    ];
    for (col, header) in headers.into_iter().enumerate() {
        sheet.write_string(2, col as u16, header)?;
    }

    for (i, task) in tasks.iter().enumerate() {
        let row = 3 + i as u32;
        sheet.write_string(row, 0, &task.title)?;
        sheet.write_string(row, 1, task.status.as_str())?;
        sheet.write_string(row, 2, task.priority.as_str())?;
        sheet.write_string(row, 3, format!("{}%", task.progress_percent))?;
        let due = task
            .due_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "Not set".to_string());
        sheet.write_string(row, 4, due)?;
        sheet.write_number(row, 5, task.estimate_hours.unwrap_or(0.0))?;
        sheet.write_number(row, 6, task.actual_hours.unwrap_or(0.0))?;
    }
    Ok(())
}

fn trends_sheet(sheet: &mut Worksheet, trends: &Trends) -> Result<()> {
    sheet.set_name("Trends")?;
    sheet.set_column_width(0, 20)?;
    sheet.set_column_width(1, 15)?;

    sheet.write_string(0, 0, "Performance Trends")?;

    let mut row = 2;
    sheet.write_string(row, 0, "Throughput by Priority")?;
    sheet.write_string(row + 1, 0, "Priority")?;
    sheet.write_string(row + 1, 1, "Tasks Completed")?;
    row += 2;
    for (priority, count) in &trends.throughput_by_priority {
        sheet.write_string(row, 0, priority)?;
        sheet.write_number(row, 1, *count as f64)?;
        row += 1;
    }

    row += 1;
    sheet.write_string(row, 0, "Focus by Tag")?;
    sheet.write_string(row + 1, 0, "Tag")?;
    sheet.write_string(row + 1, 1, "Project Count")?;
    row += 2;
    for (tag, count) in &trends.focus_by_tag {
        sheet.write_string(row, 0, tag)?;
        sheet.write_number(row, 1, *count as f64)?;
        row += 1;
    }

    row += 1;
    sheet.write_string(row, 0, "Progress Trend")?;
    sheet.write_string(row + 1, 0, "Date")?;
    sheet.write_string(row + 1, 1, "Progress %")?;
    row += 2;
    for point in &trends.progress_trend {
        sheet.write_string(row, 0, point.date.to_string())?;
        sheet.write_number(row, 1, f64::from(point.progress))?;
        row += 1;
    }
    Ok(())
}

fn recommendations_sheet(sheet: &mut Worksheet, actions: &[RecommendedAction]) -> Result<()> {
    sheet.set_name("Recommendations")?;
    for (col, width) in [40, 10, 10, 30].into_iter().enumerate() {
        sheet.set_column_width(col as u16, width)?;
    }

    sheet.write_string(0, 0, "Recommended Actions")?;
    for (col, header) in ["Title", "Impact", "Effort", "Target Metric"]
        .into_iter()
        .enumerate()
    {
        sheet.write_string(2, col as u16, header)?;
    }

    for (i, action) in actions.iter().enumerate() {
        let row = 3 + i as u32;
        sheet.write_string(row, 0, &action.title)?;
        sheet.write_string(row, 1, &action.impact)?;
        sheet.write_string(row, 2, &action.effort)?;
        sheet.write_string(row, 3, &action.metric)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fallback_analysis;
    use crate::metrics::{Aggregates, DateRange, PerformanceMetrics};
    use crate::period::Period;
    use chrono::NaiveDate;

    fn sample_metrics() -> PerformanceMetrics {
        PerformanceMetrics {
            period: Period::Weekly,
            date_range: DateRange {
                start: NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(),
                end: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
            },
            aggregates: Aggregates {
                tasks_created: 10,
                tasks_completed: 7,
                completion_rate: 70,
                on_time_rate: 80,
                estimate_accuracy: 85,
                ..Default::default()
            },
            trends: Trends {
                throughput_by_priority: [("high".to_string(), 4)].into(),
                focus_by_tag: [("backend".to_string(), 2)].into(),
                ..Default::default()
            },
            highlights: vec!["7 tasks completed".into()],
        }
    }

    #[test]
    fn test_render_produces_xlsx_bytes() {
        let metrics = sample_metrics();
        let analysis = fallback_analysis(&metrics);
        let bytes = render(&analysis, &metrics, &[], &[]).unwrap();
        // xlsx files are zip archives.
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_render_with_rows() {
        use crate::store::{Priority, Project, ProjectStatus, Task, TaskStatus};
        use chrono::Utc;

        let now = Utc::now();
        let project = Project {
            id: "p1".into(),
            user_id: "u1".into(),
            title: "Launch".into(),
            description: None,
            tags: vec!["backend".into(), "q2".into()],
            priority: Priority::High,
            status: ProjectStatus::Active,
            start_date: None,
            deadline: None,
            progress_percent: 40,
            created_at: now,
            updated_at: now,
        };
        let task = Task {
            id: "t1".into(),
            user_id: "u1".into(),
            project_id: "p1".into(),
            title: "Ship API".into(),
            checklist: serde_json::Value::Null,
            status: TaskStatus::InProgress,
            priority: Priority::Medium,
            estimate_hours: Some(8.0),
            actual_hours: None,
            start_date: None,
            due_date: NaiveDate::from_ymd_opt(2025, 3, 14),
            progress_percent: 60,
            blocking_tasks: vec![],
            assignees: vec![],
            created_at: now,
            updated_at: now,
        };

        let metrics = sample_metrics();
        let analysis = fallback_analysis(&metrics);
        let bytes = render(&analysis, &metrics, &[project], &[task]).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
