//! Prompt construction for the narrative analyzer. The instruction text
//! and the response schema are fixed; only the metrics block varies.

use crate::metrics::PerformanceMetrics;

pub const SYSTEM_PROMPT: &str = r#"You are a precise performance analyst. Use only supplied metrics; do not speculate. Quantify every claim. Return the specified JSON schema.

Analyze the provided performance metrics and return a structured analysis with:
1. A narrative summary (2-3 sentences)
2. Key bullet points (3-5 items)
3. A composite score (0-100) based on completion rate, on-time delivery, and estimate accuracy
4. 2-5 prioritized actions with impact, effort, and target metric
5. Chart configuration for visualization

Focus on actionable insights tied directly to the provided metrics."#;

/// Render the per-request prompt: labeled aggregates, serialized trend
/// maps, highlight lines, and the exact response schema.
pub fn user_prompt(metrics: &PerformanceMetrics) -> String {
    let a = &metrics.aggregates;
    let t = &metrics.trends;
    let throughput = serde_json::to_string(&t.throughput_by_priority).unwrap_or_default();
    let focus = serde_json::to_string(&t.focus_by_tag).unwrap_or_default();

    format!(
        r#"Analyze this {period} performance data:

**Metrics:**
- Tasks Created: {tasks_created}
- Tasks Completed: {tasks_completed}
- Completion Rate: {completion_rate}%
- On-Time Rate: {on_time_rate}%
- Overdue Count: {overdue_count}
- Average Overdue Days: {avg_overdue_days}
- Average Cycle Days: {avg_cycle_days}
- Work in Progress (Avg): {wip_avg}
- Estimate Accuracy: {estimate_accuracy}%

**Trends:**
- Throughput by Priority: {throughput}
- Focus by Tag: {focus}
- Blocked Time: {blocked_time} hours
- Dependency Lag: {dependency_lag} days

**Highlights:** {highlights}

Return valid JSON with this exact structure:
{{
  "narrative": "string",
  "bullets": ["string"],
  "score": number,
  "actions": [{{"title": "string", "impact": "string", "effort": "string", "metric": "string"}}],
  "charts": {{"type": "string", "data": {{}}}}
}}"#,
        period = metrics.period,
        tasks_created = a.tasks_created,
        tasks_completed = a.tasks_completed,
        completion_rate = a.completion_rate,
        on_time_rate = a.on_time_rate,
        overdue_count = a.overdue_count,
        avg_overdue_days = a.avg_overdue_days,
        avg_cycle_days = a.avg_cycle_days,
        wip_avg = a.wip_avg,
        estimate_accuracy = a.estimate_accuracy,
        blocked_time = t.blocked_time,
        dependency_lag = t.dependency_lag,
        highlights = metrics.highlights.join(", "),
    )
}
