//! Report Rendering
//!
//! Turns a merged `InsightsReport` into a human-readable Markdown
//! document. Rendering is purely presentational; every number here was
//! computed by the analyzers and is reproduced without rounding beyond
//! display precision.

use std::fmt::Write as _;

use crate::analytics::{IndividualReport, InsightsReport, MeetingInsights, Recommendation};
use crate::config::Priority;
use crate::types::error::{OrgLensError, Result};

const SIZE_LABELS: [&str; 3] = ["Small (1-2)", "Medium (3-5)", "Large (6+)"];
const DURATION_LABELS: [&str; 3] = ["Short (≤30m)", "Medium (31-60m)", "Long (>60m)"];
const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Render the full organizational report as Markdown.
pub fn render_markdown(report: &InsightsReport) -> Result<String> {
    let mut out = String::new();
    let w = &mut out;

    title(w, &format!("Meeting Analytics — {}", report.summary.company_name))?;
    summary_section(w, report)?;
    recommendations_section(w, &report.recommendations)?;
    meeting_section(w, report)?;
    manager_section(w, report)?;
    cross_functional_section(w, report)?;
    text_section(w, report)?;

    Ok(out)
}

/// Render the per-person report as Markdown.
pub fn render_individual(report: &IndividualReport) -> Result<String> {
    let mut out = String::new();
    let w = &mut out;

    title(w, &format!("Meeting Report — {} <{}>", report.name, report.email))?;
    line(w, &format!("- Function: {} ({})", report.function, report.level))?;
    line(w, &format!("- Meetings: {}", report.meeting_count))?;
    line(w, &format!("- Total hours: {:.1}", report.total_hours))?;
    line(
        w,
        &format!("- Average hours per meeting day: {:.1}", report.avg_daily_hours),
    )?;
    line(w, &format!("- Organized: {}", report.organized_count))?;
    line(w, &format!("- 1:1s: {}", report.one_on_one_count))?;
    line(w, &format!("- External meetings: {}", report.external_meetings))?;
    line(
        w,
        &format!(
            "- Fragmentation score: {:.2}",
            report.fragmentation_score
        ),
    )?;
    if !report.top_collaborators.is_empty() {
        heading(w, "Top Collaborators")?;
        for collaborator in &report.top_collaborators {
            line(
                w,
                &format!(
                    "- {} ({} shared meetings)",
                    collaborator.email, collaborator.shared_meetings
                ),
            )?;
        }
    }
    matrix_table(w, &report.meeting)?;
    type_mix_section(w, &report.meeting)?;
    timing_section(w, &report.meeting)?;
    if !report.text.topics.is_empty() {
        heading(w, "Topics")?;
        let parts: Vec<String> = report
            .text
            .topics
            .iter()
            .map(|(topic, count)| format!("{topic}: {count}"))
            .collect();
        line(w, &format!("- {}", parts.join(", ")))?;
    }
    Ok(out)
}

// =============================================================================
// Sections
// =============================================================================

fn summary_section(w: &mut String, report: &InsightsReport) -> Result<()> {
    heading(w, "Summary")?;
    let s = &report.summary;
    line(w, &format!("- Employees: {}", s.employee_count))?;
    line(w, &format!("- Events analyzed: {}", s.analyzed_events))?;
    if let Some((start, end)) = &s.date_range {
        line(
            w,
            &format!(
                "- Date range: {} to {}",
                start.format("%Y-%m-%d"),
                end.format("%Y-%m-%d")
            ),
        )?;
    }
    if !s.skipped_events.is_empty() {
        let parts: Vec<String> = s
            .skipped_events
            .iter()
            .map(|(reason, count)| format!("{reason}: {count}"))
            .collect();
        line(w, &format!("- Events skipped: {}", parts.join(", ")))?;
    }
    line(
        w,
        &format!(
            "- Total person-hours in meetings: {:.1}",
            report.meeting.total_person_hours
        ),
    )?;
    Ok(())
}

fn recommendations_section(w: &mut String, recommendations: &[Recommendation]) -> Result<()> {
    if recommendations.is_empty() {
        return Ok(());
    }
    heading(w, "Recommendations")?;
    for priority in [Priority::High, Priority::Medium, Priority::Positive] {
        for rec in recommendations.iter().filter(|r| r.priority == priority) {
            let badge = match priority {
                Priority::High => "HIGH",
                Priority::Medium => "MEDIUM",
                Priority::Positive => "POSITIVE",
            };
            line(w, &format!("- **[{badge}] {}** — {}", rec.issue, rec.advice))?;
        }
    }
    Ok(())
}

fn meeting_section(w: &mut String, report: &InsightsReport) -> Result<()> {
    let m = &report.meeting;
    heading(w, "Meeting Patterns")?;
    line(w, &format!("- Total meetings: {}", m.total_meetings))?;
    line(
        w,
        &format!("- Average duration: {:.0} minutes", m.avg_duration_minutes),
    )?;
    line(
        w,
        &format!(
            "- Average daily meeting load: {:.1} hours",
            m.avg_daily_meeting_hours
        ),
    )?;
    line(
        w,
        &format!(
            "- Recurring share: {} | default-length share: {}",
            pct(m.recurrence.recurring_share),
            pct(m.default_duration_share)
        ),
    )?;

    matrix_table(w, m)?;
    type_mix_section(w, m)?;

    heading(w, "Responses")?;
    line(
        w,
        &format!(
            "- Response rate: {} | acceptance rate: {}",
            pct(m.responses.response_rate),
            pct(m.responses.acceptance_rate)
        ),
    )?;

    heading(w, "Estimated Cost")?;
    line(w, &format!("- Total: ${:.0}", m.cost.total_cost))?;
    line(
        w,
        &format!("- Average per meeting: ${:.0}", m.cost.avg_cost_per_meeting),
    )?;
    for meeting in &m.cost.most_expensive {
        line(
            w,
            &format!(
                "- \"{}\": ${:.0} ({} attendees, {} min)",
                meeting.subject, meeting.cost, meeting.attendees, meeting.duration_minutes
            ),
        )?;
    }

    timing_section(w, m)?;

    heading(w, "Fragmentation")?;
    line(
        w,
        &format!("- Average score: {:.2}", m.fragmentation.avg_score),
    )?;
    line(
        w,
        &format!(
            "- Back-to-back meetings: {} ({} chains of 3+, longest {})",
            m.fragmentation.back_to_back_count,
            m.fragmentation.chain_count,
            m.fragmentation.longest_chain
        ),
    )?;
    Ok(())
}

fn matrix_table(w: &mut String, m: &MeetingInsights) -> Result<()> {
    heading(w, "Size × Duration Matrix (count / person-hours)")?;
    line(
        w,
        &format!(
            "| | {} | {} | {} |",
            DURATION_LABELS[0], DURATION_LABELS[1], DURATION_LABELS[2]
        ),
    )?;
    line(w, "|---|---|---|---|")?;
    for (row, label) in SIZE_LABELS.iter().enumerate() {
        let cells: Vec<String> = (0..3)
            .map(|col| {
                let cell = m.matrix.cells[row][col];
                format!("{} / {:.1}", cell.count, cell.person_hours)
            })
            .collect();
        line(w, &format!("| **{label}** | {} |", cells.join(" | ")))?;
    }
    Ok(())
}

fn type_mix_section(w: &mut String, m: &MeetingInsights) -> Result<()> {
    heading(w, "Meeting Types")?;
    line(w, &format!("- 1:1s: {}", m.type_mix.one_on_one))?;
    line(w, &format!("- Small team: {}", m.type_mix.small_team))?;
    line(w, &format!("- Large team: {}", m.type_mix.large_team))?;
    line(w, &format!("- All-hands: {}", m.type_mix.all_hands))?;
    Ok(())
}

fn timing_section(w: &mut String, m: &MeetingInsights) -> Result<()> {
    heading(w, "Timing")?;
    let busiest = m
        .timing
        .by_weekday
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(&a.0)));
    if let Some((day, count)) = busiest {
        line(w, &format!("- Busiest weekday: {} ({count})", WEEKDAYS[day]))?;
    }
    line(
        w,
        &format!(
            "- Early morning: {} | after hours: {} | over lunch: {}",
            m.timing.early_morning, m.timing.after_hours, m.timing.lunchtime
        ),
    )?;
    Ok(())
}

fn manager_section(w: &mut String, report: &InsightsReport) -> Result<()> {
    let m = &report.manager;
    if m.managers.is_empty() {
        return Ok(());
    }
    heading(w, "Manager 1:1s")?;
    line(w, &format!("- Total 1:1s: {}", m.total_one_on_ones))?;
    if m.avg_cadence_days > 0.0 {
        line(
            w,
            &format!("- Average cadence: {:.1} days", m.avg_cadence_days),
        )?;
    }
    for manager in &m.managers {
        line(
            w,
            &format!(
                "- **{}** ({} reports, {:.1}h skip-level)",
                manager.name, manager.direct_report_count, manager.skip_level_hours
            ),
        )?;
        let alloc = &manager.allocation;
        line(
            w,
            &format!(
                "  - {:.1}h total: {:.1}h 1:1, {:.1}h team, {:.1}h external, {:.1}h cross-functional",
                alloc.total_hours,
                alloc.one_on_one_hours,
                alloc.team_meeting_hours,
                alloc.external_hours,
                alloc.cross_functional_hours
            ),
        )?;
        for pair in &manager.pairs {
            let cadence = pair
                .avg_cadence_days
                .map(|d| format!("every {d:.1} days"))
                .unwrap_or_else(|| "no cadence".to_string());
            line(
                w,
                &format!(
                    "  - {}: {} 1:1s ({cadence}), monitoring {:.1}/10",
                    pair.report, pair.one_on_one_count, pair.monitoring.score
                ),
            )?;
        }
    }
    if !m.at_risk.is_empty() {
        heading(w, "At-Risk Relationships")?;
        for pair in &m.at_risk {
            line(
                w,
                &format!("- {} → {}: {}", pair.manager, pair.report, pair.detail),
            )?;
        }
    }
    Ok(())
}

fn cross_functional_section(w: &mut String, report: &InsightsReport) -> Result<()> {
    let c = &report.cross_functional;
    heading(w, "Cross-Functional Collaboration")?;
    if let Some(health) = &c.health {
        line(
            w,
            &format!(
                "- Health score: {:.0}/100 (density {}, recency {})",
                health.score,
                pct(health.density),
                pct(health.recency)
            ),
        )?;
    }
    line(
        w,
        &format!("- Cross-functional meetings: {}", c.cross_functional_meetings),
    )?;
    for edge in &c.edges {
        line(
            w,
            &format!(
                "- {} ↔ {}: {} meetings, {:.1}h shared (weight {:.2})",
                edge.a, edge.b, edge.meetings, edge.shared_hours, edge.weight
            ),
        )?;
    }
    if !c.silos.is_empty() {
        heading(w, "Potential Silos")?;
        for silo in &c.silos {
            line(
                w,
                &format!("- {} ({} members): {}", silo.function, silo.members, silo.detail),
            )?;
            if !silo.top_internal_collaborators.is_empty() {
                let parts: Vec<String> = silo
                    .top_internal_collaborators
                    .iter()
                    .map(|c| format!("{} ({:.1}h)", c.email, c.hours))
                    .collect();
                line(w, &format!("  - Meets internally with: {}", parts.join(", ")))?;
            }
        }
    }
    if !c.spanners.is_empty() {
        heading(w, "Boundary Spanners")?;
        for spanner in &c.spanners {
            line(
                w,
                &format!(
                    "- {} ({}): bridges {} functions, score {:.1}",
                    spanner.email, spanner.function, spanner.reach, spanner.score
                ),
            )?;
        }
    }
    Ok(())
}

fn text_section(w: &mut String, report: &InsightsReport) -> Result<()> {
    let t = &report.text;
    if t.topics.is_empty() && t.keywords.is_empty() {
        return Ok(());
    }
    heading(w, "Meeting Content")?;
    if !t.topics.is_empty() {
        let parts: Vec<String> = t
            .topics
            .iter()
            .map(|(topic, count)| format!("{topic}: {count}"))
            .collect();
        line(w, &format!("- Topics: {}", parts.join(", ")))?;
    }
    if !t.keywords.is_empty() {
        let words: Vec<String> = t
            .keywords
            .iter()
            .take(10)
            .map(|k| format!("{} ({})", k.word, k.count))
            .collect();
        line(w, &format!("- Top keywords: {}", words.join(", ")))?;
    }
    line(
        w,
        &format!(
            "- Vague titles: {} ({})",
            t.naming.vague_count,
            pct(t.naming.vague_share)
        ),
    )?;
    for series in &t.naming.inconsistent_series {
        line(
            w,
            &format!(
                "- Inconsistent series {}: {}",
                series.series_id,
                series.variants.join(" / ")
            ),
        )?;
    }
    line(
        w,
        &format!(
            "- Sentiment: {} positive, {} urgent, {} neutral",
            t.sentiment.positive, t.sentiment.urgent_negative, t.sentiment.neutral
        ),
    )?;
    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

fn title(w: &mut String, text: &str) -> Result<()> {
    writeln!(w, "# {text}\n").map_err(fmt_err)
}

fn heading(w: &mut String, text: &str) -> Result<()> {
    writeln!(w, "\n## {text}\n").map_err(fmt_err)
}

fn line(w: &mut String, text: &str) -> Result<()> {
    writeln!(w, "{text}").map_err(fmt_err)
}

fn pct(value: f64) -> String {
    format!("{:.0}%", value * 100.0)
}

fn fmt_err(e: std::fmt::Error) -> OrgLensError {
    OrgLensError::Report(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::InsightsEngine;
    use crate::types::event::tests::{event_at, test_org};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_render_full_report() {
        let engine =
            InsightsEngine::new(Arc::new(test_org()), crate::config::AnalyticsConfig::default())
                .unwrap();
        let events = vec![
            event_at("e1", "a@acme.com", &["b@acme.com"], 9, 30),
            event_at("e2", "a@acme.com", &["b@acme.com", "c@acme.com"], 11, 60),
        ];
        let report = engine.analyze(events).await.unwrap();
        let markdown = render_markdown(&report).unwrap();

        assert!(markdown.starts_with("# Meeting Analytics — Acme"));
        assert!(markdown.contains("## Summary"));
        assert!(markdown.contains("Size × Duration Matrix"));
        assert!(markdown.contains("- Total meetings: 2"));
    }

    #[tokio::test]
    async fn test_render_individual() {
        let engine =
            InsightsEngine::new(Arc::new(test_org()), crate::config::AnalyticsConfig::default())
                .unwrap();
        let events = vec![event_at("e1", "a@acme.com", &["b@acme.com"], 9, 30)];
        let report = engine.analyze_individual("a@acme.com", events).await.unwrap();
        let markdown = render_individual(&report).unwrap();
        assert!(markdown.contains("a@acme.com"));
        assert!(markdown.contains("- Meetings: 1"));
        assert!(markdown.contains("Size × Duration Matrix"));
        assert!(markdown.contains("## Meeting Types"));
        assert!(markdown.contains("## Timing"));
    }
}
