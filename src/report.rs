use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::models::{ClubHealth, Dataset};
use crate::scoring;

pub fn rank_clubs(data: &Dataset) -> Vec<(String, ClubHealth)> {
    let mut ranked: Vec<(String, ClubHealth)> = data
        .clubs
        .iter()
        .map(|club| (club.name.clone(), scoring::club_health(data, &club.id)))
        .collect();

    ranked.sort_by(|a, b| {
        b.1.health
            .partial_cmp(&a.1.health)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked
}

pub fn build_report(data: &Dataset, threshold: f64, generated_at: DateTime<Utc>) -> String {
    let summary = scoring::dashboard_summary(data);
    let stats = scoring::engagement_stats(data);
    let clubs = rank_clubs(data);
    let at_risk = scoring::at_risk_students(data, threshold);
    let growth = scoring::club_growth_trend(data, generated_at);

    let mut output = String::new();

    let _ = writeln!(output, "# Campus Nexus Report");
    let _ = writeln!(output, "Generated {}", generated_at.format("%Y-%m-%d %H:%M UTC"));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Overview");
    let _ = writeln!(
        output,
        "- {} students, {} clubs",
        summary.total_students, summary.total_clubs
    );
    let _ = writeln!(
        output,
        "- {} students in more than one club",
        summary.multi_club_members
    );
    let _ = writeln!(output, "- {}% participation", summary.participation_rate);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Engagement Mix");
    if stats.total == 0 {
        let _ = writeln!(output, "No students recorded.");
    } else {
        let _ = writeln!(output, "- high: {}", stats.high);
        let _ = writeln!(output, "- medium: {}", stats.medium);
        let _ = writeln!(output, "- low: {}", stats.low);
        let _ = writeln!(output, "- average: {:.1}", stats.average);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Club Health");
    if clubs.is_empty() {
        let _ = writeln!(output, "No clubs recorded.");
    } else {
        for (name, health) in clubs.iter() {
            let _ = writeln!(
                output,
                "- {}: health {:.1} ({} members, avg engagement {:.1})",
                name, health.health, health.member_count, health.engagement
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## At-Risk Students (engagement below {threshold})");
    if at_risk.is_empty() {
        let _ = writeln!(output, "No students at risk.");
    } else {
        for student in at_risk.iter().take(10) {
            let _ = writeln!(
                output,
                "- {} ({}, {}) engagement {:.1}",
                student.name,
                student.email,
                student.year.as_str(),
                student.engagement
            );
        }
        if at_risk.len() > 10 {
            let _ = writeln!(output, "- ...and {} more", at_risk.len() - 10);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## New Memberships (last {} days)", scoring::GROWTH_WINDOW_DAYS);
    if growth.is_empty() {
        let _ = writeln!(output, "No new memberships in this window.");
    } else {
        for (day, count) in growth.iter() {
            let _ = writeln!(output, "- {day}: {count}");
        }
    }

    output
}
