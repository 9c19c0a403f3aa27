use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::algebra;
use crate::models::{
    ClubHealth, DashboardSummary, Dataset, EngagementBucket, EngagementStats, Page, Student,
};

pub const DEFAULT_AT_RISK_THRESHOLD: f64 = 30.0;
pub const GROWTH_WINDOW_DAYS: i64 = 30;
const FULL_CLUB_SIZE: f64 = 20.0;

pub fn club_health(data: &Dataset, club_id: &str) -> ClubHealth {
    let members = algebra::club_members(data, club_id);
    let engagement = mean_engagement(&members);

    ClubHealth {
        member_count: members.len(),
        engagement,
        health: health_score(members.len(), engagement),
    }
}

pub fn health_score(member_count: usize, engagement: f64) -> f64 {
    let size = member_count as f64 / FULL_CLUB_SIZE * 40.0;
    let activity = engagement / 100.0 * 60.0;
    (size + activity).min(100.0)
}

fn mean_engagement(students: &[Student]) -> f64 {
    if students.is_empty() {
        0.0
    } else {
        students.iter().map(|s| s.engagement).sum::<f64>() / students.len() as f64
    }
}

fn membership_counts(data: &Dataset) -> HashMap<&str, usize> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for membership in &data.memberships {
        *counts.entry(membership.student_id.as_str()).or_insert(0) += 1;
    }
    counts
}

pub fn at_risk_students(data: &Dataset, threshold: f64) -> Vec<Student> {
    let counts = membership_counts(data);

    data.students
        .iter()
        .filter(|s| !counts.contains_key(s.id.as_str()) || s.engagement < threshold)
        .cloned()
        .collect()
}

pub fn engagement_stats(data: &Dataset) -> EngagementStats {
    let mut stats = EngagementStats {
        total: data.students.len(),
        high: 0,
        medium: 0,
        low: 0,
        average: mean_engagement(&data.students),
    };

    for student in &data.students {
        match EngagementBucket::of(student.engagement) {
            EngagementBucket::High => stats.high += 1,
            EngagementBucket::Medium => stats.medium += 1,
            EngagementBucket::Low => stats.low += 1,
        }
    }

    stats
}

pub fn club_growth_trend(data: &Dataset, now: DateTime<Utc>) -> BTreeMap<NaiveDate, usize> {
    let cutoff = growth_cutoff(now);
    let mut trend = BTreeMap::new();

    for membership in &data.memberships {
        if membership.join_date < cutoff {
            continue;
        }
        *trend.entry(membership.join_date.date_naive()).or_insert(0) += 1;
    }

    trend
}

pub fn growth_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(GROWTH_WINDOW_DAYS)
}

pub fn dashboard_summary(data: &Dataset) -> DashboardSummary {
    let counts = membership_counts(data);
    let club_count = |s: &Student| counts.get(s.id.as_str()).copied().unwrap_or(0);
    let participating = data.students.iter().filter(|s| club_count(s) > 0).count();
    let participation_rate = if data.students.is_empty() {
        0
    } else {
        (participating as f64 / data.students.len() as f64 * 100.0).round() as u32
    };

    DashboardSummary {
        total_students: data.students.len(),
        total_clubs: data.clubs.len(),
        multi_club_members: data.students.iter().filter(|s| club_count(s) > 1).count(),
        participation_rate,
    }
}

pub fn paginated_students(data: &Dataset, page: usize, page_size: usize) -> Page<Student> {
    let page = page.max(1);
    let total = data.students.len();
    let total_pages = if page_size == 0 {
        0
    } else {
        total.div_ceil(page_size)
    };
    let start = (page - 1).saturating_mul(page_size).min(total);
    let end = start.saturating_add(page_size).min(total);

    Page {
        data: data.students[start..end].to_vec(),
        total,
        page,
        page_size,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::fixtures::*;
    use crate::models::ClubCategory;
    use chrono::TimeZone;

    fn club_of(size: usize, engagement: f64) -> Dataset {
        let mut data = Dataset {
            clubs: vec![club("c1", ClubCategory::Arts)],
            ..Dataset::default()
        };
        for i in 0..size {
            let id = format!("s{}", i + 1);
            data.students.push(student(&id, engagement));
            data.memberships.push(membership(&id, "c1", 0));
        }
        data
    }

    #[test]
    fn health_weights_size_and_engagement() {
        let health = club_health(&club_of(10, 75.0), "c1");
        assert_eq!(health.member_count, 10);
        assert!((health.engagement - 75.0).abs() < 1e-9);
        assert!((health.health - 65.0).abs() < 1e-9);
    }

    #[test]
    fn health_is_capped_at_one_hundred() {
        let health = club_health(&club_of(40, 100.0), "c1");
        assert_eq!(health.health, 100.0);
    }

    #[test]
    fn empty_club_health_is_zero() {
        let health = club_health(&Dataset::default(), "c1");
        assert_eq!(health.member_count, 0);
        assert_eq!(health.engagement, 0.0);
        assert_eq!(health.health, 0.0);
    }

    #[test]
    fn at_risk_unions_both_conditions() {
        let data = two_clubs();
        let ids: Vec<String> = at_risk_students(&data, DEFAULT_AT_RISK_THRESHOLD)
            .into_iter()
            .map(|s| s.id)
            .collect();
        // s3 is disengaged, s5 is in no club.
        assert_eq!(ids, ["s3", "s5"]);
    }

    #[test]
    fn dangling_membership_still_counts_as_affiliation() {
        let mut data = two_clubs();
        data.memberships.push(membership("s5", "ghost", 3));

        let at_risk: Vec<String> = at_risk_students(&data, DEFAULT_AT_RISK_THRESHOLD)
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(at_risk, ["s3"]);
        assert!(algebra::complement(&data, &[]).is_empty());
        assert_eq!(dashboard_summary(&data).participation_rate, 100);
    }

    #[test]
    fn engagement_buckets_follow_boundaries() {
        let mut data = Dataset::default();
        for (id, value) in [("a", 70.0), ("b", 70.5), ("c", 40.0), ("d", 39.9)] {
            data.students.push(student(id, value));
        }
        let stats = engagement_stats(&data);
        assert_eq!((stats.total, stats.high, stats.medium, stats.low), (4, 1, 2, 1));
        assert!((stats.average - 55.1).abs() < 1e-9);
    }

    #[test]
    fn empty_population_average_is_zero() {
        let stats = engagement_stats(&Dataset::default());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.average, 0.0);
    }

    #[test]
    fn growth_trend_buckets_recent_joins_by_day() {
        let data = two_clubs();
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let mut aged = data.clone();
        aged.memberships.push(membership("s5", "A", 45));

        let trend = club_growth_trend(&aged, now);
        assert_eq!(trend.values().sum::<usize>(), 6);
        let day = NaiveDate::from_ymd_opt(2026, 2, 28).unwrap();
        assert_eq!(trend.get(&day), Some(&1));
    }

    #[test]
    fn dashboard_counts_participation() {
        let summary = dashboard_summary(&two_clubs());
        assert_eq!(summary.total_students, 5);
        assert_eq!(summary.total_clubs, 2);
        assert_eq!(summary.multi_club_members, 2);
        assert_eq!(summary.participation_rate, 80);
    }

    #[test]
    fn pagination_clamps_to_population() {
        let data = two_clubs();
        let page = paginated_students(&data, 2, 2);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[0].id, "s3");

        let past_end = paginated_students(&data, 9, 2);
        assert!(past_end.data.is_empty());

        let zero = paginated_students(&data, 0, 2);
        assert_eq!(zero.page, 1);
    }
}
