use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassYear {
    Freshman,
    Sophomore,
    Junior,
    Senior,
}

impl ClassYear {
    pub const ALL: [ClassYear; 4] = [
        ClassYear::Freshman,
        ClassYear::Sophomore,
        ClassYear::Junior,
        ClassYear::Senior,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassYear::Freshman => "Freshman",
            ClassYear::Sophomore => "Sophomore",
            ClassYear::Junior => "Junior",
            ClassYear::Senior => "Senior",
        }
    }
}

impl std::str::FromStr for ClassYear {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ClassYear::ALL
            .into_iter()
            .find(|year| year.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| format!("unknown class year: {value}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    pub major: String,
    pub year: ClassYear,
    /// Expected in 0..=100; demo generation never leaves that range but loaded
    /// documents are not clamped.
    pub engagement: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClubCategory {
    Academic,
    Sports,
    Arts,
    Service,
}

impl ClubCategory {
    pub const ALL: [ClubCategory; 4] = [
        ClubCategory::Academic,
        ClubCategory::Sports,
        ClubCategory::Arts,
        ClubCategory::Service,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClubCategory::Academic => "academic",
            ClubCategory::Sports => "sports",
            ClubCategory::Arts => "arts",
            ClubCategory::Service => "service",
        }
    }
}

impl std::str::FromStr for ClubCategory {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ClubCategory::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| format!("unknown club category: {value}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Club {
    pub id: String,
    pub name: String,
    pub category: ClubCategory,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    #[default]
    Member,
    Officer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub student_id: String,
    pub club_id: String,
    #[serde(default)]
    pub role: MemberRole,
    pub join_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Student,
    ClubLeader,
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "student" => Ok(UserRole::Student),
            "club_leader" | "club-leader" => Ok(UserRole::ClubLeader),
            other => Err(format!("unknown user role: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    /// Argon2 PHC string, salt included.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Upcoming,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub club_id: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub location: String,
    pub max_attendees: usize,
    #[serde(default)]
    pub attendees: Vec<String>,
    #[serde(rename = "type", default)]
    pub event_type: String,
    #[serde(default)]
    pub status: EventStatus,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: NotificationKind,
    pub timestamp: DateTime<Utc>,
    pub duration: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngagementBucket {
    High,
    Medium,
    Low,
}

impl EngagementBucket {
    pub fn of(engagement: f64) -> EngagementBucket {
        if engagement > 70.0 {
            EngagementBucket::High
        } else if engagement >= 40.0 {
            EngagementBucket::Medium
        } else {
            EngagementBucket::Low
        }
    }
}

impl std::str::FromStr for EngagementBucket {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "high" => Ok(EngagementBucket::High),
            "medium" => Ok(EngagementBucket::Medium),
            "low" => Ok(EngagementBucket::Low),
            other => Err(format!("unknown engagement bucket: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    pub search: String,
    pub category: Option<ClubCategory>,
    pub year: Option<ClassYear>,
    pub engagement: Option<EngagementBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Dataset {
    pub schema_version: u32,
    pub students: Vec<Student>,
    pub clubs: Vec<Club>,
    pub memberships: Vec<Membership>,
    pub users: Vec<User>,
    pub events: Vec<Event>,
    pub notifications: Vec<Notification>,
    pub filters: FilterState,
    pub current_user: Option<String>,
}

impl Default for Dataset {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            students: Vec::new(),
            clubs: Vec::new(),
            memberships: Vec::new(),
            users: Vec::new(),
            events: Vec::new(),
            notifications: Vec::new(),
            filters: FilterState::default(),
            current_user: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClubHealth {
    pub member_count: usize,
    pub engagement: f64,
    pub health: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EngagementStats {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub average: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub total_students: usize,
    pub total_clubs: usize,
    pub multi_club_members: usize,
    pub participation_rate: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}
