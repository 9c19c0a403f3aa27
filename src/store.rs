use std::collections::BTreeMap;
use std::rc::Rc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::Rng;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::accounts::{self, Registration};
use crate::algebra;
use crate::cache::{TtlCache, DEFAULT_CAPACITY, DEFAULT_TTL_SECS};
use crate::clock::Clock;
use crate::demo;
use crate::error::{StoreError, StoreResult};
use crate::events::{self, JoinOutcome, NewEvent};
use crate::export::{self, ExportFormat};
use crate::filter::{self, FilterField};
use crate::models::{
    ClassYear, Club, ClubCategory, ClubHealth, DashboardSummary, Dataset, EngagementStats,
    Event, FilterState, MemberRole, Membership, Notification, NotificationKind, Page, Student,
    User,
};
use crate::notifications;
use crate::persistence::{self, KeyValueStore};
use crate::report;
use crate::scoring;
use crate::validation;

#[derive(Debug, Clone)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub major: String,
    pub year: ClassYear,
    pub engagement: f64,
}

#[derive(Debug, Clone)]
pub struct NewClub {
    pub name: String,
    pub category: ClubCategory,
    pub color: String,
}

struct FilterCaches {
    clubs: TtlCache<FilterState, Rc<Vec<Club>>>,
    students: TtlCache<FilterState, Rc<Vec<Student>>>,
}

impl FilterCaches {
    fn new(ttl: Duration) -> Self {
        Self {
            clubs: TtlCache::new(ttl, DEFAULT_CAPACITY),
            students: TtlCache::new(ttl, DEFAULT_CAPACITY),
        }
    }

    fn len(&self) -> usize {
        self.clubs.len() + self.students.len()
    }

    fn sweep(&mut self, now: DateTime<Utc>) -> usize {
        self.clubs.sweep(now) + self.students.sweep(now)
    }

    fn clear(&mut self) {
        self.clubs.clear();
        self.students.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CleanupReport {
    pub notifications_removed: usize,
    pub cache_entries_removed: usize,
}

pub struct MembershipStore {
    data: Dataset,
    persistence: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    cache: FilterCaches,
}

fn next_id<'a>(prefix: &str, taken: impl Iterator<Item = &'a str> + Clone, len: usize) -> String {
    let mut n = len + 1;
    loop {
        let candidate = format!("{prefix}{n}");
        if !taken.clone().any(|id| id == candidate) {
            return candidate;
        }
        n += 1;
    }
}

impl MembershipStore {
    pub fn open(
        persistence: Box<dyn KeyValueStore>,
        clock: Box<dyn Clock>,
    ) -> StoreResult<Self> {
        let data = persistence::load_dataset(persistence.as_ref())?;
        info!(
            students = data.students.len(),
            clubs = data.clubs.len(),
            memberships = data.memberships.len(),
            "dataset loaded"
        );

        Ok(Self {
            data,
            persistence,
            clock,
            cache: FilterCaches::new(Duration::seconds(DEFAULT_TTL_SECS)),
        })
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = FilterCaches::new(ttl);
        self
    }

    pub fn ensure_demo_data<R: Rng>(&mut self, rng: &mut R) -> StoreResult<bool> {
        let now = self.clock.now();
        let mut seeded = false;

        if self.data.students.is_empty() {
            self.data.students = demo::students(rng);
            self.data.clubs = demo::clubs();
            self.data.memberships =
                demo::memberships(&self.data.students, &self.data.clubs, rng, now);
            seeded = true;
        }
        if self.data.users.is_empty() {
            self.data.users = demo::users(now)?;
            seeded = true;
        }
        if self.data.events.is_empty() {
            self.data.events = demo::events(&self.data.clubs, rng, now);
            seeded = true;
        }

        if seeded {
            info!(
                students = self.data.students.len(),
                users = self.data.users.len(),
                events = self.data.events.len(),
                "demo data generated"
            );
            self.dataset_changed()?;
        }
        Ok(seeded)
    }

    pub fn data(&self) -> &Dataset {
        &self.data
    }

    pub fn students(&self) -> &[Student] {
        &self.data.students
    }

    pub fn clubs(&self) -> &[Club] {
        &self.data.clubs
    }

    pub fn memberships(&self) -> &[Membership] {
        &self.data.memberships
    }

    pub fn student(&self, id: &str) -> Option<&Student> {
        self.data.students.iter().find(|s| s.id == id)
    }

    pub fn club(&self, id: &str) -> Option<&Club> {
        self.data.clubs.iter().find(|c| c.id == id)
    }

    pub fn save(&mut self) -> StoreResult<()> {
        persistence::save_dataset(self.persistence.as_mut(), &self.data)?;
        Ok(())
    }

    fn dataset_changed(&mut self) -> StoreResult<()> {
        self.cache.clear();
        self.save()
    }

    // Set algebra

    pub fn club_members(&self, club_id: &str) -> Vec<Student> {
        algebra::club_members(&self.data, club_id)
    }

    pub fn student_clubs(&self, student_id: &str) -> Vec<Club> {
        algebra::student_clubs(&self.data, student_id)
    }

    pub fn intersection(&self, club_a: &str, club_b: &str) -> Vec<Student> {
        algebra::intersection(&self.data, club_a, club_b)
    }

    pub fn union(&self, club_a: &str, club_b: &str) -> Vec<Student> {
        algebra::union(&self.data, club_a, club_b)
    }

    pub fn difference(&self, club_a: &str, club_b: &str) -> Vec<Student> {
        algebra::difference(&self.data, club_a, club_b)
    }

    pub fn complement(&self, club_ids: &[&str]) -> Vec<Student> {
        algebra::complement(&self.data, club_ids)
    }

    // Scoring

    pub fn club_health(&self, club_id: &str) -> ClubHealth {
        scoring::club_health(&self.data, club_id)
    }

    pub fn at_risk_students(&self, threshold: f64) -> Vec<Student> {
        scoring::at_risk_students(&self.data, threshold)
    }

    pub fn engagement_stats(&self) -> EngagementStats {
        scoring::engagement_stats(&self.data)
    }

    pub fn club_growth_trend(&self) -> BTreeMap<NaiveDate, usize> {
        scoring::club_growth_trend(&self.data, self.clock.now())
    }

    pub fn dashboard_summary(&self) -> DashboardSummary {
        scoring::dashboard_summary(&self.data)
    }

    pub fn paginated_students(&self, page: usize, page_size: usize) -> Page<Student> {
        scoring::paginated_students(&self.data, page, page_size)
    }

    // Filtering

    pub fn filters(&self) -> &FilterState {
        &self.data.filters
    }

    pub fn set_filter(&mut self, field: FilterField) -> StoreResult<()> {
        self.data.filters.apply(field);
        self.save()
    }

    pub fn set_filters(&mut self, filters: FilterState) -> StoreResult<()> {
        self.data.filters = filters;
        self.save()
    }

    pub fn clear_filters(&mut self) -> StoreResult<()> {
        self.set_filters(FilterState::default())
    }

    pub fn filtered_clubs(&self, filters: &FilterState) -> Vec<Club> {
        filter::filtered_clubs(&self.data, filters)
    }

    pub fn filtered_students(&self, filters: &FilterState) -> Vec<Student> {
        filter::filtered_students(&self.data, filters)
    }

    pub fn cached_filtered_clubs(&mut self, filters: &FilterState) -> Rc<Vec<Club>> {
        let now = self.clock.now();
        let data = &self.data;
        self.cache.clubs.get_or_insert_with(filters.clone(), now, || {
            debug!(?filters, "computing filtered clubs");
            Rc::new(filter::filtered_clubs(data, filters))
        })
    }

    pub fn cached_filtered_students(&mut self, filters: &FilterState) -> Rc<Vec<Student>> {
        let now = self.clock.now();
        let data = &self.data;
        self.cache.students.get_or_insert_with(filters.clone(), now, || {
            debug!(?filters, "computing filtered students");
            Rc::new(filter::filtered_students(data, filters))
        })
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    // Dataset mutations

    pub fn add_student(&mut self, draft: NewStudent) -> StoreResult<Student> {
        validation::require("name", &draft.name)?;
        validation::check_email(&draft.email)?;
        validation::check_engagement(draft.engagement)?;

        let id = next_id(
            "s",
            self.data.students.iter().map(|s| s.id.as_str()),
            self.data.students.len(),
        );
        let student = Student {
            id,
            name: draft.name.trim().to_string(),
            email: draft.email,
            major: draft.major,
            year: draft.year,
            engagement: draft.engagement,
        };
        self.data.students.push(student.clone());
        self.dataset_changed()?;
        info!(student_id = %student.id, "student added");
        Ok(student)
    }

    pub fn add_club(&mut self, draft: NewClub) -> StoreResult<Club> {
        validation::require("Club name", &draft.name)?;

        let id = next_id(
            "c",
            self.data.clubs.iter().map(|c| c.id.as_str()),
            self.data.clubs.len(),
        );
        let club = Club {
            id,
            name: draft.name.trim().to_string(),
            category: draft.category,
            color: draft.color,
        };
        self.data.clubs.push(club.clone());
        self.dataset_changed()?;
        info!(club_id = %club.id, "club added");
        Ok(club)
    }

    pub fn add_demo_club<R: Rng>(&mut self, rng: &mut R) -> StoreResult<Club> {
        let template = demo::random_club(self.data.clubs.len() + 1, rng);
        self.add_club(NewClub {
            name: template.name,
            category: template.category,
            color: template.color,
        })
    }

    /// Rejects unknown students or clubs and repeated (student, club) pairs.
    pub fn add_membership(
        &mut self,
        student_id: &str,
        club_id: &str,
        role: MemberRole,
    ) -> StoreResult<Membership> {
        if self.student(student_id).is_none() {
            return Err(StoreError::UnknownStudent(student_id.to_string()));
        }
        if self.club(club_id).is_none() {
            return Err(StoreError::UnknownClub(club_id.to_string()));
        }
        let duplicate = self
            .data
            .memberships
            .iter()
            .any(|m| m.student_id == student_id && m.club_id == club_id);
        if duplicate {
            return Err(StoreError::DuplicateMembership {
                student_id: student_id.to_string(),
                club_id: club_id.to_string(),
            });
        }

        let membership = Membership {
            student_id: student_id.to_string(),
            club_id: club_id.to_string(),
            role,
            join_date: self.clock.now(),
        };
        self.data.memberships.push(membership.clone());
        self.dataset_changed()?;
        Ok(membership)
    }

    // Accounts

    pub fn register_user(&mut self, form: Registration) -> StoreResult<User> {
        let role = match accounts::validate_registration(&form, &self.data.users) {
            Ok(role) => role,
            Err(err) => {
                self.add_notification(err.to_string(), NotificationKind::Error)?;
                return Err(err.into());
            }
        };

        let id = next_id(
            "u",
            self.data.users.iter().map(|u| u.id.as_str()),
            self.data.users.len(),
        );
        let user = accounts::build_user(&form, role, id, self.clock.now())?;
        self.data.users.push(user.clone());
        info!(user_id = %user.id, username = %user.username, "account registered");
        self.add_notification("Account created successfully!", NotificationKind::Success)?;
        Ok(user)
    }

    pub fn authenticate(&mut self, login: &str, password: &str) -> StoreResult<Option<User>> {
        if login.is_empty() || password.is_empty() {
            self.add_notification(
                "Username and password are required",
                NotificationKind::Error,
            )?;
            return Ok(None);
        }

        let user = accounts::find_by_credentials(&self.data.users, login, password).cloned();
        match user {
            Some(user) => {
                self.data.current_user = Some(user.id.clone());
                info!(user_id = %user.id, "login succeeded");
                self.add_notification("Login successful!", NotificationKind::Success)?;
                Ok(Some(user))
            }
            None => {
                warn!(login, "login rejected");
                self.add_notification("Invalid credentials", NotificationKind::Error)?;
                Ok(None)
            }
        }
    }

    pub fn logout(&mut self) -> StoreResult<()> {
        self.data.current_user = None;
        self.save()
    }

    pub fn current_user(&self) -> Option<&User> {
        let id = self.data.current_user.as_deref()?;
        self.data.users.iter().find(|u| u.id == id)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }

    // Events

    pub fn add_event(&mut self, draft: NewEvent) -> StoreResult<Event> {
        validation::require("title", &draft.title)?;
        if self.club(&draft.club_id).is_none() {
            return Err(StoreError::UnknownClub(draft.club_id));
        }
        let id = next_id(
            "e",
            self.data.events.iter().map(|e| e.id.as_str()),
            self.data.events.len(),
        );
        let event = draft.into_event(id, self.clock.now());
        self.data.events.push(event.clone());
        self.add_notification("Event created successfully!", NotificationKind::Success)?;
        Ok(event)
    }

    pub fn events_by_club(&self, club_id: &str) -> Vec<&Event> {
        events::events_by_club(&self.data.events, club_id)
    }

    pub fn upcoming_events(&self) -> Vec<Event> {
        events::upcoming_events(&self.data.events, self.clock.now())
    }

    pub fn join_event(&mut self, event_id: &str) -> StoreResult<JoinOutcome> {
        let user_id = match self.current_user() {
            Some(user) => user.id.clone(),
            None => return Err(StoreError::NotAuthenticated),
        };

        let outcome = self
            .data
            .events
            .iter_mut()
            .find(|e| e.id == event_id)
            .and_then(|event| event.admit(&user_id));

        match outcome {
            Some(JoinOutcome::Joined) => {
                self.add_notification("Successfully joined the event!", NotificationKind::Success)?;
                Ok(JoinOutcome::Joined)
            }
            Some(JoinOutcome::AlreadyRegistered) => {
                self.add_notification(
                    "You are already registered for this event.",
                    NotificationKind::Warning,
                )?;
                Ok(JoinOutcome::AlreadyRegistered)
            }
            None => {
                self.add_notification("Event is full or not found.", NotificationKind::Error)?;
                Err(StoreError::EventUnavailable(event_id.to_string()))
            }
        }
    }

    // Notifications

    pub fn add_notification(
        &mut self,
        message: impl Into<String>,
        kind: NotificationKind,
    ) -> StoreResult<Notification> {
        self.add_notification_for(message, kind, notifications::DEFAULT_DURATION_MS)
    }

    pub fn add_notification_for(
        &mut self,
        message: impl Into<String>,
        kind: NotificationKind,
        duration_ms: u64,
    ) -> StoreResult<Notification> {
        let notification =
            notifications::new_notification(message, kind, duration_ms, self.clock.now());
        self.data.notifications.push(notification.clone());
        self.save()?;
        Ok(notification)
    }

    pub fn remove_notification(&mut self, id: Uuid) -> StoreResult<bool> {
        let before = self.data.notifications.len();
        self.data.notifications.retain(|n| n.id != id);
        let removed = self.data.notifications.len() != before;
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.data.notifications
    }

    pub fn expire_notifications(&mut self) -> StoreResult<usize> {
        let removed = notifications::expire(&mut self.data.notifications, self.clock.now());
        if removed > 0 {
            self.save()?;
        }
        Ok(removed)
    }

    pub fn cleanup(&mut self) -> StoreResult<CleanupReport> {
        let now = self.clock.now();
        let report = CleanupReport {
            notifications_removed: notifications::prune_old(&mut self.data.notifications, now),
            cache_entries_removed: self.cache.sweep(now),
        };
        debug!(?report, "cleanup sweep");
        self.save()?;
        Ok(report)
    }

    // Export

    pub fn export(&self, format: ExportFormat) -> StoreResult<String> {
        export::export(&self.data, format, self.clock.now())
    }

    pub fn export_file_name(&self, format: ExportFormat) -> String {
        export::export_file_name(format, self.clock.now().date_naive())
    }

    pub fn report(&self, threshold: f64) -> String {
        report::build_report(&self.data, threshold, self.clock.now())
    }
}
