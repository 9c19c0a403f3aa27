use chrono::{DateTime, Duration, Utc};
use rand::seq::index::sample;
use rand::Rng;

use crate::accounts::{self, Registration};
use crate::error::StoreResult;
use crate::events::NewEvent;
use crate::models::{
    ClassYear, Club, ClubCategory, Event, MemberRole, Membership, Student, User, UserRole,
};

pub const DEMO_STUDENT_COUNT: usize = 50;

const FIRST_NAMES: [&str; 10] = [
    "Alex", "Jordan", "Taylor", "Morgan", "Casey", "Riley", "Avery", "Quinn", "Peyton", "Dakota",
];
const LAST_NAMES: [&str; 10] = [
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez",
];
const MAJORS: [&str; 8] = [
    "Computer Science",
    "Biology",
    "Business",
    "Psychology",
    "Engineering",
    "Mathematics",
    "Physics",
    "Chemistry",
];
const EVENT_TYPES: [&str; 6] = [
    "Meeting",
    "Workshop",
    "Social",
    "Competition",
    "Seminar",
    "Fundraiser",
];
const LOCATIONS: [&str; 6] = [
    "Main Hall",
    "Library",
    "Gymnasium",
    "Auditorium",
    "Cafeteria",
    "Outdoor Field",
];

pub fn students<R: Rng>(rng: &mut R) -> Vec<Student> {
    (0..DEMO_STUDENT_COUNT)
        .map(|i| Student {
            id: format!("s{}", i + 1),
            name: format!(
                "{} {}",
                FIRST_NAMES[i % FIRST_NAMES.len()],
                LAST_NAMES[i % LAST_NAMES.len()]
            ),
            email: format!("student{}@university.edu", i + 1),
            major: MAJORS[i % MAJORS.len()].to_string(),
            year: ClassYear::ALL[i % ClassYear::ALL.len()],
            engagement: rng.gen_range(0.0..100.0),
        })
        .collect()
}

pub fn clubs() -> Vec<Club> {
    [
        ("c1", "Computer Science Club", ClubCategory::Academic, "#6366f1"),
        ("c2", "Basketball Team", ClubCategory::Sports, "#10b981"),
        ("c3", "Debate Society", ClubCategory::Academic, "#8b5cf6"),
        ("c4", "Art Club", ClubCategory::Arts, "#f59e0b"),
        ("c5", "Volunteer Corps", ClubCategory::Service, "#ef4444"),
        ("c6", "Music Society", ClubCategory::Arts, "#06b6d4"),
    ]
    .into_iter()
    .map(|(id, name, category, color)| Club {
        id: id.to_string(),
        name: name.to_string(),
        category,
        color: color.to_string(),
    })
    .collect()
}

pub fn memberships<R: Rng>(
    students: &[Student],
    clubs: &[Club],
    rng: &mut R,
    now: DateTime<Utc>,
) -> Vec<Membership> {
    if clubs.is_empty() {
        return Vec::new();
    }

    let mut memberships = Vec::new();
    for student in students {
        let count = rng.gen_range(1..=4).min(clubs.len());
        for index in sample(rng, clubs.len(), count) {
            let role = if rng.gen_bool(0.1) {
                MemberRole::Officer
            } else {
                MemberRole::Member
            };
            let seconds_ago = rng.gen_range(0..365 * 24 * 60 * 60);
            memberships.push(Membership {
                student_id: student.id.clone(),
                club_id: clubs[index].id.clone(),
                role,
                join_date: now - Duration::seconds(seconds_ago),
            });
        }
    }
    memberships
}

pub fn users(now: DateTime<Utc>) -> StoreResult<Vec<User>> {
    let accounts = [
        ("admin", "admin@campus.edu", "admin123", "System Administrator", UserRole::Admin),
        ("student1", "student1@campus.edu", "student123", "Alex Johnson", UserRole::Student),
        ("leader1", "leader1@campus.edu", "leader123", "Taylor Smith", UserRole::ClubLeader),
    ];

    accounts
        .into_iter()
        .enumerate()
        .map(|(i, (username, email, password, name, role))| {
            let form = Registration {
                name: name.to_string(),
                email: email.to_string(),
                username: username.to_string(),
                password: password.to_string(),
                role: Some(role),
            };
            accounts::build_user(&form, role, format!("u{}", i + 1), now)
        })
        .collect()
}

pub fn events<R: Rng>(clubs: &[Club], rng: &mut R, now: DateTime<Utc>) -> Vec<Event> {
    let mut events = Vec::new();
    for club in clubs {
        for _ in 0..rng.gen_range(1..=3) {
            let title_type = EVENT_TYPES[rng.gen_range(0..EVENT_TYPES.len())];
            let blurb_type = EVENT_TYPES[rng.gen_range(0..EVENT_TYPES.len())].to_lowercase();
            let minutes = if rng.gen_bool(0.5) { "00" } else { "30" };
            let meridiem = if rng.gen_bool(0.5) { "AM" } else { "PM" };
            let draft = NewEvent {
                title: format!("{title_type} - {}", club.name),
                description: format!("Join us for an exciting {blurb_type} event!"),
                club_id: club.id.clone(),
                date: now + Duration::days(rng.gen_range(1..=30)),
                time: format!("{}:{minutes} {meridiem}", rng.gen_range(1..=12)),
                location: LOCATIONS[rng.gen_range(0..LOCATIONS.len())].to_string(),
                max_attendees: rng.gen_range(20..70),
                event_type: EVENT_TYPES[rng.gen_range(0..EVENT_TYPES.len())].to_lowercase(),
            };
            let id = format!("e{}", events.len() + 1);
            events.push(draft.into_event(id, now));
        }
    }
    events
}

pub fn random_club<R: Rng>(ordinal: usize, rng: &mut R) -> Club {
    Club {
        id: format!("c{ordinal}"),
        name: format!("New Club {ordinal}"),
        category: ClubCategory::ALL[rng.gen_range(0..ClubCategory::ALL.len())],
        color: format!("#{:06x}", rng.gen_range(0..=0xff_ffffu32)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn memberships_are_unique_pairs_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let now = Utc::now();
        let students = students(&mut rng);
        let clubs = clubs();
        let memberships = memberships(&students, &clubs, &mut rng, now);

        let mut pairs = HashSet::new();
        for m in &memberships {
            assert!(pairs.insert((m.student_id.clone(), m.club_id.clone())));
            assert!(m.join_date <= now && m.join_date > now - Duration::days(366));
        }
        for s in &students {
            let count = memberships.iter().filter(|m| m.student_id == s.id).count();
            assert!((1..=4).contains(&count));
        }
    }

    #[test]
    fn students_cycle_name_parts() {
        let mut rng = StdRng::seed_from_u64(1);
        let students = students(&mut rng);
        assert_eq!(students.len(), DEMO_STUDENT_COUNT);
        assert_eq!(students[0].name, "Alex Smith");
        assert_eq!(students[11].name, "Jordan Johnson");
        assert_eq!(students[4].year, ClassYear::Freshman);
        assert!(students.iter().all(|s| (0.0..100.0).contains(&s.engagement)));
    }

    #[test]
    fn events_are_upcoming() {
        let mut rng = StdRng::seed_from_u64(3);
        let now = Utc::now();
        let events = events(&clubs(), &mut rng, now);
        assert!(events.len() >= 6 && events.len() <= 18);
        assert!(events.iter().all(|e| e.date > now && e.attendees.is_empty()));
    }

    #[test]
    fn random_club_color_is_hex() {
        let mut rng = StdRng::seed_from_u64(9);
        let club = random_club(7, &mut rng);
        assert_eq!(club.id, "c7");
        assert_eq!(club.color.len(), 7);
        assert!(club.color.starts_with('#'));
    }
}
