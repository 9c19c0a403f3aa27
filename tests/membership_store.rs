use std::collections::HashSet;

use chrono::{Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

use campus_nexus::clock::ManualClock;
use campus_nexus::export::ExportFormat;
use campus_nexus::models::{ClassYear, ClubCategory, FilterState, MemberRole, Student};
use campus_nexus::persistence::FileStore;
use campus_nexus::store::{NewClub, NewStudent};
use campus_nexus::MembershipStore;

struct TestEnv {
    _tmp: TempDir,
    store: MembershipStore,
    clock: ManualClock,
}

impl TestEnv {
    fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap());
        let store = MembershipStore::open(
            Box::new(FileStore::new(tmp.path())),
            Box::new(clock.clone()),
        )
        .expect("open store");
        Self {
            _tmp: tmp,
            store,
            clock,
        }
    }

    fn seeded(seed: u64) -> Self {
        let mut env = Self::new();
        let mut rng = StdRng::seed_from_u64(seed);
        env.store.ensure_demo_data(&mut rng).expect("seed demo data");
        env
    }

    fn student(&mut self, name: &str, engagement: f64) -> String {
        let email = format!("{}@university.edu", name.to_lowercase().replace(' ', "."));
        self.store
            .add_student(NewStudent {
                name: name.to_string(),
                email,
                major: "Mathematics".to_string(),
                year: ClassYear::Sophomore,
                engagement,
            })
            .expect("add student")
            .id
    }

    fn club(&mut self, name: &str) -> String {
        self.store
            .add_club(NewClub {
                name: name.to_string(),
                category: ClubCategory::Service,
                color: "#ef4444".to_string(),
            })
            .expect("add club")
            .id
    }
}

fn id_set(students: &[Student]) -> HashSet<String> {
    students.iter().map(|s| s.id.clone()).collect()
}

#[test]
fn set_laws_hold_for_every_demo_club_pair() {
    let env = TestEnv::seeded(42);
    let store = &env.store;
    let clubs: Vec<String> = store.clubs().iter().map(|c| c.id.clone()).collect();

    for a in &clubs {
        for b in &clubs {
            let members_a = store.club_members(a);
            let members_b = store.club_members(b);
            let both = store.intersection(a, b);
            let either = store.union(a, b);
            let only_a = store.difference(a, b);

            assert_eq!(id_set(&both).len(), both.len());
            assert!(id_set(&both).is_subset(&id_set(&members_a)));
            assert!(id_set(&both).is_subset(&id_set(&members_b)));

            assert_eq!(id_set(&either).len(), either.len());
            assert!(either.len() >= members_a.len().max(members_b.len()));
            assert!(either.len() <= members_a.len() + members_b.len());
            assert_eq!(id_set(&either), &id_set(&members_a) | &id_set(&members_b));

            assert!(id_set(&only_a).is_disjoint(&id_set(&both)));
            assert_eq!(&id_set(&only_a) | &id_set(&both), id_set(&members_a));
        }
    }
}

#[test]
fn unaffiliated_and_affiliated_partition_population() {
    let mut env = TestEnv::seeded(5);
    let loner = env.student("Quinn Rodriguez", 64.0);
    let store = &env.store;

    let unaffiliated = id_set(&store.complement(&[]));
    let affiliated: HashSet<String> = store
        .students()
        .iter()
        .filter(|s| !store.student_clubs(&s.id).is_empty())
        .map(|s| s.id.clone())
        .collect();

    assert!(unaffiliated.contains(&loner));
    assert!(unaffiliated.is_disjoint(&affiliated));
    assert_eq!(unaffiliated.len() + affiliated.len(), store.students().len());
}

#[test]
fn queries_are_idempotent() {
    let env = TestEnv::seeded(11);
    let store = &env.store;
    assert_eq!(store.union("c1", "c2"), store.union("c1", "c2"));
    assert_eq!(store.complement(&["c3"]), store.complement(&["c3"]));
    assert_eq!(store.at_risk_students(30.0), store.at_risk_students(30.0));
    assert_eq!(store.club_growth_trend(), store.club_growth_trend());
}

#[test]
fn health_example_from_ten_members() {
    let mut env = TestEnv::new();
    let club = env.club("Volunteer Corps");
    for i in 0..10 {
        let id = env.student(&format!("Member {i}"), 75.0);
        env.store
            .add_membership(&id, &club, MemberRole::Member)
            .expect("join club");
    }

    let health = env.store.club_health(&club);
    assert_eq!(health.member_count, 10);
    assert!((health.health - 65.0).abs() < 1e-9);
}

#[test]
fn cached_filters_expire_after_five_minutes() {
    let mut env = TestEnv::seeded(8);
    let filters = FilterState {
        search: "club".to_string(),
        ..FilterState::default()
    };

    let first = env.store.cached_filtered_clubs(&filters);
    let again = env.store.cached_filtered_clubs(&filters);
    assert!(std::rc::Rc::ptr_eq(&first, &again));
    assert_eq!(*first, env.store.filtered_clubs(&filters));

    env.clock.advance(Duration::minutes(5));
    let refreshed = env.store.cached_filtered_clubs(&filters);
    assert!(!std::rc::Rc::ptr_eq(&first, &refreshed));
    assert_eq!(*first, *refreshed);
}

#[test]
fn dataset_survives_reopen() {
    let tmp = TempDir::new().expect("create temp dir");
    let clock = ManualClock::new(Utc::now());
    let mut rng = StdRng::seed_from_u64(1);

    let mut store = MembershipStore::open(
        Box::new(FileStore::new(tmp.path())),
        Box::new(clock.clone()),
    )
    .unwrap();
    assert!(store.ensure_demo_data(&mut rng).unwrap());
    let students = id_set(store.students());
    let memberships = store.memberships().len();

    let mut reopened = MembershipStore::open(
        Box::new(FileStore::new(tmp.path())),
        Box::new(clock),
    )
    .unwrap();
    assert!(!reopened.ensure_demo_data(&mut rng).unwrap());
    assert_eq!(id_set(reopened.students()), students);
    assert_eq!(reopened.memberships().len(), memberships);
    assert_eq!(reopened.data().users.len(), 3);
    assert!(reopened.authenticate("admin", "admin123").unwrap().is_some());
}

#[test]
fn csv_export_has_one_row_per_student() {
    let env = TestEnv::seeded(3);
    let csv = env.store.export(ExportFormat::Csv).unwrap();
    assert_eq!(csv.lines().count(), env.store.students().len() + 1);
    assert_eq!(
        env.store.export_file_name(ExportFormat::Csv),
        "students-2026-03-01.csv"
    );
}
