use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use campus_nexus::accounts::Registration;
use campus_nexus::clock::SystemClock;
use campus_nexus::config::Config;
use campus_nexus::events::{JoinOutcome, NewEvent};
use campus_nexus::export::ExportFormat;
use campus_nexus::models::{
    ClassYear, ClubCategory, EngagementBucket, Event, FilterState, MemberRole, Student, UserRole,
};
use campus_nexus::persistence::FileStore;
use campus_nexus::store::{NewClub, NewStudent};
use campus_nexus::MembershipStore;

#[derive(Parser)]
#[command(name = "campus-nexus")]
#[command(about = "Club membership analytics for campus student organizations", long_about = None)]
struct Cli {
    /// Directory holding the dataset document
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Seed for demo data generation
    #[arg(long, global = true)]
    seed: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Target {
    Clubs,
    Students,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate demo data for any empty collection
    Seed,
    /// Dashboard totals
    Summary,
    /// List a club's members
    Members { club: String },
    /// Students in both clubs
    Intersect { club_a: String, club_b: String },
    /// Students in either club
    Union { club_a: String, club_b: String },
    /// Students in the first club but not the second
    Difference { club_a: String, club_b: String },
    /// Students outside every listed club (no clubs: unaffiliated students)
    Complement { clubs: Vec<String> },
    /// Club health scores
    Health { club: Option<String> },
    /// Students with no clubs or low engagement
    AtRisk {
        #[arg(long)]
        threshold: Option<f64>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Engagement bucket counts
    Stats,
    /// New memberships per day over the last 30 days
    Growth,
    /// Page through students
    Students {
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 20)]
        page_size: usize,
    },
    /// Filter clubs or students; saved filters apply when no flag is given
    Filter {
        #[arg(value_enum)]
        target: Target,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<ClubCategory>,
        #[arg(long)]
        year: Option<ClassYear>,
        #[arg(long)]
        engagement: Option<EngagementBucket>,
        /// Persist these filters as the current filter state
        #[arg(long)]
        save: bool,
        /// Reset the saved filter state first
        #[arg(long)]
        clear: bool,
    },
    /// Add a student
    AddStudent {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        major: String,
        #[arg(long)]
        year: ClassYear,
        #[arg(long)]
        engagement: f64,
    },
    /// Add a club
    AddClub {
        #[arg(long)]
        name: String,
        #[arg(long)]
        category: ClubCategory,
        #[arg(long, default_value = "#6366f1")]
        color: String,
    },
    /// Add a placeholder club with random category and color
    AddDemoClub,
    /// Enroll a student in a club
    Join {
        student: String,
        club: String,
        #[arg(long)]
        officer: bool,
    },
    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        role: Option<UserRole>,
    },
    /// Log in by username or email
    Login { login: String, password: String },
    /// End the current session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// List upcoming events
    Events {
        #[arg(long)]
        club: Option<String>,
    },
    /// Create an event
    AddEvent {
        #[arg(long)]
        title: String,
        #[arg(long)]
        club: String,
        #[arg(long)]
        date: DateTime<Utc>,
        #[arg(long, default_value = "")]
        time: String,
        #[arg(long, default_value = "")]
        location: String,
        #[arg(long, default_value_t = 30)]
        max_attendees: usize,
        #[arg(long, default_value = "meeting")]
        event_type: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Register the logged-in user for an event
    JoinEvent { event: String },
    /// Show pending notifications
    Notifications,
    /// Drop expired notifications and cache entries
    Cleanup,
    /// Export the dataset as JSON or student CSV
    Export {
        #[arg(long, default_value = "json")]
        format: ExportFormat,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        threshold: Option<f64>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn print_students(label: &str, students: &[Student]) {
    if students.is_empty() {
        println!("{label}: none.");
        return;
    }
    println!("{label} ({}):", students.len());
    for student in students {
        println!(
            "- {} {} ({}, {}, {}) engagement {:.1}",
            student.id,
            student.name,
            student.major,
            student.year.as_str(),
            student.email,
            student.engagement
        );
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,campus_nexus=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env().context("failed to read configuration")?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let cache_ttl = chrono::Duration::try_seconds(config.cache_ttl_secs)
        .context("cache TTL is out of range")?;
    let mut store = MembershipStore::open(
        Box::new(FileStore::new(&config.data_dir)),
        Box::new(SystemClock),
    )
    .with_context(|| format!("failed to open dataset in {}", config.data_dir.display()))?
    .with_cache_ttl(cache_ttl);
    let seeded = store.ensure_demo_data(&mut rng)?;
    store.expire_notifications()?;

    match cli.command {
        Commands::Seed => {
            if seeded {
                println!("Demo data generated in {}.", config.data_dir.display());
            } else {
                println!("Dataset already populated.");
            }
        }
        Commands::Summary => {
            let summary = store.dashboard_summary();
            println!("Students: {}", summary.total_students);
            println!("Clubs: {}", summary.total_clubs);
            println!("Multi-club members: {}", summary.multi_club_members);
            println!("Participation: {}%", summary.participation_rate);
        }
        Commands::Members { club } => {
            print_students(&format!("Members of {club}"), &store.club_members(&club));
        }
        Commands::Intersect { club_a, club_b } => {
            print_students(
                &format!("In both {club_a} and {club_b}"),
                &store.intersection(&club_a, &club_b),
            );
        }
        Commands::Union { club_a, club_b } => {
            print_students(
                &format!("In {club_a} or {club_b}"),
                &store.union(&club_a, &club_b),
            );
        }
        Commands::Difference { club_a, club_b } => {
            print_students(
                &format!("In {club_a} but not {club_b}"),
                &store.difference(&club_a, &club_b),
            );
        }
        Commands::Complement { clubs } => {
            let ids: Vec<&str> = clubs.iter().map(String::as_str).collect();
            let label = if ids.is_empty() {
                "Not in any club".to_string()
            } else {
                format!("Outside {}", ids.join(", "))
            };
            print_students(&label, &store.complement(&ids));
        }
        Commands::Health { club } => {
            let ids: Vec<String> = match club {
                Some(id) => vec![id],
                None => store.clubs().iter().map(|c| c.id.clone()).collect(),
            };
            for id in ids {
                let health = store.club_health(&id);
                let name = store.club(&id).map(|c| c.name.as_str()).unwrap_or("unknown club");
                println!(
                    "- {} {}: health {:.1} ({} members, avg engagement {:.1})",
                    id, name, health.health, health.member_count, health.engagement
                );
            }
        }
        Commands::AtRisk { threshold, limit } => {
            let threshold = threshold.unwrap_or(config.at_risk_threshold);
            let students = store.at_risk_students(threshold);
            if students.is_empty() {
                println!("No students at risk.");
                return Ok(());
            }
            println!("At-risk students ({} total):", students.len());
            for student in students.iter().take(limit) {
                let clubs = store.student_clubs(&student.id);
                println!(
                    "- {} ({}) engagement {:.1} across {} clubs",
                    student.name,
                    student.email,
                    student.engagement,
                    clubs.len()
                );
            }
        }
        Commands::Stats => {
            let stats = store.engagement_stats();
            println!("Total: {}", stats.total);
            println!("High (>70): {}", stats.high);
            println!("Medium (40-70): {}", stats.medium);
            println!("Low (<40): {}", stats.low);
            println!("Average: {:.1}", stats.average);
        }
        Commands::Growth => {
            let trend = store.club_growth_trend();
            if trend.is_empty() {
                println!("No new memberships in the last 30 days.");
            }
            for (day, count) in trend {
                println!("{day}: {count}");
            }
        }
        Commands::Students { page, page_size } => {
            let page = store.paginated_students(page, page_size);
            print_students(
                &format!("Page {} of {}", page.page, page.total_pages),
                &page.data,
            );
        }
        Commands::Filter {
            target,
            search,
            category,
            year,
            engagement,
            save,
            clear,
        } => {
            if clear {
                store.clear_filters()?;
            }
            let mut filters = store.filters().clone();
            if let Some(text) = search {
                filters.search = text;
            }
            filters.category = category.or(filters.category);
            filters.year = year.or(filters.year);
            filters.engagement = engagement.or(filters.engagement);
            if save {
                store.set_filters(filters.clone())?;
            }
            show_filtered(&mut store, target, &filters);
        }
        Commands::AddStudent {
            name,
            email,
            major,
            year,
            engagement,
        } => {
            let student = store.add_student(NewStudent {
                name,
                email,
                major,
                year,
                engagement,
            })?;
            println!("Added student {} ({}).", student.name, student.id);
        }
        Commands::AddClub {
            name,
            category,
            color,
        } => {
            let club = store.add_club(NewClub {
                name,
                category,
                color,
            })?;
            println!("Added club {} ({}).", club.name, club.id);
        }
        Commands::AddDemoClub => {
            let club = store.add_demo_club(&mut rng)?;
            println!("Added club {} ({}, {}).", club.name, club.id, club.category.as_str());
        }
        Commands::Join {
            student,
            club,
            officer,
        } => {
            let role = if officer {
                MemberRole::Officer
            } else {
                MemberRole::Member
            };
            store.add_membership(&student, &club, role)?;
            println!("{student} joined {club}.");
        }
        Commands::Register {
            name,
            email,
            username,
            password,
            role,
        } => {
            let user = store.register_user(Registration {
                name,
                email,
                username,
                password,
                role,
            })?;
            println!("Account {} created ({}).", user.username, user.id);
        }
        Commands::Login { login, password } => match store.authenticate(&login, &password)? {
            Some(user) => println!("Logged in as {} ({}).", user.name, user.username),
            None => println!("Invalid username or password."),
        },
        Commands::Logout => {
            store.logout()?;
            println!("Logged out.");
        }
        Commands::Whoami => match store.current_user() {
            Some(user) => println!("{} ({}, {:?})", user.name, user.username, user.role),
            None => println!("Not logged in."),
        },
        Commands::Events { club } => {
            let events: Vec<Event> = match club {
                Some(id) => store.events_by_club(&id).into_iter().cloned().collect(),
                None => store.upcoming_events(),
            };
            if events.is_empty() {
                println!("No events.");
            }
            for event in events {
                println!(
                    "- {} {} on {} {} at {} ({}/{} attending)",
                    event.id,
                    event.title,
                    event.date.format("%Y-%m-%d"),
                    event.time,
                    event.location,
                    event.attendees.len(),
                    event.max_attendees
                );
            }
        }
        Commands::AddEvent {
            title,
            club,
            date,
            time,
            location,
            max_attendees,
            event_type,
            description,
        } => {
            let event = store.add_event(NewEvent {
                title,
                description,
                club_id: club,
                date,
                time,
                location,
                max_attendees,
                event_type,
            })?;
            println!("Created event {} ({}).", event.title, event.id);
        }
        Commands::JoinEvent { event } => match store.join_event(&event)? {
            JoinOutcome::Joined => println!("Successfully joined the event!"),
            JoinOutcome::AlreadyRegistered => {
                println!("You are already registered for this event.")
            }
        },
        Commands::Notifications => {
            if store.notifications().is_empty() {
                println!("No notifications.");
            }
            for notification in store.notifications() {
                println!(
                    "- [{:?}] {} ({})",
                    notification.kind,
                    notification.message,
                    notification.timestamp.format("%H:%M:%S")
                );
            }
        }
        Commands::Cleanup => {
            let report = store.cleanup()?;
            println!(
                "Removed {} notifications and {} cache entries.",
                report.notifications_removed, report.cache_entries_removed
            );
        }
        Commands::Export { format, out } => {
            let document = store.export(format)?;
            let out = out.unwrap_or_else(|| PathBuf::from(store.export_file_name(format)));
            std::fs::write(&out, document)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Export written to {}.", out.display());
        }
        Commands::Report { threshold, out } => {
            let threshold = threshold.unwrap_or(config.at_risk_threshold);
            let report = store.report(threshold);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

fn show_filtered(store: &mut MembershipStore, target: Target, filters: &FilterState) {
    match target {
        Target::Clubs => {
            let clubs = store.cached_filtered_clubs(filters);
            if clubs.is_empty() {
                println!("No clubs match.");
            }
            for club in clubs.iter() {
                let health = store.club_health(&club.id);
                println!(
                    "- {} {} [{}] {} members, health {:.1}",
                    club.id,
                    club.name,
                    club.category.as_str(),
                    health.member_count,
                    health.health
                );
            }
        }
        Target::Students => {
            let students = store.cached_filtered_students(filters);
            print_students("Matching students", &students);
        }
    }
}
