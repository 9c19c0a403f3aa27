use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Password must be at least {min} characters long")]
    PasswordTooShort { min: usize },

    #[error("Username or email already exists")]
    DuplicateAccount,

    #[error("Engagement must be between 0 and 100")]
    EngagementOutOfRange,
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("unknown student: {0}")]
    UnknownStudent(String),

    #[error("unknown club: {0}")]
    UnknownClub(String),

    #[error("Event is full or not found: {0}")]
    EventUnavailable(String),

    #[error("student {student_id} is already a member of {club_id}")]
    DuplicateMembership { student_id: String, club_id: String },

    #[error("Authentication required")]
    NotAuthenticated,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("export failed: {0}")]
    Export(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
