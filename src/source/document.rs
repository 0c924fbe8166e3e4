//! The users document-store seam.
//!
//! The document store is the one resource the original programs wrote to as
//! well as read: list the users, and if there are none yet, seed the store
//! with sample users so the rest of the system has something to show.

use std::fmt;

use tracing::{info, warn};

/// A user record.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct User {
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
}

/// A store of [`User`] documents.
pub trait UserStore {
    /// Error produced by the underlying store.
    type Error: std::error::Error;

    /// List every user in the store.
    fn users(&self) -> Result<Vec<User>, Self::Error>;

    /// Insert a single user.
    fn insert_user(&self, user: &User) -> Result<(), Self::Error>;

    /// Insert a batch of users, continuing past individual failures.
    ///
    /// Every user is attempted even when earlier inserts fail; the aggregate
    /// error reports how many failed and carries the last cause.
    fn insert_users(&self, users: &[User]) -> Result<(), BulkInsertError<Self::Error>> {
        let mut failed = 0;
        let mut last_error = None;

        for user in users {
            if let Err(error) = self.insert_user(user) {
                warn!(user = %user.name, error = %error, "failed to insert user");
                failed += 1;
                last_error = Some(error);
            }
        }

        match last_error {
            None => Ok(()),
            Some(last_error) => Err(BulkInsertError {
                attempted: users.len(),
                failed,
                last_error,
            }),
        }
    }
}

/// Error aggregating one or more failed inserts in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkInsertError<E> {
    /// How many inserts were attempted.
    pub attempted: usize,
    /// How many of them failed.
    pub failed: usize,
    /// The error from the last failed insert.
    pub last_error: E,
}

impl<E: fmt::Display> fmt::Display for BulkInsertError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} user inserts failed, last error: {}",
            self.failed, self.attempted, self.last_error
        )
    }
}

impl<E: std::error::Error + 'static> std::error::Error for BulkInsertError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.last_error)
    }
}

/// Error from [`ensure_users`]: either the store itself failed, or seeding it
/// did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnsureUsersError<E> {
    /// Listing users failed.
    Store(E),
    /// Seeding the empty store failed.
    Insert(BulkInsertError<E>),
}

impl<E: fmt::Display> fmt::Display for EnsureUsersError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnsureUsersError::Store(e) => write!(f, "user store error: {}", e),
            EnsureUsersError::Insert(e) => write!(f, "{}", e),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for EnsureUsersError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EnsureUsersError::Store(e) => Some(e),
            EnsureUsersError::Insert(e) => Some(e),
        }
    }
}

/// List the store's users, seeding it with `fill_count` sample users first if
/// it is empty.
///
/// # Examples
///
/// ```rust
/// use breakwater::source::ensure_users;
/// use breakwater::testing::InMemoryUserStore;
///
/// let store = InMemoryUserStore::new();
///
/// let users = ensure_users(&store, 10).unwrap();
/// assert_eq!(users.len(), 10);
///
/// // A second call finds the store populated and inserts nothing.
/// let again = ensure_users(&store, 10).unwrap();
/// assert_eq!(again, users);
/// ```
pub fn ensure_users<S: UserStore>(
    store: &S,
    fill_count: usize,
) -> Result<Vec<User>, EnsureUsersError<S::Error>> {
    let users = store.users().map_err(EnsureUsersError::Store)?;
    if !users.is_empty() {
        return Ok(users);
    }

    info!(count = fill_count, "user store is empty, seeding sample users");
    store
        .insert_users(&sample_users(fill_count))
        .map_err(EnsureUsersError::Insert)?;

    store.users().map_err(EnsureUsersError::Store)
}

const SAMPLE_NAMES: &[&str] = &[
    "Ada", "Grace", "Alan", "Barbara", "Edsger", "Margaret", "Tony", "Donald",
];

/// Generate `count` deterministic sample users.
///
/// Names cycle through a fixed list; emails are unique per index so repeated
/// seeding rounds stay distinguishable.
///
/// # Examples
///
/// ```rust
/// use breakwater::source::sample_users;
///
/// let users = sample_users(3);
/// assert_eq!(users[0].name, "Ada");
/// assert_eq!(users[0].email, "ada0@example.com");
/// assert_eq!(users.len(), 3);
/// ```
pub fn sample_users(count: usize) -> Vec<User> {
    (0..count)
        .map(|i| {
            let name = SAMPLE_NAMES[i % SAMPLE_NAMES.len()];
            User {
                name: name.to_string(),
                email: format!("{}{}@example.com", name.to_lowercase(), i),
            }
        })
        .collect()
}
