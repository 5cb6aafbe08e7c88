use eventhub_core::{User, UserId};

/// Identity resolved from the bearer credential for the current request.
///
/// Inserted once by the auth middleware; immutable for the rest of the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(User);

impl CurrentUser {
    pub fn new(user: User) -> Self {
        Self(user)
    }

    pub fn id(&self) -> UserId {
        self.0.id
    }
}
