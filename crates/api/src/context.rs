use storefront_auth::Identity;
use storefront_core::UserId;

/// The authenticated shopper for a request.
///
/// Inserted by the auth middleware; must be present for all `/api` routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    user_id: UserId,
    email: Option<String>,
}

impl UserContext {
    pub fn new(user_id: UserId, email: Option<String>) -> Self {
        Self { user_id, email }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

impl From<Identity> for UserContext {
    fn from(identity: Identity) -> Self {
        Self::new(identity.user_id, identity.email)
    }
}
