use fxhash::FxHashSet;

/// The authenticated caller, as described by a verified bearer token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Principal {
    pub subject: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub roles: FxHashSet<String>,
}

impl Principal {
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self { subject: Some(subject.into()), ..Self::default() }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn with_roles<I, R>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    /// Role names compare ordinally.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}
