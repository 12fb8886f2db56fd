/// What a subscribe call did to the audience store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionOutcome {
    Created,
    Updated,
}

impl SubscriptionOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            SubscriptionOutcome::Created => "Subscription successful! Welcome to our newsletter.",
            SubscriptionOutcome::Updated => "Your subscription has been updated. Welcome back!",
        }
    }
}
