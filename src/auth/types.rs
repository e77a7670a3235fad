//! Types for the session store and the auth flow

/// Screens the session store can send the operator to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Auth,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Dashboard => "/",
            Route::Auth => "/auth/page",
        }
    }
}

/// Notification published by the session store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Navigate(Route),
}

/// Steps of the sign-up form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupStep {
    AwaitingCredentials,
    /// A code was sent to `email`
    AwaitingVerificationCode { email: String },
}

/// Which form the auth page shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthView {
    Login,
    Signup(SignupStep),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupOutcome {
    VerificationRequired { email: String },
    /// The account needs no confirmation; the login form is shown
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    SignedIn,
    /// Verified, but the automatic sign-in did not go through
    LoginRequired,
    /// The provider accepted the code but asks for more
    Pending,
}
