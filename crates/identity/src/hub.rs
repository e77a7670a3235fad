use std::fmt;

/// Named notifications pushed by the identity client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubEvent {
    SignedIn,
    SignedOut,
    TokenRefresh,
    TokenRefreshFailure,
}

impl HubEvent {
    /// Wire-style event name
    pub fn name(&self) -> &'static str {
        match self {
            Self::SignedIn => "signedIn",
            Self::SignedOut => "signedOut",
            Self::TokenRefresh => "tokenRefresh",
            Self::TokenRefreshFailure => "tokenRefresh_failure",
        }
    }
}

impl fmt::Display for HubEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
