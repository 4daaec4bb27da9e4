//! Outcome of resolving a raw search query.

/// What the service should do with an incoming query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Send the user to a fully-formed destination URL.
    Redirect(String),
    /// Render the default informational page instead of redirecting.
    ShowDefault,
}

impl Resolution {
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect(_))
    }
}
