//! Routes of the interactive shell and the sign-in guard

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Route {
    Login,
    #[default]
    Catalog,
    Chat,
    Profile,
    Settings,
}

impl Route {
    /// Entries of the sidebar, in display order
    pub const NAV: [Route; 4] = [Route::Catalog, Route::Chat, Route::Profile, Route::Settings];

    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Sign in",
            Route::Catalog => "Programs",
            Route::Chat => "Advisor",
            Route::Profile => "Profile",
            Route::Settings => "Settings",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Route::Login => "🔑",
            Route::Catalog => "🎓",
            Route::Chat => "💬",
            Route::Profile => "👤",
            Route::Settings => "⚙",
        }
    }

    /// Everything except the sign-in screen needs a session
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login)
    }

    /// Where a request for `self` actually lands.
    ///
    /// Signed-out users are sent to `Login`; signed-in users skip it.
    pub fn resolve(self, signed_in: bool) -> Route {
        match (self, signed_in) {
            (route, false) if route.is_protected() => Route::Login,
            (Route::Login, true) => Route::Catalog,
            (route, _) => route,
        }
    }

    pub fn parse(s: &str) -> Option<Route> {
        match s.trim().to_ascii_lowercase().as_str() {
            "login" => Some(Route::Login),
            "catalog" | "programs" | "" => Some(Route::Catalog),
            "chat" | "advisor" => Some(Route::Chat),
            "profile" => Some(Route::Profile),
            "settings" => Some(Route::Settings),
            _ => None,
        }
    }

    /// Next sidebar entry, wrapping around
    pub fn next(self) -> Route {
        let pos = Self::NAV.iter().position(|r| *r == self).unwrap_or(0);
        Self::NAV[(pos + 1) % Self::NAV.len()]
    }

    pub fn previous(self) -> Route {
        let pos = Self::NAV.iter().position(|r| *r == self).unwrap_or(0);
        Self::NAV[(pos + Self::NAV.len() - 1) % Self::NAV.len()]
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_out_is_sent_to_login() {
        for route in Route::NAV {
            assert_eq!(route.resolve(false), Route::Login);
        }
        assert_eq!(Route::Login.resolve(false), Route::Login);
    }

    #[test]
    fn test_signed_in_skips_login() {
        assert_eq!(Route::Login.resolve(true), Route::Catalog);
        assert_eq!(Route::Chat.resolve(true), Route::Chat);
        assert_eq!(Route::Settings.resolve(true), Route::Settings);
    }

    #[test]
    fn test_cycle_wraps() {
        assert_eq!(Route::Settings.next(), Route::Catalog);
        assert_eq!(Route::Catalog.previous(), Route::Settings);
        assert_eq!(Route::Login.next(), Route::Chat);
    }

    #[test]
    fn test_parse() {
        assert_eq!(Route::parse("Chat"), Some(Route::Chat));
        assert_eq!(Route::parse("programs"), Some(Route::Catalog));
        assert_eq!(Route::parse("nope"), None);
    }
}
