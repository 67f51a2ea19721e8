//! Routes of the site and the navigation capability the form depends on

use std::fmt;

/// Pages served by the site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Landing,
    ThankYou,
}

impl Route {
    /// Path relative to the router's basename
    pub fn path(&self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::ThankYou => "/thank-you",
        }
    }

    /// Full path under the router's basename
    pub fn href(&self, basename: &str) -> String {
        let base = basename.trim_end_matches('/');
        match (base.is_empty(), self) {
            (true, _) => self.path().to_string(),
            (false, Route::Landing) => format!("{}/", base),
            (false, route) => format!("{}{}", base, route.path()),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Copy of the thank-you page
pub const THANK_YOU_TITLE: &str = "Thank You!";
pub const THANK_YOU_BODY: &str =
    "Your submission has been received. We will be in touch with your free SEO audit shortly.";

/// The routing layer hosting the form
pub trait Navigator: Send + Sync {
    /// Move the application to `href`
    fn navigate(&self, href: &str);
}
