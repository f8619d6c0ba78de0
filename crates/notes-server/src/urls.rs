//! Named route table.
//!
//! Routes are registered from this table and every redirect is computed by
//! reversing a name through it, so a path is spelled out exactly once.

use serde::Serialize;

/// Every named page of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RouteName {
    #[serde(rename = "notes:home")]
    Home,
    #[serde(rename = "notes:list")]
    List,
    #[serde(rename = "notes:add")]
    Add,
    #[serde(rename = "notes:success")]
    Success,
    #[serde(rename = "notes:detail")]
    Detail,
    #[serde(rename = "notes:edit")]
    Edit,
    #[serde(rename = "notes:delete")]
    Delete,
    #[serde(rename = "users:login")]
    Login,
    #[serde(rename = "users:logout")]
    Logout,
    #[serde(rename = "users:signup")]
    Signup,
    #[serde(rename = "health")]
    Health,
}

impl RouteName {
    pub const ALL: [RouteName; 11] = [
        Self::Home,
        Self::List,
        Self::Add,
        Self::Success,
        Self::Detail,
        Self::Edit,
        Self::Delete,
        Self::Login,
        Self::Logout,
        Self::Signup,
        Self::Health,
    ];

    /// Namespaced name, e.g. `notes:detail`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "notes:home",
            Self::List => "notes:list",
            Self::Add => "notes:add",
            Self::Success => "notes:success",
            Self::Detail => "notes:detail",
            Self::Edit => "notes:edit",
            Self::Delete => "notes:delete",
            Self::Login => "users:login",
            Self::Logout => "users:logout",
            Self::Signup => "users:signup",
            Self::Health => "health",
        }
    }

    fn default_pattern(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::List => "/notes/",
            Self::Add => "/add/",
            Self::Success => "/done/",
            Self::Detail => "/note/{slug}/",
            Self::Edit => "/edit/{slug}/",
            Self::Delete => "/delete/{slug}/",
            Self::Login => "/auth/login/",
            Self::Logout => "/auth/logout/",
            Self::Signup => "/auth/signup/",
            Self::Health => "/health",
        }
    }
}

impl std::fmt::Display for RouteName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Path patterns by route name, in axum's `{param}` syntax.
#[derive(Debug, Clone)]
pub struct RouteTable {
    patterns: Vec<(RouteName, String)>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            patterns: RouteName::ALL
                .iter()
                .map(|name| (*name, name.default_pattern().to_string()))
                .collect(),
        }
    }
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The axum path pattern registered for `name`.
    pub fn pattern(&self, name: RouteName) -> &str {
        self.patterns
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, p)| p.as_str())
            .unwrap_or_else(|| name.default_pattern())
    }

    /// Build the URL of `name`, filling `{param}` segments from `args` in
    /// order. Unfilled segments are left as they are.
    pub fn reverse(&self, name: RouteName, args: &[&str]) -> String {
        let mut args = args.iter();
        self.pattern(name)
            .split('/')
            .map(|segment| {
                if segment.starts_with('{') && segment.ends_with('}') {
                    args.next().copied().unwrap_or(segment)
                } else {
                    segment
                }
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Login page URL that comes back to `next` afterwards.
    ///
    /// `next` is form-encoded with `/` kept readable.
    pub fn login_redirect(&self, next: &str) -> String {
        let login = self.reverse(RouteName::Login, &[]);
        match serde_urlencoded::to_string([("next", next)]) {
            Ok(query) => format!("{login}?{}", query.replace("%2F", "/")),
            Err(_) => login,
        }
    }

    /// Whether `target` is a path on this site, safe to redirect to.
    pub fn is_local(target: &str) -> bool {
        target.starts_with('/') && !target.starts_with("//") && !target.contains('\\')
    }
}
