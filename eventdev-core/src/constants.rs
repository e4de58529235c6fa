pub const DEFAULT_API_URL: &str = "http://localhost:5122/api/v1";
pub const DEFAULT_CEP_URL: &str = "https://viacep.com.br/ws";

/// Roles the backend knows about.
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_COMMUNITY: &str = "community";

/// Seeded administrator account, treated as admin even without the role.
pub const ADMIN_EMAIL: &str = "admin@eventdev.com";

/// How many upcoming events the home screen shows.
pub const HOME_EVENT_LIMIT: usize = 4;
