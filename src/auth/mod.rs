/// Client-credentials token acquisition.
pub mod credentials;
/// Token caching and the authenticated session.
pub mod token;

pub use credentials::Credentials;
pub use token::Session;

/// Microsoft identity platform authority used when none is configured.
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";
/// Token scope for the Power Apps service.
pub const DEFAULT_SCOPE: &str = "https://service.powerapps.com/.default";
