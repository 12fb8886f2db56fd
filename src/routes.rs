mod admin;
mod analytics;
mod health_check;
mod preferences;
mod subscriptions;

pub use admin::*;
pub use analytics::*;
pub use health_check::*;
pub use preferences::*;
pub use subscriptions::*;
