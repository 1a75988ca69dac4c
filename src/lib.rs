pub mod api;
pub mod cli;
pub mod config;
pub mod geocoding;
pub mod guard;
pub mod media;
pub mod session;
pub mod state;

pub use api::{ApiClient, ClientError, ClientResult};
pub use config::Config;
pub use guard::{Access, Navigation, Navigator, RouteGuard, RouteTable};
pub use session::{Role, SessionStore};
