pub mod app_config;
pub mod cart_store;
pub mod discord;
pub mod events;
pub mod remote;
pub mod session_store;

pub use app_config::Config;
pub use cart_store::CartStore;
pub use discord::{DiscordNotifier, NotifiedItem};
pub use events::EventBus;
pub use remote::HttpBoothApi;
pub use session_store::SessionStore;
