mod file;
mod settings;

pub use file::{BroadcastConfig, ChannelList};
pub use settings::{
    BroadcastSettings, Settings, SlackConfig, load_broadcast_settings, load_settings,
};
