mod boundary;
mod client;
mod types;

pub use boundary::{MessagingBoundary, SendFailure};
pub use client::SlackClient;
pub use types::{ChannelId, ChannelListing, ChannelPage, MessageTs, SenderIdentity};

#[cfg(test)]
pub(crate) mod fake;
