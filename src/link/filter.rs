//! Channel filter.
//!
//! Several opener pairs can share one frequency. Each pair agrees on a
//! logical channel number, and packets for other channels are dropped here
//! before they reach the tracker or dispatcher. Foreign traffic is routine,
//! so rejections are only traced, never reported as errors.

use log::trace;

use super::codec::Message;

#[derive(Debug, Clone, Copy)]
pub struct ChannelFilter {
    channel: u16,
}

impl ChannelFilter {
    pub fn new(channel: u16) -> Self {
        Self { channel }
    }

    /// `true` when `msg` is addressed to our channel.
    pub fn accept(&self, msg: &Message) -> bool {
        let ours = msg.channel == self.channel;
        if !ours {
            trace!("Filter: ignoring {} (our channel is {})", msg, self.channel);
        }
        ours
    }

    pub fn channel(&self) -> u16 {
        self.channel
    }
}
