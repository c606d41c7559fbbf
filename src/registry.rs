use arrayvec::ArrayString;
use heapless::Vec;

use crate::config::{ArmConfig, ConfigError};

pub const MAX_CHANNELS: usize = 8;
pub const MAX_CHANNEL_ID_LEN: usize = 8;
pub const MAX_CHANNEL_LABEL_LEN: usize = 16;

/// Identifier prefix on the wire: channels are addressed as `m1`..`mN`.
pub const CHANNEL_ID_PREFIX: char = 'm';

pub type ChannelId = ArrayString<MAX_CHANNEL_ID_LEN>;
pub type ChannelLabel = ArrayString<MAX_CHANNEL_LABEL_LEN>;

/// One controllable joint. Position and target are kept inside
/// `[min_deg, max_deg]` at all times after construction: targets are
/// clamped on write and the position only ever steps toward an in-range
/// target from an in-range start.
#[derive(Debug, Clone)]
pub struct Channel {
    id: ChannelId,
    label: ChannelLabel,
    position_deg: i16,
    target_deg: i16,
    min_deg: i16,
    max_deg: i16,
}

impl Channel {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn position_deg(&self) -> i16 {
        self.position_deg
    }

    pub fn target_deg(&self) -> i16 {
        self.target_deg
    }

    pub fn min_deg(&self) -> i16 {
        self.min_deg
    }

    pub fn max_deg(&self) -> i16 {
        self.max_deg
    }

    pub fn at_target(&self) -> bool {
        self.position_deg == self.target_deg
    }

    fn clamp(&self, angle_deg: i16) -> i16 {
        angle_deg.clamp(self.min_deg, self.max_deg)
    }
}

/// Fixed, ordered table of servo channels. Built once from an `ArmConfig`;
/// channels are never added, removed, or re-ranged afterwards. The registry
/// exclusively owns all channel state; the parser and stepper reach it only
/// through the methods here.
#[derive(Debug)]
pub struct ChannelRegistry {
    channels: Vec<Channel, MAX_CHANNELS>,
}

impl ChannelRegistry {
    pub fn from_config(config: &ArmConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut channels: Vec<Channel, MAX_CHANNELS> = Vec::new();
        for descriptor in &config.channels {
            let mut id = ChannelId::new();
            let mut label = ChannelLabel::new();
            for ch in descriptor.id.chars().take(MAX_CHANNEL_ID_LEN) {
                let _ = id.try_push(ch.to_ascii_lowercase());
            }
            for ch in descriptor.label.chars().take(MAX_CHANNEL_LABEL_LEN) {
                let _ = label.try_push(ch);
            }

            // Capacity was checked by validate(), so this push cannot fail.
            let _ = channels.push(Channel {
                id,
                label,
                position_deg: descriptor.initial_deg,
                target_deg: descriptor.initial_deg,
                min_deg: descriptor.min_deg,
                max_deg: descriptor.max_deg,
            });
        }

        Ok(Self { channels })
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channel(&self, index: usize) -> Option<&Channel> {
        self.channels.get(index)
    }

    /// Resolve a wire identifier to a channel index. Identifiers are
    /// case-insensitive and of the form `m<number>` with a 1-based number
    /// in `[1, channel_count]`, so `M1` and `m01` both resolve to index 0.
    pub fn lookup(&self, id: &str) -> Option<usize> {
        let mut chars = id.chars();
        if !chars.next()?.eq_ignore_ascii_case(&CHANNEL_ID_PREFIX) {
            return None;
        }

        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let number: usize = digits.parse().ok()?;
        if !(1..=self.channels.len()).contains(&number) {
            return None;
        }

        Some(number - 1)
    }

    /// Sole mutation path for targets: clamps the requested angle into the
    /// channel's safe range and stores it. Out-of-range requests are not
    /// rejected, only clamped — an operator command always takes effect.
    /// Returns the clamped target actually stored.
    pub fn apply_target(&mut self, index: usize, requested_deg: i16) -> Option<i16> {
        let channel = self.channels.get_mut(index)?;
        let clamped = channel.clamp(requested_deg);
        channel.target_deg = clamped;

        debug_assert!(
            channel.min_deg <= channel.target_deg && channel.target_deg <= channel.max_deg,
            "target {} outside [{}, {}] after clamp",
            channel.target_deg,
            channel.min_deg,
            channel.max_deg
        );

        Some(clamped)
    }

    /// Advance one channel's position toward its target by at most
    /// `max_step_deg`, returning the new position, or `None` when the
    /// channel is already at target (no actuation needed). The step
    /// magnitude is capped at the remaining gap, so the position never
    /// overshoots and never leaves the safe range.
    pub fn step_toward(&mut self, index: usize, max_step_deg: i16) -> Option<i16> {
        let channel = self.channels.get_mut(index)?;
        let diff = channel.target_deg - channel.position_deg;
        if diff == 0 {
            return None;
        }

        let step = max_step_deg.min(diff.abs());
        channel.position_deg += if diff < 0 { -step } else { step };

        debug_assert!(
            channel.min_deg <= channel.position_deg && channel.position_deg <= channel.max_deg,
            "position {} outside [{}, {}] after step",
            channel.position_deg,
            channel.min_deg,
            channel.max_deg
        );

        Some(channel.position_deg)
    }
}
