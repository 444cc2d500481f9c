//! Behavior channels.

/// An independent behavior category with its own queue and consumer.
///
/// The variant order is the canonical activation order: when several
/// channels have instructions due on the same frame, they activate in
/// `Channel::ALL` order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Blink,
    Gaze,
    Head,
    Face,
    Gesture,
    Posture,
    Speech,
}

impl Channel {
    /// All channels in canonical activation order.
    pub const ALL: [Channel; 7] = [
        Channel::Blink,
        Channel::Gaze,
        Channel::Head,
        Channel::Face,
        Channel::Gesture,
        Channel::Posture,
        Channel::Speech,
    ];

    /// Number of channels.
    pub const COUNT: usize = Self::ALL.len();

    /// Stable index into per-channel arrays.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The channel's block key name.
    pub const fn name(self) -> &'static str {
        match self {
            Channel::Blink => "blink",
            Channel::Gaze => "gaze",
            Channel::Head => "head",
            Channel::Face => "face",
            Channel::Gesture => "gesture",
            Channel::Posture => "posture",
            Channel::Speech => "speech",
        }
    }

    /// Look up a channel by name, case-insensitively.
    ///
    /// Unknown names return `None`; callers skip them (forward
    /// compatibility with channels this build does not realize).
    pub fn from_name(name: &str) -> Option<Channel> {
        Channel::ALL
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }
}
