//! Screen and focus-region types.

/// Active screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Screen {
    /// File browser (default)
    #[default]
    Browser,
    Player,
    Image,
}

/// Player control strip, left to right.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    PlayPause,
    SeekBack,
    SeekForward,
    Back,
}

impl Control {
    pub const ALL: [Control; 4] = [
        Control::PlayPause,
        Control::SeekBack,
        Control::SeekForward,
        Control::Back,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::PlayPause => 0,
            Self::SeekBack => 1,
            Self::SeekForward => 2,
            Self::Back => 3,
        }
    }

    /// Neighbour to the left, clamped at the first control.
    pub fn prev(self) -> Self {
        Self::ALL[self.index().saturating_sub(1)]
    }

    /// Neighbour to the right, clamped at the last control.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1).min(Self::ALL.len() - 1)]
    }
}

/// Which screen is active and which sub-region holds focus.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScreenContext {
    pub screen: Screen,
    /// Browser header (layout toggle) focused instead of the list.
    pub header_focused: bool,
    /// Focused player control, `None` when no control has focus.
    pub control_focused: Option<Control>,
}
