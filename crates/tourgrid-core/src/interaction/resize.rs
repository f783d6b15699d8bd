//! Column resize: `Idle -> Resizing -> Idle`.

/// Narrowest width a drag can produce.
pub const MIN_COLUMN_WIDTH: u32 = 50;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ResizeState {
    #[default]
    Idle,
    Resizing {
        column: String,
        start_x: i32,
        base_width: u32,
        width: u32,
    },
}

/// Width after dragging a handle `dx` from a column of `base` width.
pub fn resized_width(base: u32, dx: i64) -> u32 {
    let width = i64::from(base).saturating_add(dx);
    width.clamp(i64::from(MIN_COLUMN_WIDTH), i64::from(u32::MAX)) as u32
}

impl ResizeState {
    pub fn is_active(&self) -> bool {
        matches!(self, ResizeState::Resizing { .. })
    }

    /// The column being resized and its current width.
    pub fn active(&self) -> Option<(&str, u32)> {
        match self {
            ResizeState::Resizing { column, width, .. } => Some((column.as_str(), *width)),
            ResizeState::Idle => None,
        }
    }

    /// Pointer down on a resize handle. Replaces any resize in flight.
    pub fn begin(&mut self, column: &str, start_x: i32, base_width: u32) {
        *self = ResizeState::Resizing {
            column: column.to_string(),
            start_x,
            base_width,
            width: base_width,
        };
    }

    /// Pointer move. Returns the new width while resizing.
    pub fn track(&mut self, x: i32) -> Option<u32> {
        match self {
            ResizeState::Resizing {
                start_x,
                base_width,
                width,
                ..
            } => {
                *width = resized_width(*base_width, i64::from(x) - i64::from(*start_x));
                Some(*width)
            }
            ResizeState::Idle => None,
        }
    }

    /// Pointer up. Computes the final width from `x` and returns to idle.
    pub fn finish(&mut self, x: i32) -> Option<(String, u32)> {
        self.track(x)?;
        match std::mem::take(self) {
            ResizeState::Resizing { column, width, .. } => Some((column, width)),
            ResizeState::Idle => None,
        }
    }
}
