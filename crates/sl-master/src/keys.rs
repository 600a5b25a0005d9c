/// Arrow-key state sampled by an input loop.
///
/// Up/down glide the tuning; left/right open and close the filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControlKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl ControlKeys {
    /// Tuning delta: up wins over down.
    pub fn tuning_delta(&self) -> i32 {
        if self.up {
            1
        } else if self.down {
            -1
        } else {
            0
        }
    }

    /// Cutoff delta: left wins over right.
    pub fn cutoff_delta(&self) -> i32 {
        if self.left {
            1
        } else if self.right {
            -1
        } else {
            0
        }
    }
}
