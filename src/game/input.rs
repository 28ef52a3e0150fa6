//! Input aggregation - held keys and raw pointer deltas

/// Keys the simulation reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Forward,
    Back,
    Left,
    Right,
    Sprint,
    Jump,
}

/// Input for a single tick, sampled from [`InputState`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Forward axis (-1.0 = back, 1.0 = forward)
    pub forward: f32,
    /// Strafe axis (-1.0 = left, 1.0 = right)
    pub strafe: f32,
    pub sprint: bool,
    /// Jump was pressed since the last sample
    pub jump: bool,
    /// Fire was triggered since the last sample
    pub fire: bool,
    /// Pointer movement accumulated while captured
    pub look_dx: f32,
    pub look_dy: f32,
}

/// Currently held keys and pending pointer movement.
///
/// Holds nothing beyond the current key/mouse state: one-shot actions
/// (jump, fire) and pointer deltas are consumed by [`InputState::sample`].
#[derive(Debug, Clone, Default)]
pub struct InputState {
    forward: bool,
    back: bool,
    left: bool,
    right: bool,
    sprint: bool,
    jump_requested: bool,
    fire_requested: bool,
    pointer_captured: bool,
    pointer_dx: f32,
    pointer_dy: f32,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        match key {
            Key::Forward => self.forward = true,
            Key::Back => self.back = true,
            Key::Left => self.left = true,
            Key::Right => self.right = true,
            Key::Sprint => self.sprint = true,
            Key::Jump => self.jump_requested = true,
        }
    }

    pub fn key_up(&mut self, key: Key) {
        match key {
            Key::Forward => self.forward = false,
            Key::Back => self.back = false,
            Key::Left => self.left = false,
            Key::Right => self.right = false,
            Key::Sprint => self.sprint = false,
            Key::Jump => {}
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        match key {
            Key::Forward => self.forward,
            Key::Back => self.back,
            Key::Left => self.left,
            Key::Right => self.right,
            Key::Sprint => self.sprint,
            Key::Jump => false,
        }
    }

    /// Pointer capture toggled (pointer lock gained or lost).
    /// Losing capture discards any movement not yet sampled.
    pub fn set_pointer_captured(&mut self, captured: bool) {
        self.pointer_captured = captured;
        if !captured {
            self.pointer_dx = 0.0;
            self.pointer_dy = 0.0;
        }
    }

    pub fn pointer_captured(&self) -> bool {
        self.pointer_captured
    }

    /// Raw pointer movement; ignored unless the pointer is captured
    pub fn pointer_moved(&mut self, dx: f32, dy: f32) {
        if self.pointer_captured && dx.is_finite() && dy.is_finite() {
            self.pointer_dx += dx;
            self.pointer_dy += dy;
        }
    }

    pub fn request_fire(&mut self) {
        self.fire_requested = true;
    }

    /// Take the input for this tick and reset one-shot state
    pub fn sample(&mut self) -> TickInput {
        let input = TickInput {
            forward: axis(self.forward, self.back),
            strafe: axis(self.right, self.left),
            sprint: self.sprint,
            jump: self.jump_requested,
            fire: self.fire_requested,
            look_dx: self.pointer_dx,
            look_dy: self.pointer_dy,
        };
        self.jump_requested = false;
        self.fire_requested = false;
        self.pointer_dx = 0.0;
        self.pointer_dy = 0.0;
        input
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    match (positive, negative) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposing_keys_cancel() {
        let mut input = InputState::new();
        input.key_down(Key::Forward);
        input.key_down(Key::Back);
        input.key_down(Key::Right);
        let tick = input.sample();
        assert_eq!(tick.forward, 0.0);
        assert_eq!(tick.strafe, 1.0);
    }

    #[test]
    fn pointer_ignored_without_capture() {
        let mut input = InputState::new();
        input.pointer_moved(10.0, 5.0);
        assert_eq!(input.sample().look_dx, 0.0);

        input.set_pointer_captured(true);
        input.pointer_moved(10.0, 5.0);
        input.pointer_moved(2.0, -1.0);
        let tick = input.sample();
        assert_eq!(tick.look_dx, 12.0);
        assert_eq!(tick.look_dy, 4.0);
    }

    #[test]
    fn one_shot_actions_are_consumed_by_sample() {
        let mut input = InputState::new();
        input.key_down(Key::Jump);
        input.request_fire();
        let first = input.sample();
        assert!(first.jump && first.fire);
        let second = input.sample();
        assert!(!second.jump && !second.fire);
    }

    #[test]
    fn held_keys_survive_sampling() {
        let mut input = InputState::new();
        input.key_down(Key::Sprint);
        input.sample();
        assert!(input.sample().sprint);
        input.key_up(Key::Sprint);
        assert!(!input.sample().sprint);
    }
}
