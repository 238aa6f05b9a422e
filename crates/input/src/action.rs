use glam::Vec3;

/// A movement action the avatar understands.
///
/// Forward is -z and right is +x on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveForward,
    MoveBackward,
    MoveLeft,
    MoveRight,
    /// Hold to move faster.
    Surge,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::MoveForward,
        Action::MoveBackward,
        Action::MoveLeft,
        Action::MoveRight,
        Action::Surge,
    ];

    /// Default binding: WASD plus space. Case-insensitive.
    pub fn from_key(key: &str) -> Option<Action> {
        match key.to_ascii_lowercase().as_str() {
            "w" => Some(Action::MoveForward),
            "s" => Some(Action::MoveBackward),
            "a" => Some(Action::MoveLeft),
            "d" => Some(Action::MoveRight),
            " " | "space" => Some(Action::Surge),
            _ => None,
        }
    }

    fn bit(self) -> u8 {
        match self {
            Action::MoveForward => 1,
            Action::MoveBackward => 1 << 1,
            Action::MoveLeft => 1 << 2,
            Action::MoveRight => 1 << 3,
            Action::Surge => 1 << 4,
        }
    }
}

/// The set of actions currently held down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    held: u8,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State with exactly `actions` held.
    pub fn with(actions: &[Action]) -> Self {
        let mut state = Self::new();
        for &a in actions {
            state.press(a);
        }
        state
    }

    pub fn press(&mut self, action: Action) {
        self.held |= action.bit();
    }

    pub fn release(&mut self, action: Action) {
        self.held &= !action.bit();
    }

    /// Apply a key-down event. Unbound keys are ignored.
    pub fn key_down(&mut self, key: &str) {
        match Action::from_key(key) {
            Some(action) => self.press(action),
            None => tracing::trace!(key, "unbound key"),
        }
    }

    /// Apply a key-up event. Unbound keys are ignored.
    pub fn key_up(&mut self, key: &str) {
        if let Some(action) = Action::from_key(key) {
            self.release(action);
        }
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.held & action.bit() != 0
    }

    pub fn surging(&self) -> bool {
        self.is_held(Action::Surge)
    }

    /// Normalized movement direction on the ground plane, or zero when the
    /// held keys cancel out or nothing is held.
    pub fn heading(&self) -> Vec3 {
        let mut dir = Vec3::ZERO;
        if self.is_held(Action::MoveForward) {
            dir.z -= 1.0;
        }
        if self.is_held(Action::MoveBackward) {
            dir.z += 1.0;
        }
        if self.is_held(Action::MoveLeft) {
            dir.x -= 1.0;
        }
        if self.is_held(Action::MoveRight) {
            dir.x += 1.0;
        }
        dir.normalize_or_zero()
    }
}
