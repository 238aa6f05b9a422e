use crate::action::{Action, InputState};

/// Errors from parsing an input script.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("segment {segment:?} is not of the form keys:frames")]
    MalformedSegment { segment: String },
    #[error("unknown key {key:?} in segment {segment:?}")]
    UnknownKey { key: char, segment: String },
    #[error("invalid frame count in segment {segment:?}")]
    BadFrameCount { segment: String },
}

/// A canned sequence of held keys, used to drive the avatar headlessly.
///
/// Written as comma-separated `keys:frames` segments, e.g. `d:120,wd:60,-:30`.
/// `-` holds nothing and `_` holds surge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputScript {
    segments: Vec<(InputState, u32)>,
}

impl InputScript {
    pub fn parse(text: &str) -> Result<Self, InputError> {
        let mut segments = Vec::new();
        for raw in text.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (keys, frames) = raw
                .split_once(':')
                .ok_or_else(|| InputError::MalformedSegment {
                    segment: raw.to_string(),
                })?;
            let frames: u32 = frames
                .trim()
                .parse()
                .map_err(|_| InputError::BadFrameCount {
                    segment: raw.to_string(),
                })?;

            let mut state = InputState::new();
            for key in keys.chars().filter(|c| *c != '-') {
                let action = if key == '_' {
                    Some(Action::Surge)
                } else {
                    Action::from_key(key.encode_utf8(&mut [0; 4]))
                };
                match action {
                    Some(a) => state.press(a),
                    None => {
                        return Err(InputError::UnknownKey {
                            key,
                            segment: raw.to_string(),
                        });
                    }
                }
            }
            segments.push((state, frames));
        }
        Ok(Self { segments })
    }

    /// Total frames covered by the script.
    pub fn len(&self) -> u64 {
        self.segments.iter().map(|(_, n)| *n as u64).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Input held on `frame` (0-based). Past the end nothing is held.
    pub fn state_at(&self, frame: u64) -> InputState {
        let mut remaining = frame;
        for (state, frames) in &self.segments {
            if remaining < *frames as u64 {
                return *state;
            }
            remaining -= *frames as u64;
        }
        InputState::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_lookup() {
        let script = InputScript::parse("d:3, wd:2,-:1").unwrap();
        assert_eq!(script.len(), 6);
        assert!(script.state_at(0).is_held(Action::MoveRight));
        assert!(script.state_at(3).is_held(Action::MoveForward));
        assert!(script.state_at(4).is_held(Action::MoveRight));
        assert_eq!(script.state_at(5), InputState::new());
        assert_eq!(script.state_at(100), InputState::new());
    }

    #[test]
    fn surge_marker() {
        let script = InputScript::parse("w_:10").unwrap();
        assert!(script.state_at(0).surging());
    }

    #[test]
    fn empty_script() {
        let script = InputScript::parse("").unwrap();
        assert!(script.is_empty());
    }

    #[test]
    fn errors_name_the_segment() {
        assert!(matches!(
            InputScript::parse("w10"),
            Err(InputError::MalformedSegment { .. })
        ));
        assert!(matches!(
            InputScript::parse("q:10"),
            Err(InputError::UnknownKey { key: 'q', .. })
        ));
        assert!(matches!(
            InputScript::parse("w:ten"),
            Err(InputError::BadFrameCount { .. })
        ));
    }
}
