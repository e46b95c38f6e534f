//! Platform-agnostic input events and the per-frame input snapshot.
//!
//! Every backend maps its native input to [`InputEvent`]. The core never
//! sees raw platform input; screens read the aggregated [`FrameInput`].

use serde::{Deserialize, Serialize};

use crate::geometry::Vec2;

/// A platform-agnostic input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer moved to an absolute position.
    CursorMove { x: i32, y: i32 },
    /// Primary pointer button pressed at an absolute position.
    PointerClick { x: i32, y: i32 },
    /// Primary pointer button released.
    PointerRelease { x: i32, y: i32 },
    /// Scroll wheel moved. Positive is away from the user (scroll up).
    Wheel { dy: f32 },
    /// A mapped key was pressed.
    KeyPress(Key),
    /// Character typed.
    TextInput(char),
    /// The window was resized.
    Resized { width: u32, height: u32 },
    /// User requested quit (window close, etc.).
    Quit,
}

/// Keys the application reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Escape,
    Enter,
    Backspace,
    Space,
    Tab,
    Left,
    Right,
    Up,
    Down,
    Screenshot,
}

/// Everything the screens need to know about input for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    /// Pointer position at the end of the frame.
    pub pointer: Vec2,
    /// Position of a pointer press this frame (press edge, not held state).
    pub click: Option<Vec2>,
    /// Accumulated wheel delta this frame.
    pub wheel: f32,
    /// Keys pressed this frame, in order.
    pub keys: Vec<Key>,
    /// Characters typed this frame, in order.
    pub text: String,
    /// New window size if it changed this frame.
    pub resized: Option<(u32, u32)>,
    /// Whether the user asked to quit.
    pub quit: bool,
}

impl FrameInput {
    /// Fold a frame's worth of events into a snapshot.
    ///
    /// `pointer` is last frame's pointer position; it carries over when
    /// the pointer did not move.
    pub fn collect(pointer: Vec2, events: &[InputEvent]) -> Self {
        let mut input = Self {
            pointer,
            ..Self::default()
        };
        for event in events {
            match event {
                InputEvent::CursorMove { x, y } => {
                    input.pointer = Vec2::new(*x as f32, *y as f32);
                },
                InputEvent::PointerClick { x, y } => {
                    let p = Vec2::new(*x as f32, *y as f32);
                    input.pointer = p;
                    // Only the first press counts; one action per frame.
                    if input.click.is_none() {
                        input.click = Some(p);
                    }
                },
                InputEvent::PointerRelease { x, y } => {
                    input.pointer = Vec2::new(*x as f32, *y as f32);
                },
                InputEvent::Wheel { dy } => input.wheel += dy,
                InputEvent::KeyPress(key) => input.keys.push(*key),
                InputEvent::TextInput(ch) => input.text.push(*ch),
                InputEvent::Resized { width, height } => {
                    input.resized = Some((*width, *height));
                },
                InputEvent::Quit => input.quit = true,
            }
        }
        input
    }

    /// Whether `key` was pressed this frame.
    pub fn pressed(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    /// A copy with clicks, wheel, keys and text removed.
    ///
    /// Used for screens that are drawn but must not react to input.
    pub fn passive(&self) -> Self {
        Self {
            pointer: self.pointer,
            resized: self.resized,
            quit: self.quit,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_carries_over_without_motion() {
        let input = FrameInput::collect(Vec2::new(5.0, 6.0), &[]);
        assert_eq!(input.pointer, Vec2::new(5.0, 6.0));
        assert!(input.click.is_none());
    }

    #[test]
    fn click_sets_pointer_and_edge() {
        let input = FrameInput::collect(
            Vec2::ZERO,
            &[
                InputEvent::CursorMove { x: 1, y: 1 },
                InputEvent::PointerClick { x: 40, y: 50 },
                InputEvent::PointerRelease { x: 41, y: 50 },
            ],
        );
        assert_eq!(input.click, Some(Vec2::new(40.0, 50.0)));
        assert_eq!(input.pointer, Vec2::new(41.0, 50.0));
    }

    #[test]
    fn only_first_click_counts() {
        let input = FrameInput::collect(
            Vec2::ZERO,
            &[
                InputEvent::PointerClick { x: 1, y: 2 },
                InputEvent::PointerClick { x: 3, y: 4 },
            ],
        );
        assert_eq!(input.click, Some(Vec2::new(1.0, 2.0)));
    }

    #[test]
    fn wheel_accumulates() {
        let input = FrameInput::collect(
            Vec2::ZERO,
            &[InputEvent::Wheel { dy: 1.0 }, InputEvent::Wheel { dy: 2.0 }],
        );
        assert_eq!(input.wheel, 3.0);
    }

    #[test]
    fn keys_text_resize_quit() {
        let input = FrameInput::collect(
            Vec2::ZERO,
            &[
                InputEvent::KeyPress(Key::Enter),
                InputEvent::TextInput('a'),
                InputEvent::TextInput('b'),
                InputEvent::Resized {
                    width: 800,
                    height: 600,
                },
                InputEvent::Quit,
            ],
        );
        assert!(input.pressed(Key::Enter));
        assert!(!input.pressed(Key::Escape));
        assert_eq!(input.text, "ab");
        assert_eq!(input.resized, Some((800, 600)));
        assert!(input.quit);
    }

    #[test]
    fn passive_strips_actions() {
        let input = FrameInput::collect(
            Vec2::ZERO,
            &[
                InputEvent::PointerClick { x: 3, y: 4 },
                InputEvent::Wheel { dy: 1.0 },
                InputEvent::KeyPress(Key::Space),
                InputEvent::TextInput('x'),
            ],
        );
        let p = input.passive();
        assert_eq!(p.pointer, Vec2::new(3.0, 4.0));
        assert!(p.click.is_none());
        assert_eq!(p.wheel, 0.0);
        assert!(p.keys.is_empty());
        assert!(p.text.is_empty());
    }

    #[test]
    fn key_serde_roundtrip() {
        let json = serde_json::to_string(&Key::Screenshot).unwrap();
        let k: Key = serde_json::from_str(&json).unwrap();
        assert_eq!(k, Key::Screenshot);
    }
}
