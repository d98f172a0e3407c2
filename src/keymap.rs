//! Drag gesture bindings for the occlusion select action.
//!
//! Each registration hands back a [`KeymapHandle`]; whoever registered a
//! binding owns it and removes it with [`KeymapRegistry::unregister`].

use bevy::input::ButtonInput;
use bevy::prelude::{KeyCode, MouseButton, Resource};

use crate::session::OcclusionIntents;

/// Modifier keys held when a drag starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
    };

    pub fn from_keyboard(keys: &ButtonInput<KeyCode>) -> Self {
        Self {
            shift: keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]),
            ctrl: keys.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]),
            alt: keys.any_pressed([KeyCode::AltLeft, KeyCode::AltRight]),
        }
    }
}

/// Mouse button plus exact modifier state that starts a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DragChord {
    pub button: MouseButton,
    pub modifiers: Modifiers,
}

impl DragChord {
    pub fn new(button: MouseButton, modifiers: Modifiers) -> Self {
        Self { button, modifiers }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub chord: DragChord,
    pub intents: OcclusionIntents,
}

/// Owner's handle to one registered binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeymapHandle(u32);

/// A binding of another tool that shares a chord with one of ours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeymapConflict {
    pub handle: KeymapHandle,
    pub chord: DragChord,
    pub other_tool: String,
}

#[derive(Resource, Default, Debug)]
pub struct KeymapRegistry {
    bindings: Vec<(KeymapHandle, KeyBinding)>,
    next_id: u32,
}

impl KeymapRegistry {
    pub fn register(&mut self, binding: KeyBinding) -> KeymapHandle {
        self.next_id += 1;
        let handle = KeymapHandle(self.next_id);
        self.bindings.push((handle, binding));
        handle
    }

    /// Right-button drag: plain sets, Shift extends, Ctrl deselects, Alt
    /// keeps backfaces only.
    pub fn register_defaults(&mut self) -> Vec<KeymapHandle> {
        let button = MouseButton::Right;
        let defaults = [
            (Modifiers::NONE, OcclusionIntents::default()),
            (
                Modifiers { shift: true, ..Modifiers::NONE },
                OcclusionIntents { extend: true, ..Default::default() },
            ),
            (
                Modifiers { ctrl: true, ..Modifiers::NONE },
                OcclusionIntents { deselect: true, ..Default::default() },
            ),
            (
                Modifiers { alt: true, ..Modifiers::NONE },
                OcclusionIntents { backface_only: true, ..Default::default() },
            ),
        ];

        defaults
            .into_iter()
            .map(|(modifiers, intents)| {
                self.register(KeyBinding {
                    chord: DragChord::new(button, modifiers),
                    intents,
                })
            })
            .collect()
    }

    pub fn unregister(&mut self, handle: KeymapHandle) -> Option<KeyBinding> {
        let index = self.bindings.iter().position(|(h, _)| *h == handle)?;
        Some(self.bindings.remove(index).1)
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn get(&self, handle: KeymapHandle) -> Option<&KeyBinding> {
        self.bindings.iter().find(|(h, _)| *h == handle).map(|(_, b)| b)
    }

    /// Whether any binding starts on `button`.
    pub fn uses_button(&self, button: MouseButton) -> bool {
        self.bindings.iter().any(|(_, b)| b.chord.button == button)
    }

    /// Intents bound to an exact chord. The first registration wins.
    pub fn resolve(&self, chord: DragChord) -> Option<OcclusionIntents> {
        self.bindings
            .iter()
            .find(|(_, b)| b.chord == chord)
            .map(|(_, b)| b.intents)
    }

    /// Bindings of other tools that would fire on the same chord as ours.
    pub fn conflicts<'a>(
        &self,
        others: impl IntoIterator<Item = (&'a str, DragChord)>,
    ) -> Vec<KeymapConflict> {
        let mut conflicts = Vec::new();
        for (tool, chord) in others {
            for (handle, binding) in &self.bindings {
                if binding.chord == chord {
                    conflicts.push(KeymapConflict {
                        handle: *handle,
                        chord,
                        other_tool: tool.to_string(),
                    });
                }
            }
        }
        conflicts
    }
}
