use serde::{Deserialize, Serialize};

/// How the drag combines with the existing selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectMode {
    /// Replace the selection.
    #[default]
    Set,
    /// Add to the selection.
    Add,
    /// Remove from the selection.
    Sub,
}

impl SelectMode {
    /// `extend` wins over `deselect` when both are requested.
    pub fn from_intents(extend: bool, deselect: bool) -> Self {
        if extend {
            SelectMode::Add
        } else if deselect {
            SelectMode::Sub
        } else {
            SelectMode::Set
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SelectMode::Set => "Set",
            SelectMode::Add => "Add",
            SelectMode::Sub => "Subtract",
        }
    }
}

/// Shape of the drag region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeStyle {
    #[default]
    Lasso,
    Box,
}

impl ShapeStyle {
    /// The scene toggle switches from the default lasso to a box.
    pub fn from_scene_toggle(box_mode: bool) -> Self {
        if box_mode {
            ShapeStyle::Box
        } else {
            ShapeStyle::Lasso
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ShapeStyle::Lasso => "Lasso",
            ShapeStyle::Box => "Box",
        }
    }

    /// Icon shown next to the scene toggle in the view header.
    pub fn icon_name(&self) -> &'static str {
        match self {
            ShapeStyle::Lasso => "select_lasso",
            ShapeStyle::Box => "select_box",
        }
    }
}

/// Flags carried by one invocation of the occlusion select action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OcclusionIntents {
    pub deselect: bool,
    pub extend: bool,
    pub backface_only: bool,
}

impl OcclusionIntents {
    pub fn mode(&self) -> SelectMode {
        SelectMode::from_intents(self.extend, self.deselect)
    }
}
