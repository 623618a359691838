use glam::Vec2;

/// User input the host forwards to a world. Points are in world
/// coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerMoved(Vec2),
    /// Press on a pet: starts a drag on the topmost pet under the point.
    DragBegin(Vec2),
    DragDelta(Vec2),
    DragEnd,
    RightClick(Vec2),
    /// Asks the pet under the point for a behavior right away.
    DoubleClick(Vec2),
    ToggleWallWalking(hecs::Entity),
    ToggleCornerTraversal(hecs::Entity),
    ToggleMouseChase(hecs::Entity),
    ToggleSleepMode(hecs::Entity),
    /// Play an animation chosen from the context menu.
    PlayAnimation {
        pet: hecs::Entity,
        animation: String,
        loops: u32,
    },
}
