//! Per-category behavioral variants.
//!
//! The session is polymorphic over {ordinary application window,
//! modal/system overlay window, input-method window}. Instead of an
//! inheritance hierarchy, each category provides a static table of
//! function pointers for the handful of overridden operations; the
//! category enum on the session selects the table.

use tracing::{debug, info};

use crate::config::FormFactor;
use crate::error::{SessionError, SessionResult};
use crate::types::{ModalityKind, PointerAction, PointerSample, WindowCategory, WindowFlags};

use super::core::SessionCore;

/// The overridable operation set of one window category.
pub struct CategoryPolicy {
    pub name: &'static str,
    /// Extra work before foregrounding on `show`.
    pub show_side_effects: fn(&mut SessionCore),
    /// Privilege check evaluated before `hide` mutates anything.
    pub hide_permission: fn(&SessionCore) -> SessionResult<()>,
    /// Extra work during `hide`, after deactivation.
    pub hide_side_effects: fn(&mut SessionCore),
    /// Extra work during a server-side disconnect.
    pub disconnect_side_effects: fn(&mut SessionCore),
    /// Category-specific ordering of raise / focus / dialog checks on
    /// pointer down.
    pub process_point_down: fn(&mut SessionCore, i32, i32) -> SessionResult<()>,
    /// Gate for key-event delivery.
    pub allow_key_event: fn(&SessionCore) -> SessionResult<()>,
    /// Gate for pointer-event dispatch.
    pub allow_pointer_dispatch: fn(&SessionCore, &PointerSample) -> bool,
    pub is_topmost: fn(&SessionCore) -> bool,
    pub is_modal: fn(&SessionCore) -> bool,
    pub is_application_modal: fn(&SessionCore) -> bool,
}

impl CategoryPolicy {
    pub fn for_category(category: WindowCategory) -> &'static CategoryPolicy {
        match category {
            WindowCategory::Application => &APPLICATION,
            WindowCategory::SystemOverlay => &SYSTEM_OVERLAY,
            WindowCategory::InputMethod => &INPUT_METHOD,
        }
    }
}

// --- Shared pieces ---

fn no_side_effects(_core: &mut SessionCore) {}

fn always_allowed(_core: &SessionCore) -> SessionResult<()> {
    Ok(())
}

fn dispatch_always(_core: &SessionCore, _sample: &PointerSample) -> bool {
    true
}

fn topmost_from_property(core: &SessionCore) -> bool {
    core.property.topmost
}

fn modal_from_property(core: &SessionCore) -> bool {
    core.property.modality != ModalityKind::NonModal
}

fn never_modal(_core: &SessionCore) -> bool {
    false
}

/// Large-screen form factors suppress dispatch to non-foreground windows,
/// except for the terminal pointer-leave event.
fn suppress_background_dispatch(core: &SessionCore, sample: &PointerSample) -> bool {
    if core.config.form_factor != FormFactor::LargeScreen {
        return true;
    }
    if core.is_session_foreground() {
        return true;
    }
    sample.action == PointerAction::Leave
}

fn camera_float_visibility(core: &mut SessionCore, shown: bool) {
    if core.property.has_flag(WindowFlags::CAMERA_FLOAT) {
        debug!(id = %core.info.id, shown, "camera float visibility change");
        core.ports
            .registry
            .notify_camera_float_visibility(core.info.id, shown);
    }
}

// --- Ordinary application window ---

fn application_point_down(core: &mut SessionCore, pos_x: i32, pos_y: i32) -> SessionResult<()> {
    let is_modal = modal_from_property(core);
    if !is_modal && core.check_dialog_on_foreground() {
        info!(id = %core.info.id, "blocking dialog foregrounded, raising it instead");
        core.handle_point_down_dialog();
        return Ok(());
    }
    if is_modal && !core.rect.contains_point(pos_x, pos_y) {
        debug!(id = %core.info.id, "click outside modal window");
    }
    core.ports.registry.present_focus(core.info.id);
    Ok(())
}

fn application_key_event(core: &SessionCore) -> SessionResult<()> {
    if core.check_dialog_on_foreground() {
        debug!(id = %core.info.id, "key event blocked by foreground dialog");
        return Err(SessionError::InvalidPermission);
    }
    Ok(())
}

fn application_is_application_modal(core: &SessionCore) -> bool {
    modal_from_property(core)
}

static APPLICATION: CategoryPolicy = CategoryPolicy {
    name: "application",
    show_side_effects: no_side_effects,
    hide_permission: always_allowed,
    hide_side_effects: no_side_effects,
    disconnect_side_effects: no_side_effects,
    process_point_down: application_point_down,
    allow_key_event: application_key_event,
    allow_pointer_dispatch: dispatch_always,
    is_topmost: topmost_from_property,
    is_modal: modal_from_property,
    is_application_modal: application_is_application_modal,
};

// --- Modal / system overlay window ---

fn overlay_show_side_effects(core: &mut SessionCore) {
    camera_float_visibility(core, true);
}

fn overlay_hide_permission(core: &SessionCore) -> SessionResult<()> {
    if core.property.protected_system_window && !core.ports.permissions.is_system_caller() {
        info!(id = %core.info.id, "hide denied for protected system window");
        return Err(SessionError::InvalidPermission);
    }
    Ok(())
}

fn overlay_hide_side_effects(core: &mut SessionCore) {
    camera_float_visibility(core, false);
}

fn overlay_disconnect_side_effects(core: &mut SessionCore) {
    camera_float_visibility(core, false);
}

fn overlay_point_down(core: &mut SessionCore, _pos_x: i32, _pos_y: i32) -> SessionResult<()> {
    if core.parent_has_foreground_dialog(false) {
        info!(id = %core.info.id, "parent has a foreground dialog");
        core.notify_parent_point_down_dialog();
        if !core.is_top_dialog() {
            return Ok(());
        }
    }
    if core.property.raise_enabled {
        core.ports.registry.raise_to_top(core.info.id);
    }
    core.ports.registry.present_focus(core.info.id);
    Ok(())
}

fn overlay_key_event(core: &SessionCore) -> SessionResult<()> {
    if core.parent_has_foreground_dialog(true) {
        debug!(id = %core.info.id, "key event blocked by parent's foreground dialog");
        return Err(SessionError::InvalidPermission);
    }
    Ok(())
}

fn overlay_is_application_modal(core: &SessionCore) -> bool {
    core.property.modality == ModalityKind::ApplicationModal
}

static SYSTEM_OVERLAY: CategoryPolicy = CategoryPolicy {
    name: "system-overlay",
    show_side_effects: overlay_show_side_effects,
    hide_permission: overlay_hide_permission,
    hide_side_effects: overlay_hide_side_effects,
    disconnect_side_effects: overlay_disconnect_side_effects,
    process_point_down: overlay_point_down,
    allow_key_event: overlay_key_event,
    allow_pointer_dispatch: suppress_background_dispatch,
    is_topmost: topmost_from_property,
    is_modal: modal_from_property,
    is_application_modal: overlay_is_application_modal,
};

// --- Input-method / keyboard window ---

fn input_method_hide_side_effects(core: &mut SessionCore) {
    core.ports
        .registry
        .notify_calling_window_restore(core.info.id);
}

fn input_method_disconnect_side_effects(core: &mut SessionCore) {
    core.ports
        .registry
        .notify_calling_window_restore(core.info.id);
}

fn input_method_point_down(core: &mut SessionCore, _x: i32, _y: i32) -> SessionResult<()> {
    // The keyboard never steals focus from its calling window.
    debug!(id = %core.info.id, "point down on input method window");
    Ok(())
}

static INPUT_METHOD: CategoryPolicy = CategoryPolicy {
    name: "input-method",
    show_side_effects: no_side_effects,
    hide_permission: always_allowed,
    hide_side_effects: input_method_hide_side_effects,
    disconnect_side_effects: input_method_disconnect_side_effects,
    process_point_down: input_method_point_down,
    allow_key_event: always_allowed,
    allow_pointer_dispatch: suppress_background_dispatch,
    is_topmost: topmost_from_property,
    is_modal: never_modal,
    is_application_modal: never_modal,
};
