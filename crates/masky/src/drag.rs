//! Drag-and-drop interaction controller.
//!
//! [`DragController::handle`] is a pure transition function: it takes the
//! current session and one incoming [`DragEvent`] and returns the next
//! session. Every visible effect goes through the [`DragView`] it is given,
//! which keeps the state machine testable without a running app.

use bevy::prelude::*;
use strum::{Display, EnumIter};
use thiserror::Error;

use crate::geometry::{Bounds, is_on_target};

pub const TEXT_PLAIN: &str = "text/plain";

pub const MASK_ON: &str = "Bingo! Mask On";
pub const MASK_OFF: &str = "Mask off";

/// What the pointer did, from the point of view of the drop area.
///
/// Discriminants match the platform drag action codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum DragAction {
    Started = 1,
    Location = 2,
    Drop = 3,
    Ended = 4,
    Entered = 5,
    Exited = 6,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DragActionError {
    #[error("unknown drag action code {0}")]
    Unknown(i32),
}

impl TryFrom<i32> for DragAction {
    type Error = DragActionError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Started),
            2 => Ok(Self::Location),
            3 => Ok(Self::Drop),
            4 => Ok(Self::Ended),
            5 => Ok(Self::Entered),
            6 => Ok(Self::Exited),
            other => Err(DragActionError::Unknown(other)),
        }
    }
}

/// Data attached to a drag when it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragPayload {
    pub label: String,
    pub mime_type: String,
    pub text: String,
}

impl DragPayload {
    pub fn plain_text(text: &str) -> Self {
        Self {
            label: text.to_string(),
            mime_type: TEXT_PLAIN.to_string(),
            text: text.to_string(),
        }
    }

    /// The attached text, if the payload was declared as plain text.
    pub fn text(&self) -> Option<&str> {
        (self.mime_type == TEXT_PLAIN).then_some(self.text.as_str())
    }
}

/// One drag notification delivered to the drop area.
///
/// `code` is the platform action code and is decoded by the controller.
/// `position` is in drop-area space. `payload` is only read on `Started`.
#[derive(Event, Debug, Clone)]
pub struct DragEvent {
    pub code: i32,
    pub item: Entity,
    pub position: Vec2,
    pub payload: Option<DragPayload>,
}

impl DragEvent {
    pub const fn new(action: DragAction, item: Entity, position: Vec2) -> Self {
        Self {
            code: action as i32,
            item,
            position,
            payload: None,
        }
    }

    pub fn action(&self) -> Result<DragAction, DragActionError> {
        DragAction::try_from(self.code)
    }

    pub fn started(item: Entity, position: Vec2, payload: DragPayload) -> Self {
        Self {
            payload: Some(payload),
            ..Self::new(DragAction::Started, item, position)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Started,
    Entered,
    Location,
    Exited,
    Dropped,
}

/// The in-progress drag. At most one exists at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub item: Entity,
    pub payload: Option<DragPayload>,
    pub phase: DragPhase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DropOutcome {
    OnTarget,
    OffTarget,
}

impl DropOutcome {
    pub const fn from_hit(hit: bool) -> Self {
        if hit { Self::OnTarget } else { Self::OffTarget }
    }

    pub const fn message(self) -> &'static str {
        match self {
            Self::OnTarget => MASK_ON,
            Self::OffTarget => MASK_OFF,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragResponse {
    pub session: Option<DragSession>,
    /// False when the event did not belong to the current drag and was ignored.
    pub handled: bool,
    pub outcome: Option<DropOutcome>,
}

impl DragResponse {
    const fn handled(session: Option<DragSession>) -> Self {
        Self {
            session,
            handled: true,
            outcome: None,
        }
    }

    const fn ignored(session: Option<DragSession>) -> Self {
        Self {
            session,
            handled: false,
            outcome: None,
        }
    }
}

/// Everything the controller needs from the screen it runs on.
pub trait DragView {
    fn set_drop_area_opacity(&mut self, opacity: f32);
    fn set_item_visible(&mut self, item: Entity, visible: bool);
    /// Bounds of the item in its current parent's space.
    fn item_bounds(&self, item: Entity) -> Option<Bounds>;
    fn move_item(&mut self, item: Entity, bounds: Bounds);
    /// Detaches the item from its current container and adds it to the drop area.
    fn attach_to_drop_area(&mut self, item: Entity);
    /// The face zone, in drop-area space.
    fn target_zone(&self) -> Option<Bounds>;
    fn request_redraw(&mut self);
    fn notify(&mut self, message: &str);
}

#[derive(Debug, Clone, Copy)]
pub struct DragController {
    pub dim_opacity: f32,
}

impl Default for DragController {
    fn default() -> Self {
        Self { dim_opacity: 0.3 }
    }
}

impl DragController {
    pub fn handle(
        &self,
        session: Option<DragSession>,
        event: &DragEvent,
        view: &mut impl DragView,
    ) -> DragResponse {
        let action = match event.action() {
            Ok(action) => action,
            Err(err) => {
                warn!("{err} for {}, ignored", event.item);
                return DragResponse::ignored(session);
            }
        };

        let Some(mut current) = session else {
            return match action {
                DragAction::Started => {
                    let label = event
                        .payload
                        .as_ref()
                        .map_or("", |payload| payload.label.as_str());
                    info!("drag started on {} ({label})", event.item);
                    DragResponse::handled(Some(DragSession {
                        item: event.item,
                        payload: event.payload.clone(),
                        phase: DragPhase::Started,
                    }))
                }
                action => {
                    warn!("{action} without an active drag, ignored");
                    DragResponse::ignored(None)
                }
            };
        };

        if current.item != event.item {
            warn!(
                "{action} for {} while {} is being dragged, ignored",
                event.item, current.item
            );
            return DragResponse::ignored(Some(current));
        }

        match action {
            DragAction::Ended => {
                info!("drag ended on {}", current.item);
                view.set_item_visible(current.item, true);
                view.request_redraw();
                DragResponse::handled(None)
            }
            action if current.phase == DragPhase::Dropped => {
                warn!("{action} after drop, ignored");
                DragResponse::ignored(Some(current))
            }
            DragAction::Started => {
                warn!("{} is already being dragged, ignored", current.item);
                DragResponse::ignored(Some(current))
            }
            DragAction::Entered => {
                debug!("drag entered drop area");
                view.set_drop_area_opacity(self.dim_opacity);
                current.phase = DragPhase::Entered;
                DragResponse::handled(Some(current))
            }
            DragAction::Location => {
                current.phase = DragPhase::Location;
                DragResponse::handled(Some(current))
            }
            DragAction::Exited => {
                debug!("drag exited drop area");
                view.set_drop_area_opacity(1.0);
                view.set_item_visible(current.item, true);
                view.request_redraw();
                current.phase = DragPhase::Exited;
                DragResponse::handled(Some(current))
            }
            DragAction::Drop => {
                let outcome = self.drop_item(&current, event.position, view);
                current.phase = DragPhase::Dropped;
                DragResponse {
                    session: Some(current),
                    handled: true,
                    outcome: Some(outcome),
                }
            }
        }
    }

    fn drop_item(
        &self,
        session: &DragSession,
        point: Vec2,
        view: &mut impl DragView,
    ) -> DropOutcome {
        view.set_drop_area_opacity(1.0);

        if let Some(text) = session.payload.as_ref().and_then(DragPayload::text) {
            info!("dragged data {text}");
        }

        match view.item_bounds(session.item) {
            Some(bounds) => view.move_item(session.item, bounds.centered_on(point)),
            None => warn!("dropped item {} has no bounds, left in place", session.item),
        }
        view.attach_to_drop_area(session.item);

        let hit = view
            .target_zone()
            .is_some_and(|zone| is_on_target(point, &zone));
        let outcome = DropOutcome::from_hit(hit);

        info!("dropped at {point}: {outcome}");
        view.notify(outcome.message());
        outcome
    }
}
