//! Action normalizer: turns raw actions into movement records.
//!
//! Only three shapes are movements:
//!
//! | Kind | Included when | Old location | New location |
//! |------|---------------|--------------|--------------|
//! | `createCard` | always | `Created` | `board / list` |
//! | `moveCardToBoard` | always | source board | `board / list` |
//! | `updateCard` | `listBefore` or `boardBefore` present | before values | after values |
//!
//! For `updateCard`, each axis missing a before/after value falls back to
//! the payload's current board or list. An included action whose payload
//! lacks the fields its kind requires is reported as malformed rather
//! than coerced.

use serde::Deserialize;

use crate::action::{ActionKind, RawEvent};
use crate::error::MalformedPayloadError;
use crate::id::CardId;
use crate::location::{AxisChange, Location};
use crate::movement::MovementRecord;

#[derive(Deserialize)]
struct Named {
    name: String,
}

#[derive(Deserialize)]
struct CardRef {
    #[serde(default)]
    id: Option<CardId>,
    name: String,
}

#[derive(Deserialize)]
struct CreatePayload {
    card: CardRef,
    board: Named,
    list: Named,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MovePayload {
    card: CardRef,
    board: Named,
    list: Named,
    board_source: Named,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePayload {
    card: CardRef,
    board: Named,
    list: Named,
    #[serde(default)]
    board_before: Option<Named>,
    #[serde(default)]
    board_after: Option<Named>,
    #[serde(default)]
    list_before: Option<Named>,
    #[serde(default)]
    list_after: Option<Named>,
}

impl UpdatePayload {
    fn board_axis(&self) -> AxisChange {
        AxisChange::resolve(
            self.board.name.clone(),
            self.board_before.as_ref().map(|b| b.name.clone()),
            self.board_after.as_ref().map(|b| b.name.clone()),
        )
    }

    fn list_axis(&self) -> AxisChange {
        AxisChange::resolve(
            self.list.name.clone(),
            self.list_before.as_ref().map(|l| l.name.clone()),
            self.list_after.as_ref().map(|l| l.name.clone()),
        )
    }
}

/// Whether an action describes a card movement.
#[must_use]
pub fn is_movement(event: &RawEvent) -> bool {
    match event.kind {
        ActionKind::CreateCard | ActionKind::MoveCardToBoard => true,
        ActionKind::UpdateCard => {
            event.has_data_field("listBefore") || event.has_data_field("boardBefore")
        }
        ActionKind::Other(_) => false,
    }
}

fn decode<'a, T: Deserialize<'a>>(event: &'a RawEvent) -> Result<T, MalformedPayloadError> {
    T::deserialize(&event.data).map_err(|source| MalformedPayloadError::Action {
        kind: event.kind.clone(),
        source,
    })
}

/// Normalize one action.
///
/// Returns `Ok(None)` for actions that are not movements.
///
/// # Errors
///
/// Returns [`MalformedPayloadError::Action`] when an included action lacks
/// the nested fields its kind requires.
pub fn normalize(event: &RawEvent) -> Result<Option<MovementRecord>, MalformedPayloadError> {
    if !is_movement(event) {
        return Ok(None);
    }

    let (card, old_location, new_location) = match event.kind {
        ActionKind::CreateCard => {
            let payload: CreatePayload = decode(event)?;
            (
                payload.card,
                Location::Created,
                Location::placed(payload.board.name, payload.list.name),
            )
        }
        ActionKind::MoveCardToBoard => {
            let payload: MovePayload = decode(event)?;
            (
                payload.card,
                Location::Board {
                    board: payload.board_source.name,
                },
                Location::placed(payload.board.name, payload.list.name),
            )
        }
        ActionKind::UpdateCard => {
            let payload: UpdatePayload = decode(event)?;
            let board = payload.board_axis();
            let list = payload.list_axis();
            (
                payload.card,
                Location::placed(board.before(), list.before()),
                Location::placed(board.after(), list.after()),
            )
        }
        ActionKind::Other(_) => return Ok(None),
    };

    Ok(Some(MovementRecord {
        card_id: card.id,
        card_name: card.name,
        old_location,
        new_location,
        timestamp: event.date,
    }))
}

/// Normalize a batch of actions, preserving input order.
///
/// # Errors
///
/// Stops at the first malformed action.
pub fn normalize_all(events: &[RawEvent]) -> Result<Vec<MovementRecord>, MalformedPayloadError> {
    let mut records = Vec::new();
    for event in events {
        if let Some(record) = normalize(event)? {
            records.push(record);
        }
    }
    Ok(records)
}
