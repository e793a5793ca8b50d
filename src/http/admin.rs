//! Admin handlers: reservation review and the availability calendar.
//!
//! The `{src}` path segment ("all" or "new") records which listing the
//! administrator came from, so the redirects land back on it.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
    Form, Json,
};
use chrono::Datelike;

use super::dto::{
    AdminReservationDetailPage, AdminReservationsPage, CalendarPage, CalendarQuery, Messages,
};
use super::error::AppError;
use super::handlers::HandlerResult;
use super::state::AppState;
use crate::services::{calendar, reservations, CalendarForm, GuestForm, ServiceError};
use crate::session::Session;

fn listing_url(src: &str) -> String {
    format!("/admin/reservations-{}", src)
}

/// GET /admin/reservations-all
pub async fn all_reservations(State(state): State<AppState>, session: Session) -> HandlerResult {
    let reservations = reservations::all_reservations(state.repository.as_ref()).await?;
    Ok(Json(AdminReservationsPage {
        src: "all".to_string(),
        reservations: reservations.into_iter().map(Into::into).collect(),
        messages: Messages::from_session(&session),
    })
    .into_response())
}

/// GET /admin/reservations-new — bookings nobody has reviewed yet.
pub async fn new_reservations(State(state): State<AppState>, session: Session) -> HandlerResult {
    let reservations = reservations::new_reservations(state.repository.as_ref()).await?;
    Ok(Json(AdminReservationsPage {
        src: "new".to_string(),
        reservations: reservations.into_iter().map(Into::into).collect(),
        messages: Messages::from_session(&session),
    })
    .into_response())
}

/// GET /admin/reservations/{src}/{id}
pub async fn show_reservation(
    State(state): State<AppState>,
    Path((src, id)): Path<(String, i64)>,
) -> HandlerResult {
    let reservation = reservations::reservation_detail(state.repository.as_ref(), id).await?;
    Ok(Json(AdminReservationDetailPage {
        src,
        reservation: reservation.into(),
        errors: Default::default(),
    })
    .into_response())
}

/// POST /admin/reservations/{src}/{id} — save edited guest details.
pub async fn update_reservation(
    State(state): State<AppState>,
    session: Session,
    Path((src, id)): Path<(String, i64)>,
    Form(form): Form<GuestForm>,
) -> HandlerResult {
    match reservations::update_reservation(state.repository.as_ref(), id, form).await {
        Ok(()) => {
            session.put_flash("Changes saved!");
            Ok(Redirect::to(&listing_url(&src)).into_response())
        }
        Err(ServiceError::Validation(errors)) => {
            let reservation =
                reservations::reservation_detail(state.repository.as_ref(), id).await?;
            Ok(Json(AdminReservationDetailPage {
                src,
                reservation: reservation.into(),
                errors: errors.into_inner(),
            })
            .into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// GET /admin/process-reservation/{src}/{id}
pub async fn process_reservation(
    State(state): State<AppState>,
    session: Session,
    Path((src, id)): Path<(String, i64)>,
) -> HandlerResult {
    reservations::mark_processed(state.repository.as_ref(), id).await?;
    session.put_flash("Reservation is marked as processed!");
    Ok(Redirect::to(&listing_url(&src)).into_response())
}

/// GET /admin/delete-reservation/{src}/{id}
pub async fn delete_reservation(
    State(state): State<AppState>,
    session: Session,
    Path((src, id)): Path<(String, i64)>,
) -> HandlerResult {
    reservations::delete_reservation(state.repository.as_ref(), id).await?;
    session.put_flash("Reservation is deleted.");
    Ok(Redirect::to(&listing_url(&src)).into_response())
}

fn current_month() -> (i32, u32) {
    let today = chrono::Utc::now().date_naive();
    (today.year(), today.month())
}

/// GET /admin/reservations-calendar?y=&m=
pub async fn reservations_calendar(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CalendarQuery>,
) -> HandlerResult {
    let (default_year, default_month) = current_month();
    let year = query.y.unwrap_or(default_year);
    let month = query.m.unwrap_or(default_month);

    let grid =
        calendar::build_month_grid(state.repository.as_ref(), &session, year, month).await?;
    Ok(Json(CalendarPage::from_grid(grid, Messages::from_session(&session))).into_response())
}

/// POST /admin/reservations-calendar — save block edits.
///
/// The form is dynamic (`add_block_*` / `remove_block_*` checkbox names
/// plus `y` and `m`), so it arrives as a raw key/value map.
pub async fn post_reservations_calendar(
    State(state): State<AppState>,
    session: Session,
    Form(fields): Form<HashMap<String, String>>,
) -> HandlerResult {
    let (default_year, default_month) = current_month();
    let year = fields
        .get("y")
        .and_then(|v| v.parse().ok())
        .unwrap_or(default_year);
    let month = fields
        .get("m")
        .and_then(|v| v.parse().ok())
        .unwrap_or(default_month);

    let form = CalendarForm::new(fields);
    calendar::apply_calendar_edits(state.repository.as_ref(), &session, &form, year, month)
        .await
        .map_err(AppError::from)?;

    session.put_flash("Changes saved!");
    Ok(
        Redirect::to(&format!("/admin/reservations-calendar?y={}&m={}", year, month))
            .into_response(),
    )
}
