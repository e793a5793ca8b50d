//! HTTP handlers for the visitor-facing booking flow.
//!
//! Handlers stay thin: parse the request, call the service layer, decide
//! between a page (typed view model as JSON) and a redirect. Recoverable
//! conditions — no availability, an expired session, a rejected form —
//! become flash messages and redirects rather than error responses.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};

use super::dto::{
    AvailabilityResponse, ChooseRoomPage, HealthResponse, MakeReservationPage, Messages,
    RoomPage, RoomSearchForm, RoomsPage, SearchForm, SearchPage, StayView, SummaryPage,
};
use super::error::AppError;
use super::state::AppState;
use crate::models::StayRange;
use crate::services::{self, reservations, GuestForm, ServiceError};
use crate::session::Session;

/// Result type for handlers.
pub type HandlerResult = Result<Response, AppError>;

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult {
    let database = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database,
    })
    .into_response())
}

/// GET /search-availability
pub async fn search_availability(session: Session) -> HandlerResult {
    Ok(Json(SearchPage {
        messages: Messages::from_session(&session),
    })
    .into_response())
}

/// POST /search-availability — the "book now" search.
pub async fn post_search_availability(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SearchForm>,
) -> HandlerResult {
    let stay = match StayRange::parse(&form.start, &form.end) {
        Ok(stay) => stay,
        Err(_) => {
            session.put_error("Please pick a valid date range.");
            return Ok(Redirect::to("/search-availability").into_response());
        }
    };

    match reservations::search(state.repository.as_ref(), &session, stay).await {
        Ok(rooms) => Ok(Json(ChooseRoomPage {
            stay: stay.into(),
            rooms: rooms.into_iter().map(Into::into).collect(),
        })
        .into_response()),
        Err(ServiceError::NotAvailable) => {
            session.put_error("No availability");
            Ok(Redirect::to("/search-availability").into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// GET /rooms
pub async fn list_rooms(State(state): State<AppState>) -> HandlerResult {
    let rooms = state.repository.all_rooms().await?;
    Ok(Json(RoomsPage {
        rooms: rooms.into_iter().map(Into::into).collect(),
    })
    .into_response())
}

/// GET /rooms/{id} — a room's browse page.
pub async fn room_page(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> HandlerResult {
    let room = state.repository.room_by_id(id).await?;
    Ok(Json(RoomPage {
        room: room.into(),
        messages: Messages::from_session(&session),
    })
    .into_response())
}

/// POST /search-availability-by-id — room-scoped availability check.
pub async fn post_search_availability_by_id(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RoomSearchForm>,
) -> HandlerResult {
    let back = format!("/rooms/{}", form.room_id);
    let stay = match StayRange::parse(&form.start, &form.end) {
        Ok(stay) => stay,
        Err(_) => {
            session.put_error("Please pick a valid date range.");
            return Ok(Redirect::to(&back).into_response());
        }
    };

    match reservations::check_room(state.repository.as_ref(), &session, form.room_id, stay).await
    {
        Ok(_) => Ok(Redirect::to("/make-reservation").into_response()),
        Err(ServiceError::NotAvailable) => {
            session.put_error("Sorry, we don't have an available room for those dates.");
            Ok(Redirect::to(&back).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// GET /choose-room/{id}-{room_name}
///
/// The slug keeps the original URL shape; only the id part is trusted, the
/// room itself is loaded from the store.
pub async fn choose_room(
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
) -> HandlerResult {
    let id = slug
        .split_once('-')
        .map(|(id, _)| id)
        .unwrap_or(slug.as_str())
        .parse::<i64>()
        .map_err(|_| AppError::BadRequest(format!("bad room slug: {}", slug)))?;

    match reservations::choose_room(state.repository.as_ref(), &session, id).await {
        Ok(_) => Ok(Redirect::to("/make-reservation").into_response()),
        Err(ServiceError::SessionStateMissing(_)) => {
            session.put_error("Your booking session expired, please search again.");
            Ok(Redirect::to("/search-availability").into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// GET /make-reservation — the guest-details form.
pub async fn make_reservation(session: Session) -> HandlerResult {
    match reservations::reservation_form(&session) {
        Ok((stay, room)) => Ok(Json(MakeReservationPage::fresh(stay, room)).into_response()),
        Err(ServiceError::SessionStateMissing(_)) => {
            session.put_error("Your booking session expired, please search again.");
            Ok(Redirect::to("/search-availability").into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// POST /make-reservation — validate and commit.
pub async fn post_make_reservation(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<GuestForm>,
) -> HandlerResult {
    let echo = form.clone();
    match reservations::commit(state.repository.as_ref(), &session, &state.mailer, form).await {
        Ok(_) => Ok(Redirect::to("/reservation-summary").into_response()),
        Err(ServiceError::Validation(errors)) => {
            // redisplay with the draft intact and the fields the visitor typed
            let (stay, room) = reservations::reservation_form(&session)?;
            let mut page = MakeReservationPage::fresh(stay, room).with_errors(errors);
            page.form.first_name = echo.first_name;
            page.form.last_name = echo.last_name;
            page.form.email = echo.email;
            page.form.phone = echo.phone;
            Ok(Json(page).into_response())
        }
        Err(ServiceError::SessionStateMissing(_)) => {
            session.put_error("Your booking session expired, please search again.");
            Ok(Redirect::to("/search-availability").into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// GET /reservation-summary — shows a committed booking exactly once.
pub async fn reservation_summary(session: Session) -> HandlerResult {
    match reservations::summary(&session) {
        Ok(reservation) => {
            let stay: StayView = reservation.stay.into();
            Ok(Json(SummaryPage {
                reservation: reservation.into(),
                stay,
            })
            .into_response())
        }
        Err(ServiceError::SessionStateMissing(_)) => {
            session.put_error("Can not get data from the session!");
            Ok(Redirect::to("/search-availability").into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// POST /api/search-availability — JSON availability probe.
pub async fn api_search_availability(
    State(state): State<AppState>,
    Form(form): Form<RoomSearchForm>,
) -> HandlerResult {
    let stay = match StayRange::parse(&form.start, &form.end) {
        Ok(stay) => stay,
        Err(_) => {
            return Ok(Json(AvailabilityResponse {
                result: false,
                msg: "Invalid dates".to_string(),
            })
            .into_response())
        }
    };
    let free =
        services::availability::is_room_free_for(state.repository.as_ref(), form.room_id, stay)
            .await?;
    Ok(Json(AvailabilityResponse {
        result: free,
        msg: if free {
            "Available!".to_string()
        } else {
            "Already booked".to_string()
        },
    })
    .into_response())
}
