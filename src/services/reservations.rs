//! The reservation workflow and the admin reservation operations.
//!
//! A booking is assembled across requests through the session-carried
//! [`DraftReservation`]:
//!
//! 1. a successful availability search stores `DatesChosen`;
//! 2. picking a room (directly or via a room-scoped check) advances it to
//!    `RoomChosen`;
//! 3. valid guest details commit the reservation — one transaction writes
//!    the reservation row and its paired restriction — and the draft
//!    becomes `Committed`;
//! 4. the summary consumes the `Committed` draft exactly once.
//!
//! Consistency is re-validated against the store at commit time only; two
//! sessions can still race between "room found free" and "restriction
//! recorded" (see the crate docs — this window is known and accepted).

use crate::db::BookingRepository;
use crate::models::{
    DraftReservation, NewReservation, Reservation, Room, StayRange,
};
use crate::session::Session;

use super::availability;
use super::error::{ServiceError, ServiceResult};
use super::forms::GuestForm;
use super::mailer::{confirmation_email, MailSender};

/// Stage 1 — availability search.
///
/// On success a fresh `DatesChosen` draft replaces whatever draft the
/// session held. With no free rooms, `NotAvailable` is returned and the
/// session is left as it was.
pub async fn search(
    repo: &dyn BookingRepository,
    session: &Session,
    stay: StayRange,
) -> ServiceResult<Vec<Room>> {
    let rooms = availability::free_rooms_for(repo, stay).await?;
    if rooms.is_empty() {
        return Err(ServiceError::NotAvailable);
    }
    session.put_draft(&DraftReservation::new(stay));
    Ok(rooms)
}

/// Stage 2a — the visitor picked a room from the search results.
///
/// The room is re-validated against the store (the original trusted the id
/// and name from the URL).
pub async fn choose_room(
    repo: &dyn BookingRepository,
    session: &Session,
    room_id: i64,
) -> ServiceResult<Room> {
    let draft = session
        .draft()
        .ok_or(ServiceError::SessionStateMissing("no dates chosen yet"))?;
    let room = repo.room_by_id(room_id).await?;
    let draft = draft
        .with_room(room.clone())
        .ok_or(ServiceError::SessionStateMissing("booking already committed"))?;
    session.put_draft(&draft);
    Ok(room)
}

/// Stage 2b — room-scoped availability check from a room page.
///
/// Unlike [`search`], the dates come in together with the room. When the
/// room is free, the draft jumps straight to `RoomChosen`; when it is not,
/// the existing draft is left untouched and `NotAvailable` is returned so
/// the caller can send the visitor back to browsing.
pub async fn check_room(
    repo: &dyn BookingRepository,
    session: &Session,
    room_id: i64,
    stay: StayRange,
) -> ServiceResult<Room> {
    if !availability::is_room_free_for(repo, room_id, stay).await? {
        return Err(ServiceError::NotAvailable);
    }
    let room = repo.room_by_id(room_id).await?;
    session.put_draft(&DraftReservation::RoomChosen {
        stay,
        room: room.clone(),
    });
    Ok(room)
}

/// Stage 3 (GET) — data for the guest-details form.
pub fn reservation_form(session: &Session) -> ServiceResult<(StayRange, Room)> {
    let draft = session
        .draft()
        .ok_or(ServiceError::SessionStateMissing("no booking in progress"))?;
    let room = draft
        .room()
        .cloned()
        .ok_or(ServiceError::SessionStateMissing("no room chosen yet"))?;
    Ok((draft.stay(), room))
}

/// Stage 3 (POST) — validate guest details and commit.
///
/// Validation problems come back as `Validation` with the draft untouched,
/// so the form can be redisplayed pre-filled. On success the reservation
/// and its paired restriction are written in one transaction, the
/// confirmation mail is queued (fire-and-forget) and the draft advances to
/// `Committed` for the summary page.
pub async fn commit(
    repo: &dyn BookingRepository,
    session: &Session,
    mailer: &MailSender,
    form: GuestForm,
) -> ServiceResult<Reservation> {
    let draft = session
        .draft()
        .ok_or(ServiceError::SessionStateMissing("no booking in progress"))?;
    let room = draft
        .room()
        .cloned()
        .ok_or(ServiceError::SessionStateMissing("no room chosen yet"))?;

    let guest = form.validate().map_err(ServiceError::Validation)?;

    let reservation = repo
        .create_reservation(NewReservation {
            guest,
            room_id: room.id,
            stay: draft.stay(),
        })
        .await?;

    mailer.enqueue(confirmation_email(&reservation));

    session.put_draft(&DraftReservation::Committed {
        reservation: reservation.clone(),
    });
    Ok(reservation)
}

/// Terminal stage — the summary page, readable exactly once.
///
/// Only a `Committed` draft is consumed; a draft still mid-flow is left in
/// place (refreshing the summary after looking at it, or visiting it cold,
/// both land here with `SessionStateMissing`).
pub fn summary(session: &Session) -> ServiceResult<Reservation> {
    let draft = session
        .draft()
        .ok_or(ServiceError::SessionStateMissing("nothing was booked"))?;
    match draft.committed() {
        Some(reservation) => {
            let reservation = reservation.clone();
            session.remove_draft();
            Ok(reservation)
        }
        None => Err(ServiceError::SessionStateMissing("nothing was booked")),
    }
}

// ── admin operations ─────────────────────────────────────────────────

pub async fn all_reservations(repo: &dyn BookingRepository) -> ServiceResult<Vec<Reservation>> {
    Ok(repo.all_reservations().await?)
}

/// Reservations not yet reviewed by staff.
pub async fn new_reservations(repo: &dyn BookingRepository) -> ServiceResult<Vec<Reservation>> {
    Ok(repo.new_reservations().await?)
}

pub async fn reservation_detail(
    repo: &dyn BookingRepository,
    id: i64,
) -> ServiceResult<Reservation> {
    Ok(repo.reservation_by_id(id).await?)
}

/// Update guest contact fields from the admin detail form.
pub async fn update_reservation(
    repo: &dyn BookingRepository,
    id: i64,
    form: GuestForm,
) -> ServiceResult<()> {
    let guest = form.validate().map_err(ServiceError::Validation)?;
    Ok(repo.update_guest_details(id, &guest).await?)
}

pub async fn mark_processed(repo: &dyn BookingRepository, id: i64) -> ServiceResult<()> {
    Ok(repo.set_processed(id, true).await?)
}

/// Delete a reservation; its paired restriction goes with it.
pub async fn delete_reservation(repo: &dyn BookingRepository, id: i64) -> ServiceResult<()> {
    Ok(repo.delete_reservation(id).await?)
}
