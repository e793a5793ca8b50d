//! Month-grid rendering and calendar reconciliation.

mod support;

use std::collections::HashMap;
use std::sync::Arc;

use innkeep::db::{BookingRepository, ReservationRepository, RestrictionRepository};
use innkeep::models::{day_key, DayStatus, NewReservation};
use innkeep::services::{calendar, CalendarForm};

use support::{date, fresh_session, guest, seeded_repo, stay, CountingRepo};

fn form(entries: &[&str]) -> CalendarForm {
    CalendarForm::new(
        entries
            .iter()
            .map(|k| (k.to_string(), "1".to_string()))
            .collect::<HashMap<_, _>>(),
    )
}

/// Block days for a room in the current store state for May 2024.
async fn blocked_days(repo: &dyn BookingRepository, room_id: i64) -> Vec<String> {
    let mut days: Vec<String> = repo
        .restrictions_for_room_in_range(room_id, date("2024-05-01"), date("2024-05-31"))
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.kind.is_block())
        .map(|r| day_key(r.stay.start()))
        .collect();
    days.sort();
    days
}

#[tokio::test]
async fn grid_marks_reservations_blocks_and_free_days() {
    let repo = seeded_repo();
    let session = fresh_session();

    let reservation = repo
        .create_reservation(NewReservation {
            guest: guest("Ada", "Byron", "ada@example.com"),
            room_id: 1,
            stay: stay("2024-05-02", "2024-05-04"),
        })
        .await
        .unwrap();
    let block_id = repo.insert_block(1, date("2024-05-10")).await.unwrap();

    let grid = calendar::build_month_grid(repo.as_ref(), &session, 2024, 5)
        .await
        .unwrap();
    assert_eq!(grid.first_day, date("2024-05-01"));
    assert_eq!(grid.last_day, date("2024-05-31"));
    assert_eq!(grid.rooms.len(), 2);

    let room1 = grid
        .rooms
        .iter()
        .find(|rc| rc.room.id == 1)
        .expect("room 1 on the grid");
    assert_eq!(room1.days.len(), 31);
    assert_eq!(room1.days[&date("2024-05-01")], DayStatus::Free);
    // day span of the reservation is marked inclusive of both endpoints
    for day in ["2024-05-02", "2024-05-03", "2024-05-04"] {
        assert_eq!(
            room1.days[&date(day)],
            DayStatus::Reserved {
                reservation_id: reservation.id
            },
            "{} should be reserved",
            day
        );
    }
    assert_eq!(
        room1.days[&date("2024-05-10")],
        DayStatus::Blocked {
            restriction_id: block_id
        }
    );

    // the block sub-map was cached for the later save
    let cached = session.block_map(1).expect("cached block map");
    assert_eq!(cached.get("2024-05-10"), Some(&block_id));

    // the untouched room is entirely free
    let room2 = grid.rooms.iter().find(|rc| rc.room.id == 2).unwrap();
    assert!(room2.days.values().all(|status| status.is_free()));
    assert!(session.block_map(2).unwrap().is_empty());
}

#[tokio::test]
async fn absent_remove_checkbox_deletes_the_block_exactly_once() {
    let repo = Arc::new(CountingRepo::new(seeded_repo()));
    let session = fresh_session();

    let block_id = repo.insert_block(1, date("2024-05-10")).await.unwrap();
    calendar::build_month_grid(repo.as_ref(), &session, 2024, 5)
        .await
        .unwrap();

    // the posted form carries no remove checkbox for that block
    calendar::apply_calendar_edits(repo.as_ref(), &session, &form(&["y", "m"]), 2024, 5)
        .await
        .unwrap();

    assert_eq!(repo.delete_calls(), 1);
    assert!(repo
        .inner
        .delete_restriction(block_id)
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn present_remove_checkbox_keeps_the_block() {
    let repo = seeded_repo();
    let session = fresh_session();

    repo.insert_block(1, date("2024-05-10")).await.unwrap();
    calendar::build_month_grid(repo.as_ref(), &session, 2024, 5)
        .await
        .unwrap();

    // both cached day keys of the one-day block stay checked
    let checked = form(&["remove_block_1_2024-05-10", "remove_block_1_2024-05-11"]);
    calendar::apply_calendar_edits(repo.as_ref(), &session, &checked, 2024, 5)
        .await
        .unwrap();

    assert_eq!(blocked_days(repo.as_ref(), 1).await, vec!["2024-05-10"]);
}

#[tokio::test]
async fn add_checkbox_inserts_a_one_day_block() {
    let repo = seeded_repo();
    let session = fresh_session();

    calendar::build_month_grid(repo.as_ref(), &session, 2024, 5)
        .await
        .unwrap();
    calendar::apply_calendar_edits(
        repo.as_ref(),
        &session,
        &form(&["add_block_2_2024-05-20"]),
        2024,
        5,
    )
    .await
    .unwrap();

    assert_eq!(blocked_days(repo.as_ref(), 2).await, vec!["2024-05-20"]);

    // the room's dates are now unavailable to visitors
    assert!(!innkeep::services::availability::is_room_free(
        repo.as_ref(),
        2,
        date("2024-05-20"),
        date("2024-05-21")
    )
    .await
    .unwrap());
}

#[tokio::test]
async fn applying_the_same_form_twice_converges() {
    let repo = seeded_repo();
    let session = fresh_session();

    repo.insert_block(1, date("2024-05-10")).await.unwrap();
    repo.insert_block(2, date("2024-05-05")).await.unwrap();
    calendar::build_month_grid(repo.as_ref(), &session, 2024, 5)
        .await
        .unwrap();

    // keep room 1's block, drop room 2's, add one for room 1 on the 20th
    let posted = form(&[
        "remove_block_1_2024-05-10",
        "remove_block_1_2024-05-11",
        "add_block_1_2024-05-20",
    ]);

    calendar::apply_calendar_edits(repo.as_ref(), &session, &posted, 2024, 5)
        .await
        .unwrap();
    let after_first = (
        blocked_days(repo.as_ref(), 1).await,
        blocked_days(repo.as_ref(), 2).await,
    );
    assert_eq!(
        after_first,
        (
            vec!["2024-05-10".to_string(), "2024-05-20".to_string()],
            Vec::<String>::new()
        )
    );

    // the browser re-submits the identical form
    calendar::apply_calendar_edits(repo.as_ref(), &session, &posted, 2024, 5)
        .await
        .unwrap();
    let after_second = (
        blocked_days(repo.as_ref(), 1).await,
        blocked_days(repo.as_ref(), 2).await,
    );
    assert_eq!(after_first, after_second);
}

#[tokio::test]
async fn out_of_range_month_is_rejected() {
    let repo = seeded_repo();
    let session = fresh_session();
    assert!(calendar::build_month_grid(repo.as_ref(), &session, 2024, 13)
        .await
        .is_err());
}
