//! Availability engine behaviour against a seeded store.

mod support;

use innkeep::db::{ReservationRepository, RestrictionRepository};
use innkeep::models::NewReservation;
use innkeep::services::{availability, ServiceError};

use support::{date, guest, seeded_repo, stay};

#[tokio::test]
async fn room_with_no_restrictions_is_free() {
    let repo = seeded_repo();
    let free = availability::is_room_free(repo.as_ref(), 1, date("2024-05-01"), date("2024-05-03"))
        .await
        .unwrap();
    assert!(free);
}

#[tokio::test]
async fn overlapping_reservation_blocks_the_room() {
    let repo = seeded_repo();
    repo.create_reservation(NewReservation {
        guest: guest("Ada", "Byron", "ada@example.com"),
        room_id: 1,
        stay: stay("2024-05-02", "2024-05-04"),
    })
    .await
    .unwrap();

    // overlap on 05-02
    let free = availability::is_room_free(repo.as_ref(), 1, date("2024-05-01"), date("2024-05-03"))
        .await
        .unwrap();
    assert!(!free);

    // the other room is untouched
    assert!(availability::is_room_free(
        repo.as_ref(),
        2,
        date("2024-05-01"),
        date("2024-05-03")
    )
    .await
    .unwrap());
}

#[tokio::test]
async fn back_to_back_stays_do_not_collide() {
    let repo = seeded_repo();
    repo.create_reservation(NewReservation {
        guest: guest("Ada", "Byron", "ada@example.com"),
        room_id: 1,
        stay: stay("2024-05-01", "2024-05-03"),
    })
    .await
    .unwrap();

    // checking in on the previous guest's checkout day is fine
    assert!(availability::is_room_free(
        repo.as_ref(),
        1,
        date("2024-05-03"),
        date("2024-05-05")
    )
    .await
    .unwrap());
}

#[tokio::test]
async fn blocks_count_the_same_as_reservations() {
    let repo = seeded_repo();
    repo.insert_block(1, date("2024-05-02")).await.unwrap();

    assert!(!availability::is_room_free(
        repo.as_ref(),
        1,
        date("2024-05-01"),
        date("2024-05-03")
    )
    .await
    .unwrap());
}

#[tokio::test]
async fn empty_and_inverted_ranges_are_invalid_for_both_entry_points() {
    let repo = seeded_repo();
    let day = date("2024-05-01");

    let err = availability::is_room_free(repo.as_ref(), 1, day, day)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidRange(_)));

    let err = availability::free_rooms(repo.as_ref(), day, day)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidRange(_)));

    let err = availability::free_rooms(repo.as_ref(), date("2024-05-03"), day)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidRange(_)));
}

/// The bulk query must agree with the per-room predicate for every room,
/// across windows that slide over a mixed set of restrictions.
#[tokio::test]
async fn free_rooms_matches_per_room_checks() {
    let repo = seeded_repo();
    repo.add_room(3, "Corner Room");

    repo.create_reservation(NewReservation {
        guest: guest("Ada", "Byron", "ada@example.com"),
        room_id: 1,
        stay: stay("2024-05-05", "2024-05-10"),
    })
    .await
    .unwrap();
    repo.insert_block(2, date("2024-05-07")).await.unwrap();
    repo.insert_block(3, date("2024-05-01")).await.unwrap();

    let windows = [
        ("2024-04-28", "2024-05-02"),
        ("2024-05-01", "2024-05-05"),
        ("2024-05-05", "2024-05-08"),
        ("2024-05-07", "2024-05-08"),
        ("2024-05-10", "2024-05-12"),
        ("2024-04-01", "2024-06-01"),
    ];

    for (start, end) in windows {
        let bulk: Vec<i64> = availability::free_rooms(repo.as_ref(), date(start), date(end))
            .await
            .unwrap()
            .into_iter()
            .map(|room| room.id)
            .collect();

        for room_id in [1, 2, 3] {
            let single =
                availability::is_room_free(repo.as_ref(), room_id, date(start), date(end))
                    .await
                    .unwrap();
            assert_eq!(
                bulk.contains(&room_id),
                single,
                "window {}..{} disagrees for room {}",
                start,
                end,
                room_id
            );
        }
    }
}
