//! The admin reservations calendar.
//!
//! Rendering builds, per room, a status for every day of the requested
//! month (free / reserved / blocked) from the restriction store, and caches
//! each room's block sub-map (day key → restriction id) in the session.
//! Saving compares that cached map against the posted checkbox state:
//! a missing `remove_block_<room>_<day>` key deletes the block, a present
//! `add_block_<room>_<date>` key inserts a fresh one-day block. The net
//! effect converges to the posted state no matter how often the same form
//! is applied.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, NaiveDate};

use crate::db::BookingRepository;
use crate::models::{day_key, month_bounds, DayStatus, InvalidRange, Room, RoomRestriction};
use crate::session::{BlockMap, Session};

use super::error::{ServiceError, ServiceResult};

/// One room's row on the calendar.
#[derive(Debug, Clone)]
pub struct RoomCalendar {
    pub room: Room,
    /// Status for every day of the month, in order.
    pub days: BTreeMap<NaiveDate, DayStatus>,
}

/// The whole month view.
#[derive(Debug, Clone)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
    pub rooms: Vec<RoomCalendar>,
}

fn invalid_month(year: i32, month: u32) -> ServiceError {
    log::warn!("rejecting calendar month {}-{}", year, month);
    ServiceError::InvalidRange(InvalidRange {
        start: NaiveDate::MIN,
        end: NaiveDate::MIN,
    })
}

/// Build the per-room day-status grid for a month and cache each room's
/// block sub-map in the session for the next save.
pub async fn build_month_grid(
    repo: &dyn BookingRepository,
    session: &Session,
    year: i32,
    month: u32,
) -> ServiceResult<MonthGrid> {
    let (first_day, last_day) =
        month_bounds(year, month).ok_or_else(|| invalid_month(year, month))?;

    let mut rooms_out = Vec::new();
    for room in repo.all_rooms().await? {
        let mut days: BTreeMap<NaiveDate, DayStatus> = (1..=last_day.day())
            .filter_map(|d| NaiveDate::from_ymd_opt(year, month, d))
            .map(|d| (d, DayStatus::Free))
            .collect();

        let restrictions = repo
            .restrictions_for_room_in_range(room.id, first_day, last_day)
            .await?;
        let mut block_map = BlockMap::new();
        for restriction in &restrictions {
            mark_restriction(&mut days, &mut block_map, restriction);
        }

        session.put_block_map(room.id, &block_map);
        rooms_out.push(RoomCalendar { room, days });
    }

    Ok(MonthGrid {
        year,
        month,
        first_day,
        last_day,
        rooms: rooms_out,
    })
}

/// Mark one restriction onto a room's day map, both endpoints inclusive.
///
/// Days outside the visible month are ignored — also for the block
/// sub-map, since the posted form can only ever carry checkboxes for
/// rendered days and a cached entry without a checkbox would be deleted
/// on the next save.
fn mark_restriction(
    days: &mut BTreeMap<NaiveDate, DayStatus>,
    block_map: &mut BlockMap,
    restriction: &RoomRestriction,
) {
    for day in restriction.stay.days_inclusive() {
        let Some(status) = days.get_mut(&day) else {
            continue;
        };
        match restriction.kind.reservation_id() {
            Some(reservation_id) => {
                *status = DayStatus::Reserved { reservation_id };
            }
            None => {
                *status = DayStatus::Blocked {
                    restriction_id: restriction.id,
                };
                block_map.insert(day_key(day), restriction.id);
            }
        }
    }
}

/// The posted calendar form: checkbox names are the data.
#[derive(Debug, Clone, Default)]
pub struct CalendarForm {
    fields: HashMap<String, String>,
}

impl CalendarForm {
    pub fn new(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }

    fn has(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// `add_block_<room>_<date>` keys, parsed.
    fn additions(&self) -> impl Iterator<Item = (i64, NaiveDate)> + '_ {
        self.fields.keys().filter_map(|name| {
            let rest = name.strip_prefix("add_block_")?;
            let (room, date) = rest.split_once('_')?;
            let room_id = room.parse().ok()?;
            let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
            Some((room_id, day))
        })
    }
}

/// Apply the posted checkbox state to the restriction store.
///
/// Per room: every cached block whose `remove_block_<room>_<day>` key is
/// absent from the form is deleted (exactly one delete per block), then
/// every `add_block_<room>_<date>` key inserts a one-day block — skipping
/// days whose cached block survived. Afterwards the cached sub-maps are
/// rebuilt from the store, so re-submitting the same form converges on the
/// same block set instead of tripping over stale ids.
pub async fn apply_calendar_edits(
    repo: &dyn BookingRepository,
    session: &Session,
    form: &CalendarForm,
    year: i32,
    month: u32,
) -> ServiceResult<()> {
    let (first_day, last_day) =
        month_bounds(year, month).ok_or_else(|| invalid_month(year, month))?;

    let rooms = repo.all_rooms().await?;
    let mut kept: HashSet<(i64, String)> = HashSet::new();

    for room in &rooms {
        let Some(cached) = session.block_map(room.id) else {
            continue;
        };
        // A block may sit under several day keys (its day span is marked
        // endpoint-inclusive); any missing remove checkbox condemns it,
        // and each condemned id is deleted exactly once.
        let mut condemned: Vec<i64> = Vec::new();
        for (day, restriction_id) in &cached {
            if !form.has(&format!("remove_block_{}_{}", room.id, day))
                && !condemned.contains(restriction_id)
            {
                condemned.push(*restriction_id);
            }
        }
        for (day, restriction_id) in &cached {
            if !condemned.contains(restriction_id) {
                kept.insert((room.id, day.clone()));
            }
        }
        for restriction_id in condemned {
            repo.delete_restriction(restriction_id).await?;
        }
    }

    for (room_id, day) in form.additions() {
        if kept.contains(&(room_id, day_key(day))) {
            continue;
        }
        repo.insert_block(room_id, day).await?;
    }

    // Re-cache what the store now holds for this month.
    for room in &rooms {
        let restrictions = repo
            .restrictions_for_room_in_range(room.id, first_day, last_day)
            .await?;
        let mut block_map = BlockMap::new();
        for restriction in restrictions.iter().filter(|r| r.kind.is_block()) {
            for day in restriction
                .stay
                .days_inclusive()
                .filter(|d| *d >= first_day && *d <= last_day)
            {
                block_map.insert(day_key(day), restriction.id);
            }
        }
        session.put_block_map(room.id, &block_map);
    }

    Ok(())
}
