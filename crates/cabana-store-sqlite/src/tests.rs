//! Integration tests for `SqliteStore` driven through the ledger and
//! directory services, against an in-memory database.

use std::sync::{Arc, Mutex};

use cabana_core::{
  Error as PoolError,
  access::{AccessFilter, AccessStatus},
  config::{PoolConfig, PoolConfigPatch},
  expiry,
  ledger::AccessLedger,
  occupancy::OccupancyLevel,
  person::{DepartmentCode, GuestType, PersonRef},
  registration::NewRegistration,
  store::PoolStore,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

/// A clock tests can move forward by hand.
#[derive(Clone)]
struct ManualClock(Arc<Mutex<DateTime<Utc>>>);

impl ManualClock {
  fn at(h: u32, m: u32) -> Self {
    Self(Arc::new(Mutex::new(
      Utc.with_ymd_and_hms(2025, 1, 15, h, m, 0).unwrap(),
    )))
  }

  fn set(&self, h: u32, m: u32) {
    *self.0.lock().unwrap() = Utc.with_ymd_and_hms(2025, 1, 15, h, m, 0).unwrap();
  }

  fn now(&self) -> DateTime<Utc> { *self.0.lock().unwrap() }
}

async fn ledger_with(
  max_capacity: u32,
  clock: &ManualClock,
) -> AccessLedger<SqliteStore> {
  let store = store().await;
  store
    .init_config(PoolConfig { max_capacity, ..PoolConfig::default() })
    .await
    .unwrap();
  let c = clock.clone();
  AccessLedger::new(Arc::new(store)).with_clock(Arc::new(move || c.now()))
}

fn dept(code: &str) -> DepartmentCode { DepartmentCode::parse(code).unwrap() }

fn owner(id: &str, code: &str) -> PersonRef {
  PersonRef::Owner { id: id.into(), department_code: dept(code) }
}

fn guest(first: &str, code: &str) -> NewRegistration {
  NewRegistration {
    first_name:      first.into(),
    last_name:       "Rivera".into(),
    document_number: Some("X123".into()),
    guest_type:      GuestType::Friend,
    department_code: dept(code),
    registered_by:   "own-1".into(),
  }
}

// ─── Configuration ───────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_store_reports_default_config() {
  let s = store().await;
  assert_eq!(s.load_config().await.unwrap(), PoolConfig::default());
}

#[tokio::test]
async fn init_config_does_not_overwrite() {
  let s = store().await;
  let first = PoolConfig { max_capacity: 25, ..PoolConfig::default() };
  assert_eq!(s.init_config(first.clone()).await.unwrap(), first);

  let second = PoolConfig { max_capacity: 3, ..PoolConfig::default() };
  assert_eq!(s.init_config(second).await.unwrap().max_capacity, 25);
}

#[tokio::test]
async fn update_config_persists_and_stamps() {
  let clock = ManualClock::at(9, 0);
  let ledger = ledger_with(10, &clock).await;

  let updated = ledger
    .update_config(PoolConfigPatch {
      max_capacity: Some(15),
      opening_time: Some("07:30".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(updated.max_capacity, 15);
  assert_eq!(updated.updated_at, Some(clock.now()));

  let reloaded = ledger.config().await.unwrap();
  assert_eq!(reloaded, updated);
}

#[tokio::test]
async fn invalid_config_update_leaves_stored_config() {
  let clock = ManualClock::at(9, 0);
  let ledger = ledger_with(10, &clock).await;

  let err = ledger
    .update_config(PoolConfigPatch {
      opening_time: Some("23:00".into()),
      ..Default::default()
    })
    .await
    .unwrap_err();
  assert!(matches!(err, PoolError::InvalidConfig(_)));
  assert_eq!(ledger.config().await.unwrap().max_capacity, 10);
}

// ─── Admission ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn capacity_is_enforced_and_freed_on_exit() {
  let clock = ManualClock::at(10, 0);
  let ledger = ledger_with(2, &clock).await;

  let a = ledger.register_access(owner("a", "101A"), 1, None).await.unwrap();
  ledger.register_access(owner("b", "102A"), 1, None).await.unwrap();

  let err = ledger
    .register_access(owner("c", "103A"), 1, None)
    .await
    .unwrap_err();
  assert!(matches!(err, PoolError::CapacityExceeded { max_capacity: 2 }));

  ledger.mark_exit(a.id).await.unwrap();
  ledger.register_access(owner("c", "103A"), 1, None).await.unwrap();
  assert_eq!(ledger.list_active().await.unwrap().len(), 2);
}

#[tokio::test]
async fn person_cannot_enter_twice() {
  let clock = ManualClock::at(10, 0);
  let ledger = ledger_with(10, &clock).await;

  ledger.register_access(owner("a", "101A"), 1, None).await.unwrap();
  let err = ledger
    .register_access(owner("a", "101A"), 2, None)
    .await
    .unwrap_err();
  assert!(matches!(err, PoolError::DuplicateAccess { person_id } if person_id == "a"));
}

#[tokio::test]
async fn expected_exit_is_entry_plus_hours() {
  let clock = ManualClock::at(10, 0);
  let ledger = ledger_with(10, &clock).await;

  let rec = ledger.register_access(owner("a", "101A"), 2, None).await.unwrap();
  assert_eq!(rec.entry_time, clock.now());
  assert_eq!(rec.expected_exit_time, clock.now() + Duration::hours(2));
  assert_eq!(rec.status, AccessStatus::Active);

  clock.set(11, 45);
  let left = expiry::remaining(clock.now(), rec.expected_exit_time);
  assert_eq!((left.minutes, left.is_overtime), (15, false));

  clock.set(12, 10);
  let active = ledger.list_active().await.unwrap();
  let over = expiry::overtime(&active, clock.now());
  assert_eq!(over.len(), 1);
  assert_eq!(over[0].id, rec.id);
}

#[tokio::test]
async fn duration_over_limit_is_refused() {
  let clock = ManualClock::at(10, 0);
  let ledger = ledger_with(10, &clock).await;

  let err = ledger
    .register_access(owner("a", "101A"), 3, None)
    .await
    .unwrap_err();
  assert!(matches!(err, PoolError::InvalidDuration { requested: 3, max: 2 }));
  assert!(ledger.list_active().await.unwrap().is_empty());
}

#[tokio::test]
async fn unrepresentable_duration_is_refused() {
  let clock = ManualClock::at(10, 0);
  let ledger = ledger_with(10, &clock).await;

  let err = ledger
    .register_access(owner("a", "101A"), u32::MAX, None)
    .await
    .unwrap_err();
  assert!(matches!(err, PoolError::InvalidDuration { requested: u32::MAX, .. }));
  assert!(ledger.list_active().await.unwrap().is_empty());
}

#[tokio::test]
async fn owner_access_trims_id_and_keeps_name() {
  let clock = ManualClock::at(10, 0);
  let ledger = ledger_with(10, &clock).await;

  let rec = ledger
    .register_owner_access(" own-7 ", dept("603A"), Some("Marta Diaz".into()), 1)
    .await
    .unwrap();
  assert_eq!(rec.person, owner("own-7", "603A"));
  assert_eq!(rec.person_name.as_deref(), Some("Marta Diaz"));
}

#[tokio::test]
async fn blank_owner_id_is_refused() {
  let clock = ManualClock::at(10, 0);
  let ledger = ledger_with(10, &clock).await;

  let err = ledger
    .register_owner_access("  ", dept("603A"), None, 1)
    .await
    .unwrap_err();
  assert!(matches!(err, PoolError::InvalidRegistration(_)));
  assert!(ledger.list_active().await.unwrap().is_empty());
}

#[tokio::test]
async fn inactive_pool_refuses_entry() {
  let clock = ManualClock::at(10, 0);
  let ledger = ledger_with(10, &clock).await;
  ledger
    .update_config(PoolConfigPatch { is_active: Some(false), ..Default::default() })
    .await
    .unwrap();

  let err = ledger
    .register_access(owner("a", "101A"), 1, None)
    .await
    .unwrap_err();
  assert!(matches!(err, PoolError::PoolInactive));
}

#[tokio::test]
async fn concurrent_admissions_never_exceed_capacity() {
  let clock = ManualClock::at(10, 0);
  let ledger = ledger_with(3, &clock).await;

  let handles: Vec<_> = (0..12)
    .map(|i| {
      let ledger = ledger.clone();
      tokio::spawn(async move {
        ledger
          .register_access(owner(&format!("own-{i}"), "101A"), 1, None)
          .await
      })
    })
    .collect();

  let mut admitted = 0;
  for h in handles {
    match h.await.unwrap() {
      Ok(_) => admitted += 1,
      Err(PoolError::CapacityExceeded { .. }) => {}
      Err(other) => panic!("unexpected error: {other}"),
    }
  }
  assert_eq!(admitted, 3);
  assert_eq!(ledger.list_active().await.unwrap().len(), 3);
}

#[tokio::test]
async fn concurrent_entries_for_one_person_admit_once() {
  let clock = ManualClock::at(10, 0);
  let ledger = ledger_with(10, &clock).await;

  let handles: Vec<_> = (0..6)
    .map(|_| {
      let ledger = ledger.clone();
      tokio::spawn(async move {
        ledger.register_access(owner("same", "101A"), 1, None).await
      })
    })
    .collect();

  let mut admitted = 0;
  for h in handles {
    if h.await.unwrap().is_ok() {
      admitted += 1;
    }
  }
  assert_eq!(admitted, 1);
}

// ─── Exit ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn exit_is_not_idempotent() {
  let clock = ManualClock::at(10, 0);
  let ledger = ledger_with(10, &clock).await;
  let rec = ledger.register_access(owner("a", "101A"), 1, None).await.unwrap();

  clock.set(10, 40);
  let closed = ledger.mark_exit(rec.id).await.unwrap();
  assert_eq!(closed.status, AccessStatus::Completed);
  assert_eq!(closed.actual_exit_time, Some(clock.now()));

  let err = ledger.mark_exit(rec.id).await.unwrap_err();
  assert!(matches!(err, PoolError::AlreadyExited(id) if id == rec.id));
}

#[tokio::test]
async fn exit_of_unknown_record_is_not_found() {
  let clock = ManualClock::at(10, 0);
  let ledger = ledger_with(10, &clock).await;
  let id = Uuid::new_v4();
  assert!(matches!(
    ledger.mark_exit(id).await,
    Err(PoolError::AccessNotFound(missing)) if missing == id
  ));
}

#[tokio::test]
async fn exit_with_skewed_clock_is_clamped_to_entry() {
  let clock = ManualClock::at(10, 0);
  let ledger = ledger_with(10, &clock).await;
  let rec = ledger.register_access(owner("a", "101A"), 1, None).await.unwrap();

  clock.set(9, 58);
  let closed = ledger.mark_exit(rec.id).await.unwrap();
  assert_eq!(closed.actual_exit_time, Some(rec.entry_time));
}

// ─── Guest roster ────────────────────────────────────────────────────────────

#[tokio::test]
async fn guest_access_resolves_roster_entry() {
  let clock = ManualClock::at(10, 0);
  let ledger = ledger_with(10, &clock).await;
  let entry = ledger.directory().register(guest("Ana", "603A")).await.unwrap();

  let rec = ledger.register_guest_access(entry.id, 1).await.unwrap();
  assert_eq!(rec.department_code, dept("603A"));
  assert_eq!(rec.person_name.as_deref(), Some("Ana Rivera"));
  assert_eq!(rec.person.guest_type(), Some(GuestType::Friend));
}

#[tokio::test]
async fn guest_inside_cannot_be_removed() {
  let clock = ManualClock::at(10, 0);
  let ledger = ledger_with(10, &clock).await;
  let directory = ledger.directory().clone();
  let entry = directory.register(guest("Ana", "603A")).await.unwrap();
  let rec = ledger.register_guest_access(entry.id, 1).await.unwrap();

  let err = directory.remove(entry.id).await.unwrap_err();
  assert!(matches!(err, PoolError::HasActiveAccess(id) if id == entry.id));

  ledger.mark_exit(rec.id).await.unwrap();
  directory.remove(entry.id).await.unwrap();
  assert!(matches!(
    directory.get(entry.id).await,
    Err(PoolError::GuestNotFound(_))
  ));

  // The historical record survives its roster entry.
  assert_eq!(ledger.get(rec.id).await.unwrap().id, rec.id);
}

#[tokio::test]
async fn removed_guest_cannot_enter() {
  let clock = ManualClock::at(10, 0);
  let ledger = ledger_with(10, &clock).await;
  let entry = ledger.directory().register(guest("Ana", "603A")).await.unwrap();
  let person = entry.person();
  ledger.directory().remove(entry.id).await.unwrap();

  let err = ledger.register_access(person, 1, None).await.unwrap_err();
  assert!(matches!(err, PoolError::GuestNotFound(id) if id == entry.id));
}

#[tokio::test]
async fn guest_reference_must_match_roster() {
  let clock = ManualClock::at(10, 0);
  let ledger = ledger_with(10, &clock).await;
  let entry = ledger.directory().register(guest("Ana", "603A")).await.unwrap();

  let other_department = PersonRef::Guest {
    id:              entry.id,
    department_code: dept("101B"),
    guest_type:      GuestType::Friend,
  };
  let err = ledger
    .register_access(other_department, 1, None)
    .await
    .unwrap_err();
  assert!(matches!(err, PoolError::InvalidRegistration(_)));

  let other_type = PersonRef::Guest {
    id:              entry.id,
    department_code: dept("603A"),
    guest_type:      GuestType::Tenant,
  };
  let err = ledger.register_access(other_type, 1, None).await.unwrap_err();
  assert!(matches!(err, PoolError::InvalidRegistration(_)));

  assert!(ledger.list_active().await.unwrap().is_empty());
}

#[tokio::test]
async fn roster_entries_are_stamped_by_the_ledger_clock() {
  let clock = ManualClock::at(9, 30);
  let ledger = ledger_with(10, &clock).await;
  let ana = ledger.directory().register(guest("Ana", "603A")).await.unwrap();
  assert_eq!(ana.created_at, clock.now());

  clock.set(9, 0);
  let ben = ledger.directory().register(guest("Ben", "603A")).await.unwrap();
  assert_eq!(ben.created_at, clock.now());

  let listed = ledger.directory().list_all().await.unwrap();
  assert_eq!(
    listed.iter().map(|g| g.id).collect::<Vec<_>>(),
    vec![ana.id, ben.id]
  );
}

#[tokio::test]
async fn roster_is_scoped_by_department() {
  let s = Arc::new(store().await);
  let ledger = AccessLedger::new(s);
  let directory = ledger.directory();
  directory.register(guest("Ana", "603A")).await.unwrap();
  directory.register(guest("Ben", "603A")).await.unwrap();
  directory.register(guest("Cid", "1204B")).await.unwrap();

  let mine = directory.list_by_department(&dept("603a")).await.unwrap();
  assert_eq!(mine.len(), 2);
  assert!(mine.iter().all(|g| g.department_code == dept("603A")));
  assert_eq!(directory.list_all().await.unwrap().len(), 3);
}

#[tokio::test]
async fn blank_registration_is_rejected() {
  let ledger = AccessLedger::new(Arc::new(store().await));
  assert!(matches!(
    ledger.directory().register(guest("  ", "603A")).await,
    Err(PoolError::InvalidRegistration(_))
  ));
}

// ─── Reads ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_is_newest_first_and_filterable() {
  let clock = ManualClock::at(9, 0);
  let ledger = ledger_with(10, &clock).await;
  let first = ledger.register_access(owner("a", "101A"), 1, None).await.unwrap();
  clock.set(9, 30);
  let second = ledger.register_access(owner("b", "202B"), 1, None).await.unwrap();
  clock.set(9, 45);
  ledger.mark_exit(first.id).await.unwrap();

  let all = ledger.list(&AccessFilter::default()).await.unwrap();
  assert_eq!(
    all.iter().map(|r| r.id).collect::<Vec<_>>(),
    vec![second.id, first.id]
  );

  let by_dept = ledger
    .list(&AccessFilter { department: Some(dept("101A")), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(by_dept.len(), 1);
  assert_eq!(by_dept[0].status, AccessStatus::Completed);

  let active = ledger.list_active().await.unwrap();
  assert_eq!(active.len(), 1);
  assert_eq!(active[0].id, second.id);
}

#[tokio::test]
async fn stats_summarise_today() {
  let clock = ManualClock::at(10, 0);
  let ledger = ledger_with(4, &clock).await;
  let entry = ledger.directory().register(guest("Ana", "603A")).await.unwrap();

  let a = ledger.register_access(owner("a", "101A"), 1, None).await.unwrap();
  ledger.register_access(owner("b", "102A"), 1, None).await.unwrap();
  ledger.register_guest_access(entry.id, 1).await.unwrap();
  ledger.mark_exit(a.id).await.unwrap();

  let stats = ledger.stats().await.unwrap();
  assert_eq!(stats.current_occupancy, 2);
  assert_eq!(stats.remaining_capacity, 2);
  assert_eq!(stats.occupancy_percent, 50);
  assert_eq!(stats.level, OccupancyLevel::Low);
  assert_eq!(stats.today_entries, 3);
  assert_eq!((stats.active_owners, stats.active_guests), (1, 1));
  assert!(stats.is_open);
}
