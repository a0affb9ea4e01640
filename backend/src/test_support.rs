//! Shared doubles for unit tests inside the crate.

use std::sync::Mutex;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{Identity, Role, UserId};

/// Timestamp used by deterministic fixtures.
pub fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 9, 8, 15, 0)
        .single()
        .expect("valid fixture timestamp")
}

/// Clock that returns a settable instant.
pub struct FixtureClock(Mutex<DateTime<Utc>>);

impl FixtureClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Regular user identity with the given id.
pub fn user(raw: i32) -> Identity {
    Identity::new(UserId::new(raw).expect("valid user id"), Role::User)
}

/// Administrator identity with the given id.
pub fn admin(raw: i32) -> Identity {
    Identity::new(UserId::new(raw).expect("valid user id"), Role::Admin)
}
