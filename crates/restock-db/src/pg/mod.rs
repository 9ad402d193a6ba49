//! PostgreSQL repository implementations

mod reminder;
mod subscription;
mod token;

pub use reminder::PgReminderLogRepository;
pub use subscription::PgSubscriptionRepository;
pub use token::PgTokenRepository;

use crate::DbPool;

/// All repositories bundled together
#[derive(Clone)]
pub struct Repositories {
    pub subscriptions: PgSubscriptionRepository,
    pub tokens: PgTokenRepository,
    pub reminders: PgReminderLogRepository,
}

impl Repositories {
    /// Create all repositories from a database pool
    pub fn new(pool: DbPool) -> Self {
        Self {
            subscriptions: PgSubscriptionRepository::new(pool.clone()),
            tokens: PgTokenRepository::new(pool.clone()),
            reminders: PgReminderLogRepository::new(pool),
        }
    }
}
