//! Mock repositories for testing

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use restock_db::{
    CreateSubscription, CreateToken, DbResult, ReminderLogRepository, ReminderRow, StateCounts,
    SubscriptionRepository, SubscriptionRow, TokenRepository, TokenRow,
};
use std::sync::Arc;
use uuid::Uuid;

/// In-memory subscription repository for testing
#[derive(Default, Clone)]
pub struct MockSubscriptionRepository {
    subs: Arc<DashMap<Uuid, SubscriptionRow>>,
}

impl MockSubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a subscription row directly
    #[allow(dead_code)]
    pub fn insert(&self, row: SubscriptionRow) {
        self.subs.insert(row.id, row);
    }

    /// Build an active subscription row with the given cadence
    pub fn active_row(
        frequency: &str,
        quantity: i32,
        discount_percent: i16,
        next_delivery_date: NaiveDate,
    ) -> SubscriptionRow {
        SubscriptionRow {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            frequency: frequency.to_string(),
            quantity,
            discount_percent,
            next_delivery_date,
            state: "active".to_string(),
            pause_until: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

#[async_trait]
impl SubscriptionRepository for MockSubscriptionRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<SubscriptionRow>> {
        Ok(self.subs.get(&id).map(|r| r.value().clone()))
    }

    async fn find_by_customer(&self, customer_id: Uuid) -> DbResult<Vec<SubscriptionRow>> {
        Ok(self
            .subs
            .iter()
            .filter(|r| r.customer_id == customer_id)
            .map(|r| r.value().clone())
            .collect())
    }

    async fn create(&self, sub: CreateSubscription) -> DbResult<SubscriptionRow> {
        let row = SubscriptionRow {
            id: sub.id,
            customer_id: sub.customer_id,
            product_id: sub.product_id,
            frequency: sub.frequency,
            quantity: sub.quantity,
            discount_percent: sub.discount_percent,
            next_delivery_date: sub.next_delivery_date,
            state: "active".to_string(),
            pause_until: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.subs.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_active_due_on(&self, date: NaiveDate) -> DbResult<Vec<SubscriptionRow>> {
        Ok(self
            .subs
            .iter()
            .filter(|r| r.state == "active" && r.next_delivery_date == date)
            .map(|r| r.value().clone())
            .collect())
    }

    async fn find_active_due_by(&self, date: NaiveDate) -> DbResult<Vec<SubscriptionRow>> {
        Ok(self
            .subs
            .iter()
            .filter(|r| r.state == "active" && r.next_delivery_date <= date)
            .map(|r| r.value().clone())
            .collect())
    }

    async fn find_paused_elapsed(&self, date: NaiveDate) -> DbResult<Vec<SubscriptionRow>> {
        Ok(self
            .subs
            .iter()
            .filter(|r| r.state == "paused" && r.pause_until.is_some_and(|u| u <= date))
            .map(|r| r.value().clone())
            .collect())
    }

    async fn set_paused(&self, id: Uuid, until: NaiveDate) -> DbResult<()> {
        if let Some(mut row) = self.subs.get_mut(&id) {
            if row.state != "cancelled" {
                row.state = "paused".to_string();
                row.pause_until = Some(until);
                row.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn set_cancelled(&self, id: Uuid) -> DbResult<()> {
        if let Some(mut row) = self.subs.get_mut(&id) {
            row.state = "cancelled".to_string();
            row.pause_until = None;
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn resume(&self, id: Uuid, next_delivery_date: NaiveDate) -> DbResult<bool> {
        if let Some(mut row) = self.subs.get_mut(&id) {
            if row.state == "paused" {
                row.state = "active".to_string();
                row.pause_until = None;
                row.next_delivery_date = next_delivery_date;
                row.updated_at = Utc::now();
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn advance_if_active(&self, id: Uuid, from: NaiveDate, to: NaiveDate) -> DbResult<bool> {
        if let Some(mut row) = self.subs.get_mut(&id) {
            if row.state == "active" && row.next_delivery_date == from {
                row.next_delivery_date = to;
                row.updated_at = Utc::now();
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn count_by_state(&self) -> DbResult<StateCounts> {
        let mut counts = StateCounts::default();
        for row in self.subs.iter() {
            match row.state.as_str() {
                "active" => counts.active += 1,
                "paused" => counts.paused += 1,
                "cancelled" => counts.cancelled += 1,
                _ => {}
            }
        }
        Ok(counts)
    }
}

/// In-memory token repository for testing
#[derive(Default, Clone)]
pub struct MockTokenRepository {
    tokens: Arc<DashMap<String, TokenRow>>,
}

impl MockTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenRepository for MockTokenRepository {
    async fn create(&self, token: CreateToken) -> DbResult<TokenRow> {
        let row = TokenRow {
            token: token.token.clone(),
            subscription_id: token.subscription_id,
            cycle_date: token.cycle_date,
            issued_at: token.issued_at,
            expires_at: token.expires_at,
            consumed_at: None,
            resulting_action: None,
        };
        self.tokens.insert(token.token, row.clone());
        Ok(row)
    }

    async fn find_by_token(&self, token: &str) -> DbResult<Option<TokenRow>> {
        Ok(self.tokens.get(token).map(|r| r.value().clone()))
    }

    async fn find_live_for_cycle(
        &self,
        subscription_id: Uuid,
        cycle_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> DbResult<Option<TokenRow>> {
        Ok(self
            .tokens
            .iter()
            .filter(|r| {
                r.subscription_id == subscription_id
                    && r.cycle_date == cycle_date
                    && r.is_live(now)
            })
            .map(|r| r.value().clone())
            .next())
    }

    async fn consume(&self, token: &str, action: &str, now: DateTime<Utc>) -> DbResult<bool> {
        // The entry lock makes the check-and-set indivisible, mirroring the
        // conditional UPDATE in the PostgreSQL implementation.
        if let Some(mut row) = self.tokens.get_mut(token) {
            if row.consumed_at.is_none() && row.expires_at > now {
                row.consumed_at = Some(now);
                row.resulting_action = Some(action.to_string());
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn count_live(&self, now: DateTime<Utc>) -> DbResult<i64> {
        Ok(self.tokens.iter().filter(|r| r.is_live(now)).count() as i64)
    }

    async fn count_consumed_since(&self, since: DateTime<Utc>) -> DbResult<i64> {
        Ok(self
            .tokens
            .iter()
            .filter(|r| r.consumed_at.is_some_and(|at| at >= since))
            .count() as i64)
    }
}

/// In-memory reminder log repository for testing
#[derive(Default, Clone)]
pub struct MockReminderLogRepository {
    sent: Arc<DashMap<(Uuid, NaiveDate), ReminderRow>>,
}

impl MockReminderLogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReminderLogRepository for MockReminderLogRepository {
    async fn record(
        &self,
        subscription_id: Uuid,
        cycle_date: NaiveDate,
        sent_at: DateTime<Utc>,
    ) -> DbResult<bool> {
        let key = (subscription_id, cycle_date);
        if self.sent.contains_key(&key) {
            return Ok(false);
        }
        self.sent.insert(
            key,
            ReminderRow {
                subscription_id,
                cycle_date,
                sent_at,
            },
        );
        Ok(true)
    }

    async fn exists(&self, subscription_id: Uuid, cycle_date: NaiveDate) -> DbResult<bool> {
        Ok(self.sent.contains_key(&(subscription_id, cycle_date)))
    }

    async fn count_sent_since(&self, since: DateTime<Utc>) -> DbResult<i64> {
        Ok(self.sent.iter().filter(|r| r.sent_at >= since).count() as i64)
    }
}
