//! Redis-backed [`PaymentStore`].

use super::{ACCOUNTING_KEY, PaymentStore, ScoreRange, StoreError, WORK_QUEUE_KEY};
use crate::entities::payment::{PaymentRecord, PaymentRequest};
use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

/// Handle to the shared Redis instance.
///
/// Cloning is cheap; every clone multiplexes over one auto-reconnecting
/// connection, so the handle can be passed freely to workers and handlers.
#[derive(Clone)]
pub struct RedisStore {
    con: ConnectionManager,
}

impl RedisStore {
    /// Connect and verify the instance is reachable.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let con = client.get_connection_manager().await?;
        let store = Self { con };
        store.ping().await?;
        Ok(store)
    }

    /// Round-trip a `PING`; lets startup fail fast on a bad URL.
    pub async fn ping(&self) -> Result<(), StoreError> {
        let mut con = self.con.clone();
        let _: String = redis::cmd("PING").query_async(&mut con).await?;
        Ok(())
    }
}

#[async_trait]
impl PaymentStore for RedisStore {
    async fn enqueue(&self, payment: &PaymentRequest) -> Result<(), StoreError> {
        let payload = serde_json::to_string(payment)?;
        let mut con = self.con.clone();
        let _: () = con.rpush(WORK_QUEUE_KEY, payload).await?;
        Ok(())
    }

    async fn dequeue(&self) -> Result<Option<PaymentRequest>, StoreError> {
        let mut con = self.con.clone();
        let raw: Option<String> = con.lpop(WORK_QUEUE_KEY, None).await?;
        match raw {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    async fn record(&self, record: &PaymentRecord) -> Result<(), StoreError> {
        let member = serde_json::to_string(record)?;
        let mut con = self.con.clone();
        let _: () = con
            .zadd(ACCOUNTING_KEY, member, record.requested_at)
            .await?;
        Ok(())
    }

    async fn scan(&self, range: ScoreRange) -> Result<Vec<PaymentRecord>, StoreError> {
        let mut con = self.con.clone();
        let members: Vec<String> = con
            .zrangebyscore(ACCOUNTING_KEY, range.min_arg(), range.max_arg())
            .await?;

        let mut records = Vec::with_capacity(members.len());
        for member in members {
            match serde_json::from_str(&member) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::debug!(error = %e, "skipping undecodable accounting member");
                }
            }
        }
        Ok(records)
    }

    async fn purge(&self) -> Result<(), StoreError> {
        let mut con = self.con.clone();
        let _: () = con.del(&[ACCOUNTING_KEY, WORK_QUEUE_KEY][..]).await?;
        Ok(())
    }
}
