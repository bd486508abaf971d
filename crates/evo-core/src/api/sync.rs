//! Client for the account-sync backend.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use reqwest::Method;
use serde_json::json;

use super::http::HttpClient;
use crate::error::ApiResult;
use crate::models::{Account, AccountGroup, Ack, GroupPayload, NewAccount, SyncType};
use crate::session::Session;

/// Typed access to the sync backend.
///
/// Sends no credentials unless built with a session (`sync_api_auth`).
#[derive(Debug, Clone)]
pub struct SyncApi {
    http: HttpClient,
}

impl SyncApi {
    pub fn new(base_url: &str, timeout: Duration, session: Option<Session>) -> ApiResult<Self> {
        Ok(Self {
            http: HttpClient::new(base_url, timeout, session)?,
        })
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    // Accounts

    pub async fn list_accounts(&self) -> ApiResult<Vec<Account>> {
        self.http
            .get_list(&["sync", "accounts"], &[], Some("accounts"))
            .await
    }

    pub async fn create_account(&self, account: &NewAccount) -> ApiResult<Ack> {
        self.http
            .mutate(Method::POST, &["sync", "accounts"], Some(account))
            .await
    }

    pub async fn delete_account(&self, id: i64) -> ApiResult<Ack> {
        let id = id.to_string();
        self.http
            .mutate::<()>(Method::DELETE, &["sync", "accounts", &id], None)
            .await
    }

    /// Start a sync of one account.
    pub async fn sync_account(&self, id: i64) -> ApiResult<Ack> {
        let id = id.to_string();
        self.http
            .mutate(Method::POST, &["sync", "account", &id], Some(&json!({})))
            .await
    }

    // Groups

    pub async fn list_groups(&self) -> ApiResult<Vec<AccountGroup>> {
        self.http.get_list(&["groups", ""], &[], Some("groups")).await
    }

    /// Groups with master, slaves and last sync expanded.
    pub async fn groups_overview(&self) -> ApiResult<Vec<AccountGroup>> {
        self.http
            .get_list(&["groups", "overview"], &[], Some("groups"))
            .await
    }

    pub async fn create_group(&self, group: &GroupPayload) -> ApiResult<Ack> {
        self.http
            .mutate(Method::POST, &["groups", ""], Some(group))
            .await
    }

    pub async fn update_group(&self, id: i64, group: &GroupPayload) -> ApiResult<Ack> {
        let id = id.to_string();
        self.http
            .mutate(Method::PUT, &["groups", &id], Some(group))
            .await
    }

    pub async fn delete_group(&self, id: i64) -> ApiResult<Ack> {
        let id = id.to_string();
        self.http
            .mutate::<()>(Method::DELETE, &["groups", &id], None)
            .await
    }

    pub async fn add_slave(&self, group_id: i64, account_id: i64) -> ApiResult<Ack> {
        let id = group_id.to_string();
        self.http
            .mutate(
                Method::POST,
                &["groups", &id, "slaves"],
                Some(&json!({ "account_id": account_id })),
            )
            .await
    }

    pub async fn trigger_group_sync(&self, group_id: i64, sync_type: SyncType) -> ApiResult<Ack> {
        let id = group_id.to_string();
        self.http
            .mutate(
                Method::POST,
                &["sync", "groups", &id, "trigger"],
                Some(&json!({ "sync_type": sync_type.as_str() })),
            )
            .await
    }

    /// Sync `ids` one after another, pausing `delay` after each account.
    ///
    /// `stop` is checked before each account; a request already in flight is
    /// not cancelled. `on_result` sees every outcome in order. Returns how
    /// many accounts were attempted.
    pub async fn sync_accounts_sequentially<F>(
        &self,
        ids: &[i64],
        delay: Duration,
        stop: &AtomicBool,
        mut on_result: F,
    ) -> usize
    where
        F: FnMut(i64, &ApiResult<Ack>),
    {
        let mut attempted = 0;
        for &id in ids {
            if stop.load(Ordering::SeqCst) {
                tracing::info!(attempted, total = ids.len(), "batch sync stopped");
                break;
            }

            let result = self.sync_account(id).await;
            attempted += 1;
            if let Err(e) = &result {
                tracing::error!(account = id, "sync failed: {e}");
            }
            on_result(id, &result);

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
        attempted
    }
}
