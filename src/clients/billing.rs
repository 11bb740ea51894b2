//! billing-service のクォータ照会クライアント。
//!
//! 生成開始前に残枠を確認する。課金側の明示的な拒否だけをエラーにし、
//! 到達不能や一時障害では生成を止めない。

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::Error;
use crate::util::retry::{RetryConfig, is_retryable_error};

/// リリース生成の前段でクォータを判定するゲート。
#[async_trait]
pub trait QuotaGate: Send + Sync {
    /// 枠が残っていれば `Ok(())`、使い切っていれば `Error::QuotaExceeded`。
    async fn enforce(&self, org_id: Uuid) -> crate::error::Result<()>;
}

/// billing-service を持たない構成向けの素通しゲート。
pub struct UnmeteredQuota;

#[async_trait]
impl QuotaGate for UnmeteredQuota {
    async fn enforce(&self, _org_id: Uuid) -> crate::error::Result<()> {
        Ok(())
    }
}

/// billing-service クライアントの設定。
#[derive(Debug, Clone)]
pub struct BillingConfig {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub total_timeout: Duration,
    pub service_token: Option<String>,
    pub retry: RetryConfig,
}

#[derive(Debug, Deserialize)]
struct QuotaResponse {
    allowed: bool,
    remaining: i64,
}

enum QuotaDecision {
    Allowed { remaining: i64 },
    Denied,
}

/// billing-service との通信を管理するクライアント。
#[derive(Debug, Clone)]
pub struct BillingClient {
    client: Client,
    base_url: Url,
    service_token: Option<String>,
    retry: RetryConfig,
}

impl BillingClient {
    /// # Errors
    /// URL のパースまたは HTTP クライアントの構築に失敗した場合はエラーを返します。
    pub fn new(config: BillingConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.total_timeout)
            .build()
            .context("failed to build billing HTTP client")?;
        let base_url = Url::parse(&config.base_url).context("invalid billing base URL")?;

        Ok(Self {
            client,
            base_url,
            service_token: config.service_token,
            retry: config.retry,
        })
    }

    async fn check_quota(&self, org_id: Uuid) -> Result<QuotaDecision> {
        let url = self
            .base_url
            .join(&format!("v1/orgs/{org_id}/quota/releases"))
            .context("failed to build quota URL")?;

        let mut request = self.client.get(url);
        if let Some(ref token) = self.service_token {
            request = request.header("X-Service-Token", token);
        }

        let response = request.send().await.context("billing quota request failed")?;
        let status = response.status();

        // 課金側が明示的に拒否した場合のみ枠切れ扱い。
        if status == StatusCode::PAYMENT_REQUIRED || status == StatusCode::TOO_MANY_REQUESTS {
            return Ok(QuotaDecision::Denied);
        }

        let body: QuotaResponse = response
            .error_for_status()
            .context("billing returned error status")?
            .json()
            .await
            .context("failed to deserialize billing quota response")?;

        if body.allowed {
            Ok(QuotaDecision::Allowed {
                remaining: body.remaining,
            })
        } else {
            Ok(QuotaDecision::Denied)
        }
    }
}

#[async_trait]
impl QuotaGate for BillingClient {
    async fn enforce(&self, org_id: Uuid) -> crate::error::Result<()> {
        let mut attempt = 0;
        loop {
            match self.check_quota(org_id).await {
                Ok(QuotaDecision::Allowed { remaining }) => {
                    debug!(%org_id, remaining, "quota check passed");
                    return Ok(());
                }
                Ok(QuotaDecision::Denied) => {
                    return Err(Error::QuotaExceeded { org_id });
                }
                Err(err) => {
                    attempt += 1;

                    let retryable = err
                        .downcast_ref::<reqwest::Error>()
                        .is_some_and(is_retryable_error);

                    if retryable && self.retry.can_retry(attempt) {
                        let delay = self.retry.delay_for_attempt(attempt);
                        warn!(
                            attempt,
                            delay_ms = delay.as_millis(),
                            "quota check failed, retrying after delay"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    // 課金が落ちている間は生成を止めない。
                    warn!(%org_id, error = %err, "billing unavailable, allowing release");
                    return Ok(());
                }
            }
        }
    }
}
