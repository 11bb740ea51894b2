pub(crate) mod billing;

pub(crate) use billing::{BillingClient, BillingConfig, QuotaGate, UnmeteredQuota};
