// src/billing.rs
//! Simulated billing: flat call-out fee per intervention plus a priority
//! surcharge, summarized per client. No payment integration; the totals are
//! display-only.

use axum::{extract::State, Json};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::api::error::{ApiResult, IntoApiError};
use crate::auth::CurrentUser;
use crate::interventions::types::{priority, status, Intervention};
use crate::state::AppState;

const CALL_OUT_FEE: i64 = 120;
const HIGH_SURCHARGE: i64 = 80;
const MEDIUM_SURCHARGE: i64 = 40;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClientInvoice {
    pub client_name: String,
    pub intervention_count: i64,
    pub total: i64,
}

/// Fee for one intervention. Cancelled work is not billed.
pub fn intervention_fee(intervention: &Intervention) -> i64 {
    if intervention.status.eq_ignore_ascii_case(status::CANCELLED) {
        return 0;
    }
    let surcharge = if intervention.priority.eq_ignore_ascii_case(priority::HIGH) {
        HIGH_SURCHARGE
    } else if intervention.priority.eq_ignore_ascii_case(priority::MEDIUM) {
        MEDIUM_SURCHARGE
    } else {
        0
    };
    CALL_OUT_FEE + surcharge
}

/// Group billable interventions per client, sorted by client name.
pub fn summarize(interventions: &[Intervention]) -> Vec<ClientInvoice> {
    let mut totals: BTreeMap<String, (i64, i64)> = BTreeMap::new();

    for intervention in interventions {
        let fee = intervention_fee(intervention);
        if fee == 0 {
            continue;
        }
        let client = intervention
            .client_name
            .clone()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| "unassigned".to_string());
        let entry = totals.entry(client).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += fee;
    }

    totals
        .into_iter()
        .map(|(client_name, (intervention_count, total))| ClientInvoice {
            client_name,
            intervention_count,
            total,
        })
        .collect()
}

/// Invoice summary over the caller's role-scoped interventions: managers see
/// the whole company, clients only their own work.
pub async fn summary_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<ClientInvoice>>> {
    let interventions = state
        .interventions
        .list_scoped(&user)
        .await
        .into_api_error("Failed to list interventions")?;

    Ok(Json(summarize(&interventions)))
}
