//! REST facade over the contract aggregation pipeline.
//!
//! The service is the presentation-boundary caller of the pipeline: it runs
//! one aggregation per request and serializes the overview with the joined
//! per-contract rows. Message keys are returned as-is; text resolution is
//! the consumer's concern.

#![deny(unsafe_code)]

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use finport_adapters::{
    FixtureAccountService, FixtureContactDirectory, FixturePayoffService,
    FixtureUpcomingPaymentService, StatusCategoryPolicy, TracingActivityLog, TracingErrorSink,
};
use finport_core::{
    amount_label_key, category_label, AccountPolicy, ContractOverview, ContractPipeline,
    PaymentStanding, Payoff, PipelineCollaborators, RunFlags, ScheduledItem, SessionCache,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone)]
pub struct ServiceState {
    pipeline: Arc<ContractPipeline>,
    policy: Arc<dyn AccountPolicy>,
    session: Arc<SessionCache>,
}

impl ServiceState {
    /// Wires the fixture collaborators into a pipeline with a fresh session.
    pub fn bootstrap() -> Self {
        let session = Arc::new(SessionCache::new());
        let policy: Arc<dyn AccountPolicy> = Arc::new(StatusCategoryPolicy::default());

        let pipeline = ContractPipeline::new(
            PipelineCollaborators {
                contacts: Arc::new(FixtureContactDirectory::default()),
                accounts: Arc::new(FixtureAccountService::default()),
                upcoming: Arc::new(FixtureUpcomingPaymentService::default()),
                payoffs: Arc::new(FixturePayoffService::default()),
                policy: Arc::clone(&policy),
                errors: Arc::new(TracingErrorSink),
                activity: Arc::new(TracingActivityLog),
            },
            Arc::clone(&session),
        );

        Self {
            pipeline: Arc::new(pipeline),
            policy,
            session,
        }
    }
}

pub fn build_router(state: ServiceState) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/overview", get(overview))
        .route("/v1/session", get(session))
        .with_state(state)
}

#[derive(Debug, Clone, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "finport-service",
    })
}

#[derive(Debug, Clone, Serialize)]
struct SessionResponse {
    cached: bool,
}

async fn session(State(state): State<ServiceState>) -> Json<SessionResponse> {
    Json(SessionResponse {
        cached: state.session.is_populated().await,
    })
}

#[derive(Debug, Clone, Deserialize)]
struct OverviewQuery {
    refresh: Option<bool>,
}

/// One contract row with its enrichment results joined back by key.
#[derive(Debug, Clone, Serialize)]
struct ContractRow {
    account_number: String,
    fs_account_id: String,
    standing: PaymentStanding,
    current_balance_minor: i64,
    total_amount_due_minor: i64,
    amount_label_key: &'static str,
    category_label: &'static str,
    next_payment_due_date: Option<NaiveDate>,
    show_due_date: bool,
    has_last_payment: bool,
    last_payment_amount_minor: Option<i64>,
    last_payment_date: Option<NaiveDate>,
    scheduled_payment: Option<ScheduledItem>,
    payoff: Option<Payoff>,
    vehicle_image_data: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct OverviewResponse {
    run_id: String,
    generated_at: DateTime<Utc>,
    customer_number: Option<u64>,
    first_name: Option<String>,
    flags: RunFlags,
    message_key: Option<&'static str>,
    contracts: Vec<ContractRow>,
}

fn contract_rows(overview: &ContractOverview, policy: &dyn AccountPolicy) -> Vec<ContractRow> {
    overview
        .contracts
        .iter()
        .map(|contract| ContractRow {
            account_number: contract.account_number.clone(),
            fs_account_id: contract.fs_account_id.clone(),
            standing: contract.payment_standing(),
            current_balance_minor: contract.current_balance_minor,
            total_amount_due_minor: contract.total_amount_due_minor,
            amount_label_key: amount_label_key(contract.total_amount_due_minor),
            category_label: category_label(policy.account_category(&contract.portfolio_code)),
            next_payment_due_date: contract.next_payment_due_date,
            show_due_date: contract.show_due_date(),
            has_last_payment: contract.has_last_payment(),
            last_payment_amount_minor: contract.last_payment_amount_minor,
            last_payment_date: contract.last_payment_date,
            scheduled_payment: overview.scheduled_payment(&contract.account_number).cloned(),
            payoff: overview.payoff(&contract.fs_account_id).cloned(),
            vehicle_image_data: overview
                .financial_products
                .iter()
                .find(|product| product.account_number == contract.account_number)
                .map(|product| product.vehicle_image_data.clone()),
        })
        .collect::<Vec<_>>()
}

async fn overview(
    State(state): State<ServiceState>,
    Query(query): Query<OverviewQuery>,
) -> Json<OverviewResponse> {
    let refresh = query.refresh.unwrap_or(false);
    let overview = state.pipeline.run(refresh).await;

    let contracts = contract_rows(&overview, state.policy.as_ref());
    Json(OverviewResponse {
        run_id: overview.run_id,
        generated_at: overview.generated_at,
        customer_number: overview.customer_number,
        first_name: overview.first_name,
        flags: overview.flags,
        message_key: overview.flags.message_key().map(|key| key.as_key()),
        contracts,
    })
}
