use crate::accounts::AccountDetailFetcher;
use crate::classify;
use crate::collaborators::{
    AccountPolicy, AccountService, ActivityLog, ContactDirectory, ErrorSink, PayoffService,
    UpcomingPaymentService,
};
use crate::contact::ContactResolver;
use crate::enrichment::EnrichmentOrchestrator;
use crate::session::SessionCache;
use crate::types::{ActivityKind, ContractAccountDetail, ContractOverview, RunFlags};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// External collaborator handles consumed by the pipeline.
pub struct PipelineCollaborators {
    pub contacts: Arc<dyn ContactDirectory>,
    pub accounts: Arc<dyn AccountService>,
    pub upcoming: Arc<dyn UpcomingPaymentService>,
    pub payoffs: Arc<dyn PayoffService>,
    pub policy: Arc<dyn AccountPolicy>,
    pub errors: Arc<dyn ErrorSink>,
    pub activity: Arc<dyn ActivityLog>,
}

/// The contract aggregation pipeline.
///
/// One invocation runs Contact -> Accounts -> Enrichment -> Classification
/// strictly in order, concurrent only inside the enrichment stage, and
/// returns exactly one `ContractOverview` no matter which stages failed.
pub struct ContractPipeline {
    resolver: ContactResolver,
    fetcher: AccountDetailFetcher,
    enrichment: EnrichmentOrchestrator,
    policy: Arc<dyn AccountPolicy>,
    errors: Arc<dyn ErrorSink>,
    activity: Arc<dyn ActivityLog>,
}

impl ContractPipeline {
    pub fn new(collaborators: PipelineCollaborators, session: Arc<SessionCache>) -> Self {
        let PipelineCollaborators {
            contacts,
            accounts,
            upcoming,
            payoffs,
            policy,
            errors,
            activity,
        } = collaborators;

        Self {
            resolver: ContactResolver::new(contacts, session),
            fetcher: AccountDetailFetcher::new(accounts),
            enrichment: EnrichmentOrchestrator::new(upcoming, payoffs, Arc::clone(&errors)),
            policy,
            errors,
            activity,
        }
    }

    pub async fn run(&self, refresh: bool) -> ContractOverview {
        let run_id = Uuid::new_v4().to_string();
        info!(run_id = %run_id, refresh, "starting contract aggregation run");

        let contact = match self.resolver.resolve(refresh).await {
            Ok(contact) => contact,
            Err(err) => {
                self.errors.report("contact-resolution", &err);
                warn!(run_id = %run_id, error = %err, "contact resolution failed, halting run");
                return Self::halted(run_id);
            }
        };

        let account_numbers = AccountDetailFetcher::account_numbers(&contact.financial_products);
        let details = match self
            .fetcher
            .fetch(contact.customer_number, &account_numbers, refresh)
            .await
        {
            Ok(details) => details,
            Err(err) => {
                self.errors.report("account-fetch", &err);
                warn!(run_id = %run_id, error = %err, "account fetch failed, halting run");
                let mut overview = Self::halted(run_id);
                overview.customer_number = Some(contact.customer_number);
                overview.first_name = contact.first_name;
                overview.financial_products = contact.financial_products;
                return overview;
            }
        };

        let active: Vec<ContractAccountDetail> = details
            .into_iter()
            .filter(|detail| self.policy.is_active_account(&detail.status_category_code))
            .collect();

        let active_numbers: Vec<String> = active
            .iter()
            .map(|detail| detail.account_number.clone())
            .collect();
        self.activity
            .log_user_activity(
                contact.customer_number,
                &active_numbers,
                ActivityKind::LegitimizationCompleted,
            )
            .await;
        self.activity
            .log_user_activity(
                contact.customer_number,
                &active_numbers,
                ActivityKind::MyAccountLogin,
            )
            .await;

        let enriched = self.enrichment.enrich(&active, refresh).await;
        let contracts = classify::order_contracts(active);

        let flags = RunFlags {
            contact_error: false,
            upays_failed: enriched.upays_failed,
            payoffs_failed: enriched.payoffs_failed,
            no_accounts: contracts.is_empty(),
        };
        if flags.no_accounts {
            info!(run_id = %run_id, "run produced no active contracts");
        }

        ContractOverview {
            run_id,
            generated_at: Utc::now(),
            customer_number: Some(contact.customer_number),
            first_name: contact.first_name,
            financial_products: contact.financial_products,
            contracts,
            scheduled_payments: enriched.scheduled_payments,
            payoffs: enriched.payoffs,
            flags,
        }
    }

    /// Overview for a run halted before classification. The halting surfaces
    /// (contact resolution and account fetch) share one flag.
    fn halted(run_id: String) -> ContractOverview {
        ContractOverview {
            run_id,
            generated_at: Utc::now(),
            customer_number: None,
            first_name: None,
            financial_products: Vec::new(),
            contracts: Vec::new(),
            scheduled_payments: Vec::new(),
            payoffs: Vec::new(),
            flags: RunFlags {
                contact_error: true,
                ..RunFlags::default()
            },
        }
    }
}
