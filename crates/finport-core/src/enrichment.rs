use crate::collaborators::{ErrorSink, PayoffService, UpcomingPaymentService};
use crate::error::FinPortError;
use crate::types::{
    ContractAccountDetail, EnrichmentKind, Payoff, ScheduledItem, UpcomingPaymentReply,
};
use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Tagged enrichment result so replies re-associate by their own key after
/// the join, independent of completion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentReply {
    Upcoming(UpcomingPaymentReply),
    Payoff(Payoff),
}

/// Joined enrichment output for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentOutcome {
    pub scheduled_payments: Vec<ScheduledItem>,
    pub payoffs: Vec<Payoff>,
    pub upays_failed: bool,
    pub payoffs_failed: bool,
}

impl EnrichmentOutcome {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Fans out one upcoming-payment lookup and one payoff computation per active
/// account, waits for all of them to settle, then applies the batch
/// all-or-nothing rule per result group.
pub struct EnrichmentOrchestrator {
    upcoming: Arc<dyn UpcomingPaymentService>,
    payoffs: Arc<dyn PayoffService>,
    errors: Arc<dyn ErrorSink>,
}

impl EnrichmentOrchestrator {
    pub fn new(
        upcoming: Arc<dyn UpcomingPaymentService>,
        payoffs: Arc<dyn PayoffService>,
        errors: Arc<dyn ErrorSink>,
    ) -> Self {
        Self {
            upcoming,
            payoffs,
            errors,
        }
    }

    pub async fn enrich(
        &self,
        active: &[ContractAccountDetail],
        refresh: bool,
    ) -> EnrichmentOutcome {
        if active.is_empty() {
            return EnrichmentOutcome::empty();
        }

        let mut requests: Vec<BoxFuture<'static, EnrichmentReply>> =
            Vec::with_capacity(active.len() * 2);
        for detail in active {
            let upcoming = Arc::clone(&self.upcoming);
            let account_number = detail.account_number.clone();
            requests.push(
                async move {
                    match upcoming.find_upcoming(&account_number, refresh).await {
                        Ok(reply) => EnrichmentReply::Upcoming(reply),
                        Err(err) => {
                            debug!(account_number = %account_number, error = %err, "upcoming payment lookup errored");
                            EnrichmentReply::Upcoming(UpcomingPaymentReply::errored(account_number))
                        }
                    }
                }
                .boxed(),
            );

            let payoffs = Arc::clone(&self.payoffs);
            let fs_account_id = detail.fs_account_id.clone();
            requests.push(
                async move {
                    match payoffs.calculate_payoff(&fs_account_id, refresh).await {
                        Ok(payoff) => EnrichmentReply::Payoff(payoff),
                        Err(err) => {
                            debug!(fs_account_id = %fs_account_id, error = %err, "payoff computation errored");
                            EnrichmentReply::Payoff(Payoff::errored(fs_account_id))
                        }
                    }
                }
                .boxed(),
            );
        }

        // Settle-all join: a failing request resolves to an errored reply and
        // never aborts the wait for the rest.
        let replies = join_all(requests).await;

        let mut upcoming_replies = Vec::new();
        let mut payoff_replies = Vec::new();
        for reply in replies {
            match reply {
                EnrichmentReply::Upcoming(reply) => upcoming_replies.push(reply),
                EnrichmentReply::Payoff(payoff) => payoff_replies.push(payoff),
            }
        }

        let mut outcome = EnrichmentOutcome::empty();

        if upcoming_replies.iter().any(|reply| reply.error) {
            outcome.upays_failed = true;
            let err = FinPortError::EnrichmentBatch(EnrichmentKind::UpcomingPayments);
            self.errors.report("upcoming-payments", &err);
            warn!(accounts = active.len(), "upcoming-payment batch discarded");
        } else {
            outcome.scheduled_payments = upcoming_replies
                .into_iter()
                .filter_map(|reply| reply.scheduled_item)
                .collect();
        }

        if payoff_replies.iter().any(|payoff| payoff.error) {
            outcome.payoffs_failed = true;
            let err = FinPortError::EnrichmentBatch(EnrichmentKind::Payoffs);
            self.errors.report("payoffs", &err);
            warn!(accounts = active.len(), "payoff batch discarded");
        } else {
            outcome.payoffs = payoff_replies;
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::time::{sleep, Duration};

    fn detail(account: &str) -> ContractAccountDetail {
        ContractAccountDetail {
            account_number: account.to_string(),
            fs_account_id: format!("FS-{account}"),
            current_balance_minor: 0,
            total_amount_due_minor: 5_000,
            next_payment_due_date: NaiveDate::from_ymd_opt(2024, 2, 1),
            status_category_code: "active".to_string(),
            portfolio_code: "LN".to_string(),
            last_payment_amount_minor: None,
            last_payment_date: None,
        }
    }

    struct RecordingSink {
        contexts: Mutex<Vec<String>>,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self {
                contexts: Mutex::new(Vec::new()),
            }
        }

        fn contexts(&self) -> Vec<String> {
            self.contexts.lock().unwrap().clone()
        }
    }

    impl ErrorSink for RecordingSink {
        fn report(&self, context: &str, _error: &FinPortError) {
            self.contexts.lock().unwrap().push(context.to_string());
        }
    }

    struct UpcomingFixture {
        calls: AtomicUsize,
        failing_account: Option<String>,
        delay_account: Option<String>,
    }

    impl UpcomingFixture {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                failing_account: None,
                delay_account: None,
            }
        }

        fn failing(account: &str) -> Self {
            Self {
                failing_account: Some(account.to_string()),
                ..Self::new()
            }
        }

        fn delayed(account: &str) -> Self {
            Self {
                delay_account: Some(account.to_string()),
                ..Self::new()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl UpcomingPaymentService for UpcomingFixture {
        async fn find_upcoming(
            &self,
            account_number: &str,
            _refresh: bool,
        ) -> Result<UpcomingPaymentReply, FinPortError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.delay_account.as_deref() == Some(account_number) {
                sleep(Duration::from_millis(20)).await;
            }
            if self.failing_account.as_deref() == Some(account_number) {
                return Ok(UpcomingPaymentReply::errored(account_number));
            }
            Ok(UpcomingPaymentReply {
                account_number: account_number.to_string(),
                scheduled_item: Some(ScheduledItem {
                    account_number: account_number.to_string(),
                    due_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                    amount_minor: 4_500,
                }),
                error: false,
            })
        }
    }

    struct PayoffFixture {
        calls: AtomicUsize,
        transport_fail_account: Option<String>,
    }

    impl PayoffFixture {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                transport_fail_account: None,
            }
        }

        fn transport_failing(fs_account_id: &str) -> Self {
            Self {
                transport_fail_account: Some(fs_account_id.to_string()),
                ..Self::new()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PayoffService for PayoffFixture {
        async fn calculate_payoff(
            &self,
            fs_account_id: &str,
            _refresh: bool,
        ) -> Result<Payoff, FinPortError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.transport_fail_account.as_deref() == Some(fs_account_id) {
                return Err(FinPortError::PayoffComputation {
                    fs_account_id: fs_account_id.to_string(),
                    message: "backend unavailable".to_string(),
                });
            }
            Ok(Payoff {
                fs_account_id: fs_account_id.to_string(),
                amount_minor: 250_000,
                error: false,
            })
        }
    }

    fn orchestrator(
        upcoming: Arc<UpcomingFixture>,
        payoffs: Arc<PayoffFixture>,
        sink: Arc<RecordingSink>,
    ) -> EnrichmentOrchestrator {
        EnrichmentOrchestrator::new(upcoming, payoffs, sink)
    }

    #[tokio::test]
    async fn empty_active_set_issues_no_requests() {
        let upcoming = Arc::new(UpcomingFixture::new());
        let payoffs = Arc::new(PayoffFixture::new());
        let sink = Arc::new(RecordingSink::new());

        let outcome = orchestrator(upcoming.clone(), payoffs.clone(), sink)
            .enrich(&[], false)
            .await;

        assert_eq!(outcome, EnrichmentOutcome::empty());
        assert_eq!(upcoming.calls(), 0);
        assert_eq!(payoffs.calls(), 0);
    }

    #[tokio::test]
    async fn both_groups_collected_on_success() {
        let upcoming = Arc::new(UpcomingFixture::delayed("A1"));
        let payoffs = Arc::new(PayoffFixture::new());
        let sink = Arc::new(RecordingSink::new());
        let active = vec![detail("A1"), detail("A2"), detail("A3")];

        let outcome = orchestrator(upcoming.clone(), payoffs.clone(), sink)
            .enrich(&active, false)
            .await;

        assert_eq!(upcoming.calls(), 3);
        assert_eq!(payoffs.calls(), 3);
        assert!(!outcome.upays_failed);
        assert!(!outcome.payoffs_failed);
        assert_eq!(outcome.scheduled_payments.len(), 3);
        assert_eq!(outcome.payoffs.len(), 3);

        // Re-association is by key, not arrival order: the delayed account
        // still maps to its own scheduled item.
        assert!(outcome
            .scheduled_payments
            .iter()
            .any(|item| item.account_number == "A1"));
        assert!(outcome
            .payoffs
            .iter()
            .any(|payoff| payoff.fs_account_id == "FS-A3"));
    }

    #[tokio::test]
    async fn one_failing_upay_discards_the_whole_group() {
        let upcoming = Arc::new(UpcomingFixture::failing("A2"));
        let payoffs = Arc::new(PayoffFixture::new());
        let sink = Arc::new(RecordingSink::new());
        let active = vec![detail("A1"), detail("A2"), detail("A3")];

        let outcome = orchestrator(upcoming, payoffs, sink.clone())
            .enrich(&active, false)
            .await;

        assert!(outcome.upays_failed);
        assert!(outcome.scheduled_payments.is_empty());
        // The payoff group is independent and survives intact.
        assert!(!outcome.payoffs_failed);
        assert_eq!(outcome.payoffs.len(), 3);
        assert_eq!(sink.contexts(), vec!["upcoming-payments"]);
    }

    #[tokio::test]
    async fn transport_error_is_folded_into_the_payoff_batch() {
        let upcoming = Arc::new(UpcomingFixture::new());
        let payoffs = Arc::new(PayoffFixture::transport_failing("FS-A3"));
        let sink = Arc::new(RecordingSink::new());
        let active = vec![detail("A1"), detail("A2"), detail("A3")];

        let outcome = orchestrator(upcoming, payoffs.clone(), sink.clone())
            .enrich(&active, false)
            .await;

        // All 2N requests still settled; the join was not aborted.
        assert_eq!(payoffs.calls(), 3);
        assert!(outcome.payoffs_failed);
        assert!(outcome.payoffs.is_empty());
        assert!(!outcome.upays_failed);
        assert_eq!(outcome.scheduled_payments.len(), 3);
        assert_eq!(sink.contexts(), vec!["payoffs"]);
    }
}
