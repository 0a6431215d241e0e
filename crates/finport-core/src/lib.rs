//! Contract aggregation pipeline for a financing portal backend.
//!
//! Resolves a customer identity, fetches contract account details, enriches
//! every active contract concurrently with upcoming-payment and payoff data,
//! and classifies the results into one ordered sequence. Any sub-fetch may
//! fail independently without crashing the pipeline.

#![deny(unsafe_code)]

pub mod accounts;
pub mod classify;
pub mod collaborators;
pub mod contact;
pub mod enrichment;
pub mod error;
pub mod labels;
pub mod pipeline;
pub mod session;
pub mod types;

pub use accounts::{parse_due_date, AccountDetailFetcher};
pub use classify::{order_contracts, standing};
pub use collaborators::{
    AccountPolicy, AccountService, ActivityLog, ContactDirectory, ErrorSink, PayoffService,
    UpcomingPaymentService,
};
pub use contact::ContactResolver;
pub use enrichment::{EnrichmentOrchestrator, EnrichmentOutcome, EnrichmentReply};
pub use error::FinPortError;
pub use labels::{amount_label_key, category_label, MessageKey};
pub use pipeline::{ContractPipeline, PipelineCollaborators};
pub use session::SessionCache;
pub use types::{
    AccountCategory, ActivityKind, ContactInfo, ContractAccountDetail, ContractOverview,
    EnrichmentKind, FinancialProduct, Identity, PaymentStanding, Payoff, RunFlags, ScheduledItem,
    UpcomingPaymentReply,
};
