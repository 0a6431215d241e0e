use crate::types::{ContractAccountDetail, PaymentStanding};
use chrono::NaiveDate;
use std::cmp::Ordering;

/// Mutually exclusive standing rule, evaluated in priority order.
pub fn standing(contract: &ContractAccountDetail) -> PaymentStanding {
    if contract.current_balance_minor > 0 {
        PaymentStanding::PastDue
    } else if contract.total_amount_due_minor > 0 {
        PaymentStanding::Current
    } else {
        PaymentStanding::Paid
    }
}

impl ContractAccountDetail {
    pub fn payment_standing(&self) -> PaymentStanding {
        standing(self)
    }
}

/// Missing due dates sort last within their bucket.
fn cmp_due_date(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Partitions contracts into standing buckets, orders each bucket ascending
/// by due date (stable, so equal dates keep input order), and concatenates
/// PastDue ++ Current ++ Paid. Bucket membership dominates due-date order.
pub fn order_contracts(contracts: Vec<ContractAccountDetail>) -> Vec<ContractAccountDetail> {
    let mut past_due = Vec::new();
    let mut current = Vec::new();
    let mut paid = Vec::new();

    for contract in contracts {
        match standing(&contract) {
            PaymentStanding::PastDue => past_due.push(contract),
            PaymentStanding::Current => current.push(contract),
            PaymentStanding::Paid => paid.push(contract),
        }
    }

    past_due.sort_by(|a, b| cmp_due_date(a.next_payment_due_date, b.next_payment_due_date));
    current.sort_by(|a, b| cmp_due_date(a.next_payment_due_date, b.next_payment_due_date));
    paid.sort_by(|a, b| cmp_due_date(a.next_payment_due_date, b.next_payment_due_date));

    let mut ordered = past_due;
    ordered.append(&mut current);
    ordered.append(&mut paid);
    ordered
}
