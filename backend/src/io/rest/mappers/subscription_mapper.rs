use chrono::NaiveDate;
use shared::{
    BillingInstanceView, CancelSubscriptionResponse, CostValue, CreateSubscriptionRequest,
    PaymentResponse, SubscriptionView, UpdateSubscriptionRequest,
};

use crate::domain::commands::subscription::{
    CancelResult, CostInput, PaymentResult, RegisterSubscriptionCommand,
    UpdateSubscriptionCommand,
};
use crate::domain::models::{BillingInstance, SubscriptionSnapshot};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub struct SubscriptionMapper;

impl SubscriptionMapper {
    fn cost_to_domain(cost: CostValue) -> CostInput {
        match cost {
            CostValue::Number(amount) => CostInput::Amount(amount),
            CostValue::Text(text) => CostInput::Text(text),
        }
    }

    /// Convert a registration request to a domain command
    pub fn to_register_command(request: CreateSubscriptionRequest) -> RegisterSubscriptionCommand {
        RegisterSubscriptionCommand {
            service_name: request.service_name,
            cost: request.cost.map(Self::cost_to_domain),
            category: request.category,
            canceled: request.canceled.unwrap_or(false),
            renewal_date: request.renewal_date,
        }
    }

    /// Convert an edit request to a domain command, keeping absent and null apart
    pub fn to_update_command(request: UpdateSubscriptionRequest) -> UpdateSubscriptionCommand {
        UpdateSubscriptionCommand {
            service_name: request.service_name,
            cost: request.cost.map(|cost| cost.map(Self::cost_to_domain)),
            category: request.category,
        }
    }

    pub fn instance_to_dto(instance: BillingInstance) -> BillingInstanceView {
        BillingInstanceView {
            id: instance.id,
            subscription_id: instance.subscription_id,
            period_start: format_date(instance.period_start),
            period_end: format_date(instance.period_end),
            payment_status: instance.payment_status.to_string(),
            paid_at: instance.paid_at.map(|paid_at| paid_at.to_rfc3339()),
        }
    }

    /// Project a subscription and its current instance
    pub fn to_dto(snapshot: SubscriptionSnapshot) -> SubscriptionView {
        let renewal_date = snapshot.renewal_date().map(format_date);
        let SubscriptionSnapshot {
            subscription,
            current_instance,
        } = snapshot;
        let current = current_instance.as_ref();

        SubscriptionView {
            id: subscription.id,
            service_name: subscription.service_name,
            cost: subscription.cost,
            renewal_date,
            payment_status: current.map(|i| i.payment_status.to_string()),
            category: subscription.category,
            canceled: subscription.canceled,
            current_instance_id: current.map(|i| i.id),
            current_period_start: current.map(|i| format_date(i.period_start)),
            current_period_end: current.map(|i| format_date(i.period_end)),
        }
    }

    pub fn to_dto_list(snapshots: Vec<SubscriptionSnapshot>) -> Vec<SubscriptionView> {
        snapshots.into_iter().map(Self::to_dto).collect()
    }

    pub fn to_payment_response(result: PaymentResult) -> PaymentResponse {
        PaymentResponse {
            paid_instance: Self::instance_to_dto(result.paid_instance),
            next_instance: Self::instance_to_dto(result.next_instance),
            subscription: Self::to_dto(result.snapshot),
        }
    }

    pub fn to_cancel_response(result: CancelResult) -> CancelSubscriptionResponse {
        CancelSubscriptionResponse {
            message: format!("Subscription {} canceled", result.subscription.id),
            id: result.subscription.id,
            canceled: result.subscription.canceled,
            reminders_removed: result.reminders_removed,
        }
    }
}
