use shared::{CostSummaryResponse, ReminderView};

use crate::domain::commands::report::CostSummary;
use crate::domain::models::PendingReminder;
use crate::io::rest::mappers::subscription_mapper::format_date;

pub struct ReportMapper;

impl ReportMapper {
    pub fn summary_to_dto(summary: CostSummary) -> CostSummaryResponse {
        CostSummaryResponse {
            total_monthly_cost: summary.total_monthly_cost,
            total_annual_cost: summary.total_annual_cost,
            cost_by_category: summary.cost_by_category,
        }
    }

    pub fn reminder_to_dto(pending: PendingReminder) -> ReminderView {
        ReminderView {
            reminder_id: pending.reminder.id,
            send_date: format_date(pending.reminder.send_date),
            sent: pending.reminder.sent,
            subscription_id: pending.reminder.subscription_id,
            service_name: pending.service_name,
            cost: pending.cost,
            renewal_date: pending.renewal_date.map(format_date),
            category: pending.category,
            canceled: pending.canceled,
        }
    }

    pub fn reminders_to_dto_list(pending: Vec<PendingReminder>) -> Vec<ReminderView> {
        pending.into_iter().map(Self::reminder_to_dto).collect()
    }
}
