use super::instance::BillingInstance;

/// A recurring service the user pays for.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub id: i64,
    pub service_name: String,
    /// Monthly cost, never negative
    pub cost: f64,
    /// Trimmed, never blank
    pub category: Option<String>,
    /// Only ever goes from false to true
    pub canceled: bool,
    /// Instance with the latest `period_start`, maintained on every append
    pub current_instance_id: Option<i64>,
}

/// Subscription together with its resolved current billing instance.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionSnapshot {
    pub subscription: Subscription,
    pub current_instance: Option<BillingInstance>,
}

impl SubscriptionSnapshot {
    pub fn renewal_date(&self) -> Option<chrono::NaiveDate> {
        self.current_instance.as_ref().map(|i| i.period_end)
    }
}

/// Normalize a category: trimmed, with blank treated as absent.
pub fn normalize_category(category: Option<&str>) -> Option<String> {
    category
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

/// Summary bucket for a category; absent categories are grouped together.
pub fn category_bucket(category: Option<&str>) -> String {
    normalize_category(category).unwrap_or_else(|| "Uncategorized".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_category() {
        assert_eq!(normalize_category(Some("  Video ")), Some("Video".to_string()));
        assert_eq!(normalize_category(Some("   ")), None);
        assert_eq!(normalize_category(Some("")), None);
        assert_eq!(normalize_category(None), None);
    }

    #[test]
    fn test_category_bucket() {
        assert_eq!(category_bucket(Some("A")), "A");
        assert_eq!(category_bucket(Some(" ")), "Uncategorized");
        assert_eq!(category_bucket(None), "Uncategorized");
    }
}
