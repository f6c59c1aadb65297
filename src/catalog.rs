//! Static partner catalog - the known categories and options per category.
//!
//! The catalog is advisory: the engine processes any selection, known or not.
//! The CLI uses it to list choices and to warn about unrecognized ones.

use serde::{Deserialize, Serialize};

/// Product base URL, attached as context to summarization calls
pub const PRODUCT_URL: &str = "citibankdemobusiness.dev";
/// Product display name
pub const PRODUCT_NAME: &str = "Citibank Demo Business Inc";

/// The onboarding categories a partner can be selected in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartnerCategory {
    CreditCardProcessing,
    ECommercePlatform,
    PaymentGateway,
    CloudProvider,
    AiPlatform,
    CrmSystem,
    HrmSystem,
    CyberSecurity,
    ProjectManagement,
    Blockchain,
}

impl PartnerCategory {
    pub const ALL: [PartnerCategory; 10] = [
        PartnerCategory::CreditCardProcessing,
        PartnerCategory::ECommercePlatform,
        PartnerCategory::PaymentGateway,
        PartnerCategory::CloudProvider,
        PartnerCategory::AiPlatform,
        PartnerCategory::CrmSystem,
        PartnerCategory::HrmSystem,
        PartnerCategory::CyberSecurity,
        PartnerCategory::ProjectManagement,
        PartnerCategory::Blockchain,
    ];

    /// Category key as it appears in selection files
    pub fn key(&self) -> &'static str {
        match self {
            PartnerCategory::CreditCardProcessing => "creditCardProcessing",
            PartnerCategory::ECommercePlatform => "eCommercePlatform",
            PartnerCategory::PaymentGateway => "paymentGateway",
            PartnerCategory::CloudProvider => "cloudProvider",
            PartnerCategory::AiPlatform => "aiPlatform",
            PartnerCategory::CrmSystem => "crmSystem",
            PartnerCategory::HrmSystem => "hrmSystem",
            PartnerCategory::CyberSecurity => "cyberSecuritySolution",
            PartnerCategory::ProjectManagement => "projectManagement",
            PartnerCategory::Blockchain => "blockchainService",
        }
    }

    /// Human-readable category name
    pub fn label(&self) -> &'static str {
        match self {
            PartnerCategory::CreditCardProcessing => "Credit Card Processing",
            PartnerCategory::ECommercePlatform => "E-Commerce Platform",
            PartnerCategory::PaymentGateway => "Payment Gateway",
            PartnerCategory::CloudProvider => "Cloud Provider",
            PartnerCategory::AiPlatform => "AI Platform",
            PartnerCategory::CrmSystem => "CRM System",
            PartnerCategory::HrmSystem => "HRM System",
            PartnerCategory::CyberSecurity => "Cyber Security Solution",
            PartnerCategory::ProjectManagement => "Project Management",
            PartnerCategory::Blockchain => "Blockchain Service",
        }
    }

    /// Known partner options for this category
    pub fn options(&self) -> &'static [&'static str] {
        match self {
            PartnerCategory::CreditCardProcessing => &["Stripe", "PayPal", "Adyen"],
            PartnerCategory::ECommercePlatform => &["Shopify", "WooCommerce", "SquareSpace"],
            PartnerCategory::PaymentGateway => &["Plaid", "Stripe", "Marqeta"],
            PartnerCategory::CloudProvider => &["Azure", "GoogleCloud", "AWS"],
            PartnerCategory::AiPlatform => &["Gemini", "ChatGPT", "HuggingFace"],
            PartnerCategory::CrmSystem => &["Salesforce", "HubSpot", "ZohoCRM"],
            PartnerCategory::HrmSystem => &["Workday", "ADP", "Gusto"],
            PartnerCategory::CyberSecurity => &["PaloAltoNetworks", "Fortinet", "CrowdStrike"],
            PartnerCategory::ProjectManagement => &["Jira", "Asana", "Trello"],
            PartnerCategory::Blockchain => &["Ethereum", "Hyperledger", "Cardano"],
        }
    }

    /// Look a category up by its key
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }
}

/// Whether a (category, value) pair is listed in the catalog
pub fn is_known(category: &str, value: &str) -> bool {
    PartnerCategory::from_key(category)
        .map(|c| c.options().contains(&value))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_categories_have_options() {
        for category in PartnerCategory::ALL {
            assert!(!category.options().is_empty(), "{:?}", category);
            assert!(!category.key().is_empty());
            assert!(!category.label().is_empty());
        }
    }

    #[test]
    fn test_from_key_roundtrip() {
        for category in PartnerCategory::ALL {
            assert_eq!(PartnerCategory::from_key(category.key()), Some(category));
        }
        assert_eq!(PartnerCategory::from_key("unknownKey"), None);
    }

    #[test]
    fn test_is_known() {
        assert!(is_known("paymentGateway", "Stripe"));
        assert!(is_known("cyberSecuritySolution", "CrowdStrike"));
        assert!(!is_known("paymentGateway", "NotAGateway"));
        assert!(!is_known("nope", "Stripe"));
    }

    #[test]
    fn test_keys_are_unique() {
        let mut keys: Vec<&str> = PartnerCategory::ALL.iter().map(|c| c.key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), PartnerCategory::ALL.len());
    }
}
