//! Pure validation of payment-field configurations and buyer-entered
//! amounts. Nothing here touches the network.

use fieldpay_types::{
    payment_fields::{AccountIdentifier, AmountConfig, PaymentFieldConfig, PaymentTypeConfig},
};
use fieldpay_utils::types::MajorUnit;

/// Result of validating a field configuration.
#[derive(Clone, Debug, Default)]
pub struct ValidationOutcome {
    /// True when no errors were found; warnings do not affect this.
    pub is_valid: bool,
    /// Blocking problems, in discovery order.
    pub errors: Vec<String>,
    /// Non-blocking observations (e.g. an upcoming plan re-creation).
    pub warnings: Vec<String>,
}

impl ValidationOutcome {
    /// All errors joined into one displayable message.
    pub fn error_message(&self) -> String {
        self.errors.join("; ")
    }
}

/// Validates a field's declared configuration before any network call.
pub fn validate_field(field: &PaymentFieldConfig) -> ValidationOutcome {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if field.account_identifier.raw().trim().is_empty() {
        errors.push("Merchant account is required".to_owned());
    }

    match &field.payment_type {
        PaymentTypeConfig::Subscription(config) => {
            if config.use_existing_plan {
                if config
                    .selected_existing_plan
                    .as_deref()
                    .map_or(true, |plan| plan.trim().is_empty())
                {
                    errors.push("Existing plan selection is required".to_owned());
                }
            } else {
                if config
                    .name
                    .as_deref()
                    .map_or(true, |name| name.trim().is_empty())
                {
                    errors.push("Subscription name is required".to_owned());
                }
                let price = config.price.or(field.amount.value);
                if !price.is_some_and(MajorUnit::is_positive) {
                    errors.push("Subscription price must be greater than zero".to_owned());
                }
                if config.frequency.is_none() {
                    errors.push("Billing frequency is required".to_owned());
                }
            }
        }
        PaymentTypeConfig::DonationButton(config) => {
            if config
                .donation_button_id
                .as_deref()
                .map_or(true, |id| id.trim().is_empty())
            {
                errors.push("Donation button ID is required".to_owned());
            }
        }
        PaymentTypeConfig::ProductWise(config) => {
            if config.products.is_empty() {
                errors.push("At least one product is required".to_owned());
            }
        }
        // Donation and one-time amounts are checked at checkout time.
        PaymentTypeConfig::Donation(_)
        | PaymentTypeConfig::CustomAmount(_)
        | PaymentTypeConfig::OneTime(_) => {}
    }

    if let (Some(previous), AccountIdentifier::Direct(current)) =
        (&field.previous_merchant_id, &field.account_identifier)
    {
        if previous != current {
            warnings
                .push("Merchant account changed; a new subscription plan will be created".to_owned());
        }
    }

    ValidationOutcome {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

/// Why a buyer-entered amount was rejected.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum AmountError {
    #[allow(missing_docs)]
    #[error("Please enter a valid amount")]
    NotANumber,
    #[allow(missing_docs)]
    #[error("Amount must be greater than zero")]
    NotPositive,
    #[allow(missing_docs)]
    #[error("Amount must be at least {min}")]
    BelowMinimum {
        #[allow(missing_docs)]
        min: MajorUnit,
    },
    #[allow(missing_docs)]
    #[error("Amount must not exceed {max}")]
    AboveMaximum {
        #[allow(missing_docs)]
        max: MajorUnit,
    },
}

/// Validates a buyer-entered amount string against the field's bounds.
pub fn validate_payment_amount(
    input: &str,
    amount: &AmountConfig,
) -> Result<MajorUnit, AmountError> {
    let value = MajorUnit::parse(input).map_err(|_| AmountError::NotANumber)?;
    if !value.is_positive() {
        return Err(AmountError::NotPositive);
    }
    if let Some(min) = amount.min_amount {
        if value < min {
            return Err(AmountError::BelowMinimum { min });
        }
    }
    if let Some(max) = amount.max_amount {
        if value > max {
            return Err(AmountError::AboveMaximum { max });
        }
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use fieldpay_types::{
        enums::{AmountType, Currency, PaymentProvider},
        payment_fields::{
            DonationButtonConfig, EnabledMethods, SubscriptionConfig,
        },
    };

    use super::*;

    fn amount_config(min: Option<f64>, max: Option<f64>) -> AmountConfig {
        AmountConfig {
            kind: AmountType::Variable,
            value: None,
            currency: Currency::Usd,
            min_amount: min.map(MajorUnit::new),
            max_amount: max.map(MajorUnit::new),
            suggested_amounts: Vec::new(),
        }
    }

    fn field(payment_type: PaymentTypeConfig) -> PaymentFieldConfig {
        PaymentFieldConfig {
            field_id: "field1".to_owned(),
            form_id: "form1".to_owned(),
            provider: PaymentProvider::Paypal,
            account_identifier: AccountIdentifier::Direct("M-1".to_owned()),
            amount: amount_config(None, None),
            payment_type,
            previous_merchant_id: None,
            enabled_methods: EnabledMethods::default(),
        }
    }

    #[test]
    fn amount_bounds_are_enforced() {
        let config = amount_config(Some(10.0), Some(100.0));
        assert_eq!(
            validate_payment_amount("5", &config),
            Err(AmountError::BelowMinimum {
                min: MajorUnit::new(10.0)
            })
        );
        assert_eq!(
            validate_payment_amount("50", &config).map(MajorUnit::get),
            Ok(50.0)
        );
        assert_eq!(
            validate_payment_amount("500", &config),
            Err(AmountError::AboveMaximum {
                max: MajorUnit::new(100.0)
            })
        );
        assert_eq!(
            validate_payment_amount("abc", &config),
            Err(AmountError::NotANumber)
        );
    }

    #[test]
    fn missing_donation_button_id_is_an_error() {
        let outcome = validate_field(&field(PaymentTypeConfig::DonationButton(
            DonationButtonConfig {
                donation_button_id: None,
            },
        )));
        assert!(!outcome.is_valid);
        assert_eq!(outcome.errors, vec!["Donation button ID is required"]);
    }

    #[test]
    fn subscription_requires_name_price_and_frequency() {
        let outcome = validate_field(&field(PaymentTypeConfig::Subscription(
            SubscriptionConfig::default(),
        )));
        assert!(!outcome.is_valid);
        assert_eq!(outcome.errors.len(), 3);
    }

    #[test]
    fn existing_plan_link_skips_remaining_checks() {
        let outcome = validate_field(&field(PaymentTypeConfig::Subscription(
            SubscriptionConfig {
                use_existing_plan: true,
                selected_existing_plan: Some("P-77".to_owned()),
                ..Default::default()
            },
        )));
        assert!(outcome.is_valid);
    }

    #[test]
    fn merchant_change_is_a_warning_not_an_error() {
        let mut config = field(PaymentTypeConfig::Subscription(SubscriptionConfig {
            use_existing_plan: true,
            selected_existing_plan: Some("P-77".to_owned()),
            ..Default::default()
        }));
        config.previous_merchant_id = Some("M-OLD".to_owned());
        let outcome = validate_field(&config);
        assert!(outcome.is_valid);
        assert_eq!(outcome.warnings.len(), 1);
    }
}
