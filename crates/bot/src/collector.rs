//! The reusable profile collector.
//!
//! A strictly sequential three-step form - full name, address, phone - used
//! from four different entry points. The collector itself persists nothing:
//! it accumulates the triple in memory and hands it back on the final step,
//! and the session commits it as a single profile update. Cancelling (or
//! starting another collector) throws the partial input away.

use packshop_core::{Phone, ShippingMethod};

/// What to do with the collected triple once the form completes.
///
/// A tagged variant, not a conditional chain: each entry point constructs
/// the collector with its own resume action and gets control back with the
/// fresh data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeAction {
    /// Continue into checkout: show the info-confirmation prompt.
    NewOrder,
    /// Standalone address edit from the main menu.
    EditProfile,
    /// Re-entry from the info-confirmation prompt during checkout.
    EditProfileMidOrder,
    /// Edit from the final invoice preview; the chosen shipping method
    /// rides along so the preview can be rebuilt.
    EditInvoice {
        /// Shipping method already chosen in this checkout.
        shipping: ShippingMethod,
    },
}

/// Prompt for the first step, shown when the collector starts.
pub const NAME_PROMPT: &str = "Please enter your full name:";
const NAME_REPROMPT: &str = "Name cannot be empty. Please enter your full name:";
const ADDRESS_PROMPT: &str = "Please enter your full shipping address:";
const ADDRESS_REPROMPT: &str = "Address cannot be empty. Please enter your full shipping address:";
const PHONE_PROMPT: &str = "Please enter your mobile phone number:";

enum Step {
    FullName,
    Address { full_name: String },
    Phone { full_name: String, address: String },
}

/// The validated triple produced by a completed collector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedProfile {
    pub full_name: String,
    pub address: String,
    pub phone: Phone,
}

/// Result of feeding one message into the collector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectorOutcome {
    /// Step accepted; ask for the next field.
    Prompt(&'static str),
    /// Input rejected; re-ask the same field.
    Invalid(String),
    /// All three fields collected; commit and resume.
    Complete(CollectedProfile),
}

/// A single user's in-flight form.
pub struct ProfileCollector {
    resume: ResumeAction,
    step: Step,
}

impl ProfileCollector {
    /// Start a fresh collector for the given resume context.
    #[must_use]
    pub const fn new(resume: ResumeAction) -> Self {
        Self {
            resume,
            step: Step::FullName,
        }
    }

    /// The entry point this collector will hand its data back to.
    #[must_use]
    pub const fn resume_action(&self) -> ResumeAction {
        self.resume
    }

    /// Feed one user message into the current step.
    ///
    /// Input is trimmed; empty text never advances. On
    /// [`CollectorOutcome::Complete`] the collector is spent and should be
    /// dropped.
    pub fn advance(&mut self, input: &str) -> CollectorOutcome {
        let input = input.trim();

        match std::mem::replace(&mut self.step, Step::FullName) {
            Step::FullName => {
                if input.is_empty() {
                    return CollectorOutcome::Invalid(NAME_REPROMPT.to_owned());
                }
                self.step = Step::Address {
                    full_name: input.to_owned(),
                };
                CollectorOutcome::Prompt(ADDRESS_PROMPT)
            }
            Step::Address { full_name } => {
                if input.is_empty() {
                    self.step = Step::Address { full_name };
                    return CollectorOutcome::Invalid(ADDRESS_REPROMPT.to_owned());
                }
                self.step = Step::Phone {
                    full_name,
                    address: input.to_owned(),
                };
                CollectorOutcome::Prompt(PHONE_PROMPT)
            }
            Step::Phone { full_name, address } => match Phone::parse(input) {
                Ok(phone) => CollectorOutcome::Complete(CollectedProfile {
                    full_name,
                    address,
                    phone,
                }),
                Err(e) => {
                    self.step = Step::Phone { full_name, address };
                    CollectorOutcome::Invalid(format!("{e}. {PHONE_PROMPT}"))
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_collects_all_three_fields() {
        let mut collector = ProfileCollector::new(ResumeAction::NewOrder);

        assert_eq!(
            collector.advance("Erfan Ahmadi"),
            CollectorOutcome::Prompt(ADDRESS_PROMPT)
        );
        assert_eq!(
            collector.advance("12 Bazaar Lane, Tehran"),
            CollectorOutcome::Prompt(PHONE_PROMPT)
        );

        let CollectorOutcome::Complete(profile) = collector.advance("+989121234567") else {
            panic!("expected completion");
        };
        assert_eq!(profile.full_name, "Erfan Ahmadi");
        assert_eq!(profile.address, "12 Bazaar Lane, Tehran");
        assert_eq!(profile.phone.as_str(), "+989121234567");
    }

    #[test]
    fn empty_input_reprompts_without_advancing() {
        let mut collector = ProfileCollector::new(ResumeAction::EditProfile);

        assert!(matches!(collector.advance("  "), CollectorOutcome::Invalid(_)));
        // Still on the name step.
        assert_eq!(
            collector.advance("Erfan"),
            CollectorOutcome::Prompt(ADDRESS_PROMPT)
        );
    }

    #[test]
    fn bad_phone_reprompts_and_keeps_earlier_fields() {
        let mut collector = ProfileCollector::new(ResumeAction::NewOrder);
        collector.advance("Erfan");
        collector.advance("Somewhere 5");

        assert!(matches!(
            collector.advance("not a phone"),
            CollectorOutcome::Invalid(_)
        ));

        let CollectorOutcome::Complete(profile) = collector.advance("02188776655") else {
            panic!("expected completion after valid phone");
        };
        assert_eq!(profile.full_name, "Erfan");
        assert_eq!(profile.address, "Somewhere 5");
    }

    #[test]
    fn resume_action_is_preserved() {
        let collector = ProfileCollector::new(ResumeAction::EditInvoice {
            shipping: ShippingMethod::Cargo,
        });
        assert_eq!(
            collector.resume_action(),
            ResumeAction::EditInvoice {
                shipping: ShippingMethod::Cargo
            }
        );
    }
}
