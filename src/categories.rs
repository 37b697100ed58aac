//! Credit-score bands and the guidance attached to each one

use crate::score_index::{RangeLookup, ScoreRangeIndex};
use crate::utilization::UtilizationLimits;
use serde::Serialize;
use tracing::debug;

pub const MIN_CREDIT_SCORE: u32 = 300;
pub const MAX_CREDIT_SCORE: u32 = 850;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Impact {
    Critical,
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequiredAction {
    pub title: &'static str,
    pub description: &'static str,
    pub impact: Impact,
}

/// Optional tip shown next to the required actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub title: &'static str,
    pub text: &'static str,
}

/// A credit-score band
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCategory {
    pub name: &'static str,
    /// Stable identifier used by the presentation layer
    pub slug: &'static str,
    pub min_score: u32,
    pub max_score: u32,
    pub utilization: UtilizationLimits,
    pub suggestions: Vec<Suggestion>,
    pub required_actions: Vec<RequiredAction>,
}

fn action(title: &'static str, description: &'static str, impact: Impact) -> RequiredAction {
    RequiredAction {
        title,
        description,
        impact,
    }
}

fn suggestion(title: &'static str, text: &'static str) -> Suggestion {
    Suggestion { title, text }
}

/// The five bands covering 300..=850, lowest first
pub fn credit_categories() -> Vec<CreditCategory> {
    use Impact::*;

    vec![
        CreditCategory {
            name: "High Risk",
            slug: "high-risk",
            min_score: 300,
            max_score: 579,
            utilization: UtilizationLimits {
                recommended_limit: 30,
                ideal_limit: 10,
                warning_threshold: 25,
                danger_threshold: 30,
                message: "Keep utilization below 30% to avoid further score damage",
            },
            suggestions: vec![
                suggestion(
                    "Use auto-pay for bills",
                    "Set up automatic payments to avoid forgetting due dates. This ensures consistent on-time payments starting this month.",
                ),
                suggestion(
                    "Check credit report for errors",
                    "Review your credit reports carefully and dispute any inaccuracies. Removing incorrect negative items can significantly boost your score.",
                ),
                suggestion(
                    "Track credit score monthly",
                    "Monitor your credit score regularly to notice improvements and stay motivated on your credit repair journey.",
                ),
                suggestion(
                    "Focus on one debt at a time",
                    "Use the \"Snowball\" method - pay off smallest debts first for quick wins, then move to larger ones for momentum.",
                ),
            ],
            required_actions: vec![
                action(
                    "Pay all bills on time starting this month",
                    "Make every payment on time - no missed or late payments. Payment history is the most critical factor in rebuilding your credit.",
                    Critical,
                ),
                action(
                    "Clear overdue or defaulted accounts",
                    "Contact creditors immediately to set up payment plans for any past-due accounts. Bringing accounts current is your top priority.",
                    Critical,
                ),
                action(
                    "Keep credit card usage below 30%",
                    "Reduce credit utilization to under 30% of your total limit. High utilization signals financial stress to lenders.",
                    High,
                ),
                action(
                    "Avoid applying for new loans or cards temporarily",
                    "Each application creates a hard inquiry that lowers your score. Focus on rebuilding existing credit, not obtaining new credit.",
                    High,
                ),
                action(
                    "Build credit history if needed",
                    "If you have no credit history, get a secured credit card or take a small credit builder loan from your bank to establish positive payment records.",
                    High,
                ),
            ],
        },
        CreditCategory {
            name: "Needs Improvement",
            slug: "needs-improvement",
            min_score: 580,
            max_score: 669,
            utilization: UtilizationLimits {
                recommended_limit: 25,
                ideal_limit: 10,
                warning_threshold: 20,
                danger_threshold: 25,
                message: "Aim for under 25% utilization to improve your score",
            },
            suggestions: vec![
                suggestion(
                    "Set reminders before due dates",
                    "Create calendar alerts or phone reminders 2-3 days before each bill is due to ensure you never miss a payment.",
                ),
                suggestion(
                    "Keep one small credit card active",
                    "Maintain at least one credit card with small recurring charges (like Netflix) and pay it in full each month to build positive history.",
                ),
                suggestion(
                    "Avoid co-signing loans",
                    "Don't co-sign loans for others until your score improves to 670+. Co-signing adds debt to your profile and increases risk.",
                ),
                suggestion(
                    "Add a goal tracker",
                    "Set milestones (e.g., 650 → 670) and track your progress monthly. Small wins keep you motivated on your improvement journey.",
                ),
            ],
            required_actions: vec![
                action(
                    "Make every payment on time for 6 months",
                    "Establish a consistent pattern of on-time payments. Set up automatic payments or reminders to ensure 100% on-time payment rate.",
                    Critical,
                ),
                action(
                    "Reduce credit card balances below 25%",
                    "Lower your credit utilization to under 25%, ideally under 10%. Pay down high-balance cards first for maximum score impact.",
                    High,
                ),
                action(
                    "Keep old accounts open and active",
                    "Don't close old accounts - they help your credit age. Keep them active with small purchases every few months.",
                    High,
                ),
                action(
                    "Limit new credit inquiries",
                    "Avoid too many new credit applications. Maximum 1 every 6 months to minimize hard inquiries on your report.",
                    High,
                ),
                action(
                    "Check credit report and remove errors",
                    "Review your credit reports from all three bureaus. Dispute and remove any inaccurate negative entries immediately.",
                    Medium,
                ),
            ],
        },
        CreditCategory {
            name: "Moderate Risk",
            slug: "moderate-risk",
            min_score: 670,
            max_score: 739,
            utilization: UtilizationLimits {
                recommended_limit: 20,
                ideal_limit: 10,
                warning_threshold: 15,
                danger_threshold: 20,
                message: "Keep under 20% to move into \"Low Risk\" category",
            },
            suggestions: vec![
                suggestion(
                    "Pay card before statement date",
                    "Your statement balance is reported to credit bureaus. Pay before the statement closing date to show lower utilization.",
                ),
                suggestion(
                    "Schedule automatic full payments",
                    "Set up autopay to pay your full statement balance each month. This ensures perfect payment history with zero effort.",
                ),
                suggestion(
                    "Keep inactive accounts alive",
                    "Check for any dormant accounts and use them occasionally with small purchases. Inactive accounts may be closed by the issuer.",
                ),
                suggestion(
                    "Review credit reports quarterly",
                    "Monitor your credit reports every 3-4 months for errors, fraud, or unexpected changes. Early detection prevents bigger issues.",
                ),
            ],
            required_actions: vec![
                action(
                    "Keep credit utilization under 20-25%",
                    "Maintain low credit card balances relative to limits. Aim for under 20% on each card to demonstrate responsible credit use.",
                    Critical,
                ),
                action(
                    "Continue 100% on-time payments",
                    "You're doing great! Keep making every payment on time. Consistency over time strengthens your credit profile significantly.",
                    Critical,
                ),
                action(
                    "Limit credit applications to 1-2 per year",
                    "Only apply for new credit when truly needed. Too many inquiries can lower your score and signal credit shopping.",
                    High,
                ),
                action(
                    "Maintain a healthy credit mix",
                    "Have both revolving (credit cards) and installment (loans) credit. If you only have cards, consider a small loan.",
                    Medium,
                ),
                action(
                    "Avoid unnecessary account closures",
                    "Keep old accounts open, especially your oldest ones. Closing accounts reduces your credit age and available credit.",
                    Medium,
                ),
            ],
        },
        CreditCategory {
            name: "Low Risk",
            slug: "low-risk",
            min_score: 740,
            max_score: 799,
            utilization: UtilizationLimits {
                recommended_limit: 15,
                ideal_limit: 10,
                warning_threshold: 12,
                danger_threshold: 15,
                message: "Maintain under 15% to reach prime status",
            },
            suggestions: vec![
                suggestion(
                    "Ask for credit limit increases",
                    "Request higher limits on existing cards to improve your utilization ratio. With your score, approvals are likely without hard inquiries.",
                ),
                suggestion(
                    "Diversify with low-risk accounts",
                    "Consider adding a small EMI or credit builder loan to show you can manage different types of credit responsibly.",
                ),
                suggestion(
                    "Sign up for credit monitoring alerts",
                    "Enable real-time alerts for any changes to your credit report. Early detection of errors or fraud protects your excellent score.",
                ),
                suggestion(
                    "Stay below 2 hard inquiries per year",
                    "Be very selective with new credit applications. Multiple inquiries can drop you from \"Very Good\" to \"Good\" category.",
                ),
            ],
            required_actions: vec![
                action(
                    "Maintain perfect payment history",
                    "One missed payment can drop your score significantly at this level. Continue your spotless record with autopay and alerts.",
                    Critical,
                ),
                action(
                    "Keep utilization consistently under 15-20%",
                    "Maintain low balances on all cards. Consider paying before statement close to report even lower utilization.",
                    Critical,
                ),
                action(
                    "Monitor credit reports regularly",
                    "Check your credit reports every few months for errors or unauthorized activity. Quick action prevents score damage.",
                    High,
                ),
                action(
                    "Keep old credit lines open",
                    "Preserve your credit history by keeping oldest accounts active. Length of history is crucial at this score level.",
                    High,
                ),
                action(
                    "Use credit occasionally",
                    "Don't let accounts go dormant. Make small purchases periodically and pay in full to show active, responsible credit use.",
                    Medium,
                ),
            ],
        },
        CreditCategory {
            name: "Prime",
            slug: "prime",
            min_score: 800,
            max_score: 850,
            utilization: UtilizationLimits {
                recommended_limit: 10,
                ideal_limit: 5,
                warning_threshold: 8,
                danger_threshold: 10,
                message: "Keep below 10% to maintain excellent credit",
            },
            suggestions: vec![
                suggestion(
                    "Set up credit alerts",
                    "Enable alerts for any change or inquiry to your credit. At this level, you're a target for fraud - stay vigilant.",
                ),
                suggestion(
                    "Negotiate best offers with lenders",
                    "You have maximum leverage. Negotiate lowest rates on mortgages, auto loans, and request premium card benefits.",
                ),
                suggestion(
                    "Monitor average account age",
                    "Keep your oldest accounts open and active. Don't close them even if unused - they're valuable for your credit age.",
                ),
                suggestion(
                    "Stay diversified across credit types",
                    "Use multiple types of credit (cards, loans, EMI) responsibly. Diversity strengthens your already excellent profile.",
                ),
            ],
            required_actions: vec![
                action(
                    "Keep utilization under 10%",
                    "Maintain very low credit card balances. At prime level, even 15-20% utilization can prevent you from reaching 850.",
                    Critical,
                ),
                action(
                    "Maintain 100% on-time payments",
                    "You've mastered credit! Continue your perfect payment history. Even one late payment can drop you 50-100 points.",
                    Critical,
                ),
                action(
                    "Check credit report monthly",
                    "Monitor for fraud or identity theft issues. With excellent credit, you're a high-value target for criminals.",
                    High,
                ),
                action(
                    "Avoid unnecessary new credit lines",
                    "Only apply for credit when truly needed. Each hard inquiry temporarily lowers your score, even at prime level.",
                    Medium,
                ),
                action(
                    "Keep existing accounts responsibly active",
                    "Use your cards occasionally with small purchases and pay in full. Don't let premium accounts go dormant and get closed.",
                    Medium,
                ),
            ],
        },
    ]
}

/// Insertion order that yields a three-level tree: middle band first, then
/// each half bisected.
const BALANCED_ORDER: [usize; 5] = [2, 1, 3, 0, 4];

/// Credit category lookup built once at startup and shared by reference
#[derive(Debug, Clone)]
pub struct CreditCategoryIndex {
    index: ScoreRangeIndex<CreditCategory>,
}

impl CreditCategoryIndex {
    pub fn category_for(&self, score: u32) -> Option<&CreditCategory> {
        let RangeLookup {
            category,
            comparisons,
        } = self.index.search_with_stats(score);

        debug!(
            score = score,
            category = category.map(|c| c.name).unwrap_or("none"),
            comparisons = comparisons,
            "Credit category lookup"
        );

        category
    }

    pub fn index(&self) -> &ScoreRangeIndex<CreditCategory> {
        &self.index
    }
}

/// Build the balanced credit category index
pub fn credit_category_index() -> CreditCategoryIndex {
    let categories = credit_categories();
    let mut index = ScoreRangeIndex::new();

    for &i in &BALANCED_ORDER {
        let category = categories[i].clone();
        index.insert(category.min_score, category.max_score, category);
    }

    debug!(height = index.height(), "Credit category index built");

    CreditCategoryIndex { index }
}
