//! Builds the request handed to a `Narrator` and turns its answer into `Advice`.
//!
//! The request only carries figures that were already computed by `aggregate` and `projection`.
//! Whatever the narrator writes, the numbers shown next to it stay the ones computed here.

use crate::aggregate::{AggregateView, SavingsStatus};
use crate::api::Narrator;
use crate::model::{Amount, DataKind, Household, Profile};
use crate::projection::ProjectionSeries;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

/// Shown instead of the narrative when the narrator could not produce one.
pub const FALLBACK_MESSAGE: &str = "The written analysis is not available right now. The figures \
above were calculated from your sheet and are unaffected.";

/// One of the largest expenses.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct TopExpense {
    pub label: String,
    pub average: Amount,
    /// Percent of the income total, `None` when there is no income.
    pub share_of_income: Option<Decimal>,
}

/// The final year of a projection.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct ProjectionSummary {
    pub years: u32,
    pub annual_rate_percent: Decimal,
    pub monthly_contribution: Amount,
    pub principal_contributed: Amount,
    pub growth: Amount,
    pub total_balance: Amount,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct NarrativeRequest {
    pub data_kind: DataKind,
    pub profile: Profile,
    pub period_count: usize,
    pub income_total: Amount,
    pub expense_total: Amount,
    pub net_balance: Amount,
    pub investment_total: Amount,
    pub true_savings: Amount,
    pub status: SavingsStatus,
    pub top_expenses: Vec<TopExpense>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<ProjectionSummary>,
}

impl NarrativeRequest {
    pub fn build(
        view: &AggregateView,
        profile: &Profile,
        data_kind: DataKind,
        projection: Option<&ProjectionSeries>,
    ) -> Self {
        let top_expenses = view
            .top_expenses
            .iter()
            .map(|e| TopExpense {
                label: e.label.clone(),
                average: e.average,
                share_of_income: view.share_of_income(e.average),
            })
            .collect();

        let projection = projection.and_then(|series| {
            let last = series.final_snapshot()?;
            Some(ProjectionSummary {
                years: last.year,
                annual_rate_percent: series.input.annual_rate_percent(),
                monthly_contribution: series.input.monthly_contribution(),
                principal_contributed: last.principal_contributed,
                growth: last.growth,
                total_balance: last.total_balance,
            })
        });

        Self {
            data_kind,
            profile: profile.clone(),
            period_count: view.period_count,
            income_total: view.income_total,
            expense_total: view.expense_total,
            net_balance: view.net_balance,
            investment_total: view.investment_total,
            true_savings: view.true_savings,
            status: view.status,
            top_expenses,
            projection,
        }
    }

    /// The structured text sent to the narrator.
    pub fn payload(&self) -> String {
        let p = &self.profile;
        let mut lines = vec![
            "### CLIENT PROFILE (the person and the household are separate)".to_string(),
            format!("- Person: {}-year-old adult", p.age),
            format!(
                "- Household: {}, children: {}",
                household_text(p),
                p.children
            ),
            format!("- Main goal: {}", p.goal.trim()),
            format!(
                "- Net worth: {} € (homes plus investments minus debts)",
                p.net_worth.whole()
            ),
            String::new(),
            format!(
                "### HOUSEHOLD FIGURES ({}, averaged over {} periods)",
                data_kind_text(self.data_kind),
                self.period_count
            ),
            format!("- Income: {} €/month", self.income_total.whole()),
            format!("- Expenses: {} €/month", self.expense_total.whole()),
            format!("- Net balance: {} €/month", self.net_balance.whole()),
            format!(
                "- Put aside now (including investments): {} €/month",
                self.true_savings.whole()
            ),
            format!("- Status: {}", status_text(self.status)),
            String::new(),
            format!("### TOP {} EXPENSES", self.top_expenses.len()),
        ];

        if self.top_expenses.is_empty() {
            lines.push("- (none)".to_string());
        }
        lines.extend(self.top_expenses.iter().map(|e| match e.share_of_income {
            Some(share) => format!(
                "- {}: {} €/month ({share} % of income)",
                e.label,
                e.average.whole()
            ),
            None => format!("- {}: {} €/month", e.label, e.average.whole()),
        }));

        if let Some(projection) = &self.projection {
            lines.push(String::new());
            lines.push("### PROJECTION".to_string());
            lines.push(format!(
                "- Saving {} €/month at {} % a year for {} years gives {} € \
                 ({} € contributed, {} € growth)",
                projection.monthly_contribution.whole(),
                projection.annual_rate_percent,
                projection.years,
                projection.total_balance.whole(),
                projection.principal_contributed.whole(),
                projection.growth.whole()
            ));
        }

        lines.push(String::new());
        lines.push("### TASK".to_string());
        lines.push(format!(
            "Compare the situation with the goal \"{}\". Is it realistic with these figures at \
             the current pace of {} €/month?",
            p.goal.trim(),
            self.true_savings.whole()
        ));

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

fn household_text(p: &Profile) -> &'static str {
    match p.household {
        Household::Single => "living alone",
        Household::Couple => "living with a partner",
        Household::Family => "family with children",
        Household::SingleParent => "single parent",
    }
}

fn data_kind_text(kind: DataKind) -> &'static str {
    match kind {
        DataKind::Plan => "budget plan",
        DataKind::Actual => "actual figures",
    }
}

fn status_text(status: SavingsStatus) -> &'static str {
    match status {
        SavingsStatus::Deficit => "critical (spending exceeds income)",
        SavingsStatus::Balanced => "balanced (roughly break-even)",
        SavingsStatus::Strong => "strong (clear surplus)",
    }
}

/// The narrator's answer, or the fallback message.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Advice {
    pub text: String,
    /// `true` when `text` is `FALLBACK_MESSAGE`.
    pub fallback: bool,
}

/// Asks `narrator` for a narrative. Failures never propagate: they are logged and replaced by
/// `FALLBACK_MESSAGE`.
pub async fn advise(narrator: &dyn Narrator, request: &NarrativeRequest) -> Advice {
    match narrator.generate(&request.payload()).await {
        Ok(text) => {
            info!("Received a narrative of {} characters", text.chars().count());
            Advice {
                text,
                fallback: false,
            }
        }
        Err(e) => {
            warn!("Unable to get a narrative, using the fallback message: {e:#}");
            Advice {
                text: FALLBACK_MESSAGE.to_string(),
                fallback: true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{aggregate, AggregateOptions};
    use crate::api::{TestNarrator, TEST_NARRATIVE};
    use crate::parse::{parse_grid, Layout};
    use crate::projection::{project, ProjectionInput};
    use crate::test::{grid_from_csv, SCENARIO_SHEET};
    use std::str::FromStr;

    fn scenario_view() -> AggregateView {
        let store = parse_grid(&grid_from_csv(SCENARIO_SHEET), &Layout::default()).unwrap();
        aggregate(&store, &AggregateOptions::default())
    }

    fn profile() -> Profile {
        Profile {
            age: 37,
            household: Household::Family,
            children: 2,
            goal: "Buy a summer cottage".to_string(),
            net_worth: Amount::from_str("150000").unwrap(),
        }
    }

    #[test]
    fn test_build_copies_computed_figures() {
        let view = scenario_view();
        let request = NarrativeRequest::build(&view, &profile(), DataKind::Actual, None);
        assert_eq!(request.income_total, view.income_total);
        assert_eq!(request.net_balance, Amount::from_str("2200").unwrap());
        assert_eq!(request.status, SavingsStatus::Strong);
        assert_eq!(request.top_expenses.len(), 1);
        assert_eq!(request.top_expenses[0].label, "Rent");
        assert_eq!(
            request.top_expenses[0].share_of_income,
            Some(Decimal::from_str("26.7").unwrap())
        );
        assert!(request.projection.is_none());
    }

    #[test]
    fn test_payload_contents() {
        let view = scenario_view();
        let input = ProjectionInput::new(
            Amount::ZERO,
            view.true_savings,
            Decimal::from(5),
            10,
        )
        .unwrap();
        let series = project(&input);
        let request = NarrativeRequest::build(&view, &profile(), DataKind::Plan, Some(&series));
        let payload = request.payload();
        assert!(payload.contains("37-year-old"));
        assert!(payload.contains("family with children, children: 2"));
        assert!(payload.contains("Net worth: 150,000 €"));
        assert!(payload.contains("budget plan"));
        assert!(payload.contains("Income: 3,000 €/month"));
        assert!(payload.contains("Net balance: 2,200 €/month"));
        assert!(payload.contains("- Rent: 800 €/month (26.7 % of income)"));
        assert!(payload.contains("Buy a summer cottage"));
        assert!(payload.contains("for 10 years"));
        let last = series.final_snapshot().unwrap();
        assert!(payload.contains(&format!("gives {} €", last.total_balance.whole())));
    }

    #[test]
    fn test_payload_without_income_or_expenses() {
        let store = parse_grid(
            &grid_from_csv(",,Jan\n,Income\n,\n,Expenses\n,\n"),
            &Layout::default(),
        )
        .unwrap();
        let view = aggregate(&store, &AggregateOptions::default());
        let request = NarrativeRequest::build(&view, &profile(), DataKind::Actual, None);
        let payload = request.payload();
        assert!(payload.contains("- (none)"));
        assert!(!payload.contains("PROJECTION"));
    }

    #[test]
    fn test_payload_section_order() {
        let request = NarrativeRequest::build(&scenario_view(), &profile(), DataKind::Plan, None);
        let payload = request.payload();
        let headings: Vec<&str> = payload.lines().filter(|l| l.starts_with("### ")).collect();
        assert_eq!(
            headings,
            vec![
                "### CLIENT PROFILE (the person and the household are separate)",
                "### HOUSEHOLD FIGURES (budget plan, averaged over 2 periods)",
                "### TOP 1 EXPENSES",
                "### TASK",
            ]
        );
        assert!(payload.contains("- Status: "));
        assert!(payload.contains("\n\n### TOP 1 EXPENSES\n- Rent: "));
        assert!(payload.ends_with("€/month?\n"));
    }

    #[tokio::test]
    async fn test_advise_returns_narrative() {
        let narrator = TestNarrator::new();
        let request = NarrativeRequest::build(&scenario_view(), &profile(), DataKind::Plan, None);
        let advice = advise(&narrator, &request).await;
        assert_eq!(advice.text, TEST_NARRATIVE);
        assert!(!advice.fallback);
        assert_eq!(narrator.calls(), 1);
    }

    #[tokio::test]
    async fn test_advise_falls_back_on_failure() {
        let narrator = TestNarrator::failing();
        let view = scenario_view();
        let request = NarrativeRequest::build(&view, &profile(), DataKind::Plan, None);
        let advice = advise(&narrator, &request).await;
        assert!(advice.fallback);
        assert_eq!(advice.text, FALLBACK_MESSAGE);
        // The figures do not depend on the narrator.
        assert_eq!(request.net_balance, view.net_balance);
    }
}
