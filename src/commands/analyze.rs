use crate::aggregate::{aggregate, AggregateView};
use crate::args::AnalyzeArgs;
use crate::commands::{load_store, Out};
use crate::model::{Amount, Category, LineItemRecord};
use crate::session::Session;
use crate::{Config, Result};
use serde::Serialize;

/// The sum of one category in one period, in header order.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct PeriodTotal {
    pub period: String,
    pub income: Amount,
    pub expense: Amount,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeOutput {
    pub periods: Vec<String>,
    pub period_totals: Vec<PeriodTotal>,
    pub view: AggregateView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<LineItemRecord>>,
}

/// Parses the sheet and aggregates it.
pub async fn analyze(config: Config, args: &AnalyzeArgs) -> Result<Out<AnalyzeOutput>> {
    let mut session = Session::new();
    let sheet = args.sheet();
    let store = load_store(&config, &mut session, sheet.file(), sheet.sheet()).await?;
    let view = aggregate(&store, &config.aggregate_options(sheet.top()));

    let expenses = store.period_totals(Category::Expense);
    let period_totals = store
        .period_totals(Category::Income)
        .into_iter()
        .zip(expenses)
        .map(|((period, income), (_, expense))| PeriodTotal {
            period,
            income,
            expense,
        })
        .collect();

    let message = if store.is_empty() {
        format!(
            "The sheet '{}' has the expected structure but no amounts to analyze",
            sheet.file().display()
        )
    } else {
        summary(&view)
    };

    Ok(Out::new(
        message,
        AnalyzeOutput {
            periods: store.periods().to_vec(),
            period_totals,
            view,
            records: args.records().then(|| store.records().to_vec()),
        },
    ))
}

/// One line with the totals, e.g. `Income 3,000, expenses 800, net 2,200 per period (strong)`.
pub(super) fn summary(view: &AggregateView) -> String {
    format!(
        "Income {}, expenses {}, net {} per period over {} periods ({})",
        view.income_total.whole(),
        view.expense_total.whole(),
        view.net_balance.whole(),
        view.period_count,
        view.status
    )
}
