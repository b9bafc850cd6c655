use crate::aggregate::aggregate;
use crate::args::ProjectArgs;
use crate::commands::{load_store, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::Amount;
use crate::projection::{project as run_projection, ProjectionInput, ProjectionSeries};
use crate::session::Session;
use crate::{Config, Result};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Serialize)]
pub struct ProjectOutput {
    /// The true savings of the sheet when the contribution was taken from one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_true_savings: Option<Amount>,
    pub series: ProjectionSeries,
}

/// Projects a balance forward. `config` is only needed when `args` names a spreadsheet.
pub async fn project(config: Option<Config>, args: &ProjectArgs) -> Result<Out<ProjectOutput>> {
    let sheet_true_savings = match (args.file(), config.as_ref()) {
        (Some(file), Some(config)) => {
            let mut session = Session::new();
            let store = load_store(config, &mut session, file, args.sheet()).await?;
            let view = aggregate(&store, &config.aggregate_options(None));
            debug!("True savings of the sheet: {}", view.true_savings);
            Some(view.true_savings)
        }
        _ => None,
    };

    let monthly = args
        .monthly()
        .or(sheet_true_savings)
        .unwrap_or(Amount::ZERO);
    let input = ProjectionInput::new(
        args.start(),
        monthly,
        args.growth().rate(),
        args.growth().years(),
    )
    .pub_result(ErrorType::Input)?;
    let series = run_projection(&input);

    let message = match series.final_snapshot() {
        Some(last) => format!(
            "Year {}: {} ({} contributed, {} growth)",
            last.year,
            last.total_balance.whole(),
            last.principal_contributed.whole(),
            last.growth.whole()
        ),
        None => "Nothing to project".to_string(),
    };
    Ok(Out::new(
        message,
        ProjectOutput {
            sheet_true_savings,
            series,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::GrowthArgs;
    use crate::error::error_type;
    use crate::test::{TestEnv, SCENARIO_SHEET};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn amount(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    #[tokio::test]
    async fn test_project_without_sheet() {
        let args = ProjectArgs::new(
            Amount::ZERO,
            Some(amount("100")),
            GrowthArgs::new(Decimal::ZERO, 1),
            None,
            None,
        );
        let out = project(None, &args).await.unwrap();
        assert_eq!(out.message(), "Year 1: 1,200 (1,200 contributed, 0 growth)");
        assert!(out.structure().unwrap().sheet_true_savings.is_none());
    }

    #[tokio::test]
    async fn test_monthly_defaults_to_true_savings() {
        let env = TestEnv::new().await;
        let file = env.write_file("budget.csv", SCENARIO_SHEET);
        let args = ProjectArgs::new(
            Amount::ZERO,
            None,
            GrowthArgs::new(Decimal::ZERO, 2),
            Some(file),
            None,
        );
        let out = project(Some(env.config()), &args).await.unwrap();
        let structure = out.structure().unwrap();
        assert_eq!(structure.sheet_true_savings, Some(amount("2200")));
        assert_eq!(
            structure.series.final_snapshot().unwrap().total_balance,
            amount("52800")
        );
    }

    #[tokio::test]
    async fn test_explicit_monthly_wins_over_sheet() {
        let env = TestEnv::new().await;
        let file = env.write_file("budget.csv", SCENARIO_SHEET);
        let args = ProjectArgs::new(
            Amount::ZERO,
            Some(amount("10")),
            GrowthArgs::new(Decimal::ZERO, 1),
            Some(file),
            None,
        );
        let out = project(Some(env.config()), &args).await.unwrap();
        assert_eq!(
            out.structure().unwrap().series.final_snapshot().unwrap().total_balance,
            amount("120")
        );
    }

    #[tokio::test]
    async fn test_invalid_input() {
        let args = ProjectArgs::new(
            Amount::ZERO,
            None,
            GrowthArgs::new(Decimal::from(-1), 10),
            None,
            None,
        );
        let e = project(None, &args).await.unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Input));
    }
}
