use crate::aggregate::aggregate;
use crate::api::{Mode, Narrator};
use crate::args::AdviseArgs;
use crate::audit::{AuditEntry, AuditLog};
use crate::commands::analyze::summary;
use crate::commands::{load_store, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::{Amount, Profile};
use crate::narrative::{self, Advice, NarrativeRequest};
use crate::projection::{project, ProjectionInput};
use crate::session::Session;
use crate::{api, Config, Result};
use anyhow::Context;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct AdviseOutput {
    pub request: NarrativeRequest,
    pub advice: Advice,
    /// The id of the audit log row, `None` if it could not be written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_id: Option<String>,
}

/// Analyzes the sheet, projects its true savings forward and asks the narrator for a written
/// analysis. The narrator is chosen by `mode`.
pub async fn advise(config: Config, mode: Mode, args: &AdviseArgs) -> Result<Out<AdviseOutput>> {
    let narrator = api::narrator(&config, mode)
        .await
        .context("Unable to set up the narrative service")
        .pub_result(ErrorType::Narrator)?;
    advise_with(&config, &*narrator, args).await
}

async fn advise_with(
    config: &Config,
    narrator: &dyn Narrator,
    args: &AdviseArgs,
) -> Result<Out<AdviseOutput>> {
    let mut session = Session::new();
    let sheet = args.sheet();
    let store = load_store(config, &mut session, sheet.file(), sheet.sheet()).await?;
    let view = aggregate(&store, &config.aggregate_options(sheet.top()));

    let input = ProjectionInput::new(
        Amount::ZERO,
        view.true_savings,
        args.growth().rate(),
        args.growth().years(),
    )
    .pub_result(ErrorType::Input)?;
    let series = project(&input);

    let profile = Profile {
        age: args.age(),
        household: args.household(),
        children: args.children(),
        goal: args.goal().to_string(),
        net_worth: args.net_worth(),
    };
    let request = NarrativeRequest::build(&view, &profile, args.data_kind(), Some(&series));
    let advice = narrative::advise(narrator, &request).await;

    let entry = AuditEntry::new(&profile, args.data_kind(), view.net_balance);
    let log = AuditLog::new(config.audit_log_path());
    let audit_id = match log.append(&entry).await {
        Ok(()) => Some(entry.id),
        Err(e) => {
            warn!("Unable to write the audit log: {e:#}");
            None
        }
    };

    info!("{}", summary(&view));
    Ok(Out::new(
        advice.text.clone(),
        AdviseOutput {
            request,
            advice,
            audit_id,
        },
    ))
}
