use crate::{
    Res,
    config::Settings,
    info,
    management::{ReconcileReport, reconcile_track_ledger},
    success, warning,
};

pub async fn reconcile(settings: &Settings) -> Res<ReconcileReport> {
    let report = reconcile_track_ledger(settings).await?;

    if report.is_clean() {
        success!("Track ledger and track records agree. Nothing to do.");
        return Ok(report);
    }

    if !report.removed_from_ledger.is_empty() {
        warning!(
            "Removed {} track ids without a record from the ledger; they will be fetched again.",
            report.removed_from_ledger.len()
        );
    }
    if !report.added_to_ledger.is_empty() {
        info!(
            "Added {} recorded track ids missing from the ledger.",
            report.added_to_ledger.len()
        );
    }
    success!("Track ledger reconciled.");
    Ok(report)
}
