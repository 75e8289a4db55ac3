use crate::api::Mode;
use crate::bills::BillList;
use crate::commands::Out;
use crate::ui::LogNavigate;
use crate::{Config, Result};
use anyhow::Context;

/// Resolves the receipt attachment URL for one bill: the CLI rendition of the
/// list row's "eye" affordance.
pub async fn receipt(config: Config, mode: Mode, bill_id: &str) -> Result<Out<String>> {
    let session = config.session().await?;
    let store = crate::api::store(mode, &config, &session)?;
    let mut bill_list = BillList::new(store, Box::new(LogNavigate));
    let rows = bill_list.get_bills().await;
    let row = rows
        .iter()
        .find(|row| row.bill.id.as_deref() == Some(bill_id))
        .with_context(|| format!("No bill with id '{bill_id}'"))?;
    let url = row.receipt_url()?;
    let message = format!("Receipt for '{}': {url}", row.bill.name);
    Ok(Out::new(message, url.to_string()))
}
