use crate::api::Mode;
use crate::args::SubmitArgs;
use crate::commands::Out;
use crate::model::{Bill, BillForm, ExpenseType};
use crate::new_bill::{FileInput, NewBillWorkflow};
use crate::ui::{LogNavigate, TermAlert};
use crate::{utils, Config, Result};
use anyhow::{bail, Context};
use std::str::FromStr;

/// Submits a new bill: optionally uploads the receipt file, then persists the
/// bill record.
pub async fn submit(config: Config, mode: Mode, args: SubmitArgs) -> Result<Out<Bill>> {
    // The form offers a fixed set of categories; reject unknown ones before
    // doing anything else.
    if ExpenseType::from_str(args.expense_type()).is_err() {
        let known: Vec<String> = ExpenseType::ALL.iter().map(ToString::to_string).collect();
        bail!(
            "'{}' is not a known expense type. Expected one of: {}",
            args.expense_type(),
            known.join(", ")
        );
    }

    let session = config.session().await?;
    let store = crate::api::store(mode, &config, &session)?;
    let mut workflow = NewBillWorkflow::new(
        store,
        session,
        Box::new(LogNavigate),
        Box::new(TermAlert),
    );

    if let Some(path) = args.receipt() {
        let name = path
            .file_name()
            .with_context(|| format!("'{}' has no file name", path.display()))?
            .to_string_lossy()
            .to_string();
        let bytes = utils::read_bytes(path).await?;
        let handle = workflow.attach(FileInput { name, bytes }).await?;
        tracing::debug!("receipt uploaded to {}", handle.file_url);
    }

    let form = BillForm {
        bill_type: args.expense_type().to_string(),
        name: args.name().to_string(),
        date: args.date().to_string(),
        amount: args.amount().to_string(),
        vat: args.vat().to_string(),
        pct: args.pct().to_string(),
        commentary: args.commentary().to_string(),
    };
    let bill = workflow.finalize(&form).await?;
    let message = format!(
        "Submitted bill '{}' for {} € (id {})",
        bill.name,
        bill.amount,
        bill.id.as_deref().unwrap_or("?")
    );
    Ok(Out::new(message, bill))
}
