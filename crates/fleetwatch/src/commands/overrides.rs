//! Override command handlers. These only touch the store.

use serde::Serialize;
use tabled::Tabled;

use fleetwatch_core::{ClientId, ClientStore, OverrideStore, UnitId, UnitOverride};

use crate::cli::{GlobalOpts, OverridesArgs, OverridesCommand};
use crate::config::Resolved;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OverrideEntry {
    unit_id: UnitId,
    #[serde(flatten)]
    fields: UnitOverride,
}

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct OverrideRow {
    #[tabled(rename = "Unit")]
    unit: String,
    #[tabled(rename = "Number")]
    number: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Driver")]
    driver: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Client")]
    client: String,
}

impl From<&OverrideEntry> for OverrideRow {
    fn from(e: &OverrideEntry) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".into());
        Self {
            unit: e.unit_id.to_string(),
            number: text(&e.fields.number),
            model: text(&e.fields.model),
            driver: text(&e.fields.driver),
            phone: text(&e.fields.driver_phone),
            client: e
                .fields
                .client_id
                .map_or_else(|| "-".into(), |id| id.to_string()),
        }
    }
}

fn detail(e: &OverrideEntry) -> String {
    let row = OverrideRow::from(e);
    format!(
        "Unit:    {}\nNumber:  {}\nModel:   {}\nDriver:  {}\nPhone:   {}\nClient:  {}",
        row.unit, row.number, row.model, row.driver, row.phone, row.client
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    resolved: &Resolved,
    args: OverridesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let kv = resolved.store()?;
    let overrides = OverrideStore::new(kv.clone());

    match args.command {
        OverridesCommand::List => {
            let entries: Vec<OverrideEntry> = overrides
                .load()
                .await?
                .into_iter()
                .map(|(unit_id, fields)| OverrideEntry { unit_id, fields })
                .collect();
            let out = output::render_list(
                &global.output,
                &entries,
                |e| OverrideRow::from(e),
                |e| e.unit_id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        OverridesCommand::Set {
            unit_id,
            number,
            model,
            driver,
            driver_phone,
            client,
        } => {
            let edit = UnitOverride {
                number,
                model,
                driver,
                driver_phone,
                client_id: client.map(ClientId),
                ..UnitOverride::default()
            };
            if let Some(client_id) = edit.client_id.filter(|id| !id.is_unassigned()) {
                ClientStore::new(kv).ensure_exists(client_id).await?;
            }

            let unit_id = UnitId(unit_id);
            let saved = overrides.save(unit_id, edit).await?;
            let entry = OverrideEntry {
                unit_id,
                fields: saved,
            };
            let out = output::render_single(&global.output, &entry, detail, |e| e.unit_id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
