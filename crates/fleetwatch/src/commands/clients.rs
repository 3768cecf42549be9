//! Client command handlers.

use tabled::Tabled;

use fleetwatch_core::{Client, ClientId, ClientStore};

use crate::cli::{ClientsArgs, ClientsCommand, GlobalOpts};
use crate::config::Resolved;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Company")]
    company: String,
    #[tabled(rename = "Contact")]
    contact: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Email")]
    email: String,
}

impl From<&Client> for ClientRow {
    fn from(c: &Client) -> Self {
        Self {
            id: c.id.to_string(),
            company: c.company.clone(),
            contact: util::or_dash(&c.contact_person),
            phone: util::or_dash(&c.phone),
            email: util::or_dash(&c.email),
        }
    }
}

fn detail(c: &Client) -> String {
    let row = ClientRow::from(c);
    format!(
        "ID:       {}\nCompany:  {}\nContact:  {}\nPhone:    {}\nEmail:    {}",
        row.id, row.company, row.contact, row.phone, row.email
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    resolved: &Resolved,
    args: ClientsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let store = ClientStore::new(resolved.store()?);

    match args.command {
        ClientsCommand::List => {
            let clients = store.list().await?;
            let out = output::render_list(
                &global.output,
                &clients,
                |c| ClientRow::from(c),
                |c| c.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ClientsCommand::Add {
            company,
            contact,
            phone,
            email,
            id,
        } => {
            let saved = store
                .save(Client {
                    id: ClientId(id.unwrap_or_default()),
                    company,
                    contact_person: contact.unwrap_or_default(),
                    phone: phone.unwrap_or_default(),
                    email: email.unwrap_or_default(),
                })
                .await?;
            let out = output::render_single(&global.output, &saved, detail, |c| c.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ClientsCommand::Remove { id } => {
            store.delete(ClientId(id)).await?;
            if !global.quiet {
                eprintln!("Client {id} removed");
            }
            Ok(())
        }
    }
}
