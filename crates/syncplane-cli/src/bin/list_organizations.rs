use anyhow::Result;
use clap::Parser;
use syncplane_cli::{connect_from_env, init_tracing, truncate_string, OutputFormat};
use syncplane_core::models::{Organization, ResourcesByUserQueryPaginated};
use syncplane_db::OrganizationRepository;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "list_organizations")]
#[command(about = "List the organizations a user holds an organization-level permission on")]
struct Args {
    /// User whose organizations are listed
    #[arg(long, value_name = "UUID")]
    user_id: Uuid,

    /// Case-insensitive substring of the organization name
    #[arg(long)]
    keyword: Option<String>,

    /// Page size; omit to list everything
    #[arg(long)]
    page_size: Option<i32>,

    /// Rows to skip before the page (default: 0)
    #[arg(long, default_value = "0")]
    offset: i32,

    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let (pool, _) = connect_from_env().await?;
    let repo = OrganizationRepository::new(pool);
    let keyword = args.keyword.as_deref();

    let organizations = match args.page_size {
        Some(page_size) => {
            let query = ResourcesByUserQueryPaginated::new(args.user_id, page_size, args.offset);
            repo.list_organizations_by_user_id_paginated(&query, keyword)
                .await?
        }
        None => repo.list_organizations_by_user_id(args.user_id, keyword).await?,
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&organizations)?),
        OutputFormat::Table => print_organization_table(&organizations, args.user_id),
    }

    Ok(())
}

fn print_organization_table(organizations: &[Organization], user_id: Uuid) {
    println!("\n=== Organizations for user {} ===\n", user_id);

    if organizations.is_empty() {
        println!("No organizations found.");
        return;
    }

    println!(
        "{:<36} {:<30} {:<30} {:<5} {:<20}",
        "ID", "Name", "Email", "PBA", "SSO Realm"
    );
    println!("{}", "-".repeat(125));

    for org in organizations {
        println!(
            "{:<36} {:<30} {:<30} {:<5} {:<20}",
            org.organization_id,
            truncate_string(&org.name, 30),
            truncate_string(&org.email, 30),
            if org.pba { "yes" } else { "no" },
            org.sso_realm.as_deref().unwrap_or("-")
        );
    }

    println!("\nTotal: {}", organizations.len());
}
