use anyhow::{anyhow, Result};
use clap::Parser;
use serde::Serialize;
use syncplane_cli::{connect_from_env, init_tracing, truncate_string, OutputFormat};
use syncplane_core::models::{Organization, OrganizationUserPermission, SsoConfig};
use syncplane_db::{OrganizationRepository, PermissionRepository};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "show_organization")]
#[command(about = "Show an organization, its SSO config and its members")]
struct Args {
    /// Organization ID
    #[arg(long, value_name = "UUID")]
    id: Uuid,

    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Serialize)]
struct OrganizationDetails {
    organization: Organization,
    sso_config: Option<SsoConfig>,
    members: Vec<OrganizationUserPermission>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let (pool, _) = connect_from_env().await?;
    let organizations = OrganizationRepository::new(pool.clone());
    let permissions = PermissionRepository::new(pool);

    let organization = organizations
        .get_organization(args.id)
        .await?
        .ok_or_else(|| anyhow!("Organization {} not found", args.id))?;
    let (sso_config, members) = tokio::try_join!(
        organizations.get_sso_config_for_organization(args.id),
        permissions.list_users_in_organization(args.id),
    )?;

    let details = OrganizationDetails {
        organization,
        sso_config,
        members,
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&details)?),
        OutputFormat::Table => print_details(&details),
    }

    Ok(())
}

fn print_details(details: &OrganizationDetails) {
    let org = &details.organization;
    println!("\n=== Organization ===\n");
    println!("ID:                {}", org.organization_id);
    println!("Name:              {}", org.name);
    println!("Email:             {}", org.email);
    println!(
        "Owner:             {}",
        org.user_id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string())
    );
    println!("PBA:               {}", org.pba);
    println!("Org-level billing: {}", org.org_level_billing);

    match &details.sso_config {
        Some(config) => println!("SSO realm:         {}", config.keycloak_realm),
        None => println!("SSO realm:         -"),
    }

    println!("\n=== Members ({}) ===\n", details.members.len());
    if details.members.is_empty() {
        println!("No members.");
        return;
    }

    println!("{:<36} {:<25} {:<30} {:<20}", "User ID", "Name", "Email", "Permission");
    println!("{}", "-".repeat(114));
    for member in &details.members {
        println!(
            "{:<36} {:<25} {:<30} {:<20}",
            member.user_id,
            truncate_string(&member.user_name, 25),
            truncate_string(&member.email, 30),
            member.permission_type
        );
    }
    println!();
}
