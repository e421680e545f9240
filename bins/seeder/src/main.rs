//! Creates the super-admin account, and optionally demo merchants.
//!
//! The admin comes from the `admin` config section (see `AppConfig`).

use anyhow::{Context, bail};
use clap::Parser;
use rust_decimal::Decimal;
use tally_core::auth::Role;
use tally_core::ledger::{MerchantInput, MerchantStatus, NewTransaction, TransactionType};
use tally_db::{MerchantRepository, NewUser, TransactionRepository, UserRepository};
use tally_shared::AppConfig;
use tally_shared::config::AdminConfig;

struct DemoMerchant {
    username: &'static str,
    first_name: &'static str,
    last_name: &'static str,
    business_name: &'static str,
    status: MerchantStatus,
    /// Amounts in cents.
    bookings: &'static [(i64, TransactionType)],
}

const DEMO_MERCHANTS: [DemoMerchant; 3] = [
    DemoMerchant {
        username: "coffee",
        first_name: "Maya",
        last_name: "Chen",
        business_name: "Corner Coffee",
        status: MerchantStatus::Active,
        bookings: &[
            (125_000, TransactionType::Credit),
            (48_050, TransactionType::Credit),
            (12_000, TransactionType::Debit),
        ],
    },
    DemoMerchant {
        username: "books",
        first_name: "Omar",
        last_name: "Haddad",
        business_name: "Second Chapter Books",
        status: MerchantStatus::Active,
        bookings: &[(89_999, TransactionType::Credit), (5_500, TransactionType::Debit)],
    },
    DemoMerchant {
        username: "bikes",
        first_name: "Lena",
        last_name: "Kowalski",
        business_name: "Spoke & Chain",
        status: MerchantStatus::Inactive,
        bookings: &[(30_000, TransactionType::Credit)],
    },
];

const DEMO_PASSWORD: &str = "demo-pass";

/// Creates the super-admin account, and optionally demo merchants.
#[derive(Debug, Parser)]
#[command(name = "seeder", version, about)]
struct Options {
    /// Also reset an existing super-admin's password
    #[arg(long)]
    reset_password: bool,

    /// Also add sample merchants and transactions
    #[arg(long)]
    demo: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let options = Options::parse();
    let config = AppConfig::load().context("Failed to load configuration")?;

    println!("Connecting to database...");
    let db = tally_db::connect(&config.database)
        .await
        .context("Failed to connect to database")?;

    let users = UserRepository::new(db.clone());

    println!("Seeding super-admin...");
    seed_super_admin(&users, &config.admin, options.reset_password).await?;

    if options.demo {
        println!("Seeding demo merchants...");
        seed_demo_merchants(
            &users,
            &MerchantRepository::new(db.clone()),
            &TransactionRepository::new(db),
        )
        .await?;
    }

    println!("Seeding complete!");
    Ok(())
}

async fn seed_super_admin(
    users: &UserRepository,
    admin: &AdminConfig,
    reset_password: bool,
) -> anyhow::Result<()> {
    if let Some(existing) = users.find_by_username(&admin.username).await? {
        if existing.role != Role::SuperAdmin {
            bail!("user {} exists but is not a super-admin", existing.username);
        }
        if reset_password {
            users.set_password(existing.id, &admin.password).await?;
            println!("  Reset password for super-admin: {}", existing.username);
        } else {
            println!("  Super-admin {} already exists, skipping...", existing.username);
        }
        return Ok(());
    }

    let created = users
        .create(NewUser {
            username: admin.username.clone(),
            email: admin.email.clone(),
            first_name: admin.first_name.clone(),
            last_name: admin.last_name.clone(),
            password: admin.password.clone(),
            role: Role::SuperAdmin,
        })
        .await?;
    println!("  Created super-admin: {} <{}>", created.username, created.email);
    Ok(())
}

async fn seed_demo_merchants(
    users: &UserRepository,
    merchants: &MerchantRepository,
    transactions: &TransactionRepository,
) -> anyhow::Result<()> {
    let mut inserted = 0;

    for demo in DEMO_MERCHANTS {
        if users.find_by_username(demo.username).await?.is_some() {
            println!("  Merchant {} already exists, skipping...", demo.username);
            continue;
        }

        let created = merchants
            .create(MerchantInput {
                username: demo.username.to_string(),
                email: format!("{}@demo.tally.test", demo.username),
                first_name: demo.first_name.to_string(),
                last_name: demo.last_name.to_string(),
                password: Some(DEMO_PASSWORD.to_string()),
                business_name: demo.business_name.to_string(),
                business_address: None,
                status: demo.status,
            })
            .await?;

        for &(cents, kind) in demo.bookings {
            transactions
                .create(NewTransaction {
                    merchant_id: created.merchant.id,
                    amount: Decimal::new(cents, 2),
                    kind,
                    description: format!("Demo {kind}"),
                })
                .await?;
        }
        inserted += 1;
    }

    println!("  Inserted {inserted} demo merchants (password: {DEMO_PASSWORD})");
    Ok(())
}
