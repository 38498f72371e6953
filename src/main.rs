//! Stayline service launcher
//!
//! ```text
//! stayline --service booking   # availability + booking transactions
//! stayline --service payment   # gateway orders + verification + webhooks
//! ```
//!
//! Each service owns its own store and listens on its own port.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};

use stayline::api::{self, BookingState, PaymentState};
use stayline::booking::{
    AvailabilitySweeper, IdentityDirectory, InMemoryInventory, InventoryStore,
    PgIdentityDirectory, PgInventoryStore,
};
use stayline::config::{AppConfig, StorageKind};
use stayline::db::{Database, schema};
use stayline::logging;
use stayline::payment::{
    BrokerConfig, InMemoryPaymentStore, PaymentBroker, PaymentGateway, PaymentReconciler,
    PaymentSignatureVerifier, PaymentStore, PgPaymentStore, RazorpayGateway, SandboxGateway,
    WebhookSignatureVerifier,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Service {
    Booking,
    Payment,
}

impl Service {
    fn name(self) -> &'static str {
        match self {
            Service::Booking => "booking",
            Service::Payment => "payment",
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "stayline", version = env!("GIT_HASH"), about = "Hotel booking and payment services")]
struct Args {
    /// Environment; loads config/<env>.yaml
    #[arg(short, long, default_value = "dev")]
    env: String,

    /// Service to run
    #[arg(short, long, value_enum)]
    service: Service,

    /// Override the configured port
    #[arg(short, long)]
    port: Option<u16>,
}

async fn connect(url: Option<&str>, statements: &[&str], service: &str) -> Result<Database> {
    let Some(url) = url else {
        bail!("{} storage is postgres but postgres_url is not set", service);
    };
    let db = Database::connect(url)
        .await
        .with_context(|| format!("Failed to connect {} database", service))?;
    db.init_schema(statements)
        .await
        .with_context(|| format!("Failed to initialize {} schema", service))?;
    Ok(db)
}

async fn run_booking(config: &AppConfig, port: u16) -> Result<()> {
    let cfg = &config.booking;

    let inventory: Arc<dyn InventoryStore>;
    let identity: Arc<dyn IdentityDirectory>;
    match cfg.storage {
        StorageKind::Memory => {
            let store = InMemoryInventory::new();
            store.seed(&cfg.seed).await;
            inventory = Arc::new(store.clone());
            identity = Arc::new(store);
        }
        StorageKind::Postgres => {
            let db =
                connect(cfg.postgres_url.as_deref(), schema::BOOKING_SCHEMA, "booking").await?;
            inventory = Arc::new(PgInventoryStore::new(db.pool().clone()));
            identity = Arc::new(PgIdentityDirectory::new(db.pool().clone()));
        }
    }

    if cfg.availability_sweep_secs > 0 {
        let sweeper = AvailabilitySweeper::new(
            inventory.clone(),
            Duration::from_secs(cfg.availability_sweep_secs),
        );
        tokio::spawn(async move {
            sweeper.run().await;
        });
        tracing::info!(
            interval_secs = cfg.availability_sweep_secs,
            "Availability sweep started"
        );
    }

    let state = Arc::new(BookingState::new(inventory, identity));
    api::serve("booking", &cfg.host, port, api::booking_router(state))
        .await
        .context("Booking server failed")
}

async fn run_payment(config: &AppConfig, port: u16) -> Result<()> {
    let cfg = &config.payment;

    let store: Arc<dyn PaymentStore> = match cfg.storage {
        StorageKind::Memory => Arc::new(InMemoryPaymentStore::new()),
        StorageKind::Postgres => {
            let db =
                connect(cfg.postgres_url.as_deref(), schema::PAYMENT_SCHEMA, "payment").await?;
            Arc::new(PgPaymentStore::new(db.pool().clone()))
        }
    };

    let gateway: Arc<dyn PaymentGateway> = if cfg.gateway.sandbox {
        tracing::warn!(
            "Sandbox gateway enabled; orders are not sent to {}",
            cfg.gateway.base_url
        );
        Arc::new(SandboxGateway::new(cfg.gateway.key_id.clone()))
    } else {
        Arc::new(RazorpayGateway::new(&cfg.gateway).context("Failed to build gateway client")?)
    };

    let payment_signatures = PaymentSignatureVerifier::new(&cfg.gateway.key_secret)
        .context("gateway.key_secret")?;
    let webhook_signatures = WebhookSignatureVerifier::new(&cfg.gateway.webhook_secret)
        .context("gateway.webhook_secret")?;

    let broker = PaymentBroker::new(
        store.clone(),
        gateway,
        BrokerConfig {
            default_currency: cfg.default_currency.clone(),
            minor_unit_factor: cfg.gateway.minor_unit_factor,
            gateway_timeout: Duration::from_millis(cfg.gateway.timeout_ms),
        },
    );
    let reconciler = PaymentReconciler::new(store.clone(), payment_signatures, webhook_signatures);

    let state = Arc::new(PaymentState::new(broker, reconciler, store));
    api::serve("payment", &cfg.host, port, api::payment_router(state))
        .await
        .context("Payment server failed")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = AppConfig::load(&args.env)?;
    let _guard = logging::init_logging(&config, args.service.name());

    tracing::info!(
        env = %args.env,
        service = args.service.name(),
        version = env!("GIT_HASH"),
        "Starting stayline"
    );

    let result = match args.service {
        Service::Booking => {
            let port = args.port.unwrap_or(config.booking.port);
            run_booking(&config, port).await
        }
        Service::Payment => {
            let port = args.port.unwrap_or(config.payment.port);
            run_payment(&config, port).await
        }
    };

    if let Err(e) = &result {
        tracing::error!("{:#}", e);
    }
    result
}
