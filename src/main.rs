use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use checkout_gateway::config::Config;
use checkout_gateway::handlers;
use checkout_gateway::state::AppState;
use checkout_gateway::storefront::{Cart, CheckoutFlow, FlowStep, GatewayClient, begin_checkout};

#[derive(Parser)]
#[command(name = "checkout-gateway", version, about = "Checkout gateway for a Stripe-backed storefront")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the gateway HTTP server (default)
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// List the catalog through a running gateway
    Products {
        #[arg(long, default_value = "http://localhost:3000")]
        gateway: String,
    },
    /// Start a checkout through a running gateway
    Checkout {
        #[arg(long, default_value = "http://localhost:3000")]
        gateway: String,
        #[arg(long, default_value = "hosted")]
        flow: CheckoutFlow,
        /// Cart line as PRICE_ID:QTY, repeatable
        #[arg(long = "item", value_parser = parse_item, required = true)]
        items: Vec<(String, u32)>,
    },
}

fn parse_item(s: &str) -> Result<(String, u32), String> {
    let (price_id, qty) = s
        .rsplit_once(':')
        .ok_or_else(|| format!("expected PRICE_ID:QTY, got '{}'", s))?;
    let qty = qty
        .parse::<u32>()
        .map_err(|_| format!("invalid quantity '{}'", qty))?;
    if price_id.is_empty() {
        return Err("price id must not be empty".into());
    }
    Ok((price_id.to_string(), qty))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "checkout_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve { host: None, port: None }) {
        Command::Serve { host, port } => serve(host, port).await,
        Command::Products { gateway } => list_products(&gateway).await,
        Command::Checkout { gateway, flow, items } => checkout(&gateway, flow, items).await,
    }
}

async fn serve(host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    let state = AppState::from_config(&config).context("Failed to build application state")?;
    let app = handlers::app(state, config.storefront_pages);

    let addr = config.addr();
    tracing::info!("Starting checkout gateway on {} ({})", addr, config.base_url);
    tracing::info!(
        "Storefront URL: {}, pricing: {}",
        config.app_url,
        config.pricing_mode
    );

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}

async fn list_products(gateway: &str) -> anyhow::Result<()> {
    let client = GatewayClient::new(gateway)?;
    let products = client.fetch_products().await?;

    for product in products {
        println!(
            "{:<24} {:<32} {:>10.2} {:<4} {}",
            product.id,
            product.name,
            product.price,
            product.currency.as_deref().unwrap_or("").to_uppercase(),
            product.price_id.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

async fn checkout(gateway: &str, flow: CheckoutFlow, items: Vec<(String, u32)>) -> anyhow::Result<()> {
    let client = GatewayClient::new(gateway)?;
    let mut cart = Cart::new(client.fetch_products().await?);

    for (price_id, qty) in items {
        if !cart.set_qty_by_price(&price_id, qty) {
            bail!("No active product sells at price {}", price_id);
        }
    }

    println!("Cart total: {:.2}", cart.total());

    match begin_checkout(&client, flow, &cart).await? {
        FlowStep::Redirect(url) => println!("Open this URL to pay: {}", url),
        FlowStep::EmbeddedCheckout { client_secret } => {
            println!("Embedded checkout client secret: {}", client_secret)
        }
        FlowStep::PaymentForm { client_secret } => {
            println!("Payment intent client secret: {}", client_secret)
        }
    }
    Ok(())
}
