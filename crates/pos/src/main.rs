//! Line-oriented till driver.
//!
//! Reads operator commands from stdin and drives a [`PosSession`] against the
//! configured store. Type `help` for the command list.

use std::sync::Arc;

use anyhow::{Context, bail};
use tokio::io::{AsyncBufReadExt, BufReader};

use tillpoint_core::ProductId;
use tillpoint_pos::{HttpGateway, PosConfig, PosSession, StoreGateway};
use tillpoint_products::{CatalogProduct, filter_by_name};

const HELP: &str = "\
commands:
  products [filter]     list catalog products
  add <product id>      add one unit to the cart
  qty <product id> <n>  set a line quantity (0 removes)
  rm <product id>       remove a line
  name <text>           edit the customer name draft
  phone <text>          edit the customer phone draft
  pick <n>              select suggestion n
  cart                  show cart and customer
  checkout              place the order
  clear                 start over
  quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tillpoint_observability::init();

    let config = PosConfig::from_env().context("loading configuration")?;
    let mut gateway = HttpGateway::from_config(&config);

    if !gateway.is_authenticated() {
        match &config.login {
            Some(credentials) => {
                let token = gateway.login(credentials).await.context("signing in")?;
                gateway.set_token(token);
                tracing::info!(email = %credentials.email, "signed in");
            }
            None => bail!("no auth token or login credentials configured"),
        }
    }

    let catalog = gateway
        .list_products(1, config.catalog_page_size)
        .await
        .context("loading catalog")?;
    tracing::info!(products = catalog.len(), api_url = gateway.api_url(), "catalog loaded");

    let mut session = PosSession::from_config(Arc::new(gateway), &config);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle(&mut session, &catalog, line.trim()).await {
                    break;
                }
            }
            true = session.pump() => {
                print_suggestions(&session);
            }
        }
        for notification in session.take_notifications() {
            println!("[{:?}] {}: {}", notification.level, notification.title, notification.message);
        }
    }

    Ok(())
}

/// Apply one command; returns `false` on quit.
async fn handle(session: &mut PosSession, catalog: &[CatalogProduct], line: &str) -> bool {
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    match command {
        "" => {}
        "help" => println!("{HELP}"),
        "quit" | "exit" => return false,
        "products" => {
            for product in filter_by_name(catalog, rest) {
                println!("{:<12} {:<32} {}", product.id, product.name, product.unit_price);
            }
        }
        "add" => match catalog.iter().find(|p| p.id.as_str() == rest.trim()) {
            Some(product) => session.add_product(product),
            None => println!("unknown product {rest:?}"),
        },
        "qty" => {
            let mut args = rest.split_whitespace();
            match (args.next(), args.next().map(str::parse::<i64>)) {
                (Some(id), Some(Ok(quantity))) => session.set_quantity(&ProductId::new(id), quantity),
                _ => println!("usage: qty <product id> <n>"),
            }
        }
        "rm" => session.remove_item(&ProductId::new(rest.trim())),
        "name" => session.update_name_draft(rest),
        "phone" => session.update_phone_draft(rest),
        "pick" => {
            let chosen = rest
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|n| session.suggestions().get(n.checked_sub(1)?).cloned());
            match chosen {
                Some(customer) => session.select_suggestion(customer),
                None => println!("no such suggestion"),
            }
        }
        "cart" => print_cart(session),
        "checkout" => match session.checkout().await {
            Ok(receipt) => tracing::debug!(attempt_id = %receipt.attempt_id, "checkout finished"),
            Err(err) => tracing::debug!(kind = ?err.kind(), error = %err, "checkout failed"),
        },
        "clear" => session.clear_cart(),
        other => println!("unknown command {other:?}; try `help`"),
    }
    true
}

fn print_cart(session: &PosSession) {
    for line in session.cart().lines() {
        println!("{:<12} {:<32} {:>4} x {} = {}", line.id, line.name, line.quantity, line.unit_price, line.subtotal());
    }
    println!("total: {}", session.cart().total());
    match session.customer() {
        Some(customer) if customer.pending => println!("customer: {} ({}) [new]", customer.name, customer.phone),
        Some(customer) => println!("customer: {} ({})", customer.name, customer.phone),
        None => println!("customer: none"),
    }
}

fn print_suggestions(session: &PosSession) {
    for (n, customer) in session.suggestions().iter().enumerate() {
        println!("  {}. {} ({})", n + 1, customer.name, customer.phone);
    }
}
