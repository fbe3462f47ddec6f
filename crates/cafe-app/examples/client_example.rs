///  To run :
///  cargo r -p cafe-app --example client_example
use std::sync::Arc;

use cafe_client::CafeClient;
use cafe_hex::application::gateway::PersistenceGateway;
use cafe_hex::application::storefront::Storefront;
use cafe_hex::inbound::http::{HttpServer, HttpServerConfig};
use cafe_hex::outbound::UnconfiguredCompletion;
use cafe_repo::build_local_store;
use cafe_types::domain::menu::Category;
use tempfile::tempdir;

fn find_free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let port = find_free_port();
    let addr = format!("http://127.0.0.1:{port}/");

    // Local mode: no cloud store, no completion key, a temp file-backed SQLite cache.
    let tmp = tempdir()?;
    let db_url = format!("sqlite://{}", tmp.path().join("cafe.db").display());
    let local = build_local_store(Some(&db_url)).await?;
    let gateway = PersistenceGateway::new(local, None);
    let storefront = Storefront::open(gateway, Arc::new(UnconfiguredCompletion)).await;
    let server = HttpServer::new(
        storefront,
        HttpServerConfig {
            port: port.to_string(),
        },
    )
    .await?;

    let handle = tokio::spawn(async move {
        server.run().await.expect("server run");
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let client = CafeClient::new(&addr)?;
    println!("Connection status: {:?}", client.status().await?);

    let coffees = client.menu(Some(Category::HotCoffee)).await?;
    for item in &coffees {
        println!("{:>6} {} (${}.{:02})", item.id, item.name, item.price_cents / 100, item.price_cents % 100);
    }

    client.add_item("1").await?;
    client.add_item("5").await?;
    let cart = client.update_quantity("5", 1).await?;
    println!(
        "Cart: {} items, total {} cents",
        cart.item_count, cart.totals.total_cents
    );

    let receipt = client.checkout().await?;
    println!("{}", receipt.message);

    let orders = client.orders().await?;
    println!("Local orders on file: {}", orders.len());

    let reply = client.chat("What pairs well with a croissant?").await?;
    println!("Barista: {}", reply.text);

    handle.abort();
    Ok(())
}
