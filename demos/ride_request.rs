use rides_client::{
    Config, ConfigLocation, Coordinate, RideRequest, RideRequestOutcome, RidesClient, Token,
    read_config,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional: enable basic logging for the example
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    // Load configuration from a JSON file placed next to the binary, and a
    // token saved by an earlier authorization-code exchange.
    let cfg: Config = read_config(ConfigLocation::File("config.json".into())).await?;
    let token: Token = serde_json::from_str(&std::fs::read_to_string("token.json")?)?;
    let client = RidesClient::with_user_token(cfg.sandbox(true), token)?;

    let pickup = Coordinate::new(37.7752315, -122.418075);
    let dropoff = Coordinate::new(37.8043514, -122.2711639);

    let products = client.products(pickup).await?;
    let Some(product) = products.first() else {
        println!("no products available here");
        return Ok(());
    };

    let request = RideRequest::new(product.product_id.clone(), pickup, dropoff);
    let outcome = match client.request_ride(&request).await {
        RideRequestOutcome::SurgeConfirmationRequired(confirmation) => {
            println!("accept surge pricing at {}", confirmation.confirmation_url);
            client.request_ride(&request.confirmed(&confirmation)).await
        }
        other => other,
    };
    match outcome.into_result()? {
        Ok(ride) => println!("ride {} is {}", ride.request_id, ride.status),
        Err(confirmation) => println!("surge still pending: {}", confirmation.confirmation_id),
    }

    // Persist the possibly refreshed token for the next run.
    if let Some(token) = client.token() {
        std::fs::write("token.json", serde_json::to_string(&*token)?)?;
    }
    Ok(())
}
