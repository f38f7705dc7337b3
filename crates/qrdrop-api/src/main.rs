use qrdrop_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // A missing .env file is not an error
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (storage, services, routes)
    let (_state, router) = qrdrop_api::setup::initialize_app(config.clone()).await?;

    // Start the server
    qrdrop_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
