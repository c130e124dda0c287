use ev_charge_dashboard::{
    config::Config, db, error::AppError, logger, route, shutdown, state::AppState,
};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    logger::init();

    let config = Config::from_env()?;

    let mut conn = db::establish_connection(&config.database_url)?;
    db::run_migrations(&mut conn)?;
    drop(conn);

    let bind_addr = config.bind_addr;
    let app = route::app(AppState::new(config)?);

    let listener = TcpListener::bind(bind_addr).await?;
    info!(%bind_addr, "Dashboard listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::signal())
        .await?;
    Ok(())
}
