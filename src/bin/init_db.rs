use ev_charge_dashboard::{config::Config, db, error::AppError, logger};
use tracing::info;

fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    logger::init();

    let config = Config::from_env()?;
    let mut conn = db::establish_connection(&config.database_url)?;
    db::run_migrations(&mut conn)?;

    info!(
        database_url = %config.database_url,
        "transactions and boot_notifications tables are in place"
    );
    Ok(())
}
