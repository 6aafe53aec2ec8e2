use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use testcontainers_modules::postgres::Postgres;
use testcontainers_modules::testcontainers::ContainerAsync;
use testcontainers_modules::testcontainers::runners::AsyncRunner;

/// A migrated database living inside a throwaway Postgres container.
pub struct TestContext {
    #[allow(dead_code)] // dropping the container stops the database
    pub container: ContainerAsync<Postgres>,
    pub db: DatabaseConnection,
}

/// Starts Postgres and returns a connection with the task schema applied.
pub async fn setup() -> anyhow::Result<TestContext> {
    let _ = tracing_subscriber::fmt().try_init();

    let container = Postgres::default().start().await?;
    let db_url = format!(
        "postgres://postgres:postgres@{}:{}/postgres",
        container.get_host().await?,
        container.get_host_port_ipv4(5432).await?
    );
    let db = Database::connect(&db_url).await?;
    migration::Migrator::up(&db, None).await?;

    Ok(TestContext { container, db })
}
