use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;

mod attendance_store;
mod employee_directory;

pub use attendance_store::MySqlAttendanceStore;
pub use employee_directory::MySqlEmployeeDirectory;

pub async fn init_db(database_url: &str, max_connections: u32) -> Result<MySqlPool, sqlx::Error> {
    MySqlPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &MySqlPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
