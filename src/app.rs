//! Application bootstrap: database, module registry, router and lifecycle.

use anyhow::Context;
use axum::Router;
use bookstore_kernel::settings::Settings;
use bookstore_kernel::{InitCtx, ModuleRegistry};
use sqlx::SqlitePool;

use crate::{modules, utils};

/// A fully initialized bookstore service
pub struct App {
    settings: Settings,
    registry: ModuleRegistry,
    db: SqlitePool,
}

impl App {
    /// Connect to the database, register modules, apply migrations when
    /// enabled and initialize every module.
    pub async fn bootstrap(settings: Settings) -> anyhow::Result<Self> {
        let db = bookstore_db::connect(&settings.database)
            .await
            .context("failed to connect to database")?;

        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry)?;
        tracing::info!(modules = registry.len(), "modules registered");

        let app = Self {
            settings,
            registry,
            db,
        };

        if app.settings.database.run_migrations {
            app.migrate().await?;
        }

        app.registry.init_all(&app.init_ctx()).await?;
        Ok(app)
    }

    /// Apply pending migrations of every registered module
    pub async fn migrate(&self) -> anyhow::Result<usize> {
        let migrations = self.registry.collect_migrations();
        let applied = bookstore_db::run_migrations(&self.db, &migrations)
            .await
            .context("failed to run migrations")?;
        tracing::info!(applied, total = migrations.len(), "migrations complete");
        Ok(applied)
    }

    pub fn router(&self) -> Router {
        bookstore_http::build_router(&self.registry, &self.settings, &self.db)
    }

    pub fn db(&self) -> &SqlitePool {
        &self.db
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Serve HTTP until a shutdown signal arrives, then stop modules and
    /// close the pool.
    pub async fn serve(self) -> anyhow::Result<()> {
        self.registry.start_all(&self.init_ctx()).await?;

        let served =
            bookstore_http::start_server(self.router(), &self.settings, utils::shutdown_signal())
                .await;

        self.registry.stop_all().await?;
        self.db.close().await;
        tracing::info!("bookstore shut down");
        served
    }

    fn init_ctx(&self) -> InitCtx<'_> {
        InitCtx {
            settings: &self.settings,
            db: &self.db,
        }
    }
}
