use crate::config::Settings;
use crate::gateway::GatewayService;
use crate::Result;
use tracing::{info, instrument};

/// Main application struct that coordinates all components
pub struct Application {
    settings: Settings,
    router: axum::Router,
}

impl Application {
    /// Load configuration and compile every route table.
    ///
    /// All pattern compilation happens here; a malformed template or a
    /// misconfigured upstream fails startup instead of a request.
    #[instrument]
    pub fn new() -> Result<Self> {
        let settings = Settings::new()?;
        let service = GatewayService::from_settings(&settings)?;
        let router = service.into_router()?;
        Ok(Self { settings, router })
    }

    #[instrument(skip(self))]
    pub async fn run(self) -> Result<()> {
        let address = format!(
            "{}:{}",
            self.settings.application.host, self.settings.application.port
        );
        info!("Starting EHR gateway on {address}");

        let listener = tokio::net::TcpListener::bind(&address).await?;
        axum::serve(listener, self.router).await?;

        Ok(())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_builds_from_default_settings() {
        // Skipped when the host has no native certificate store.
        if let Ok(app) = Application::new() {
            assert!(app.settings().application.port > 0);
        }
    }
}
