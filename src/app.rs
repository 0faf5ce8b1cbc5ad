//! Assembly of a running board from configuration.

use axum::Router;
use mockable::DefaultClock;
use std::future::Future;
use std::io;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::agent::{
    adapters::{DisabledSessionCoordinator, GatewaySessionCoordinator},
    ports::SessionCoordinator,
    services::PromptRenderer,
};
use crate::board::{ports::BoardStore, services::BoardRuntime};
use crate::config::{BoardConfig, ConfigError};
use crate::effects::DetachedEffects;
use crate::http::{ApiKey, AppState, router};
use crate::live::services::Broadcaster;

/// Picks the gateway coordinator when a token is configured.
#[must_use]
pub fn session_coordinator(config: &BoardConfig) -> Arc<dyn SessionCoordinator> {
    match config.gateway_options() {
        Some(options) => {
            info!(url = %options.base_url, "agent gateway enabled");
            Arc::new(GatewaySessionCoordinator::new(options))
        }
        None => {
            info!("agent gateway disabled: no token configured");
            Arc::new(DisabledSessionCoordinator)
        }
    }
}

/// Wires a runtime over `store` using the system clock.
///
/// # Errors
///
/// Returns [`ConfigError`] when the roster or limits are invalid.
pub fn assemble<S>(
    config: &BoardConfig,
    store: Arc<S>,
    coordinator: Arc<dyn SessionCoordinator>,
) -> Result<AppState<S, DefaultClock>, ConfigError>
where
    S: BoardStore + 'static,
{
    let runtime = BoardRuntime::new(store, Arc::new(DefaultClock), Arc::new(config.agent_roster()?))
        .with_broadcaster(Arc::new(Broadcaster::new()))
        .with_coordinator(coordinator)
        .with_effects(Arc::new(DetachedEffects::new(
            config.gateway.effect_timeout(),
            config.limits.failure_capacity,
        )))
        .with_prompts(Arc::new(PromptRenderer::new(config.prompt_context())))
        .with_limits(config.content_limits()?);
    Ok(AppState::new(runtime, config.branding.clone())
        .with_api_key(ApiKey::new(config.api_key())))
}

/// Serves the board router until `shutdown` resolves, then waits for
/// detached effects to finish.
///
/// # Errors
///
/// Returns the listener's I/O error.
pub async fn serve<S>(
    listener: TcpListener,
    state: AppState<S, DefaultClock>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> io::Result<()>
where
    S: BoardStore + 'static,
{
    let effects = Arc::clone(state.runtime().effects());
    let app: Router = router(state);
    info!(address = %listener.local_addr()?, "task board listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    effects.settle().await;
    Ok(())
}
