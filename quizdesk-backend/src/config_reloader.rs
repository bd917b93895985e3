use crate::tracing_setup::ReloadHandle;

/// Re-read the configuration on SIGHUP and apply a changed log level.
///
/// Only `logging.level` is applied; everything else needs a restart.
#[cfg(unix)]
pub fn spawn_config_reloader(
    config_path: Option<String>,
    initial: quizdesk_config::Config,
    reload_handle: ReloadHandle,
) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangups = match signal(SignalKind::hangup()) {
        Ok(stream) => stream,
        Err(error) => {
            tracing::warn!(%error, "cannot listen for SIGHUP; config reload disabled");
            return;
        }
    };

    tokio::spawn(async move {
        let mut current = initial;
        while hangups.recv().await.is_some() {
            let new_cfg = match quizdesk_config::load_config(config_path.as_deref()) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::error!(%e, "failed to reload config file");
                    continue;
                }
            };
            if let Err(e) = quizdesk_config::validate_config(&new_cfg) {
                tracing::error!(%e, "loaded config failed validation, ignoring");
                continue;
            }

            reload_log_level(&current, &new_cfg, &reload_handle);
            if current.explanations != new_cfg.explanations || current.openai != new_cfg.openai {
                tracing::warn!("explanation settings changed; restart to apply them");
            }
            current = new_cfg;
        }
    });
}

#[cfg(not(unix))]
pub fn spawn_config_reloader(
    _config_path: Option<String>,
    _initial: quizdesk_config::Config,
    _reload_handle: ReloadHandle,
) {
    tracing::debug!("config reload on SIGHUP is only available on unix");
}

#[cfg(unix)]
fn reload_log_level(
    old: &quizdesk_config::Config,
    new: &quizdesk_config::Config,
    reload_handle: &ReloadHandle,
) {
    if old.logging.level == new.logging.level {
        return;
    }
    let filter = tracing_subscriber::EnvFilter::new(new.logging.level.clone());
    match reload_handle(filter) {
        Ok(()) => tracing::info!(new_level = %new.logging.level, "log level updated at runtime"),
        Err(e) => tracing::error!(%e, "failed to reload log level"),
    }
}
