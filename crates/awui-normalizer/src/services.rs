// SPDX-License-Identifier: MIT OR Apache-2.0
//! One-shot construction of the shared UI services.

use crate::NormalizerError;
use crate::normalizer::{ErrorNormalizer, PageReloader};
use awui_config::{UiConfig, validate_config};
use awui_dialog::{DialogPresenter, Overlay};
use awui_telemetry::{ConsoleCaptureLayer, ConsoleSink, ErrorLog, LogSink, PageContext, RemoteSink};
use std::sync::Arc;
use tracing::{debug, warn};

/// The presenter, the log and the normalizer, built once at start-up.
///
/// Clone it (or the individual services) into whatever needs to present or
/// report errors.
#[derive(Debug, Clone)]
pub struct UiServices {
    config: UiConfig,
    presenter: DialogPresenter,
    log: ErrorLog,
    normalizer: ErrorNormalizer,
    remote: Option<Arc<RemoteSink>>,
}

impl UiServices {
    /// Validate `config` and wire the console sink, the remote sink and the
    /// normalizer around a presenter drawing into `overlay`.
    ///
    /// An endpoint that cannot be resolved disables remote delivery with a
    /// warning; invalid configuration is an error.
    pub fn bootstrap(
        config: UiConfig,
        page: PageContext,
        overlay: Arc<dyn Overlay>,
        reloader: Arc<dyn PageReloader>,
    ) -> Result<Self, NormalizerError> {
        Self::bootstrap_with_sinks(config, page, overlay, reloader, Vec::new())
    }

    /// [`UiServices::bootstrap`] with additional sinks after the standard
    /// ones.
    pub fn bootstrap_with_sinks(
        config: UiConfig,
        page: PageContext,
        overlay: Arc<dyn Overlay>,
        reloader: Arc<dyn PageReloader>,
        extra_sinks: Vec<Arc<dyn LogSink>>,
    ) -> Result<Self, NormalizerError> {
        for warning in validate_config(&config)? {
            warn!(target: "awui.errors", %warning, "configuration warning");
        }

        let mut sinks: Vec<Arc<dyn LogSink>> = vec![Arc::new(ConsoleSink::new(config.echo()))];
        let remote = match RemoteSink::from_config(&config, &page) {
            Ok(sink) => {
                let sink = Arc::new(sink);
                sinks.push(sink.clone());
                Some(sink)
            }
            Err(e) => {
                warn!(target: "awui.errors", error = %e, "remote error logging disabled");
                None
            }
        };
        sinks.extend(extra_sinks);

        let log = ErrorLog::new(page, sinks);
        let presenter = DialogPresenter::new(overlay);
        let normalizer = ErrorNormalizer::new(log.clone())
            .with_presenter(presenter.clone())
            .with_reloader(reloader)
            .with_stale_signatures(config.stale_signatures());

        debug!(target: "awui.errors", sinks = ?log.sink_names(), "ui services ready");
        Ok(Self {
            config,
            presenter,
            log,
            normalizer,
            remote,
        })
    }

    /// Effective configuration.
    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    /// The shared presenter.
    pub fn presenter(&self) -> &DialogPresenter {
        &self.presenter
    }

    /// The shared log.
    pub fn log(&self) -> &ErrorLog {
        &self.log
    }

    /// The shared normalizer.
    pub fn normalizer(&self) -> &ErrorNormalizer {
        &self.normalizer
    }

    /// The remote sink, when delivery is enabled.
    pub fn remote(&self) -> Option<&RemoteSink> {
        self.remote.as_deref()
    }

    /// A layer capturing error-level `tracing` events into the log.
    pub fn capture_layer(&self) -> ConsoleCaptureLayer {
        ConsoleCaptureLayer::new(self.log.clone())
    }

    /// Wait for outstanding remote deliveries.
    pub async fn settle(&self) {
        if let Some(remote) = &self.remote {
            remote.settle().await;
        }
    }
}
