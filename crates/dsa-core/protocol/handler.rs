//! Request dispatch
//!
//! [`RequestHandler`] owns the host, the variable store, and the preference
//! store for a document and turns each [`Request`] into one or more
//! [`Response`]s. Every failure becomes exactly one `error` response.

use super::messages::{Request, Response, VariableOptions};
use crate::analysis::{AbortFlag, AnalysisConfig, DesignAnalysis};
use crate::document::{DocumentHost, PreferenceStore, VariableStore};
use crate::utils::{normalize_hex, CoreError};
use crate::variables::{ResolverConfig, VariableResolver};
use tracing::{debug, error, warn};

/// Maps requests onto analysis and variable workflows.
#[derive(Debug)]
pub struct RequestHandler<H, S, P> {
    host: H,
    store: S,
    prefs: P,
    analysis: AnalysisConfig,
    resolver: ResolverConfig,
    abort: Option<AbortFlag>,
}

impl<H, S, P> RequestHandler<H, S, P>
where
    H: DocumentHost,
    S: VariableStore,
    P: PreferenceStore,
{
    /// Create a handler with default configuration.
    pub fn new(host: H, store: S, prefs: P) -> Self {
        Self {
            host,
            store,
            prefs,
            analysis: AnalysisConfig::default(),
            resolver: ResolverConfig::default(),
            abort: None,
        }
    }

    /// Set analysis configuration.
    #[must_use]
    pub fn with_analysis_config(mut self, config: AnalysisConfig) -> Self {
        self.analysis = config;
        self
    }

    /// Set resolver configuration.
    #[must_use]
    pub fn with_resolver_config(mut self, config: ResolverConfig) -> Self {
        self.resolver = config;
        self
    }

    /// Let analyses observe `flag`.
    #[must_use]
    pub fn with_abort(mut self, flag: AbortFlag) -> Self {
        self.abort = Some(flag);
        self
    }

    /// Document host.
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// Variable store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Preference store.
    pub const fn prefs(&self) -> &P {
        &self.prefs
    }

    /// Take the collaborators back.
    pub fn into_parts(self) -> (H, S, P) {
        (self.host, self.store, self.prefs)
    }

    /// Handle one decoded request.
    pub async fn handle(&mut self, request: Request) -> Vec<Response> {
        debug!(?request, "handling request");
        match request {
            Request::AnalyzeDesignSystem => vec![self.analyze().await],
            Request::FindVariables { data } => vec![self.find(&data.hex).await],
            Request::UseVariable { data } | Request::ReplaceColor { data } => {
                self.replace(&data.hex, &data.variable_key).await
            }
            Request::CreateVariable { data } => {
                vec![self.create(&data.hex, data.collection.as_deref()).await]
            }
        }
    }

    /// Decode and handle one JSON request.
    pub async fn handle_json(&mut self, input: &str) -> Vec<Response> {
        let value: serde_json::Value = match serde_json::from_str(input) {
            Ok(value) => value,
            Err(err) => return vec![fail(&err.into())],
        };

        let kind = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string();
        if !Request::KINDS.contains(&kind.as_str()) {
            let message = format!("Unknown message type: {kind}");
            warn!(%message, "rejecting request");
            return vec![Response::Error { message }];
        }

        match serde_json::from_value::<Request>(value) {
            Ok(request) => self.handle(request).await,
            Err(err) => vec![fail(&err.into())],
        }
    }

    async fn analyze(&self) -> Response {
        let mut analysis = DesignAnalysis::new(self.analysis.clone());
        if let Some(flag) = &self.abort {
            analysis = analysis.with_abort(flag.clone());
        }

        match analysis.run(&self.host, &self.store).await {
            Ok(result) => Response::AnalysisResults { data: result },
            Err(err @ (CoreError::EmptySelection | CoreError::Cancelled { .. })) => fail(&err),
            Err(err) => fail(&CoreError::internal(err)),
        }
    }

    async fn find(&self, hex: &str) -> Response {
        let resolver =
            VariableResolver::new(&self.store, &self.prefs).with_config(self.resolver.clone());
        let hex = match normalize_hex(hex) {
            Ok(hex) => hex,
            Err(err) => return fail(&err),
        };

        match resolver.find_by_color(&hex).await {
            Ok(variables) if variables.is_empty() => fail(&CoreError::NoVariablesFound { hex }),
            Ok(variables) => Response::VariableOptions {
                data: VariableOptions { hex, variables },
            },
            Err(err) => fail(&err),
        }
    }

    async fn create(&self, hex: &str, collection: Option<&str>) -> Response {
        let resolver =
            VariableResolver::new(&self.store, &self.prefs).with_config(self.resolver.clone());
        match resolver.create_for_color(hex, collection).await {
            Ok(variable) => Response::VariableCreated { data: variable },
            Err(err) => fail(&err),
        }
    }

    async fn replace(&mut self, hex: &str, key: &str) -> Vec<Response> {
        let roots = self.host.selection();
        let resolver =
            VariableResolver::new(&self.store, &self.prefs).with_config(self.resolver.clone());

        match resolver.bind_color(&mut self.host, &roots, hex, key).await {
            Ok(report) => vec![
                Response::ColorsReplaced { data: report },
                self.analyze().await,
            ],
            Err(err) => vec![fail(&err)],
        }
    }
}

fn fail(err: &CoreError) -> Response {
    if err.is_recoverable() {
        warn!(category = %err.category(), suggestion = err.suggestion(), "{err}");
    } else {
        error!(category = %err.category(), "{err}");
    }
    Response::error(err)
}
