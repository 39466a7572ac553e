//! School asset lookup through the script-only remote endpoint.
//!
//! The endpoint cannot answer a direct cross-origin request; it responds
//! with a script body that invokes a named callback with the data object.
//! Each call registers its callback in a [`CallbackRegistry`] keyed by a
//! unique correlation name, hands the registry to a [`ScriptLoader`], and
//! races three settlement branches: callback data, load failure, and a
//! fixed timeout. The first branch to settle wins; the registry entry is
//! removed on every path. A call never fails — it degrades to `None`
//! placeholders and submission proceeds with whatever resolved.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::{Client, Url};
use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::{debug, warn};

/// How long to wait for the remote script before degrading to `None`s.
pub const SCRIPT_TIMEOUT: Duration = Duration::from_secs(15);

/// Process-wide sequence keeping callback names unique even within one
/// timestamp tick.
static CALLBACK_SEQ: AtomicU64 = AtomicU64::new(0);

/// Which asset the endpoint is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// School logo: resolves a file id only
    Logo,

    /// School template: resolves a file id plus inline content
    Template,
}

impl AssetKind {
    /// Value of the `type` query parameter, also used in callback names.
    #[must_use]
    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::Logo => "logo",
            Self::Template => "template",
        }
    }
}

/// Resolved school asset, fields defaulting to `None` on any degradation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchoolAsset {
    /// Remote file id of the asset
    pub file_id: Option<String>,

    /// Inline template content (templates only)
    pub content: Option<String>,
}

/// Signal delivered through the registry for one callback name.
#[derive(Debug)]
pub enum CallbackSignal {
    /// The remote script invoked the callback with this data object
    Data(serde_json::Value),

    /// The script resource failed to load
    LoadFailed,
}

/// Pending callbacks keyed by correlation name.
///
/// Settlement is one-shot: the first `dispatch` or `fail` for a name
/// consumes the entry and later signals for it are ignored.
#[derive(Default)]
pub struct CallbackRegistry {
    pending: Mutex<HashMap<String, oneshot::Sender<CallbackSignal>>>,
}

impl CallbackRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback name, returning the receiver its signal
    /// arrives on.
    fn register(&self, name: &str) -> oneshot::Receiver<CallbackSignal> {
        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .expect("callback registry lock poisoned")
            .insert(name.to_owned(), tx);
        rx
    }

    /// Delivers the remote callback's data object. Returns `false` when
    /// the name already settled or was never registered.
    pub fn dispatch(&self, name: &str, data: serde_json::Value) -> bool {
        self.settle(name, CallbackSignal::Data(data))
    }

    /// Signals that the script resource failed to load. Returns `false`
    /// when the name already settled or was never registered.
    pub fn fail(&self, name: &str) -> bool {
        self.settle(name, CallbackSignal::LoadFailed)
    }

    fn settle(&self, name: &str, signal: CallbackSignal) -> bool {
        let sender = self
            .pending
            .lock()
            .expect("callback registry lock poisoned")
            .remove(name);
        match sender {
            // The receiver may have gone away already; the entry is
            // consumed either way.
            Some(tx) => {
                let _ = tx.send(signal);
                true
            }
            None => false,
        }
    }

    /// Drops a pending entry without signalling (timeout cleanup).
    fn release(&self, name: &str) {
        self.pending
            .lock()
            .expect("callback registry lock poisoned")
            .remove(name);
    }

    /// Number of callbacks still awaiting settlement.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending
            .lock()
            .expect("callback registry lock poisoned")
            .len()
    }
}

/// The script-loading primitive.
///
/// Starting a load must not block; the loader later settles the named
/// callback on the registry with either the data object the script
/// carried or a load failure.
pub trait ScriptLoader: Send + Sync {
    fn load(&self, url: Url, callback: String, registry: Arc<CallbackRegistry>);
}

/// Production loader: fetches the script body over HTTP and recovers the
/// callback invocation payload from it.
pub struct HttpScriptLoader {
    client: Client,
}

impl HttpScriptLoader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for HttpScriptLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptLoader for HttpScriptLoader {
    fn load(&self, url: Url, callback: String, registry: Arc<CallbackRegistry>) {
        let client = self.client.clone();
        tokio::spawn(async move {
            let body = match client.get(url).send().await {
                Ok(response) => response.text().await,
                Err(error) => Err(error),
            };

            match body {
                Ok(body) => match parse_callback_payload(&body, &callback) {
                    Some(data) => {
                        registry.dispatch(&callback, data);
                    }
                    None => {
                        warn!(%callback, "Script response did not invoke the callback");
                        registry.fail(&callback);
                    }
                },
                Err(error) => {
                    debug!(%callback, "Script load failed: {error}");
                    registry.fail(&callback);
                }
            }
        });
    }
}

/// Extracts the JSON argument of `callback({...})` from a script body.
fn parse_callback_payload(body: &str, callback: &str) -> Option<serde_json::Value> {
    let invocation = format!("{callback}(");
    let start = body.find(&invocation)? + invocation.len();
    let end = body[start..].rfind(')')? + start;
    serde_json::from_str(body[start..end].trim()).ok()
}

/// Fetches one school asset, degrading to `None` placeholders on load
/// failure or after [`SCRIPT_TIMEOUT`].
pub async fn fetch_school_asset(
    loader: &dyn ScriptLoader,
    registry: &Arc<CallbackRegistry>,
    script_url: &str,
    school: &str,
    kind: AssetKind,
) -> SchoolAsset {
    fetch_with_timeout(loader, registry, script_url, school, kind, SCRIPT_TIMEOUT).await
}

pub(crate) async fn fetch_with_timeout(
    loader: &dyn ScriptLoader,
    registry: &Arc<CallbackRegistry>,
    script_url: &str,
    school: &str,
    kind: AssetKind,
    wait: Duration,
) -> SchoolAsset {
    let callback = next_callback_name(kind);

    let Some(url) = build_request_url(script_url, school, &callback, kind) else {
        warn!(script_url, "Invalid script endpoint address");
        return SchoolAsset::default();
    };

    let rx = registry.register(&callback);
    loader.load(url, callback.clone(), Arc::clone(registry));

    match timeout(wait, rx).await {
        Ok(Ok(CallbackSignal::Data(data))) => parse_asset(kind, &data),
        Ok(Ok(CallbackSignal::LoadFailed)) | Ok(Err(_)) => SchoolAsset::default(),
        Err(_elapsed) => {
            debug!(%callback, "Script callback timed out");
            registry.release(&callback);
            SchoolAsset::default()
        }
    }
}

/// Unique correlation name: timestamp-, sequence-, and kind-qualified.
fn next_callback_name(kind: AssetKind) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let seq = CALLBACK_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("scriptCallback_{millis}_{seq}_{}", kind.as_query_value())
}

fn build_request_url(
    script_url: &str,
    school: &str,
    callback: &str,
    kind: AssetKind,
) -> Option<Url> {
    let mut url = Url::parse(script_url).ok()?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("school", school);
        pairs.append_pair("callback", callback);
        if kind == AssetKind::Template {
            pairs.append_pair("type", kind.as_query_value());
        }
    }
    Some(url)
}

/// Maps the callback's data object to the asset shape for `kind`,
/// defaulting missing fields to `None`. Logo lookups never carry content.
fn parse_asset(kind: AssetKind, data: &serde_json::Value) -> SchoolAsset {
    let file_id = data
        .get("fileId")
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned);
    let content = match kind {
        AssetKind::Logo => None,
        AssetKind::Template => data
            .get("content")
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned),
    };
    SchoolAsset { file_id, content }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use serde_json::json;

    use super::*;

    /// Loader that settles immediately with a fixed data object.
    struct DataLoader(serde_json::Value);

    impl ScriptLoader for DataLoader {
        fn load(&self, _url: Url, callback: String, registry: Arc<CallbackRegistry>) {
            let data = self.0.clone();
            tokio::spawn(async move {
                registry.dispatch(&callback, data);
            });
        }
    }

    /// Loader that fails every load.
    struct FailingLoader;

    impl ScriptLoader for FailingLoader {
        fn load(&self, _url: Url, callback: String, registry: Arc<CallbackRegistry>) {
            tokio::spawn(async move {
                registry.fail(&callback);
            });
        }
    }

    /// Loader that never settles anything.
    struct SilentLoader;

    impl ScriptLoader for SilentLoader {
        fn load(&self, _url: Url, _callback: String, _registry: Arc<CallbackRegistry>) {}
    }

    const SCRIPT_URL: &str = "https://script.example.com/exec";

    #[tokio::test]
    async fn test_logo_lookup_resolves_file_id_only() {
        let registry = Arc::new(CallbackRegistry::new());
        let loader = DataLoader(json!({ "fileId": "logo-123", "content": "ignored" }));

        let asset =
            fetch_school_asset(&loader, &registry, SCRIPT_URL, "Some School", AssetKind::Logo)
                .await;

        assert_eq!(asset.file_id.as_deref(), Some("logo-123"));
        assert!(asset.content.is_none());
        assert_eq!(registry.pending_len(), 0);
    }

    #[tokio::test]
    async fn test_template_lookup_resolves_content() {
        let registry = Arc::new(CallbackRegistry::new());
        let loader = DataLoader(json!({ "fileId": "tpl-1", "content": "module.exports = {}" }));

        let asset = fetch_school_asset(
            &loader,
            &registry,
            SCRIPT_URL,
            "Some School",
            AssetKind::Template,
        )
        .await;

        assert_eq!(asset.file_id.as_deref(), Some("tpl-1"));
        assert_eq!(asset.content.as_deref(), Some("module.exports = {}"));
    }

    #[tokio::test]
    async fn test_missing_fields_default_to_none() {
        let registry = Arc::new(CallbackRegistry::new());
        let loader = DataLoader(json!({}));

        let asset = fetch_school_asset(
            &loader,
            &registry,
            SCRIPT_URL,
            "Some School",
            AssetKind::Template,
        )
        .await;

        assert_eq!(asset, SchoolAsset::default());
    }

    #[tokio::test]
    async fn test_load_failure_degrades_to_placeholders() {
        let registry = Arc::new(CallbackRegistry::new());

        let asset = fetch_school_asset(
            &FailingLoader,
            &registry,
            SCRIPT_URL,
            "Some School",
            AssetKind::Logo,
        )
        .await;

        assert_eq!(asset, SchoolAsset::default());
        assert_eq!(registry.pending_len(), 0);
    }

    #[tokio::test]
    async fn test_silent_endpoint_resolves_at_the_timeout() {
        let registry = Arc::new(CallbackRegistry::new());
        let wait = Duration::from_millis(50);

        let started = Instant::now();
        let asset = fetch_with_timeout(
            &SilentLoader,
            &registry,
            SCRIPT_URL,
            "Some School",
            AssetKind::Logo,
            wait,
        )
        .await;

        assert!(started.elapsed() >= wait);
        assert_eq!(asset, SchoolAsset::default());
        // Timeout cleanup removed the pending entry.
        assert_eq!(registry.pending_len(), 0);
    }

    #[tokio::test]
    async fn test_first_signal_wins_and_later_ones_are_ignored() {
        let registry = CallbackRegistry::new();
        let _rx = registry.register("cb_1");

        assert!(registry.dispatch("cb_1", json!({ "fileId": "a" })));
        assert!(!registry.dispatch("cb_1", json!({ "fileId": "b" })));
        assert!(!registry.fail("cb_1"));
    }

    #[tokio::test]
    async fn test_signals_for_unknown_callbacks_are_ignored() {
        let registry = CallbackRegistry::new();
        assert!(!registry.dispatch("never_registered", json!({})));
        assert!(!registry.fail("never_registered"));
    }

    #[test]
    fn test_callback_names_are_unique_and_kind_qualified() {
        let a = next_callback_name(AssetKind::Logo);
        let b = next_callback_name(AssetKind::Logo);
        assert_ne!(a, b);
        assert!(a.starts_with("scriptCallback_"));
        assert!(a.ends_with("_logo"));
        assert!(next_callback_name(AssetKind::Template).ends_with("_template"));
    }

    #[test]
    fn test_request_url_carries_type_only_for_templates() {
        let logo = build_request_url(SCRIPT_URL, "My School", "cb", AssetKind::Logo).unwrap();
        assert!(logo.query().unwrap().contains("school=My+School"));
        assert!(logo.query().unwrap().contains("callback=cb"));
        assert!(!logo.query().unwrap().contains("type="));

        let template =
            build_request_url(SCRIPT_URL, "My School", "cb", AssetKind::Template).unwrap();
        assert!(template.query().unwrap().contains("type=template"));
    }

    #[test]
    fn test_parse_callback_payload() {
        let body = r#"/**/cb_42({"fileId": "abc", "content": null});"#;
        let data = parse_callback_payload(body, "cb_42").unwrap();
        assert_eq!(data["fileId"], "abc");

        assert!(parse_callback_payload("console.log('nope')", "cb_42").is_none());
        assert!(parse_callback_payload("cb_42(not json)", "cb_42").is_none());
    }
}
