use alertbridge_notify::AlertDispatcher;

/// Shared, immutable request state. Built once at startup.
pub struct AppState {
    pub dispatcher: AlertDispatcher,
    pub version: &'static str,
}

impl AppState {
    pub fn new(dispatcher: AlertDispatcher) -> Self {
        Self {
            dispatcher,
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}
