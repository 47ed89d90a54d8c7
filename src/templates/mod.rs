//! Reusable source-code fragments and the generic placeholder engine.

use std::sync::Mutex;

use ahash::AHashMap;

mod placeholders;
mod python;

pub use placeholders::{
    escape_py_string, extract_placeholders, replace_placeholders, sanitize_identifier,
    validate_template,
};

/// A cached registry of Python source fragments.
///
/// Every getter is a pure function of the template name (plus `kind` for
/// handler skeletons), so entries are memoized for the process lifetime and
/// only an explicit [`clear_cache`](Self::clear_cache) drops them. One
/// instance is constructed at startup and passed by reference to whatever
/// assembles programs; the mutex makes that instance safe to share across
/// concurrent generations.
#[derive(Default)]
pub struct TemplateLibrary {
    cache: Mutex<AHashMap<String, String>>,
}

impl TemplateLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    fn cached(&self, key: &str, build: impl FnOnce() -> String) -> String {
        let mut cache = match self.cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        cache.entry(key.to_string()).or_insert_with(build).clone()
    }

    pub fn encoding(&self) -> String {
        self.cached("encoding", || python::ENCODING.to_string())
    }

    pub fn imports(&self) -> String {
        self.cached("imports", || python::IMPORTS.to_string())
    }

    pub fn bot_init(&self) -> String {
        self.cached("bot_init", || python::BOT_INIT.to_string())
    }

    pub fn main_function(&self) -> String {
        self.cached("main_function", || python::MAIN_FUNCTION.to_string())
    }

    /// Handler skeleton for a kind. An unrecognized kind returns a visible
    /// placeholder comment rather than failing: generation must never
    /// hard-fail on an unknown handler kind.
    pub fn handler_skeleton(&self, kind: &str) -> String {
        self.cached(&format!("handler:{kind}"), || match kind {
            "message" => python::HANDLER_MESSAGE.to_string(),
            "callback" => python::HANDLER_CALLBACK.to_string(),
            "command" => python::HANDLER_COMMAND.to_string(),
            other => format!("\n# TODO: no handler template for kind '{other}'\n"),
        })
    }

    pub fn save_message(&self) -> String {
        self.cached("save_message", || python::SAVE_MESSAGE.to_string())
    }

    pub fn middleware(&self) -> String {
        self.cached("middleware", || python::MIDDLEWARE.to_string())
    }

    pub fn safe_edit_or_send(&self) -> String {
        self.cached("safe_edit_or_send", || python::SAFE_EDIT_OR_SEND.to_string())
    }

    pub fn utility_functions(&self) -> String {
        self.cached("utility_functions", || python::UTILITIES.to_string())
    }

    pub fn clear_cache(&self) {
        match self.cache.lock() {
            Ok(mut guard) => guard.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }

    pub fn cache_size(&self) -> usize {
        match self.cache.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}
