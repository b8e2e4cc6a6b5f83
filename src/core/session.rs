use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{debug, warn};

type UnauthorizedHook = Box<dyn Fn() + Send + Sync>;

/// Single owner of the process-wide bearer token.
///
/// The token is read before every outgoing request, stored on login or
/// registration, and cleared on logout or on any 401 response. A hook can be
/// injected to observe the 401 path (the TUI uses it to fall back to the
/// login screen) so the expiry behavior is testable without a UI.
pub struct Session {
    token: Mutex<Option<String>>,
    path: Option<PathBuf>,
    on_unauthorized: Mutex<Option<UnauthorizedHook>>,
}

impl Session {
    /// Session backed by a token file, pre-loaded from disk if present.
    pub fn load(path: PathBuf) -> Self {
        let token = match fs::read_to_string(&path) {
            Ok(contents) => {
                let trimmed = contents.trim();
                if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
            }
            Err(_) => None,
        };
        Self {
            token: Mutex::new(token),
            path: Some(path),
            on_unauthorized: Mutex::new(None),
        }
    }

    /// Session with no disk persistence.
    pub fn in_memory() -> Self {
        Self {
            token: Mutex::new(None),
            path: None,
            on_unauthorized: Mutex::new(None),
        }
    }

    /// Default token location: `~/.draftdeck/token`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".draftdeck").join("token"))
    }

    pub fn token(&self) -> Option<String> {
        self.token.lock().expect("session lock poisoned").clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.token().is_some()
    }

    pub fn store(&self, token: &str) {
        *self.token.lock().expect("session lock poisoned") = Some(token.to_string());
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent()
                && let Err(e) = fs::create_dir_all(parent)
            {
                warn!("could not create session directory: {}", e);
                return;
            }
            if let Err(e) = fs::write(path, token) {
                warn!("could not persist session token: {}", e);
            }
        }
    }

    pub fn clear(&self) {
        *self.token.lock().expect("session lock poisoned") = None;
        if let Some(path) = &self.path
            && path.exists()
            && let Err(e) = fs::remove_file(path)
        {
            warn!("could not remove session token file: {}", e);
        }
    }

    /// Install the callback invoked whenever the session expires via a 401.
    pub fn on_unauthorized(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.on_unauthorized.lock().expect("session lock poisoned") = Some(Box::new(hook));
    }

    /// 401 path: clear the token and notify the owner. The in-flight
    /// operation is aborted by the caller returning `ApiError::Unauthorized`.
    pub fn expire(&self) {
        debug!("session expired, clearing stored token");
        self.clear();
        if let Some(hook) = &*self.on_unauthorized.lock().expect("session lock poisoned") {
            hook();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn store_and_clear_roundtrip() {
        let session = Session::in_memory();
        assert!(!session.is_logged_in());
        session.store("t0k3n");
        assert_eq!(session.token(), Some("t0k3n".to_string()));
        session.clear();
        assert_eq!(session.token(), None);
    }

    #[test]
    fn persists_token_across_loads() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("token");

        let session = Session::load(path.clone());
        assert!(!session.is_logged_in());
        session.store("persisted-token");

        let reloaded = Session::load(path.clone());
        assert_eq!(reloaded.token(), Some("persisted-token".to_string()));

        reloaded.clear();
        assert!(!path.exists());
        assert_eq!(Session::load(path).token(), None);
    }

    #[test]
    fn load_ignores_blank_token_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("token");
        fs::write(&path, "  \n").expect("write blank file");
        assert!(!Session::load(path).is_logged_in());
    }

    #[test]
    fn expire_clears_and_fires_hook() {
        let session = Session::in_memory();
        session.store("t0k3n");

        let fired = Arc::new(AtomicUsize::new(0));
        let observed = fired.clone();
        session.on_unauthorized(move || {
            observed.fetch_add(1, Ordering::SeqCst);
        });

        session.expire();
        assert_eq!(session.token(), None);
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        session.expire();
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn expire_without_hook_is_harmless() {
        let session = Session::in_memory();
        session.store("t0k3n");
        session.expire();
        assert!(!session.is_logged_in());
    }
}
