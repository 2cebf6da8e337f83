pub mod net;
pub mod state;
pub mod store;

use crate::error::{ApiError, SetupError};
use crate::gallery::net::{CredentialProvider, GalleryApi, HttpGalleryApi, NoAuth};
use crate::gallery::state::{
    LikeToggle, Lightbox, LightboxAdvance, PhotoCollection, PhotoId, PhotoView, WrapCause,
};
use crate::gallery::store::load_or_create_identity;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryConfig {
    #[serde(alias = "feedUrl")]
    pub feed_url: String,
    #[serde(alias = "likesUrl", default)]
    pub likes_url: Option<String>,
    #[serde(alias = "dataDir")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct GalleryStatus {
    pub identity: String,
    pub photo_count: usize,
    pub has_more: bool,
    pub likes_ready: bool,
    pub lightbox_index: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum LikePhase {
    #[default]
    NotStarted,
    Loading,
    Ready,
}

#[derive(Debug, Default)]
struct FeedState {
    photos: PhotoCollection,
    next_link: Option<String>,
    in_flight: HashSet<String>,
    likes: LikePhase,
    lightbox: Lightbox,
}

/// One device's gallery pipeline: server pagination, the reconciled liked
/// set, optimistic like flips, and the viewer position. Single-threaded by
/// design; keep it on the task that drives the UI.
pub struct GallerySession {
    api: Box<dyn GalleryApi>,
    credentials: Rc<dyn CredentialProvider>,
    identity: String,
    feed: RefCell<FeedState>,
}

impl GallerySession {
    /// Open a session with no authentication collaborator.
    pub fn open(config: GalleryConfig) -> Result<GallerySession, SetupError> {
        Self::open_with_credentials(config, Rc::new(NoAuth))
    }

    pub fn open_with_credentials(
        config: GalleryConfig,
        credentials: Rc<dyn CredentialProvider>,
    ) -> Result<GallerySession, SetupError> {
        let feed_url = config.feed_url.trim().to_string();
        if feed_url.is_empty() {
            return Err(SetupError::InvalidConfig("feedUrl is required".to_string()));
        }
        let identity = load_or_create_identity(&config.data_dir)?;
        let api = HttpGalleryApi::new(config.likes_url, Rc::clone(&credentials))?;
        Ok(Self::with_api(
            Box::new(api),
            credentials,
            identity.user_id,
            feed_url,
        ))
    }

    /// Assemble a session over an explicit transport; `open` is the usual path.
    pub fn with_api(
        api: Box<dyn GalleryApi>,
        credentials: Rc<dyn CredentialProvider>,
        identity: String,
        feed_url: String,
    ) -> GallerySession {
        let feed = FeedState {
            next_link: Some(feed_url),
            ..FeedState::default()
        };
        GallerySession {
            api,
            credentials,
            identity,
            feed: RefCell::new(feed),
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn photo_count(&self) -> usize {
        self.feed.borrow().photos.len()
    }

    pub fn photo(&self, index: usize) -> Option<PhotoView> {
        self.feed.borrow().photos.view(index)
    }

    pub fn photos(&self) -> Vec<PhotoView> {
        self.feed.borrow().photos.snapshot()
    }

    pub fn is_liked(&self, id: &PhotoId) -> bool {
        self.feed.borrow().photos.is_liked(id)
    }

    pub fn has_more(&self) -> bool {
        self.feed.borrow().next_link.is_some()
    }

    pub fn likes_ready(&self) -> bool {
        self.feed.borrow().likes == LikePhase::Ready
    }

    pub fn lightbox(&self) -> Lightbox {
        self.feed.borrow().lightbox
    }

    pub fn status(&self) -> GalleryStatus {
        let feed = self.feed.borrow();
        GalleryStatus {
            identity: self.identity.clone(),
            photo_count: feed.photos.len(),
            has_more: feed.next_link.is_some(),
            likes_ready: feed.likes == LikePhase::Ready,
            lightbox_index: feed.lightbox.index(),
        }
    }

    /// Pull the device's liked-photo ids from the likes service, once per
    /// session. A pending credential defers the pull; a failed pull counts as
    /// done with no likes, so the feed still renders.
    pub async fn reconcile_likes(&self) {
        {
            let mut feed = self.feed.borrow_mut();
            match feed.likes {
                LikePhase::Ready | LikePhase::Loading => return,
                LikePhase::NotStarted => {}
            }
            if !self.credentials.is_ready() {
                debug!("likes reconcile deferred: credential is not ready");
                return;
            }
            if !self.api.likes_configured() {
                feed.likes = LikePhase::Ready;
                return;
            }
            feed.likes = LikePhase::Loading;
        }
        let liked: HashSet<PhotoId> = match self.api.fetch_liked_ids(&self.identity).await {
            Ok(response) => response
                .photos
                .iter()
                .map(|suffix| PhotoId::image(suffix))
                .collect(),
            Err(e) => {
                warn!(identity = %self.identity, "fetch liked photos failed: {e}");
                HashSet::new()
            }
        };
        let mut feed = self.feed.borrow_mut();
        feed.photos.replace_likes(liked);
        feed.likes = LikePhase::Ready;
    }

    /// Fetch the page the next link points at, if any. Returns true when at
    /// least one new photo was appended. A missing link, a fetch already in
    /// flight for the same link, and a failed fetch all return false; on
    /// failure the link stays current so a later call can retry it.
    pub async fn request_next_page(&self) -> bool {
        if !self.credentials.is_ready() {
            debug!("page fetch suppressed: credential is not ready");
            return false;
        }
        self.reconcile_likes().await;
        if !self.likes_ready() {
            return false;
        }
        let link = {
            let mut feed = self.feed.borrow_mut();
            let Some(link) = feed.next_link.clone() else {
                return false;
            };
            if !feed.in_flight.insert(link.clone()) {
                return false;
            }
            link
        };
        let fetched = self.api.fetch_page(&link).await;
        let mut feed = self.feed.borrow_mut();
        feed.in_flight.remove(&link);
        match fetched {
            Ok(page) => {
                let next = page.next_href();
                let appended = feed.photos.append(page.photos);
                feed.next_link = next;
                debug!(appended, has_more = feed.next_link.is_some(), "gallery page fetched");
                appended > 0
            }
            Err(ApiError::Unauthorized) => {
                warn!(link = %link, "page fetch rejected as unauthorized");
                false
            }
            Err(e) => {
                warn!(link = %link, "fetch gallery page failed: {e}");
                false
            }
        }
    }

    /// Flip one photo's liked state. The flip lands locally first; if the
    /// remote update then fails it is undone exactly. Returns whether the
    /// flip stuck.
    pub async fn toggle_like(&self, id: &PhotoId) -> bool {
        if !self.credentials.is_ready() {
            debug!(photo = %id, "like toggle suppressed: credential is not ready");
            return false;
        }
        let toggle = {
            let mut feed = self.feed.borrow_mut();
            LikeToggle::apply(&mut feed.photos, id)
        };
        if !self.api.likes_configured() {
            // nothing to sync against; the local flip is final
            toggle.commit();
            return true;
        }
        let pushed = self
            .api
            .push_like(&self.identity, id.suffix(), toggle.has_liked())
            .await;
        match pushed {
            Ok(()) => {
                toggle.commit();
                true
            }
            Err(e) => {
                warn!(photo = %id, "push like update failed: {e}");
                let mut feed = self.feed.borrow_mut();
                toggle.rollback(&mut feed.photos);
                false
            }
        }
    }

    pub fn open_lightbox(&self, index: usize) -> bool {
        let mut feed = self.feed.borrow_mut();
        if index >= feed.photos.len() {
            return false;
        }
        feed.lightbox = Lightbox::Open(index);
        true
    }

    pub fn close_lightbox(&self) {
        self.feed.borrow_mut().lightbox = Lightbox::Closed;
    }

    pub fn lightbox_previous(&self) -> Option<usize> {
        let mut feed = self.feed.borrow_mut();
        let Lightbox::Open(index) = feed.lightbox else {
            return None;
        };
        let previous = index.saturating_sub(1);
        feed.lightbox = Lightbox::Open(previous);
        Some(previous)
    }

    /// Step the viewer forward. Past the loaded window this fetches the next
    /// page first; when the feed is exhausted, or the page cannot be fetched,
    /// the viewer wraps to the first photo.
    pub async fn lightbox_next(&self) -> LightboxAdvance {
        let (index, within_window, has_more) = {
            let feed = self.feed.borrow();
            let Lightbox::Open(index) = feed.lightbox else {
                return LightboxAdvance::Closed;
            };
            (
                index,
                index + 1 < feed.photos.len(),
                feed.next_link.is_some(),
            )
        };
        if within_window {
            self.feed.borrow_mut().lightbox = Lightbox::Open(index + 1);
            return LightboxAdvance::Advanced(index + 1);
        }
        if has_more && self.request_next_page().await {
            self.feed.borrow_mut().lightbox = Lightbox::Open(index + 1);
            return LightboxAdvance::Advanced(index + 1);
        }
        let mut feed = self.feed.borrow_mut();
        feed.lightbox = Lightbox::Open(0);
        let cause = if feed.next_link.is_some() {
            WrapCause::FetchFailed
        } else {
            WrapCause::EndOfFeed
        };
        LightboxAdvance::Wrapped(cause)
    }
}

impl fmt::Debug for GallerySession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let feed = self.feed.borrow();
        f.debug_struct("GallerySession")
            .field("identity", &self.identity)
            .field("photo_count", &feed.photos.len())
            .field("has_more", &feed.next_link.is_some())
            .field("likes", &feed.likes)
            .finish()
    }
}
