//! Asynchronous, de-duplicating image cache.
//!
//! Lookups happen on the thread that owns the cache. A miss starts one background fetch per
//! URL; the worker downloads, decodes and scales the image, then queues the result on a
//! channel. [`ImageCache::poll`] applies queued results, so every map mutation stays on the
//! owning thread.
use crate::error::FetchError;
use crate::error::ImageError;
use image::RgbaImage;
use image::imageops::FilterType;
use std::cell::Cell;
use std::cell::RefCell;
use std::collections::HashMap;
use std::panic;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::thread;
use url::Url;

mod fetch;

pub use fetch::DEFAULT_MAX_IMAGE_BYTES;
pub use fetch::FileFetcher;
#[cfg(feature = "http")]
pub use fetch::HttpFetcher;
pub use fetch::ImageFetcher;

/// Decoded pixels ready for display at a given scale.
#[derive(Debug)]
pub struct ScaledImage {
    pixels: RgbaImage,
    scale: f32,
}

impl ScaledImage {
    pub fn new(pixels: RgbaImage, scale: f32) -> Self {
        Self { pixels, scale }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }
}

/// Divides both dimensions of `image` by `scale`, keeping at least one pixel.
pub fn scale_preserving_aspect_ratio(image: &RgbaImage, scale: f32) -> RgbaImage {
    if !scale.is_finite() || scale <= 0.0 || (scale - 1.0).abs() < f32::EPSILON {
        return image.clone();
    }
    let factor = 1.0 / scale;
    let width = ((image.width() as f32) * factor).round().max(1.0) as u32;
    let height = ((image.height() as f32) * factor).round().max(1.0) as u32;
    if width == image.width() && height == image.height() {
        return image.clone();
    }
    image::imageops::resize(image, width, height, FilterType::Triangle)
}

/// Scale factors are keyed in thousandths so they can be hashed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct ScaleKey(u32);

impl ScaleKey {
    fn new(scale: f32) -> Self {
        if !scale.is_finite() || scale <= 0.0 {
            return ScaleKey(1000);
        }
        ScaleKey((scale * 1000.0).round().max(1.0) as u32)
    }

    fn value(self) -> f32 {
        self.0 as f32 / 1000.0
    }
}

#[derive(Clone, Debug)]
pub struct FetchHandle {
    id: u64,
    cancelled: Arc<AtomicBool>,
}

impl FetchHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

#[derive(Clone, Debug)]
pub enum RequestState {
    Loading(FetchHandle),
    Failed(Arc<FetchError>),
}

type Waker = Arc<dyn Fn() + Send + Sync>;

type Loaded = (Arc<RgbaImage>, Arc<ScaledImage>);

struct Completed {
    url: Url,
    id: u64,
    scale: ScaleKey,
    result: Result<Loaded, FetchError>,
}

pub struct ImageCache {
    fetcher: Arc<dyn ImageFetcher>,
    requests: RefCell<HashMap<Url, RequestState>>,
    originals: RefCell<HashMap<Url, Arc<RgbaImage>>>,
    scaled: RefCell<HashMap<(Url, ScaleKey), Arc<ScaledImage>>>,
    next_id: Cell<u64>,
    tx: mpsc::Sender<Completed>,
    rx: mpsc::Receiver<Completed>,
    waker: Option<Waker>,
}

impl ImageCache {
    /// Cache backed by the default fetcher (`HttpFetcher` with the `http` feature).
    pub fn new() -> Self {
        #[cfg(feature = "http")]
        let fetcher: Arc<dyn ImageFetcher> = Arc::new(HttpFetcher::new());
        #[cfg(not(feature = "http"))]
        let fetcher: Arc<dyn ImageFetcher> = Arc::new(FileFetcher);
        Self::with_fetcher(fetcher)
    }

    pub fn with_fetcher(fetcher: Arc<dyn ImageFetcher>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            fetcher,
            requests: RefCell::new(HashMap::new()),
            originals: RefCell::new(HashMap::new()),
            scaled: RefCell::new(HashMap::new()),
            next_id: Cell::new(1),
            tx,
            rx,
            waker: None,
        }
    }

    /// Called from a worker thread whenever a result is queued; typically requests a redraw.
    pub fn with_waker(mut self, waker: impl Fn() + Send + Sync + 'static) -> Self {
        self.waker = Some(Arc::new(waker));
        self
    }

    /// Looks up the image at `source` scaled by `scale`.
    ///
    /// Returns `Ok(None)` while the image is loading; the first miss for a URL starts the
    /// fetch. A URL whose fetch failed keeps failing until it is evicted.
    pub fn image(
        &self,
        source: Option<&str>,
        scale: f32,
    ) -> Result<Option<Arc<ScaledImage>>, ImageError> {
        let Some(url) = source.and_then(|s| Url::parse(s.trim()).ok()) else {
            return Err(ImageError::NoUrl);
        };
        let key = ScaleKey::new(scale);

        if let Some(image) = self.scaled.borrow().get(&(url.clone(), key)) {
            return Ok(Some(Arc::clone(image)));
        }

        let original = self.originals.borrow().get(&url).cloned();
        if let Some(original) = original {
            let scaled = Arc::new(ScaledImage::new(
                scale_preserving_aspect_ratio(&original, key.value()),
                key.value(),
            ));
            self.scaled
                .borrow_mut()
                .insert((url, key), Arc::clone(&scaled));
            return Ok(Some(scaled));
        }

        match self.requests.borrow().get(&url) {
            Some(RequestState::Failed(err)) => return Err(ImageError::FetchFailed(Arc::clone(err))),
            Some(RequestState::Loading(_)) => return Ok(None),
            None => {}
        }

        let state = self.start_fetch(&url, key);
        let out = match &state {
            RequestState::Loading(_) => Ok(None),
            RequestState::Failed(err) => Err(ImageError::FetchFailed(Arc::clone(err))),
        };
        self.requests.borrow_mut().insert(url, state);
        out
    }

    fn start_fetch(&self, url: &Url, scale: ScaleKey) -> RequestState {
        let id = self.next_id.get();
        self.next_id.set(id.wrapping_add(1));
        let handle = FetchHandle {
            id,
            cancelled: Arc::new(AtomicBool::new(false)),
        };

        let fetcher = Arc::clone(&self.fetcher);
        let cancelled = Arc::clone(&handle.cancelled);
        let tx = self.tx.clone();
        let waker = self.waker.clone();
        let task_url = url.clone();

        log::debug!(target: "ratatui_markup::image", "fetching {url}");
        let spawned = thread::Builder::new()
            .name("markup-image-fetch".to_string())
            .spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    load(fetcher.as_ref(), &task_url, scale, &cancelled)
                }))
                .unwrap_or(Err(FetchError::Panicked));
                let done = Completed {
                    url: task_url,
                    id,
                    scale,
                    result,
                };
                if tx.send(done).is_ok() {
                    if let Some(waker) = waker {
                        waker();
                    }
                }
            });

        match spawned {
            Ok(_) => RequestState::Loading(handle),
            Err(err) => {
                log::warn!(target: "ratatui_markup::image", "could not start fetch for {url}: {err}");
                RequestState::Failed(Arc::new(FetchError::Io(err)))
            }
        }
    }

    /// Applies finished fetches. Returns true when any cached state changed.
    pub fn poll(&self) -> bool {
        let mut changed = false;
        while let Ok(done) = self.rx.try_recv() {
            let mut requests = self.requests.borrow_mut();
            let current = matches!(
                requests.get(&done.url),
                Some(RequestState::Loading(handle)) if handle.id == done.id
            );
            if !current {
                log::debug!(target: "ratatui_markup::image", "dropping stale result for {}", done.url);
                continue;
            }
            match done.result {
                Ok((original, scaled)) => {
                    log::debug!(target: "ratatui_markup::image", "loaded {}", done.url);
                    requests.remove(&done.url);
                    self.originals
                        .borrow_mut()
                        .insert(done.url.clone(), original);
                    self.scaled
                        .borrow_mut()
                        .insert((done.url, done.scale), scaled);
                }
                Err(FetchError::Cancelled) => {
                    requests.remove(&done.url);
                }
                Err(err) => {
                    log::warn!(target: "ratatui_markup::image", "failed to load {}: {err}", done.url);
                    requests.insert(done.url, RequestState::Failed(Arc::new(err)));
                }
            }
            changed = true;
        }
        changed
    }

    /// Stops tracking an in-flight fetch. Its result is discarded when it arrives.
    pub fn cancel(&self, url: &Url) -> bool {
        let mut requests = self.requests.borrow_mut();
        match requests.get(url) {
            Some(RequestState::Loading(handle)) => {
                handle.cancel();
                requests.remove(url);
                true
            }
            _ => false,
        }
    }

    /// Forgets everything known about `url`, including a recorded failure.
    pub fn evict(&self, url: &Url) {
        self.cancel(url);
        self.requests.borrow_mut().remove(url);
        self.originals.borrow_mut().remove(url);
        self.scaled.borrow_mut().retain(|(u, _), _| u != url);
    }

    pub fn clear(&self) {
        for state in self.requests.borrow().values() {
            if let RequestState::Loading(handle) = state {
                handle.cancel();
            }
        }
        self.requests.borrow_mut().clear();
        self.originals.borrow_mut().clear();
        self.scaled.borrow_mut().clear();
    }

    pub fn state(&self, url: &Url) -> Option<RequestState> {
        self.requests.borrow().get(url).cloned()
    }

    pub fn is_loading(&self, url: &Url) -> bool {
        matches!(self.state(url), Some(RequestState::Loading(_)))
    }

    pub fn has_failed(&self, url: &Url) -> bool {
        matches!(self.state(url), Some(RequestState::Failed(_)))
    }

    /// Number of fetches still running.
    pub fn in_flight(&self) -> usize {
        self.requests
            .borrow()
            .values()
            .filter(|s| matches!(s, RequestState::Loading(_)))
            .count()
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new()
    }
}

fn load(
    fetcher: &dyn ImageFetcher,
    url: &Url,
    scale: ScaleKey,
    cancelled: &AtomicBool,
) -> Result<Loaded, FetchError> {
    if cancelled.load(Ordering::Relaxed) {
        return Err(FetchError::Cancelled);
    }
    let bytes = fetcher.fetch(url)?;
    if cancelled.load(Ordering::Relaxed) {
        return Err(FetchError::Cancelled);
    }
    let original = image::load_from_memory(&bytes)?.to_rgba8();
    let scaled = scale_preserving_aspect_ratio(&original, scale.value());
    Ok((
        Arc::new(original),
        Arc::new(ScaledImage::new(scaled, scale.value())),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;
    use image::ImageFormat;
    use image::Rgba;
    use std::io::Cursor;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 10, 10, 255]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn wait_for_poll(cache: &ImageCache) -> bool {
        for _ in 0..500 {
            if cache.poll() {
                return true;
            }
            thread::sleep(Duration::from_millis(10));
        }
        false
    }

    struct Gated {
        calls: AtomicUsize,
        gate: Mutex<mpsc::Receiver<()>>,
        body: Result<Vec<u8>, String>,
    }

    impl ImageFetcher for Gated {
        fn fetch(&self, _url: &Url) -> Result<Vec<u8>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let _ = self.gate.lock().unwrap().recv();
            self.body.clone().map_err(FetchError::Http)
        }
    }

    fn gated(body: Result<Vec<u8>, String>) -> (Arc<Gated>, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel();
        let fetcher = Arc::new(Gated {
            calls: AtomicUsize::new(0),
            gate: Mutex::new(rx),
            body,
        });
        (fetcher, tx)
    }

    const URL: &str = "https://example.com/cat.png";

    #[test]
    fn concurrent_requests_share_one_fetch() {
        let (fetcher, gate) = gated(Ok(png(4, 2)));
        let cache = ImageCache::with_fetcher(fetcher.clone());

        assert!(cache.image(Some(URL), 1.0).unwrap().is_none());
        assert!(cache.image(Some(URL), 1.0).unwrap().is_none());
        let url = Url::parse(URL).unwrap();
        assert!(cache.is_loading(&url));
        assert_eq!(cache.in_flight(), 1);

        gate.send(()).unwrap();
        assert!(wait_for_poll(&cache));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);

        let image = cache.image(Some(URL), 1.0).unwrap().unwrap();
        assert_eq!((image.width(), image.height()), (4, 2));
        assert!(cache.state(&url).is_none());
    }

    #[test]
    fn failures_stick_until_evicted() {
        let (fetcher, gate) = gated(Err("404".into()));
        let cache = ImageCache::with_fetcher(fetcher.clone());
        let url = Url::parse(URL).unwrap();

        assert!(cache.image(Some(URL), 1.0).unwrap().is_none());
        gate.send(()).unwrap();
        assert!(wait_for_poll(&cache));
        assert!(cache.has_failed(&url));

        for _ in 0..3 {
            assert!(matches!(
                cache.image(Some(URL), 1.0),
                Err(ImageError::FetchFailed(_))
            ));
        }
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);

        cache.evict(&url);
        assert!(cache.image(Some(URL), 1.0).unwrap().is_none());
        gate.send(()).unwrap();
        assert!(wait_for_poll(&cache));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn missing_or_invalid_url_is_reported() {
        let cache = ImageCache::with_fetcher(Arc::new(FileFetcher));
        assert!(matches!(cache.image(None, 1.0), Err(ImageError::NoUrl)));
        assert!(matches!(
            cache.image(Some("not a url"), 1.0),
            Err(ImageError::NoUrl)
        ));
        assert_eq!(cache.in_flight(), 0);
    }

    #[test]
    fn other_scales_reuse_the_decoded_original() {
        let bytes = png(8, 4);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let fetcher = move |_: &Url| -> Result<Vec<u8>, FetchError> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(bytes.clone())
        };
        let cache = ImageCache::with_fetcher(Arc::new(fetcher));

        assert!(cache.image(Some(URL), 2.0).unwrap().is_none());
        assert!(wait_for_poll(&cache));
        let half = cache.image(Some(URL), 2.0).unwrap().unwrap();
        assert_eq!((half.width(), half.height()), (4, 2));
        let full = cache.image(Some(URL), 1.0).unwrap().unwrap();
        assert_eq!((full.width(), full.height()), (8, 4));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cancelled_results_are_discarded() {
        let (fetcher, gate) = gated(Ok(png(2, 2)));
        let cache = ImageCache::with_fetcher(fetcher);
        let url = Url::parse(URL).unwrap();

        assert!(cache.image(Some(URL), 1.0).unwrap().is_none());
        assert!(cache.cancel(&url));
        gate.send(()).unwrap();
        thread::sleep(Duration::from_millis(50));
        assert!(!cache.poll());
        assert!(cache.state(&url).is_none());
    }

    #[test]
    fn waker_fires_when_result_is_queued() {
        let woke = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&woke);
        let bytes = png(1, 1);
        let fetcher = move |_: &Url| -> Result<Vec<u8>, FetchError> { Ok(bytes.clone()) };
        let cache = ImageCache::with_fetcher(Arc::new(fetcher))
            .with_waker(move || flag.store(true, Ordering::SeqCst));
        assert!(cache.image(Some(URL), 1.0).unwrap().is_none());
        assert!(wait_for_poll(&cache));
        assert!(woke.load(Ordering::SeqCst));
    }

    #[test]
    fn scaling_divides_dimensions() {
        let img = RgbaImage::new(10, 6);
        let out = scale_preserving_aspect_ratio(&img, 2.0);
        assert_eq!((out.width(), out.height()), (5, 3));
        let same = scale_preserving_aspect_ratio(&img, 0.0);
        assert_eq!((same.width(), same.height()), (10, 6));
        let tiny = scale_preserving_aspect_ratio(&RgbaImage::new(1, 1), 8.0);
        assert_eq!((tiny.width(), tiny.height()), (1, 1));
    }
}
