//! Background render thread with latest-request-wins scheduling.
//!
//! Requests that arrive while a pass is running are coalesced: when the pass
//! finishes only the newest pending request is rendered and the rest are
//! discarded. A running pass is never interrupted.

use crate::{Conversion, Converter, GlyphprintError, Rasterizer, RenderParams, Result};
use flume::{Receiver, Sender};
use image::RgbaImage;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread::JoinHandle;

#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub image: Arc<RgbaImage>,
    pub params: RenderParams,
    /// New group set, or `None` to keep the current one.
    pub groups: Option<BTreeSet<String>>,
}

impl RenderRequest {
    pub fn new(image: Arc<RgbaImage>, params: RenderParams) -> Self {
        Self { image, params, groups: None }
    }

    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.groups = Some(groups.into_iter().map(|s| s.as_ref().to_string()).collect());
        self
    }
}

#[derive(Debug)]
pub struct RenderResult {
    /// Sequence number returned by [`RenderWorker::submit`].
    pub seq: u64,
    pub outcome: Result<Conversion>,
}

pub struct RenderWorker {
    requests: Option<Sender<(u64, RenderRequest)>>,
    results: Receiver<RenderResult>,
    next_seq: u64,
    handle: Option<JoinHandle<()>>,
}

impl RenderWorker {
    pub fn spawn<R>(converter: Converter<R>) -> Result<Self>
    where
        R: Rasterizer + Send + 'static,
    {
        let (req_tx, req_rx) = flume::unbounded();
        let (res_tx, res_rx) = flume::unbounded();
        let handle = std::thread::Builder::new()
            .name("glyphprint-render".into())
            .spawn(move || run(converter, &req_rx, &res_tx))?;
        Ok(Self { requests: Some(req_tx), results: res_rx, next_seq: 1, handle: Some(handle) })
    }

    /// Queue a pass, replacing any request that has not started yet.
    pub fn submit(&mut self, request: RenderRequest) -> Result<u64> {
        let seq = self.next_seq;
        self.requests
            .as_ref()
            .ok_or(GlyphprintError::WorkerClosed)?
            .send((seq, request))
            .map_err(|_| GlyphprintError::WorkerClosed)?;
        self.next_seq += 1;
        Ok(seq)
    }

    /// Block until the next finished pass.
    pub fn recv(&self) -> Result<RenderResult> {
        self.results.recv().map_err(|_| GlyphprintError::WorkerClosed)
    }

    /// Newest finished pass, discarding older ones.
    pub fn latest(&self) -> Option<RenderResult> {
        self.results.try_iter().last()
    }

    /// Stop accepting work, wait for the current pass and return every
    /// result not yet received.
    pub fn finish(mut self) -> Vec<RenderResult> {
        self.shutdown();
        self.results.try_iter().collect()
    }

    fn shutdown(&mut self) {
        self.requests = None;
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("render thread panicked");
            }
        }
    }
}

impl Drop for RenderWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run<R: Rasterizer>(
    mut converter: Converter<R>,
    requests: &Receiver<(u64, RenderRequest)>,
    results: &Sender<RenderResult>,
) {
    while let Ok(mut next) = requests.recv() {
        for mut newer in requests.try_iter() {
            log::debug!("request {} superseded by {}", next.0, newer.0);
            // a group change must survive even when its request is dropped
            if newer.1.groups.is_none() {
                newer.1.groups = next.1.groups.take();
            }
            next = newer;
        }
        let (seq, request) = next;
        if let Some(groups) = request.groups {
            converter.set_groups(groups);
        }
        let outcome = converter.convert(&request.image, &request.params);
        if let Err(e) = &outcome {
            log::warn!("render {seq} failed: {e}");
        }
        if results.send(RenderResult { seq, outcome }).is_err() {
            break;
        }
    }
    log::debug!("render thread exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{GeometricRasterizer, RasterError};
    use image::Rgba;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Parks inside the first render call until released.
    struct Gate {
        entered: Sender<()>,
        release: Receiver<()>,
        armed: AtomicBool,
    }

    impl Rasterizer for Gate {
        fn render(
            &self,
            glyph: &str,
            w: u32,
            h: u32,
        ) -> std::result::Result<RgbaImage, RasterError> {
            if self.armed.swap(false, Ordering::SeqCst) {
                let _ = self.entered.send(());
                let _ = self.release.recv();
            }
            GeometricRasterizer.render(glyph, w, h)
        }
    }

    fn image(v: u8) -> Arc<RgbaImage> {
        Arc::new(RgbaImage::from_pixel(8, 8, Rgba([v, v, v, 255])))
    }

    #[test]
    fn pending_requests_collapse_to_the_latest() {
        let (entered_tx, entered_rx) = flume::bounded(1);
        let (release_tx, release_rx) = flume::bounded(1);
        let gate = Gate { entered: entered_tx, release: release_rx, armed: AtomicBool::new(true) };
        let mut worker = RenderWorker::spawn(Converter::new(gate).with_groups(["blocks"])).unwrap();

        let params = RenderParams::default().with_cols(2);
        let first = worker.submit(RenderRequest::new(image(0), params)).unwrap();
        entered_rx.recv().unwrap();
        let second = worker.submit(RenderRequest::new(image(255), params)).unwrap();
        let third = worker.submit(RenderRequest::new(image(0), params.with_cols(3))).unwrap();
        release_tx.send(()).unwrap();

        let done = worker.recv().unwrap();
        assert_eq!(done.seq, first);
        let results = worker.finish();
        let seqs: Vec<u64> = results.iter().map(|r| r.seq).collect();
        assert_eq!(seqs, [third]);
        assert!(!seqs.contains(&second));

        let art = &results[0].outcome.as_ref().unwrap().art;
        assert_eq!(art.lines()[0], "\u{2588}".repeat(3));
    }

    #[test]
    fn superseded_group_change_still_applies() {
        let (entered_tx, entered_rx) = flume::bounded(1);
        let (release_tx, release_rx) = flume::bounded(1);
        let gate = Gate { entered: entered_tx, release: release_rx, armed: AtomicBool::new(true) };
        let mut worker = RenderWorker::spawn(Converter::new(gate).with_groups(["blocks"])).unwrap();

        let params = RenderParams::default().with_cols(1);
        worker.submit(RenderRequest::new(image(0), params)).unwrap();
        entered_rx.recv().unwrap();
        worker.submit(RenderRequest::new(image(0), params).with_groups(["shades"])).unwrap();
        let last = worker.submit(RenderRequest::new(image(0), params.with_contrast(0.1))).unwrap();
        release_tx.send(()).unwrap();

        worker.recv().unwrap();
        let results = worker.finish();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].seq, last);
        let out = results[0].outcome.as_ref().unwrap();
        assert_eq!(out.stats.candidates, 3);
        assert_eq!(out.art.text(), "\u{2593}");
    }

    #[test]
    fn errors_are_reported_per_request() {
        let mut worker = RenderWorker::spawn(Converter::new(GeometricRasterizer)).unwrap();
        let req = RenderRequest::new(image(0), RenderParams::default().with_cols(0));
        let seq = worker.submit(req).unwrap();
        let result = worker.recv().unwrap();
        assert_eq!(result.seq, seq);
        assert!(matches!(result.outcome, Err(GlyphprintError::InvalidWidth)));
    }

    #[test]
    fn group_changes_travel_with_the_request() {
        let mut worker = RenderWorker::spawn(Converter::new(GeometricRasterizer)).unwrap();
        let req = RenderRequest::new(image(0), RenderParams::default().with_cols(1))
            .with_groups(["shades"]);
        worker.submit(req).unwrap();
        let out = worker.recv().unwrap().outcome.unwrap();
        assert_eq!(out.stats.candidates, 3);
        assert_eq!(out.art.text(), "\u{2593}");
    }
}
