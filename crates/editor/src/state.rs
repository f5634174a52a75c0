//! The editor state container.
//!
//! [`EditorState`] exclusively owns the overlay set. Every mutation builds
//! a new `Arc<[Overlay]>` and then recomputes the [`EditorSnapshot`], so a
//! snapshot handed out earlier never changes underneath its holder.

use std::sync::Arc;

use tracing::debug;

use reelforge_common::clock::FrameClock;
use reelforge_common::config::AppConfig;
use reelforge_processing_core::duration::{resolve_duration, CompositionDuration, DurationPolicy};
use reelforge_processing_core::geometry::transform_overlays_for_aspect_ratio;
use reelforge_processing_core::zoom::{TimelineZoom, ZoomConfig};
use reelforge_project_model::aspect::{AspectRatio, CanvasDimensions};
use reelforge_project_model::composition::{Composition, CompositionDocument};
use reelforge_project_model::overlay::{validate_overlays, Overlay, OverlayDraft, OverlayId, OverlayKind};
use reelforge_render_engine::request::RenderRequest;

use crate::cache::DerivedCache;
use crate::error::{EditorError, EditorResult};
use crate::playback::Playback;

/// Consistent view of the editor after the latest mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorSnapshot {
    /// Bumped on every change to the overlay set.
    pub revision: u64,
    pub overlays: Arc<[Overlay]>,
    pub aspect_ratio: AspectRatio,
    pub dimensions: CanvasDimensions,
    pub fps: u32,
    pub duration: CompositionDuration,
    pub selected: Option<OverlayId>,
    pub playback: Playback,
}

/// Owns the overlay set and everything derived from it.
#[derive(Debug)]
pub struct EditorState {
    overlays: Arc<[Overlay]>,
    next_id: u64,
    revision: u64,
    fps: u32,
    aspect_ratio: AspectRatio,
    /// Canvas the current overlay geometry is expressed in.
    baseline: CanvasDimensions,
    policy: DurationPolicy,
    selected: Option<OverlayId>,
    playback: Playback,
    timeline: TimelineZoom,
    durations: DerivedCache<(u64, u32), CompositionDuration>,
    snapshot: EditorSnapshot,
}

impl EditorState {
    pub fn new(fps: u32, aspect_ratio: AspectRatio) -> Self {
        Self::build(fps, aspect_ratio, DurationPolicy::default(), TimelineZoom::default())
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::build(
            config.editor.fps,
            AspectRatio::parse(&config.editor.aspect_ratio),
            DurationPolicy::new(config.editor.default_duration_frames),
            TimelineZoom::new(ZoomConfig::from(&config.timeline)),
        )
    }

    /// Editor over the overlays of a loaded document.
    pub fn from_document(document: &CompositionDocument) -> EditorResult<Self> {
        let mut editor = Self::new(document.fps, document.aspect_ratio);
        editor.set_overlays(document.overlays.clone())?;
        Ok(editor)
    }

    fn build(
        fps: u32,
        aspect_ratio: AspectRatio,
        policy: DurationPolicy,
        timeline: TimelineZoom,
    ) -> Self {
        let overlays: Arc<[Overlay]> = Arc::from(Vec::new());
        let dimensions = aspect_ratio.dimensions();
        let duration = resolve_duration(&overlays, fps, policy);
        let playback = Playback::default();
        Self {
            snapshot: EditorSnapshot {
                revision: 0,
                overlays: Arc::clone(&overlays),
                aspect_ratio,
                dimensions,
                fps,
                duration,
                selected: None,
                playback,
            },
            overlays,
            next_id: 1,
            revision: 0,
            fps,
            aspect_ratio,
            baseline: dimensions,
            policy,
            selected: None,
            playback,
            timeline,
            durations: DerivedCache::default(),
        }
    }

    pub fn snapshot(&self) -> &EditorSnapshot {
        &self.snapshot
    }

    pub fn overlays(&self) -> &Arc<[Overlay]> {
        &self.overlays
    }

    pub fn overlay(&self, id: OverlayId) -> Option<&Overlay> {
        self.overlays.iter().find(|o| o.id == id)
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    pub fn dimensions(&self) -> CanvasDimensions {
        self.baseline
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn duration(&self) -> CompositionDuration {
        self.snapshot.duration
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn timeline(&self) -> &TimelineZoom {
        &self.timeline
    }

    pub fn timeline_mut(&mut self) -> &mut TimelineZoom {
        &mut self.timeline
    }

    pub fn cache(&self) -> &DerivedCache<(u64, u32), CompositionDuration> {
        &self.durations
    }

    pub fn clear_cache(&mut self) {
        self.durations.clear();
    }

    // ── Overlay mutations ───────────────────────────────────────────

    /// Add an overlay built from `draft`; returns its new id.
    pub fn add(&mut self, draft: OverlayDraft) -> EditorResult<OverlayId> {
        if draft.duration_in_frames == 0 {
            return Err(EditorError::ZeroDuration);
        }
        let overlay = draft.into_overlay(self.mint_id());
        let id = overlay.id;
        debug!(%id, kind = overlay.kind_name(), from = overlay.from, "Adding overlay");

        let mut next = self.overlays.to_vec();
        next.push(overlay);
        self.install(next);
        Ok(id)
    }

    /// Edit one overlay in place. The overlay keeps its id and `type`.
    pub fn change(
        &mut self,
        id: OverlayId,
        update: impl FnOnce(&mut Overlay),
    ) -> EditorResult<()> {
        let index = self.index_of(id)?;
        let original = &self.overlays[index];
        let mut changed = original.clone();
        update(&mut changed);

        if changed.id != id {
            return Err(EditorError::IdChange {
                id,
                attempted: changed.id,
            });
        }
        if !changed.kind.same_type(&original.kind) {
            return Err(EditorError::TypeChange {
                id,
                from: original.kind_name(),
                to: changed.kind_name(),
            });
        }
        if changed.duration_in_frames == 0 {
            return Err(EditorError::ZeroDuration);
        }
        if changed == *original {
            return Ok(());
        }

        debug!(%id, "Changing overlay");
        let mut next = self.overlays.to_vec();
        next[index] = changed;
        self.install(next);
        Ok(())
    }

    /// Remove an overlay, clearing the selection if it pointed at it.
    pub fn delete(&mut self, id: OverlayId) -> EditorResult<Overlay> {
        let index = self.index_of(id)?;
        let mut next = self.overlays.to_vec();
        let removed = next.remove(index);
        if self.selected == Some(id) {
            self.selected = None;
        }
        debug!(%id, "Deleting overlay");
        self.install(next);
        Ok(removed)
    }

    /// Copy an overlay onto the first free slot of its row at or after the
    /// original's end. Returns the id of the copy.
    pub fn duplicate(&mut self, id: OverlayId) -> EditorResult<OverlayId> {
        let original = self.overlays[self.index_of(id)?].clone();
        let from = first_free_slot(
            &self.overlays,
            original.row,
            original.end_frame(),
            original.duration_in_frames,
        );

        let copy = Overlay {
            id: self.mint_id(),
            from,
            ..original
        };
        let copy_id = copy.id;
        debug!(%id, copy = %copy_id, from, "Duplicating overlay");

        let mut next = self.overlays.to_vec();
        next.push(copy);
        self.install(next);
        Ok(copy_id)
    }

    /// Cut an overlay in two at `frame`, which must fall strictly inside
    /// it. The left part keeps the id; the right part gets a new id and
    /// starts its media where the left part stops.
    pub fn split(&mut self, id: OverlayId, frame: u32) -> EditorResult<(OverlayId, OverlayId)> {
        let index = self.index_of(id)?;
        let original = &self.overlays[index];
        let (from, end) = (original.from, original.end_frame());
        if frame <= from || frame >= end {
            return Err(EditorError::InvalidSplit {
                id,
                frame,
                from,
                end,
            });
        }

        let offset = frame - from;
        let left = Overlay {
            duration_in_frames: offset,
            ..original.clone()
        };
        let right = Overlay {
            id: OverlayId(self.next_id),
            from: frame,
            duration_in_frames: end - frame,
            kind: advance_media(&original.kind, offset, self.fps),
            ..original.clone()
        };
        self.next_id += 1;
        let right_id = right.id;
        debug!(%id, right = %right_id, frame, "Splitting overlay");

        let mut next = self.overlays.to_vec();
        next[index] = left;
        next.insert(index + 1, right);
        self.install(next);
        Ok((id, right_id))
    }

    /// Replace the whole overlay set.
    pub fn set_overlays(&mut self, overlays: impl Into<Arc<[Overlay]>>) -> EditorResult<()> {
        let overlays = overlays.into();
        validate_overlays(&overlays)?;
        if let Some(max) = overlays.iter().map(|o| o.id.0).max() {
            self.next_id = self.next_id.max(max.saturating_add(1));
        }
        if let Some(selected) = self.selected {
            if !overlays.iter().any(|o| o.id == selected) {
                self.selected = None;
            }
        }
        debug!(count = overlays.len(), "Replacing overlay set");
        self.install_arc(overlays);
        Ok(())
    }

    /// Switch the canvas aspect ratio, rescaling every overlay from the
    /// previous canvas. The new canvas becomes the baseline for the next
    /// switch even when nothing had to be rescaled.
    pub fn set_aspect_ratio(&mut self, label: &str) {
        let ratio = AspectRatio::parse(label);
        let dimensions = ratio.dimensions();
        let transformed = transform_overlays_for_aspect_ratio(&self.overlays, self.baseline, dimensions);
        debug!(
            from = %self.baseline,
            to = %dimensions,
            ratio = ratio.label(),
            "Changing aspect ratio"
        );

        self.aspect_ratio = ratio;
        self.baseline = dimensions;
        if Arc::ptr_eq(&transformed, &self.overlays) {
            self.refresh();
        } else {
            self.install_arc(transformed);
        }
    }

    pub fn set_fps(&mut self, fps: u32) {
        self.fps = fps;
        self.refresh();
    }

    // ── Selection and playback ──────────────────────────────────────

    pub fn select(&mut self, id: Option<OverlayId>) -> EditorResult<()> {
        if let Some(id) = id {
            self.index_of(id)?;
        }
        self.selected = id;
        self.refresh();
        Ok(())
    }

    pub fn selected(&self) -> Option<&Overlay> {
        self.selected.and_then(|id| self.overlay(id))
    }

    pub fn play(&mut self) {
        self.playback.play();
        self.refresh();
    }

    pub fn pause(&mut self) {
        self.playback.pause();
        self.refresh();
    }

    pub fn toggle_playback(&mut self) -> bool {
        let playing = self.playback.toggle();
        self.refresh();
        playing
    }

    pub fn seek(&mut self, frame: u32) {
        self.playback
            .seek(frame, self.snapshot.duration.duration_in_frames);
        self.refresh();
    }

    /// Advance the playhead by `frames` while playing.
    pub fn advance(&mut self, frames: u32) -> u32 {
        let frame = self
            .playback
            .advance(frames, self.snapshot.duration.duration_in_frames);
        self.refresh();
        frame
    }

    /// Playhead position as `mm:ss:ff`.
    pub fn timecode(&self) -> String {
        FrameClock::new(self.fps).timecode(self.playback.current_frame)
    }

    // ── Renderer input ──────────────────────────────────────────────

    pub fn composition(&self) -> Composition {
        Composition {
            overlays: self.overlays.to_vec(),
            duration_in_frames: self.snapshot.duration.duration_in_frames,
            fps: self.fps,
            width: self.baseline.width,
            height: self.baseline.height,
        }
    }

    pub fn render_request(&self, composition_id: &str, src: Option<&str>) -> RenderRequest {
        let request = RenderRequest::new(composition_id, self.composition());
        match src {
            Some(src) => request.with_src(src),
            None => request,
        }
    }

    // ── Internals ───────────────────────────────────────────────────

    fn index_of(&self, id: OverlayId) -> EditorResult<usize> {
        self.overlays
            .iter()
            .position(|o| o.id == id)
            .ok_or(EditorError::OverlayNotFound(id))
    }

    fn mint_id(&mut self) -> OverlayId {
        let id = OverlayId(self.next_id);
        self.next_id += 1;
        id
    }

    fn install(&mut self, overlays: Vec<Overlay>) {
        self.install_arc(overlays.into());
    }

    fn install_arc(&mut self, overlays: Arc<[Overlay]>) {
        self.overlays = overlays;
        self.revision += 1;
        self.refresh();
    }

    fn refresh(&mut self) {
        let (overlays, fps, policy) = (&self.overlays, self.fps, self.policy);
        let duration = self
            .durations
            .get_or_compute((self.revision, fps), || resolve_duration(overlays, fps, policy));
        self.playback.clamp_to(duration.duration_in_frames);

        self.snapshot = EditorSnapshot {
            revision: self.revision,
            overlays: Arc::clone(&self.overlays),
            aspect_ratio: self.aspect_ratio,
            dimensions: self.baseline,
            fps: self.fps,
            duration,
            selected: self.selected,
            playback: self.playback,
        };
    }
}

/// Earliest start at or after `start` where `length` frames fit on `row`
/// without overlapping another overlay.
fn first_free_slot(overlays: &[Overlay], row: u32, start: u32, length: u32) -> u32 {
    let mut candidate = start;
    loop {
        let end = candidate.saturating_add(length);
        let blocker = overlays
            .iter()
            .filter(|o| o.row == row && o.from < end && candidate < o.end_frame())
            .map(Overlay::end_frame)
            .max();
        match blocker {
            Some(blocked_until) if blocked_until > candidate => candidate = blocked_until,
            _ => return candidate,
        }
    }
}

/// Payload for the right half of a split: media starts `offset` frames later.
fn advance_media(kind: &OverlayKind, offset: u32, fps: u32) -> OverlayKind {
    let mut kind = kind.clone();
    match &mut kind {
        OverlayKind::Video {
            video_start_time, ..
        } => {
            *video_start_time += FrameClock::new(fps).frames_to_secs(offset);
        }
        OverlayKind::Audio {
            start_from_sound, ..
        } => {
            *start_from_sound = start_from_sound.saturating_add(offset);
        }
        _ => {}
    }
    kind
}
