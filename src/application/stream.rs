use crate::application::identity_resolver::{IdentityResolver, PromptOutcome};
use crate::domain::entities::detection::{Detection, LabeledFrame, ResolvedFace};
use crate::domain::error::DomainError;
use crate::domain::ports::frame_io::{FrameSink, FrameSource};
use crate::domain::values::classification::Classification;
use serde::Serialize;
use std::future::Future;
use tracing::{debug, info, warn};

/// Frame-loop knobs that stay outside the resolver.
#[derive(Debug, Clone, Copy)]
pub struct StreamSettings {
    /// Factor the detector downscaled frames by; boxes are scaled back up.
    pub resize_factor: f64,
    /// Resolve every n-th frame; frames in between reuse the last labels.
    pub frame_stride: u32,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct StreamSummary {
    pub frames_read: u64,
    pub frames_resolved: u64,
    pub bad_frames: u64,
    pub faces_seen: u64,
    pub unknown_faces: u64,
    pub promotions: u64,
    pub declined_prompts: u64,
    pub interrupted: bool,
    /// Set when the source failed in a way skipping a line cannot fix.
    pub source_error: Option<String>,
    /// Set when the sink stopped accepting frames.
    pub sink_error: Option<String>,
}

impl StreamSummary {
    /// The error that ended the stream early, if any.
    pub fn failure(&self) -> Option<&str> {
        self.source_error.as_deref().or(self.sink_error.as_deref())
    }
}

pub struct StreamUseCase {
    settings: StreamSettings,
}

impl StreamUseCase {
    pub fn new(settings: StreamSettings) -> Self {
        Self { settings }
    }

    /// Drives `source` through the resolver into `sink` until the source
    /// ends or `shutdown` fires. At end of stream a pending prompt is waited
    /// for; on shutdown it is cancelled.
    ///
    /// Unparseable frames are skipped. Any other source error, or a sink
    /// error, ends the stream like end of input and is reported in the
    /// summary, so the caller can still save what was learned.
    pub async fn run<F>(
        &self,
        resolver: &mut IdentityResolver,
        source: &mut dyn FrameSource,
        sink: &mut dyn FrameSink,
        shutdown: F,
    ) -> StreamSummary
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let stride = u64::from(self.settings.frame_stride.max(1));
        let mut summary = StreamSummary::default();
        let mut last_faces: Vec<ResolvedFace> = Vec::new();

        loop {
            let next = tokio::select! {
                next = source.next_frame() => next,
                _ = &mut shutdown => {
                    summary.interrupted = true;
                    break;
                }
            };
            let frame = match next {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(DomainError::InvalidInput(msg)) => {
                    warn!(error = %msg, "skipping unreadable frame");
                    summary.bad_frames += 1;
                    continue;
                }
                Err(e) => {
                    warn!(error = %e, "frame source failed, ending stream");
                    summary.source_error = Some(e.to_string());
                    break;
                }
            };
            let index = summary.frames_read;
            summary.frames_read += 1;

            if let Some(outcome) = resolver.poll_prompt() {
                Self::count_outcome(&mut summary, &outcome);
            }

            if index % stride == 0 {
                last_faces = self.resolve(resolver, index, &frame.faces, &mut summary);
                summary.frames_resolved += 1;
            }

            let labeled = LabeledFrame {
                index,
                faces: last_faces.clone(),
            };
            if let Err(e) = sink.render(&labeled).await {
                warn!(error = %e, frame = index, "frame sink failed, ending stream");
                summary.sink_error = Some(e.to_string());
                break;
            }
        }

        let outcome = if summary.interrupted {
            resolver.cancel_prompt();
            None
        } else {
            resolver.settle().await
        };
        if let Some(outcome) = outcome {
            Self::count_outcome(&mut summary, &outcome);
        }

        info!(
            frames = summary.frames_read,
            resolved = summary.frames_resolved,
            promotions = summary.promotions,
            "stream finished"
        );
        summary
    }

    fn resolve(
        &self,
        resolver: &mut IdentityResolver,
        index: u64,
        faces: &[Detection],
        summary: &mut StreamSummary,
    ) -> Vec<ResolvedFace> {
        let scaled: Vec<Detection> = faces
            .iter()
            .map(|d| Detection {
                region: d.region.scale_up(self.settings.resize_factor),
                ..d.clone()
            })
            .collect();

        let resolutions = resolver.resolve_frame(index, &scaled);
        summary.faces_seen += resolutions.len() as u64;
        scaled
            .iter()
            .zip(resolutions)
            .map(|(d, r)| {
                if r.classification == Classification::Unknown {
                    summary.unknown_faces += 1;
                }
                debug!(frame = index, name = %r.name, class = %r.classification, "resolved face");
                ResolvedFace {
                    region: d.region,
                    code: r.classification.code(),
                    classification: r.classification,
                    name: r.name,
                }
            })
            .collect()
    }

    fn count_outcome(summary: &mut StreamSummary, outcome: &PromptOutcome) {
        match outcome {
            PromptOutcome::Promoted { .. } => summary.promotions += 1,
            PromptOutcome::Declined => summary.declined_prompts += 1,
            PromptOutcome::Failed(_) => {}
        }
    }
}
