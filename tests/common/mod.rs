//! Shared test helpers.
#![allow(dead_code)]

use chrono::Duration;
use facetier::application::identity_resolver::IdentityResolver;
use facetier::domain::entities::detection::{Detection, Frame, LabeledFrame};
use facetier::domain::entities::face_store::FaceStore;
use facetier::domain::error::DomainError;
use facetier::domain::ports::frame_io::{FrameSink, FrameSource};
use facetier::domain::ports::name_prompt::{NamePrompt, NameRequest};
use facetier::domain::values::face_vector::FaceVector;
use facetier::domain::values::region::BoundingBox;
use facetier::infrastructure::clock::ManualClock;
use facetier::infrastructure::matchers::euclidean::EuclideanMatcher;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

pub fn vector(components: &[f64]) -> FaceVector {
    FaceVector::new(components.to_vec()).unwrap()
}

pub fn detection(region: [i32; 4], components: &[f64]) -> Detection {
    Detection {
        region: BoundingBox::from(region),
        vector: vector(components),
        crop: None,
    }
}

pub fn stores(clock: Arc<ManualClock>, window: Duration) -> (FaceStore, FaceStore) {
    let matcher = Arc::new(EuclideanMatcher::default());
    (
        FaceStore::ephemeral(window, matcher.clone(), clock.clone()),
        FaceStore::permanent(window, matcher, clock),
    )
}

pub fn resolver(clock: Arc<ManualClock>, prompt: Arc<dyn NamePrompt>) -> IdentityResolver {
    let (ephemeral, permanent) = stores(clock, Duration::hours(1));
    IdentityResolver::new(ephemeral, permanent, prompt)
}

/// Answers prompts from a script, optionally holding each answer until a
/// permit is released on `gate`.
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<Option<String>>>,
    gate: Option<Arc<Semaphore>>,
    requests: Mutex<Vec<NameRequest>>,
}

impl ScriptedPrompt {
    pub fn new(answers: Vec<Option<&str>>) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.into_iter().map(|a| a.map(String::from)).collect()),
            gate: None,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn gated(answers: Vec<Option<&str>>) -> (Arc<Self>, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let prompt = Arc::new(Self {
            answers: Mutex::new(answers.into_iter().map(|a| a.map(String::from)).collect()),
            gate: Some(gate.clone()),
            requests: Mutex::new(Vec::new()),
        });
        (prompt, gate)
    }

    pub fn requests(&self) -> Vec<NameRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl NamePrompt for ScriptedPrompt {
    async fn ask(&self, request: NameRequest) -> Result<Option<String>, DomainError> {
        self.requests.lock().unwrap().push(request);
        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| DomainError::Prompt(e.to_string()))?
                .forget();
        }
        Ok(self.answers.lock().unwrap().pop_front().flatten())
    }
}

/// Prompt whose answer is an error.
pub struct FailingPrompt;

#[async_trait::async_trait]
impl NamePrompt for FailingPrompt {
    async fn ask(&self, _request: NameRequest) -> Result<Option<String>, DomainError> {
        Err(DomainError::Prompt("dialog closed".into()))
    }
}

pub struct VecSource {
    frames: VecDeque<Result<Option<Frame>, DomainError>>,
}

impl VecSource {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames: frames.into_iter().map(|f| Ok(Some(f))).collect(),
        }
    }

    pub fn with_results(results: Vec<Result<Option<Frame>, DomainError>>) -> Self {
        Self {
            frames: results.into_iter().collect(),
        }
    }
}

#[async_trait::async_trait]
impl FrameSource for VecSource {
    async fn next_frame(&mut self) -> Result<Option<Frame>, DomainError> {
        self.frames.pop_front().unwrap_or(Ok(None))
    }
}

/// Never yields a frame.
pub struct StalledSource;

#[async_trait::async_trait]
impl FrameSource for StalledSource {
    async fn next_frame(&mut self) -> Result<Option<Frame>, DomainError> {
        std::future::pending().await
    }
}

/// Fails every read with an I/O error, like reading a directory.
#[derive(Default)]
pub struct FailingSource {
    pub reads: usize,
}

#[async_trait::async_trait]
impl FrameSource for FailingSource {
    async fn next_frame(&mut self) -> Result<Option<Frame>, DomainError> {
        self.reads += 1;
        Err(DomainError::Io("Is a directory (os error 21)".into()))
    }
}

/// Rejects every frame, like stdout after the reader hung up.
pub struct BrokenSink;

#[async_trait::async_trait]
impl FrameSink for BrokenSink {
    async fn render(&mut self, _frame: &LabeledFrame) -> Result<(), DomainError> {
        Err(DomainError::Io("Broken pipe (os error 32)".into()))
    }
}

#[derive(Default)]
pub struct CollectSink {
    pub frames: Vec<LabeledFrame>,
}

#[async_trait::async_trait]
impl FrameSink for CollectSink {
    async fn render(&mut self, frame: &LabeledFrame) -> Result<(), DomainError> {
        self.frames.push(frame.clone());
        Ok(())
    }
}

pub fn frame(faces: Vec<Detection>) -> Frame {
    Frame { faces }
}
