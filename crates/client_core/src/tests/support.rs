//! Scripted gateway shared by the orchestration tests.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use shared::protocol::{
    Composition, HealthResponse, SequenceInput, SequenceOutput, SequenceStats,
};

use crate::gateway::{GatewayError, SequenceGateway, TransformOperation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Health,
    Transform(TransformOperation, String),
    Stats(String),
}

pub struct Scripted<T> {
    pub delay: Duration,
    pub reply: Result<T, GatewayError>,
}

impl<T> Scripted<T> {
    pub fn ok(value: T) -> Self {
        Self {
            delay: Duration::ZERO,
            reply: Ok(value),
        }
    }

    pub fn err(err: GatewayError) -> Self {
        Self {
            delay: Duration::ZERO,
            reply: Err(err),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Replies from per-operation scripts, falling back to instant local answers
/// once a script runs dry.
#[derive(Default)]
pub struct FakeGateway {
    health: Mutex<VecDeque<Scripted<HealthResponse>>>,
    transforms: Mutex<VecDeque<Scripted<SequenceOutput>>>,
    stats: Mutex<VecDeque<Scripted<SequenceStats>>>,
    healthy_by_default: Mutex<bool>,
    calls: Mutex<Vec<Call>>,
}

impl FakeGateway {
    pub fn online() -> Arc<Self> {
        let gateway = Self::default();
        *gateway.healthy_by_default.lock().expect("lock") = true;
        Arc::new(gateway)
    }

    pub fn offline() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script_health(&self, reply: Scripted<HealthResponse>) {
        self.health.lock().expect("lock").push_back(reply);
    }

    pub fn script_transform(&self, reply: Scripted<SequenceOutput>) {
        self.transforms.lock().expect("lock").push_back(reply);
    }

    pub fn script_stats(&self, reply: Scripted<SequenceStats>) {
        self.stats.lock().expect("lock").push_back(reply);
    }

    pub fn set_healthy(&self, healthy: bool) {
        *self.healthy_by_default.lock().expect("lock") = healthy;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("lock").clone()
    }

    pub fn stats_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Stats(sequence) => Some(sequence),
                _ => None,
            })
            .collect()
    }

    pub fn health_calls(&self) -> usize {
        self.calls()
            .into_iter()
            .filter(|call| *call == Call::Health)
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("lock").push(call);
    }
}

pub fn healthy() -> HealthResponse {
    HealthResponse {
        status: "healthy".to_string(),
        package_manager: None,
    }
}

pub fn output(result: &str, original: &str) -> SequenceOutput {
    SequenceOutput {
        result: result.to_string(),
        original_sequence: original.to_string(),
        sequence_type: "dna".to_string(),
        sequence_id: None,
        metadata: None,
    }
}

pub fn stats_for(sequence: &str) -> SequenceStats {
    let mut composition = Composition::new();
    let cleaned: Vec<char> = sequence
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    for symbol in &cleaned {
        let key = symbol.to_string();
        if composition.get(&key).is_none() {
            let count = cleaned.iter().filter(|c| *c == symbol).count() as u64;
            composition.insert(key, count).expect("unique symbol");
        }
    }
    SequenceStats {
        length: cleaned.len() as u64,
        composition,
        gc_content: None,
        molecular_weight: None,
        sequence_type: "dna".to_string(),
        sequence_id: None,
    }
}

fn reverse_complement(sequence: &str) -> String {
    sequence
        .chars()
        .rev()
        .map(|c| match c.to_ascii_uppercase() {
            'A' => 'T',
            'T' => 'A',
            'C' => 'G',
            'G' => 'C',
            other => other,
        })
        .collect()
}

async fn play<T>(script: Option<Scripted<T>>, fallback: impl FnOnce() -> Result<T, GatewayError>) -> Result<T, GatewayError> {
    match script {
        Some(scripted) => {
            if !scripted.delay.is_zero() {
                tokio::time::sleep(scripted.delay).await;
            }
            scripted.reply
        }
        None => fallback(),
    }
}

#[async_trait]
impl SequenceGateway for FakeGateway {
    async fn health_check(&self) -> Result<HealthResponse, GatewayError> {
        self.record(Call::Health);
        let script = self.health.lock().expect("lock").pop_front();
        let healthy_by_default = *self.healthy_by_default.lock().expect("lock");
        play(script, || {
            if healthy_by_default {
                Ok(healthy())
            } else {
                Err(GatewayError::Transport("connection refused".to_string()))
            }
        })
        .await
    }

    async fn transform(
        &self,
        operation: TransformOperation,
        input: &SequenceInput,
    ) -> Result<SequenceOutput, GatewayError> {
        self.record(Call::Transform(operation, input.sequence.clone()));
        let script = self.transforms.lock().expect("lock").pop_front();
        let sequence = input.sequence.clone();
        play(script, move || {
            let result = match operation {
                TransformOperation::ReverseComplement => reverse_complement(&sequence),
                TransformOperation::Lowercase => sequence.to_lowercase(),
                _ => sequence.to_uppercase(),
            };
            Ok(output(&result, &sequence))
        })
        .await
    }

    async fn get_stats(&self, input: &SequenceInput) -> Result<SequenceStats, GatewayError> {
        self.record(Call::Stats(input.sequence.clone()));
        let script = self.stats.lock().expect("lock").pop_front();
        let sequence = input.sequence.clone();
        play(script, move || Ok(stats_for(&sequence))).await
    }
}
