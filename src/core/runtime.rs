//! Drives the session: reduces events on the caller's task and runs the
//! resulting effects as background tasks that report back over a channel.

use super::events::{Effect, Event, UiEffect};
use super::state::SessionState;
use crate::ai::gateway::ModelGateway;
use crate::config::Timings;
use crate::orchestrator;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;

enum Completion {
    /// Result of a model call or the simulated login.
    Work(Event),
    /// Toast expiry; nobody waits on these.
    Timer(Event),
}

pub struct Runtime {
    state: SessionState,
    gateway: Arc<ModelGateway>,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    in_flight: usize,
    ui_effects: Vec<UiEffect>,
}

impl Runtime {
    pub fn new(gateway: ModelGateway, timings: Timings) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: SessionState::new(timings),
            gateway: Arc::new(gateway),
            tx,
            rx,
            in_flight: 0,
            ui_effects: Vec::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Number of model calls (and logins) still pending.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn dispatch(&mut self, event: Event) {
        for effect in orchestrator::reduce(&mut self.state, event) {
            self.perform(effect);
        }
    }

    /// Waits for the next background completion and reduces it.
    pub async fn step(&mut self) {
        let Some(completion) = self.rx.recv().await else {
            return;
        };
        let event = match completion {
            Completion::Work(event) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                event
            }
            Completion::Timer(event) => event,
        };
        self.dispatch(event);
    }

    /// Processes completions until no work is pending. Toast timers that are
    /// still running are left alone.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            self.step().await;
        }
    }

    pub fn drain_ui_effects(&mut self) -> Vec<UiEffect> {
        std::mem::take(&mut self.ui_effects)
    }

    fn perform(&mut self, effect: Effect) {
        match effect {
            Effect::Analyze { request, prompt } => {
                let gateway = Arc::clone(&self.gateway);
                self.spawn_work(async move {
                    Event::AnalysisFinished {
                        request,
                        outcome: gateway.analyze(&prompt).await,
                    }
                });
            }
            Effect::Execute {
                request,
                slot,
                prompt,
                mode,
            } => {
                let gateway = Arc::clone(&self.gateway);
                self.spawn_work(async move {
                    Event::ExecutionFinished {
                        request,
                        slot,
                        response: gateway.execute(&prompt, mode).await,
                    }
                });
            }
            Effect::CompleteLogin { after } => {
                self.spawn_work(async move {
                    tokio::time::sleep(after).await;
                    Event::LoginCompleted
                });
            }
            Effect::ExpireToast { id, after } => {
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(after).await;
                    let _ = tx.send(Completion::Timer(Event::ToastExpired(id)));
                });
            }
            Effect::Ui(effect) => self.ui_effects.push(effect),
        }
    }

    fn spawn_work<F>(&mut self, work: F)
    where
        F: Future<Output = Event> + Send + 'static,
    {
        self.in_flight += 1;
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let event = work.await;
            if tx.send(Completion::Work(event)).is_err() {
                log::debug!("Runtime dropped before completion was delivered");
            }
        });
    }
}
