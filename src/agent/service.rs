//! Agent services and the service registry
//!
//! Each agent runs behind a pair of FIFO queues and its own background
//! task: prompts go in, one conversation loop runs per prompt, textual
//! results come out. The registry owns the name-to-service mapping, creates
//! services lazily on first lookup, and cancels every service task on
//! shutdown.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::agent::conversation::{CompletionHandler, ConversationLoop, ReportCompletion};
use crate::agent::definition::Agent;
use crate::core::{Config, OverflowPolicy, Result, TroupeError};
use crate::tools::ToolContext;

/// One unit of work for an agent service: the prompt and the invocation
/// chain that led to it (the target agent last)
#[derive(Debug, Clone)]
pub struct PromptRequest {
    pub prompt: String,
    pub chain: Vec<String>,
}

/// A queue-wrapped, independently-scheduled instance of one agent.
///
/// Callers must alternate `send_to`/`receive_from` 1:1: responses carry no
/// correlation id and are only guaranteed to come back in FIFO order.
pub struct AgentService {
    name: String,
    request_tx: mpsc::Sender<PromptRequest>,
    response_rx: tokio::sync::Mutex<mpsc::Receiver<Result<String>>>,
    overflow: OverflowPolicy,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for AgentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentService")
            .field("name", &self.name)
            .field("overflow", &self.overflow)
            .finish_non_exhaustive()
    }
}

impl AgentService {
    /// Spawn a service for the given agent. The background task processes
    /// prompts strictly one at a time, in submission order.
    fn spawn(
        agent: Arc<Agent>,
        registry: Weak<Registry>,
        config: Config,
        completion: Arc<dyn CompletionHandler>,
        cancel: CancellationToken,
    ) -> Arc<Self> {
        let capacity = config.service.queue_capacity.max(1);
        let overflow = config.service.overflow;
        let (request_tx, mut request_rx) = mpsc::channel::<PromptRequest>(capacity);
        let (response_tx, response_rx) = mpsc::channel::<Result<String>>(capacity);

        let name = agent.name().to_string();
        let task_cancel = cancel.clone();

        let task = tokio::spawn(async move {
            loop {
                let request = tokio::select! {
                    _ = task_cancel.cancelled() => break,
                    request = request_rx.recv() => match request {
                        Some(request) => request,
                        None => break,
                    },
                };

                tracing::info!(agent = agent.name(), prompt = %request.prompt, "received prompt");

                // The registry outlives its services except during
                // teardown; a failed upgrade means we are shutting down.
                let Some(registry) = registry.upgrade() else {
                    break;
                };

                let ctx = ToolContext::new(registry, request.chain, task_cancel.child_token());
                let mut conversation =
                    ConversationLoop::with_completion(agent.clone(), &config, completion.clone());
                let result = conversation.run(&request.prompt, &ctx).await;

                match &result {
                    Ok(response) => {
                        tracing::info!(agent = agent.name(), response = %response, "responding");
                    }
                    Err(e) => {
                        tracing::error!(agent = agent.name(), error = %e, "run failed");
                    }
                }

                // The caller is waiting on the outbound queue either way;
                // a failed run must reach them, not vanish.
                if response_tx.send(result).await.is_err() {
                    break;
                }
            }
        });

        Arc::new(Self {
            name,
            request_tx,
            response_rx: tokio::sync::Mutex::new(response_rx),
            overflow,
            cancel,
            task: Mutex::new(Some(task)),
        })
    }

    /// Get the name of the wrapped agent
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Enqueue a prompt from the host process
    pub async fn send_to(&self, prompt: impl Into<String>) -> Result<()> {
        self.send_request(PromptRequest {
            prompt: prompt.into(),
            chain: vec![self.name.clone()],
        })
        .await
    }

    /// Enqueue a prompt request carrying an explicit invocation chain
    pub async fn send_request(&self, request: PromptRequest) -> Result<()> {
        match self.overflow {
            OverflowPolicy::Block => self
                .request_tx
                .send(request)
                .await
                .map_err(|_| TroupeError::QueueClosed(self.name.clone())),
            OverflowPolicy::Reject => match self.request_tx.try_send(request) {
                Ok(()) => Ok(()),
                Err(TrySendError::Full(_)) => Err(TroupeError::QueueFull(self.name.clone())),
                Err(TrySendError::Closed(_)) => Err(TroupeError::QueueClosed(self.name.clone())),
            },
        }
    }

    /// Dequeue one response, suspending until it is available
    pub async fn receive_from(&self) -> Result<String> {
        let mut response_rx = self.response_rx.lock().await;
        match response_rx.recv().await {
            Some(result) => result,
            None => Err(TroupeError::QueueClosed(self.name.clone())),
        }
    }

    /// Cancel the background task
    pub fn shutdown(&self) {
        self.cancel.cancel();
        if let Some(task) = self
            .task
            .lock()
            .expect("service task handle poisoned")
            .take()
        {
            task.abort();
        }
    }
}

/// Name-to-service mapping with lazy service creation.
///
/// Constructed once at process start and passed by reference to everything
/// that needs lookup; `shutdown` cancels all service tasks.
pub struct Registry {
    config: Config,
    completion: Arc<dyn CompletionHandler>,
    agents: Mutex<HashMap<String, Arc<Agent>>>,
    services: Mutex<HashMap<String, Arc<AgentService>>>,
    cancel: CancellationToken,
}

impl Registry {
    /// Create a registry with the default completion handler
    pub fn new(config: Config) -> Arc<Self> {
        Self::with_completion(config, Arc::new(ReportCompletion))
    }

    /// Create a registry with a custom completion handler shared by all
    /// agents
    pub fn with_completion(config: Config, completion: Arc<dyn CompletionHandler>) -> Arc<Self> {
        Arc::new(Self {
            config,
            completion,
            agents: Mutex::new(HashMap::new()),
            services: Mutex::new(HashMap::new()),
            cancel: CancellationToken::new(),
        })
    }

    /// Get the registry's configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register an agent definition under its name
    pub fn register(&self, agent: Agent) {
        self.agents
            .lock()
            .expect("agent map poisoned")
            .insert(agent.name().to_string(), Arc::new(agent));
    }

    /// Registered agent names, sorted
    pub fn agent_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .agents
            .lock()
            .expect("agent map poisoned")
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Look up the service for an agent name, creating and starting it on
    /// first use
    pub fn service(self: &Arc<Self>, name: &str) -> Result<Arc<AgentService>> {
        let mut services = self.services.lock().expect("service map poisoned");
        if let Some(service) = services.get(name) {
            return Ok(service.clone());
        }

        let agent = self
            .agents
            .lock()
            .expect("agent map poisoned")
            .get(name)
            .cloned()
            .ok_or_else(|| TroupeError::UnknownAgent(name.to_string()))?;

        tracing::debug!(agent = name, "starting agent service");
        let service = AgentService::spawn(
            agent,
            Arc::downgrade(self),
            self.config.clone(),
            self.completion.clone(),
            self.cancel.child_token(),
        );
        services.insert(name.to_string(), service.clone());
        Ok(service)
    }

    /// Cancel every running service task
    pub fn shutdown(&self) {
        self.cancel.cancel();
        let services = self.services.lock().expect("service map poisoned");
        for service in services.values() {
            service.shutdown();
        }
    }
}
