//! Running analyses off the caller's thread.
//!
//! [`AnalyzerWorker`] owns one background thread that handles requests
//! strictly one at a time. [`analyze_batch`] fans independent requests out
//! over the rayon pool. Runs share no state, so either is safe.

use std::io;
use std::sync::mpsc::{self, Receiver, SendError, Sender};
use std::thread::{self, JoinHandle};

use rayon::prelude::*;

use crate::handle_request;
use crate::types::{AnalysisRequest, AnalysisResponse};

/// The conversions recurse once per nesting level; give them room.
const WORKER_STACK_SIZE: usize = 16 * 1024 * 1024;

const WORKER_STOPPED: &str = "Analyzer worker has stopped.";

struct Job {
    request: AnalysisRequest,
    reply: Sender<AnalysisResponse>,
}

/// A dedicated analysis thread fed through a channel.
pub struct AnalyzerWorker {
    jobs: Option<Sender<Job>>,
    handle: Option<JoinHandle<()>>,
}

impl AnalyzerWorker {
    pub fn spawn() -> io::Result<Self> {
        let (jobs, queue) = mpsc::channel::<Job>();
        let handle = thread::Builder::new()
            .name("markup-analyzer".to_string())
            .stack_size(WORKER_STACK_SIZE)
            .spawn(move || {
                for job in queue {
                    let response = handle_request(&job.request);
                    // The submitter may have dropped its receiver.
                    let _ = job.reply.send(response);
                }
                tracing::debug!("analyzer worker queue closed");
            })?;

        Ok(Self {
            jobs: Some(jobs),
            handle: Some(handle),
        })
    }

    /// Queue a request. The response arrives on the returned receiver.
    pub fn submit(&self, request: AnalysisRequest) -> Receiver<AnalysisResponse> {
        let (reply, response) = mpsc::channel();
        let job = Job { request, reply };
        match &self.jobs {
            Some(jobs) => {
                if let Err(SendError(job)) = jobs.send(job) {
                    tracing::warn!("analyzer worker is gone; failing request");
                    let _ = job.reply.send(AnalysisResponse::failure(WORKER_STOPPED));
                }
            }
            None => {
                let _ = job.reply.send(AnalysisResponse::failure(WORKER_STOPPED));
            }
        }
        response
    }

    /// Submit and block until the response arrives.
    pub fn analyze(&self, request: AnalysisRequest) -> AnalysisResponse {
        self.submit(request)
            .recv()
            .unwrap_or_else(|_| AnalysisResponse::failure(WORKER_STOPPED))
    }
}

impl Drop for AnalyzerWorker {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop after queued jobs finish.
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("analyzer worker panicked");
            }
        }
    }
}

/// Analyze independent requests in parallel. Output order matches input.
pub fn analyze_batch(requests: &[AnalysisRequest]) -> Vec<AnalysisResponse> {
    requests.par_iter().map(handle_request).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_processes_in_order() {
        let worker = AnalyzerWorker::spawn().unwrap();
        let first = worker.submit(AnalysisRequest::new("<div><p>a</p></div>", "html"));
        let second = worker.submit(AnalysisRequest::new("", "jsx"));

        let first = first.recv().unwrap();
        assert!(first.success);
        assert_eq!(first.result.unwrap().dfs.total_nodes, 2);

        let second = second.recv().unwrap();
        assert!(!second.success);
        assert_eq!(
            second.error.as_deref(),
            Some("Input is empty. Please provide HTML or JSX code.")
        );
    }

    #[test]
    fn test_worker_blocking_analyze() {
        let worker = AnalyzerWorker::spawn().unwrap();
        let response = worker.analyze(AnalysisRequest::new("const x = <App />;", "tsx"));
        assert!(response.success);
        assert_eq!(response.result.unwrap().tree.tag, "App");
    }

    #[test]
    fn test_batch_preserves_order() {
        let requests = vec![
            AnalysisRequest::new("<ul><li></li></ul>", "html"),
            AnalysisRequest::new("<p></p>", "markdown"),
            AnalysisRequest::new("const a = <A><B /></A>;", "jsx"),
        ];
        let responses = analyze_batch(&requests);
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0].result.as_ref().unwrap().tree.tag, "ul");
        assert_eq!(responses[1].error.as_deref(), Some("Unsupported language: markdown"));
        assert_eq!(responses[2].result.as_ref().unwrap().dfs.max_depth, 1);
    }
}
